use crate::ipc::helpers::{book_mut, outcome_response, required_index, required_input, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_marks_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_index = match required_index(req, "studentIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let value = match required_input(req, "value") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.set_mark(student_index, &subject, &value);
    let can_compute = book.can_compute();
    outcome_response(req, outcome, |mark| {
        json!({
            "studentIndex": student_index,
            "subject": subject,
            "mark": mark,
            "canCompute": can_compute,
        })
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.set" => Some(handle_marks_set(state, req)),
        _ => None,
    }
}

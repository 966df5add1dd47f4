use crate::ipc::error::ok;
use crate::ipc::helpers::{
    book, book_mut, outcome_response, required_index, required_str, students_json,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let book = match book(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "students": students_json(book) }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.add_student(&name);
    let index = book.students().len().saturating_sub(1);
    outcome_response(req, outcome, |id| json!({ "studentId": id, "index": index }))
}

fn handle_students_rename(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req, "index") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.rename_student(index, &name);
    outcome_response(req, outcome, |()| json!({ "index": index }))
}

fn handle_students_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req, "index") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.remove_student(index);
    outcome_response(req, outcome, |s| {
        json!({ "studentId": s.id, "name": s.name })
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.rename" => Some(handle_students_rename(state, req)),
        "students.remove" => Some(handle_students_remove(state, req)),
        _ => None,
    }
}

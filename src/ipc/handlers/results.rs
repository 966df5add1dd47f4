use crate::ipc::error::ok;
use crate::ipc::helpers::{book, book_mut, outcome_response};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_results_compute(state: &mut AppState, req: &Request) -> serde_json::Value {
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.compute();
    outcome_response(req, outcome, |snapshot| json!(snapshot))
}

fn handle_results_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let book = match book(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "canCompute": book.can_compute(),
            "results": book.last_results(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "results.compute" => Some(handle_results_compute(state, req)),
        "results.get" => Some(handle_results_get(state, req)),
        _ => None,
    }
}

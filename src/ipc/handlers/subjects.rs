use crate::catalog::parse_total;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    book, book_mut, outcome_response, required_index, required_input, required_str, subjects_json,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let book = match book(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "subjects": subjects_json(book) }))
}

fn handle_subjects_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let total = match required_input(req, "total") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.add_subject(&name, &total);
    let index = book.subjects().len().saturating_sub(1);
    outcome_response(req, outcome, |()| json!({ "index": index }))
}

fn handle_subjects_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req, "index") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let total = match req.params.get("total") {
        Some(v) if v.is_i64() => v.as_i64(),
        Some(v) if v.is_string() => v.as_str().and_then(parse_total),
        Some(v) if v.is_number() => None,
        _ => return err(&req.id, "bad_params", "missing total", None),
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    // An unparseable total goes through as 0 so a bad index still wins.
    let outcome = book.edit_subject(index, &name, total.unwrap_or(0));
    outcome_response(req, outcome, |previous| {
        json!({ "index": index, "previous": previous })
    })
}

fn handle_subjects_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req, "index") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = book.remove_subject(index);
    outcome_response(req, outcome, |removed| json!({ "removed": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "subjects.add" => Some(handle_subjects_add(state, req)),
        "subjects.edit" => Some(handle_subjects_edit(state, req)),
        "subjects.remove" => Some(handle_subjects_remove(state, req)),
        _ => None,
    }
}

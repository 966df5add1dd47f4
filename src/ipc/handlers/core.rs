use crate::db::SqliteStore;
use crate::gradebook::Gradebook;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{book, book_mut, students_json, subjects_json};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match SqliteStore::open(&path) {
        Ok(store) => {
            let book = Gradebook::open(store);
            tracing::info!(
                workspace = %path.to_string_lossy(),
                students = book.students().len(),
                subjects = book.subjects().len(),
                "workspace opened"
            );
            state.workspace = Some(path.clone());
            state.book = Some(book);
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_gradebook_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let book = match book(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "students": students_json(book),
            "subjects": subjects_json(book),
            "canCompute": book.can_compute(),
            "results": book.last_results(),
        }),
    )
}

fn handle_gradebook_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match book.reset() {
        Ok(()) => ok(&req.id, json!({ "reset": true })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "gradebook.get" => Some(handle_gradebook_get(state, req)),
        "gradebook.reset" => Some(handle_gradebook_reset(state, req)),
        _ => None,
    }
}

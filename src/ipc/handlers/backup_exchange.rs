use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{book, book_mut};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let book = match book(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let persisted = match book.persisted_state() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "encode_failed", e.to_string(), None),
    };

    let out = PathBuf::from(&out_path);
    let export = match backup::export_state_bundle(&persisted, &out) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            )
        }
    };

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count
        }),
    )
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "backup file not found",
            Some(json!({ "path": in_path })),
        );
    }

    let persisted = match backup::read_state_bundle(&src) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_bundle",
                e.to_string(),
                Some(json!({ "path": in_path })),
            )
        }
    };

    let book = match book_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = book.replace_persisted(&persisted) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }
    tracing::info!(
        path = %in_path,
        students = book.students().len(),
        subjects = book.subjects().len(),
        "backup imported"
    );

    ok(
        &req.id,
        json!({
            "path": in_path,
            "bundleFormat": backup::BUNDLE_FORMAT_V1,
            "studentCount": book.students().len(),
            "subjectCount": book.subjects().len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_backup_export(state, req)),
        "backup.import" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}

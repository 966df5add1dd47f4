use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{book, outcome_response, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Outcome, Rejection};
use crate::report::{self, ReportFormat, ReportModel};
use serde_json::json;
use std::path::PathBuf;

fn current_report(
    state: &AppState,
    req: &Request,
) -> Result<Outcome<ReportModel>, serde_json::Value> {
    let book = book(state, req)?;
    Ok(match book.last_results() {
        Some(snapshot) => Outcome::Applied(report::build_report(snapshot)),
        None => Outcome::Rejected(Rejection::NoResults),
    })
}

fn handle_report_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    let outcome = match current_report(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    outcome_response(req, outcome, |model| json!({ "model": model }))
}

fn handle_report_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let format = match req.params.get("format").and_then(|v| v.as_str()) {
        None => ReportFormat::Csv,
        Some(s) => match ReportFormat::parse(s) {
            Some(f) => f,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "format must be one of: csv, text",
                    Some(json!({ "format": s })),
                )
            }
        },
    };
    let model = match current_report(state, req) {
        Ok(Outcome::Applied(m)) => m,
        Ok(rejected) => return outcome_response(req, rejected, |_| json!({})),
        Err(e) => return e,
    };

    let out = PathBuf::from(&out_path);
    match report::export_report(&model, format, &out) {
        Ok(bytes) => {
            tracing::info!(path = %out_path, bytes, "report exported");
            ok(
                &req.id,
                json!({
                    "applied": true,
                    "path": out_path,
                    "bytes": bytes,
                    "rowCount": model.rows.len(),
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": out_path })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.model" => Some(handle_report_model(state, req)),
        "report.export" => Some(handle_report_export(state, req)),
        _ => None,
    }
}

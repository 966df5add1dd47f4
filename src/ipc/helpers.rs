use crate::db::SqliteStore;
use crate::gradebook::Gradebook;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{Outcome, Rejection};
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_index(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a non-negative integer", key),
                None,
            )
        })
}

/// Form-style input: strings pass through, numbers are rendered as text and
/// null reads as an empty field.
pub fn required_input(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::Null) => Ok(String::new()),
        Some(other) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must be a string or number", key),
            Some(json!({ "value": other })),
        )),
        None => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

pub fn book<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Gradebook<SqliteStore>, serde_json::Value> {
    state
        .book
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn book_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Gradebook<SqliteStore>, serde_json::Value> {
    state
        .book
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

/// Applied outcomes become `{applied: true, ..}`. Rejections are answered
/// successfully with a reason, except addressing a missing row, which is a
/// caller bug and reported as `not_found`.
pub fn outcome_response<T>(
    req: &Request,
    outcome: Outcome<T>,
    applied: impl FnOnce(T) -> serde_json::Value,
) -> serde_json::Value {
    match outcome {
        Outcome::Applied(v) => {
            let mut result = applied(v);
            if let Some(obj) = result.as_object_mut() {
                obj.insert("applied".into(), json!(true));
            } else {
                result = json!({ "applied": true, "value": result });
            }
            ok(&req.id, result)
        }
        Outcome::Rejected(r @ (Rejection::NoSuchStudent | Rejection::NoSuchSubject)) => err(
            &req.id,
            "not_found",
            r.to_string(),
            Some(json!({ "reason": r.code() })),
        ),
        Outcome::Rejected(r) => ok(
            &req.id,
            json!({
                "applied": false,
                "reason": r.code(),
                "message": r.to_string(),
            }),
        ),
    }
}

pub fn students_json(book: &Gradebook<SqliteStore>) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = book
        .students()
        .iter()
        .zip(book.mark_records())
        .enumerate()
        .map(|(i, (s, marks))| {
            json!({
                "index": i,
                "id": s.id,
                "name": s.name,
                "marks": marks,
            })
        })
        .collect();
    json!(rows)
}

pub fn subjects_json(book: &Gradebook<SqliteStore>) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = book
        .subjects()
        .iter()
        .enumerate()
        .map(|(i, s)| json!({ "index": i, "name": s.name, "total": s.total }))
        .collect();
    json!(rows)
}

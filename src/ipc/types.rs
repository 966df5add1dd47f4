use std::path::PathBuf;

use crate::db::SqliteStore;
use crate::gradebook::Gradebook;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub book: Option<Gradebook<SqliteStore>>,
}

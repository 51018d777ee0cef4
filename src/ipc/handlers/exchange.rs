use crate::exchange;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::persist_roster;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

fn handle_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let Some(content) = req.params.get("content").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing content", None);
    };

    let outcome = exchange::parse_roster(content);
    if outcome.skipped_rows > 0 {
        debug!(skipped = outcome.skipped_rows, "import skipped malformed rows");
    }
    let imported = outcome.records.len();
    state.roster.bulk_replace(outcome.records);
    persist_roster(state);
    info!(imported, skipped = outcome.skipped_rows, "roster imported");

    ok(
        &req.id,
        json!({
            "imported": imported,
            "skippedRows": outcome.skipped_rows,
        }),
    )
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    if state.roster.is_empty() {
        return err(&req.id, "empty_roster", "no records to export", None);
    }

    let mut content = String::from(exchange::UTF8_BOM);
    content.push_str(&exchange::render_roster(state.roster.snapshot()));

    if let Some(out_path) = req
        .params
        .get("outPath")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        let out = PathBuf::from(out_path);
        if let Some(parent) = out.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return err(
                    &req.id,
                    "io_failed",
                    e.to_string(),
                    Some(json!({ "path": out_path })),
                );
            }
        }
        if let Err(e) = std::fs::write(&out, &content) {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            );
        }
    }

    ok(
        &req.id,
        json!({
            "fileName": exchange::EXPORT_FILE_NAME,
            "contentType": exchange::EXPORT_CONTENT_TYPE,
            "content": content,
            "records": state.roster.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "import.csv" => Some(handle_import_csv(state, req)),
        "export.csv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}

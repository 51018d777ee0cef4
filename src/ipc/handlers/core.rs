use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "records": state.roster.len(),
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

    match db::open_db(&path) {
        Ok(conn) => {
            // A prior save becomes the initial store content; otherwise the
            // session starts empty. An unreadable save must not prevent the
            // workspace from opening.
            let restored = match db::roster_load(&conn) {
                Ok(Some(records)) => {
                    let n = records.len();
                    state.roster.bulk_replace(records);
                    n
                }
                Ok(None) => {
                    state.roster.bulk_replace(Vec::new());
                    0
                }
                Err(e) => {
                    warn!(error = %e, "stored roster unreadable; starting empty");
                    state.roster.bulk_replace(Vec::new());
                    0
                }
            };
            info!(
                workspace = %path.to_string_lossy(),
                restored,
                "workspace opened"
            );
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "restoredRecords": restored,
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}

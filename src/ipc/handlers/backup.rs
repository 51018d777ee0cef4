use crate::backup;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn require_path(req: &Request, field: &'static str) -> Result<PathBuf, serde_json::Value> {
    req.params
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {field}"), None))
}

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let out = match require_path(req, "outPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match backup::export_bundle(&workspace, &out) {
        Ok(summary) => {
            info!(path = %out.to_string_lossy(), "workspace bundle exported");
            ok(
                &req.id,
                json!({
                    "ok": true,
                    "path": out.to_string_lossy(),
                    "format": backup::BUNDLE_FORMAT,
                    "entryCount": summary.entry_count,
                    "dbSha256": summary.db_sha256,
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:?}"),
            Some(json!({ "path": out.to_string_lossy() })),
        ),
    }
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let in_path = match require_path(req, "inPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    // The open connection would keep the old database file alive; drop it
    // before the bundle swaps the file in.
    state.db = None;
    if let Err(e) = backup::import_bundle(&in_path, &workspace) {
        // Reopen whatever is on disk so the session stays usable.
        state.db = db::open_db(&workspace).ok();
        return err(
            &req.id,
            "io_failed",
            format!("{e:?}"),
            Some(json!({ "path": in_path.to_string_lossy() })),
        );
    }

    let conn = match db::open_db(&workspace) {
        Ok(c) => c,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };
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
            warn!(error = %e, "restored roster unreadable; starting empty");
            state.roster.bulk_replace(Vec::new());
            0
        }
    };
    state.db = Some(conn);
    info!(restored, "workspace bundle imported");

    ok(&req.id, json!({ "ok": true, "restoredRecords": restored }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_backup_export(state, req)),
        "backup.importBundle" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}

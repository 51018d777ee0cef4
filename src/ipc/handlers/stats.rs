use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use serde_json::json;

fn handle_stats_overall(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let subjects = stats::overall_statistics(state.roster.snapshot());
    ok(&req.id, json!({ "subjects": subjects }))
}

fn handle_stats_by_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let classes = stats::class_statistics(state.roster.snapshot());
    ok(&req.id, json!({ "classes": classes }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stats.overall" => Some(handle_stats_overall(state, req)),
        "stats.byClass" => Some(handle_stats_by_class(state, req)),
        _ => None,
    }
}

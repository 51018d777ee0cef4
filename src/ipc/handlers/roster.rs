use crate::db;
use crate::grades::{is_valid_grade, parse_grade, Grades, Subject};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::persist_roster;
use crate::ipc::types::{AppState, Request};
use crate::roster::StudentRecord;
use crate::stats;
use serde_json::json;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

fn require_field<'a>(
    params: &'a serde_json::Value,
    field: &'static str,
) -> Result<&'a str, HandlerErr> {
    let value = params
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("");
    if value.is_empty() {
        return Err(HandlerErr {
            code: "bad_params",
            message: format!("missing {field}"),
            details: Some(json!({ "field": field })),
        });
    }
    Ok(value)
}

/// Grade params arrive as whatever the form produced: number, string, or
/// null. Strings get form-level validation before the lenient parse so the
/// caller can point at the offending field.
fn grade_param(params: &serde_json::Value, subject: Subject) -> Result<Option<u8>, HandlerErr> {
    let raw = match params.get("grades").and_then(|g| g.get(subject.key())) {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(HandlerErr {
                code: "bad_params",
                message: format!("grade for {} must be a string, number or null", subject.key()),
                details: Some(json!({ "field": subject.key() })),
            })
        }
    };
    if !is_valid_grade(&raw) {
        return Err(HandlerErr {
            code: "bad_params",
            message: format!("grade for {} must be between 2 and 5", subject.key()),
            details: Some(json!({ "field": subject.key(), "value": raw })),
        });
    }
    Ok(parse_grade(&raw))
}

fn parse_index(req: &Request) -> Result<usize, HandlerErr> {
    match req.params.get("index").and_then(|v| v.as_u64()) {
        Some(v) => Ok(v as usize),
        None => Err(HandlerErr {
            code: "bad_params",
            message: "missing/invalid index".to_string(),
            details: Some(json!({ "field": "index" })),
        }),
    }
}

fn handle_roster_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let saved_at = db::roster_saved_at(conn).ok().flatten();
    ok(
        &req.id,
        json!({
            "records": state.roster.snapshot(),
            "count": state.roster.len(),
            "savedAt": saved_at,
        }),
    )
}

fn handle_roster_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let classes = stats::group_by_class(state.roster.snapshot());
    ok(&req.id, json!({ "classes": classes }))
}

fn handle_roster_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let index = match parse_index(req) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    match state.roster.get(index) {
        Some(record) => ok(&req.id, json!({ "index": index, "record": record })),
        None => err(
            &req.id,
            "not_found",
            "no record at index",
            Some(json!({ "index": index })),
        ),
    }
}

fn handle_roster_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }

    let parsed: Result<StudentRecord, HandlerErr> = (|| {
        let name = require_field(&req.params, "name")?.to_string();
        let class_name = require_field(&req.params, "className")?.to_string();
        let mut grades = Grades::default();
        for subject in Subject::ALL {
            grades.set(subject, grade_param(&req.params, subject)?);
        }
        Ok(StudentRecord {
            name,
            class_name,
            grades,
        })
    })();
    let record = match parsed {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    state.roster.upsert(record);
    persist_roster(state);
    ok(&req.id, json!({ "ok": true, "count": state.roster.len() }))
}

fn handle_roster_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let index = match parse_index(req) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    // A stale index is answered here; the store itself treats it as a
    // contract violation.
    if index >= state.roster.len() {
        return err(
            &req.id,
            "not_found",
            "no record at index",
            Some(json!({ "index": index })),
        );
    }
    let removed = state.roster.delete_at(index);
    persist_roster(state);
    ok(
        &req.id,
        json!({
            "ok": true,
            "removed": removed,
            "count": state.roster.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.list" => Some(handle_roster_list(state, req)),
        "roster.preview" => Some(handle_roster_preview(state, req)),
        "roster.get" => Some(handle_roster_get(state, req)),
        "roster.upsert" => Some(handle_roster_upsert(state, req)),
        "roster.delete" => Some(handle_roster_delete(state, req)),
        _ => None,
    }
}

use crate::forms::{self, StudentDraft};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_bool, get_optional_str, get_required_str, parse_params, require_app};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn students_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    let view = app.student_view(get_optional_str(params, "search"));
    Ok(json!({ "view": view }))
}

/// Edit-form contents. An unknown id yields a blank form.
fn students_get(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    let draft = forms::student_form(&app.students, get_optional_str(params, "studentId"));
    Ok(json!({ "draft": draft }))
}

fn students_save(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let draft: StudentDraft = parse_params(params)?;
    let app = require_app(state)?;
    let student = app.save_student(draft)?;
    Ok(json!({
        "student": student,
        "view": app.student_view(None),
    }))
}

fn students_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let confirmed = get_bool(params, "confirm");
    let app = require_app(state)?;
    let deleted = app
        .delete_student(&student_id, confirmed)
        .map_err(HandlerErr::store_write)?;
    Ok(json!({
        "deleted": deleted,
        "confirmed": confirmed,
        "view": app.student_view(None),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "students.list" => students_list(state, &req.params),
        "students.get" => students_get(state, &req.params),
        "students.save" => students_save(state, &req.params),
        "students.delete" => students_delete(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

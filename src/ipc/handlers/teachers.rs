use crate::forms::{self, TeacherDraft};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_bool, get_optional_str, get_required_str, parse_params, require_app};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn teachers_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    let view = app.teacher_view(get_optional_str(params, "search"));
    Ok(json!({ "view": view }))
}

fn teachers_get(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    let draft = forms::teacher_form(&app.teachers, get_optional_str(params, "teacherId"));
    Ok(json!({ "draft": draft }))
}

fn teachers_save(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let draft: TeacherDraft = parse_params(params)?;
    let app = require_app(state)?;
    let teacher = app.save_teacher(draft)?;
    Ok(json!({
        "teacher": teacher,
        "view": app.teacher_view(None),
    }))
}

fn teachers_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    let confirmed = get_bool(params, "confirm");
    let app = require_app(state)?;
    let deleted = app
        .delete_teacher(&teacher_id, confirmed)
        .map_err(HandlerErr::store_write)?;
    Ok(json!({
        "deleted": deleted,
        "confirmed": confirmed,
        "view": app.teacher_view(None),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "teachers.list" => teachers_list(state, &req.params),
        "teachers.get" => teachers_get(state, &req.params),
        "teachers.save" => teachers_save(state, &req.params),
        "teachers.delete" => teachers_delete(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

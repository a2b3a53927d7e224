use crate::grades::{self, MAX_MARKS};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_app};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn get_marks(params: &serde_json::Value) -> Result<u32, HandlerErr> {
    let raw = params
        .get("marks")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params("missing marks"))?;
    u32::try_from(raw)
        .ok()
        .filter(|m| *m <= MAX_MARKS)
        .ok_or_else(|| {
            HandlerErr::new(
                "validation_failed",
                format!("marks must be between 0 and {}", MAX_MARKS),
            )
        })
}

fn grades_view(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    let view = app.grade_view().map_err(HandlerErr::store_write)?;
    Ok(json!({ "view": view }))
}

fn grades_set(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let course = get_required_str(params, "course")?;
    let marks = get_marks(params)?;
    let app = require_app(state)?;
    app.set_marks(&student_id, &course, marks)
        .map_err(HandlerErr::store_write)?;
    let view = app.grade_view().map_err(HandlerErr::store_write)?;
    Ok(json!({
        "studentId": student_id,
        "course": course,
        "marks": marks,
        "view": view,
    }))
}

fn grades_letter(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let marks = get_marks(params)?;
    Ok(json!({
        "marks": marks,
        "grade": grades::letter_grade(marks),
        "pass": grades::is_pass(marks),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "grades.view" => grades_view(state),
        "grades.set" => grades_set(state, &req.params),
        "grades.letter" => grades_letter(&req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

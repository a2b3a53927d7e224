use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_required_str, require_app};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use chrono::NaiveDate;
use serde_json::json;

fn parse_status(raw: &str) -> Result<AttendanceStatus, HandlerErr> {
    AttendanceStatus::parse(raw).ok_or_else(|| {
        HandlerErr::bad_params("status must be one of present, absent, leave")
    })
}

fn check_date(date: &str) -> Result<(), HandlerErr> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| HandlerErr::bad_params("date must be YYYY-MM-DD"))
}

/// A blank course or date renders an empty table rather than an error.
fn attendance_view(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let course = get_optional_str(params, "course").unwrap_or("");
    let date = get_optional_str(params, "date").unwrap_or("");
    let app = require_app(state)?;
    Ok(json!({
        "course": course,
        "date": date,
        "view": app.attendance_view(course, date),
    }))
}

fn attendance_mark(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let date = get_required_str(params, "date")?;
    check_date(&date)?;
    let status = parse_status(&get_required_str(params, "status")?)?;

    let app = require_app(state)?;
    let marked = app
        .mark_attendance(&student_id, &date, status)
        .map_err(HandlerErr::store_write)?;
    Ok(json!({
        "marked": marked,
        "key": crate::attendance::attendance_key(&date, &student_id),
        "status": status,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "attendance.view" => attendance_view(state, &req.params),
        "attendance.mark" => attendance_mark(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_app};
use crate::ipc::types::{AppState, Request};
use crate::model::COURSES;
use crate::store::DARK_MODE_KEY;
use serde_json::json;

#[derive(Clone, Copy)]
enum SettingKey {
    DarkMode,
}

impl SettingKey {
    fn parse(s: &str) -> Option<Self> {
        match s {
            DARK_MODE_KEY => Some(Self::DarkMode),
            _ => None,
        }
    }
}

fn setting_key(params: &serde_json::Value) -> Result<SettingKey, HandlerErr> {
    let raw = get_required_str(params, "key")?;
    SettingKey::parse(&raw).ok_or_else(|| HandlerErr::bad_params(format!("unknown setting: {}", raw)))
}

fn settings_get(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = setting_key(params)?;
    let app = require_app(state)?;
    let value = match key {
        SettingKey::DarkMode => json!(app.dark_mode()),
    };
    Ok(json!({ "key": DARK_MODE_KEY, "value": value }))
}

fn settings_set(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let key = setting_key(params)?;
    let app = require_app(state)?;
    match key {
        SettingKey::DarkMode => {
            let on = params
                .get("value")
                .and_then(|v| v.as_bool())
                .ok_or_else(|| HandlerErr::bad_params("darkMode value must be boolean"))?;
            app.set_dark_mode(on).map_err(HandlerErr::store_write)?;
            Ok(json!({ "key": DARK_MODE_KEY, "value": on }))
        }
    }
}

fn dashboard_summary(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    Ok(json!(app.dashboard()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "courses.list" => Ok(json!({ "courses": COURSES })),
        "dashboard.summary" => dashboard_summary(state),
        "settings.get" => settings_get(state, &req.params),
        "settings.set" => settings_set(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

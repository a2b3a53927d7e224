use crate::app::App;
use crate::ipc::error::HandlerErr;
use crate::ipc::types::AppState;
use serde::de::DeserializeOwned;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn get_bool(params: &serde_json::Value, key: &str) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Decode the whole params object into a draft type. Missing fields take
/// their defaults; wrong types are a `bad_params` error.
pub fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    let v = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(v).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

pub fn require_app(state: &mut AppState) -> Result<&mut App, HandlerErr> {
    state
        .app
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

use crate::app::App;
use crate::ipc::error::{err, ok, respond, HandlerErr};
use crate::ipc::helpers::require_app;
use crate::ipc::types::{AppState, Request};
use crate::session::Page;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
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

    match state.open_workspace(&path) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

/// Session snapshot shared by every response that can move between pages.
pub fn session_json(app: &App, page: Page) -> serde_json::Value {
    json!({
        "page": page,
        "user": app.session.current_user(),
        "profile": app.session.profile(),
    })
}

fn app_init(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    let page = app.init().map_err(HandlerErr::store_write)?;
    let mut out = session_json(app, page);
    out["darkMode"] = json!(app.dark_mode());
    Ok(out)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "app.init" => Some(respond(&req.id, app_init(state))),
        _ => None,
    }
}

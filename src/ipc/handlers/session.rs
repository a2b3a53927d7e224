use crate::forms::{LoginDraft, SignupDraft};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::handlers::core::session_json;
use crate::ipc::helpers::{get_required_str, parse_params, require_app};
use crate::ipc::types::{AppState, Request};
use crate::session::Page;
use serde_json::json;

fn session_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    Ok(session_json(app, app.session.page()))
}

fn session_login(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let draft: LoginDraft = parse_params(params)?;
    let app = require_app(state)?;
    app.session.login(&app.users, &draft)?;
    Ok(session_json(app, app.session.page()))
}

fn session_signup(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let draft: SignupDraft = parse_params(params)?;
    let app = require_app(state)?;
    app.session.signup(&mut app.users, draft)?;
    let mut out = session_json(app, app.session.page());
    out["message"] = json!("Account created successfully!");
    Ok(out)
}

fn session_logout(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let app = require_app(state)?;
    app.session.logout().map_err(HandlerErr::store_write)?;
    Ok(session_json(app, app.session.page()))
}

/// Move to a page and render its table in the same response.
fn session_navigate(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let raw = get_required_str(params, "page")?;
    let target = Page::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown page: {}", raw)))?;
    let app = require_app(state)?;
    let page = app
        .session
        .navigate(target)
        .map_err(HandlerErr::store_write)?;
    let view = app.page_view(page).map_err(HandlerErr::store_write)?;
    let mut out = session_json(app, page);
    out["view"] = json!(view);
    Ok(out)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "session.get" => session_get(state),
        "session.login" => session_login(state, &req.params),
        "session.signup" => session_signup(state, &req.params),
        "session.logout" => session_logout(state),
        "session.navigate" => session_navigate(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

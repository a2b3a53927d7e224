use crate::backup::{self, BundleError};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn require_workspace(state: &AppState) -> Result<PathBuf, HandlerErr> {
    state
        .workspace
        .clone()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

fn io_failed(e: anyhow::Error) -> HandlerErr {
    HandlerErr::new("io_failed", format!("{e:#}"))
}

fn export_bundle(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let workspace = require_workspace(state)?;
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let summary = backup::export_workspace_bundle(&workspace, &out_path).map_err(io_failed)?;
    Ok(json!({
        "ok": true,
        "path": out_path.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "dbSha256": summary.db_sha256,
        "dbBytes": summary.db_bytes,
    }))
}

fn import_bundle(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let workspace = require_workspace(state)?;
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    if !in_path.is_file() {
        return Err(HandlerErr::new(
            "not_found",
            format!("bundle not found: {}", in_path.to_string_lossy()),
        ));
    }

    // The open connection must go before the database file is swapped.
    state.app = None;
    let imported = backup::import_workspace_bundle(&in_path, &workspace);

    // Reopen either way so a failed import leaves the old workspace usable.
    let reopened = state.open_workspace(&workspace);

    let summary = imported.map_err(|e| {
        if let Some(b) = e.downcast_ref::<BundleError>() {
            return HandlerErr::new("bad_bundle", b.to_string());
        }
        io_failed(e)
    })?;
    reopened.map_err(|e| HandlerErr::new("db_open_failed", format!("{e:#}")))?;

    Ok(json!({
        "ok": true,
        "workspacePath": workspace.to_string_lossy(),
        "bundleFormatDetected": summary.bundle_format_detected,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "backup.exportWorkspaceBundle" => export_bundle(state, &req.params),
        "backup.importWorkspaceBundle" => import_bundle(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, res))
}

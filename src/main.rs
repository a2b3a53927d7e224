mod app;
mod attendance;
mod backup;
mod clock;
mod config;
mod db;
mod forms;
mod grades;
mod ipc;
mod model;
mod repo;
mod session;
mod store;
mod views;

use clap::Parser;
use env_logger::Env;
use std::io::{self, BufRead, Write};

fn main() {
    let config = config::Config::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    let mut state = ipc::AppState::new(config.seed);
    if let Some(path) = config.workspace.as_deref() {
        if let Err(e) = state.open_workspace(path) {
            log::error!("failed to open workspace {}: {e:#}", path.to_string_lossy());
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                log::error!("stdin read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // No id to echo back.
            Err(e) => {
                log::warn!("unparseable request: {e}");
                ipc::err("", "bad_json", e.to_string(), None)
            }
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    log::info!("stdin closed, exiting");
}

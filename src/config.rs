use clap::Parser;
use std::path::PathBuf;

/// Records sidecar: newline-delimited JSON requests on stdin, one response
/// line per request on stdout. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "collegerecd", version)]
pub struct Config {
    /// Open this workspace at start-up instead of waiting for `workspace.select`.
    #[arg(long, env = "COLLEGE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Default log filter; `RUST_LOG` takes precedence.
    #[arg(long, env = "COLLEGE_LOG", default_value = "info")]
    pub log_level: String,

    /// Seed for generated grades, for reproducible sessions.
    #[arg(long, env = "COLLEGE_SEED")]
    pub seed: Option<u64>,
}

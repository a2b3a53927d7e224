use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::app::App;
use crate::clock::SystemClock;
use crate::db;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub app: Option<App>,
    pub seed: Option<u64>,
}

impl AppState {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            workspace: None,
            app: None,
            seed,
        }
    }

    /// Open (or create) the workspace database and load every collection.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let conn = db::open_db(path)?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // Drop the old handle before the new one takes over the file.
        self.app = None;
        self.app = Some(App::open(Store::sqlite(conn), Box::new(SystemClock), rng));
        self.workspace = Some(path.to_path_buf());
        log::info!("workspace opened: {}", path.to_string_lossy());
        Ok(())
    }
}

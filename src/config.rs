//! Runtime settings.

use std::path::PathBuf;

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database path.
    pub db_path: PathBuf,
}

impl Settings {
    /// Resolve settings from an optional CLI override, falling back to the
    /// `AUTOLISTA_DB` environment variable and then the platform data
    /// directory.
    pub fn resolve(db_path: Option<PathBuf>) -> Self {
        let db_path = db_path
            .or_else(|| std::env::var_os("AUTOLISTA_DB").map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        Self { db_path }
    }

    /// Create the database's parent directory if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autolista")
        .join("autolista.db")
}

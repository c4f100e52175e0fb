mod config;
pub mod database;
pub mod migrations;

pub use config::Config;
pub use database::{Database, Stats};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `STUDYTRACK_DATA_DIR` overrides the location outright (end-to-end tests
/// point it at a temp directory); otherwise `~/.config/studytrack` is used,
/// or `~/.config/studytrack-dev` when `STUDYTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STUDYTRACK_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());
    let dir = if env == "dev" {
        base_dir.join("studytrack-dev")
    } else {
        base_dir.join("studytrack")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

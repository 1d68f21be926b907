//! Cross-Platform Path Utilities
//!
//! Resolves the Quality Lens data directory (~/.quality-lens/).

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Quality Lens directory (~/.quality-lens/)
pub fn quality_lens_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".quality-lens"))
}

/// Get the config file path (~/.quality-lens/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(quality_lens_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

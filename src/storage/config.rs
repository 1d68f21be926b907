//! JSON Configuration Management
//!
//! Handles reading and writing the client settings file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::{ClientSettings, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};

/// Configuration service for managing client settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    settings: ClientSettings,
}

impl ConfigService {
    /// Load ~/.quality-lens/config.json, falling back to defaults if missing
    pub fn new() -> AppResult<Self> {
        Self::at(config_path()?)
    }

    /// Load settings from an explicit path.
    ///
    /// A missing file yields defaults without touching disk; the file is only
    /// written by [`update_config`](Self::update_config) or [`reset`](Self::reset).
    pub fn at(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        let settings = Self::load_from_file(&config_path)?;
        Ok(Self {
            config_path,
            settings,
        })
    }

    fn load_from_file(path: &Path) -> AppResult<ClientSettings> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(ClientSettings::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: ClientSettings = serde_json::from_str(&content)?;
        settings.validate().map_err(AppError::validation)?;
        Ok(settings)
    }

    fn save_to_file(path: &Path, settings: &ClientSettings) -> AppResult<()> {
        settings.validate().map_err(AppError::validation)?;
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply a partial update and persist it.
    ///
    /// An update that fails validation leaves both memory and disk untouched.
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<ClientSettings> {
        let mut next = self.settings.clone();
        next.apply_update(update);
        Self::save_to_file(&self.config_path, &next)?;
        self.settings = next;
        Ok(self.settings.clone())
    }

    /// Reload settings from disk, or defaults if the file is gone
    pub fn reload(&mut self) -> AppResult<()> {
        self.settings = Self::load_from_file(&self.config_path)?;
        Ok(())
    }

    /// Reset settings to defaults
    pub fn reset(&mut self) -> AppResult<()> {
        self.settings = ClientSettings::default();
        Self::save_to_file(&self.config_path, &self.settings)
    }
}

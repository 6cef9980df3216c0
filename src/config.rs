use crate::dashboard::Palette;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `preview_row_limit` when set to a positive integer.
pub const PREVIEW_ROWS_ENV: &str = "DATADASH_PREVIEW_ROWS";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Rows shown in table previews (default: 50)
    pub preview_row_limit: usize,
    /// Rows scanned to infer CSV column types; `null` scans the whole file
    pub infer_schema_length: Option<usize>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Colours new dashboards start with
    pub palette: Palette,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            preview_row_limit: 50,
            infer_schema_length: Some(10_000),
            log_level: "info".to_owned(),
            palette: Palette::default(),
        }
    }
}

impl AppSettings {
    /// Applies environment overrides on top of the stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(PREVIEW_ROWS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(rows) if rows > 0 => self.preview_row_limit = rows,
                _ => tracing::warn!("Ignoring {}={:?}: not a positive integer", PREVIEW_ROWS_ENV, raw),
            }
        }
        self
    }
}

/// `<config dir>/datadash/config.json`
pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(base.join("datadash").join("config.json"))
}

/// Loads settings from the default location, falling back to defaults when
/// the file is missing or unreadable.
pub fn load_settings() -> AppSettings {
    let settings = match get_config_path() {
        Ok(path) => load_settings_from(&path),
        Err(e) => {
            tracing::warn!("{:#}; using default settings", e);
            AppSettings::default()
        }
    };
    settings.with_env_overrides()
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }

    match std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| Ok(serde_json::from_str::<AppSettings>(&content)?))
    {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to read settings from {}: {}; using defaults", path.display(), e);
            AppSettings::default()
        }
    }
}

pub fn save_settings(settings: &AppSettings) -> Result<()> {
    save_settings_to(settings, &get_config_path()?)
}

pub fn save_settings_to(settings: &AppSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    tracing::debug!("Settings saved to {}", path.display());
    Ok(())
}

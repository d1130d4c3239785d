use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Smallest zoom level the preview accepts, in percent.
pub const MIN_ZOOM: u16 = 25;
/// Largest zoom level the preview accepts, in percent.
pub const MAX_ZOOM: u16 = 400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// User-facing preview settings.
///
/// Field names serialize in camelCase so the same struct is both the TOML
/// file format and the payload of the `config-update` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Re-render the preview automatically after source edits.
    pub auto_refresh: bool,
    /// Quiet period in milliseconds before an automatic refresh fires.
    pub refresh_delay: u64,
    /// Zoom level in percent used on startup and on zoom reset.
    pub default_zoom: u16,
    pub sync_scroll: bool,
    pub show_css_panel: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_delay: 100,
            default_zoom: 100,
            sync_scroll: true,
            show_css_panel: true,
        }
    }
}

impl PreviewConfig {
    /// Returns a copy with out-of-range values clamped into their legal range.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.default_zoom = self.default_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: PreviewConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config.validated()))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Loads the config file, falling back to defaults when it is missing.
    pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/html-livebridge");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expands `~` and environment variables in a user supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

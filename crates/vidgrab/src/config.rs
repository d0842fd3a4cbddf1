//! Application settings.
//!
//! Settings live in a TOML file in the platform configuration directory
//! (for example `~/.config/vidgrab/vidgrab.toml` on Linux). Every field
//! has a default, so a missing file or a partial file is fine:
//!
//! ```toml
//! log_level = "info"
//! default_format = "best"
//! status_timeout_ms = 4000
//!
//! [text]
//! normal_background = "#ffffff"
//! disabled_background = "#262626"
//! ```
//!
//! Saving goes through a temporary file in the same directory that is
//! renamed over the target, so a crash never leaves a truncated file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use vidgrab_widgets::color;
use vidgrab_widgets::widget::{DEFAULT_DISABLED_BACKGROUND, DEFAULT_NORMAL_BACKGROUND};

use crate::error::{AppError, Result};
use crate::logging::targets;

/// File name of the settings file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "vidgrab.toml";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing filter, such as `info` or `vidgrab=debug`.
    pub log_level: String,
    /// Format selector used when the selector entry is empty.
    pub default_format: String,
    /// How long transient status messages stay visible.
    pub status_timeout_ms: u64,
    /// Extractor executable.
    pub extractor: PathBuf,
    /// Arguments passed to the extractor before anything else.
    pub extractor_args: Vec<String>,
    /// Directory downloads are written to; the working directory if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    /// Replace spaces and strip brackets in downloaded file names.
    pub sanitize_file_names: bool,
    /// Colors of text areas.
    pub text: TextColors,
}

/// Background colors of text areas per state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextColors {
    /// Background while the text area is editable.
    pub normal_background: String,
    /// Background while the text area is disabled.
    pub disabled_background: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            default_format: "best".into(),
            status_timeout_ms: 4000,
            extractor: PathBuf::from("yt-dlp"),
            extractor_args: Vec::new(),
            download_dir: None,
            sanitize_file_names: true,
            text: TextColors::default(),
        }
    }
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            normal_background: DEFAULT_NORMAL_BACKGROUND.into(),
            disabled_background: DEFAULT_DISABLED_BACKGROUND.into(),
        }
    }
}

impl Config {
    /// Path of the settings file in the platform configuration directory.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "vidgrab").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// Colors are normalized to `#rrggbb`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: targets::CONFIG, path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        let mut config: Self = toml::from_str(&content).map_err(|err| AppError::config(path, err))?;
        config.validate().map_err(|err| AppError::config(path, err))?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "settings loaded");
        Ok(config)
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|err| AppError::config(path, err))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| AppError::Io(err.error))?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "settings saved");
        Ok(())
    }

    /// Normalize colors and reject values the application cannot use.
    pub fn validate(&mut self) -> std::result::Result<(), String> {
        for (name, value) in [
            ("text.normal_background", &mut self.text.normal_background),
            ("text.disabled_background", &mut self.text.disabled_background),
        ] {
            *value = color::normalize(value).map_err(|err| format!("{name}: {err}"))?;
        }
        if self.default_format.trim().is_empty() {
            return Err("default_format must not be empty".into());
        }
        if self.status_timeout_ms == 0 {
            return Err("status_timeout_ms must be positive".into());
        }
        Ok(())
    }

    /// Lifetime of transient status messages.
    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}

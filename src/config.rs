use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// parameters of the synthesized alarm tone
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ToneConfig {
    /// pitch in hertz
    pub frequency: f32,
    /// 0-100
    pub volume: f32,
}

impl ToneConfig {
    /// playback gain, with the volume bounded to 0-100 in case a
    /// hand-edited config file says otherwise
    #[must_use]
    pub fn gain(&self) -> f32 {
        self.volume.clamp(0.0, 100.0) / 100.0
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        // A4, full volume
        Self {
            frequency: 440.0,
            volume: 100.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// chrono format string used for every rendered time
    pub time_format: String,
    #[serde(default)]
    pub tone: ToneConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: "%l:%M:%S %p".to_string(),
            tone: ToneConfig::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// load the config file, falling back to defaults (with a log entry)
    /// when it is missing or malformed
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("couldn't parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) => {
                log::info!("no config file at {} ({e}), using defaults", path.display());
                Self::default()
            }
        }
    }

    /// # Errors
    /// fails if the config directory can't be created or written
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let raw = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, raw)
    }

    /// `None` when the platform has no config directory convention
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "desk_clock")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().is_some_and(|path| path.exists())
    }
}

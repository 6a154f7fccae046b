use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::note::DEFAULT_TITLE;
use crate::scheduler::DEFAULT_TICK;

pub const CONFIG_VERSION: u64 = 1;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("chime")
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("chime")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ChimeConfig {
    pub version: u64,
    pub data_directory: PathBuf,
    pub tick_interval_ms: u64,
    pub default_title: String,
    pub debug_logging: bool,
}

impl Default for ChimeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_directory: default_data_dir(),
            tick_interval_ms: DEFAULT_TICK.as_millis() as u64,
            default_title: DEFAULT_TITLE.to_string(),
            debug_logging: false,
        }
    }
}

impl ChimeConfig {
    pub fn config_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Read the user's config, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// A missing file gives defaults silently; a malformed one gives defaults and a warning.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => {
                if config.version != CONFIG_VERSION {
                    log::warn!(
                        "Config version {} differs from {}, reading it anyway",
                        config.version,
                        CONFIG_VERSION
                    );
                }
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Scheduler period; zero means the default.
    pub fn tick_interval(&self) -> Duration {
        match self.tick_interval_ms {
            0 => DEFAULT_TICK,
            ms => Duration::from_millis(ms),
        }
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }
}

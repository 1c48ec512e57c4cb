//! Configuration management for sapi-client.
//!
//! An optional YAML file supplies defaults for flags left off the command
//! line and engine settings that have no flag at all.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::engine::WaveFormat;

/// Token category holding the OneCore voices.
pub const DEFAULT_CATALOG: &str = r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Speech_OneCore\Voices";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Voice used when `-v` is not given.
    pub voice: Option<String>,
    /// Rate used when `-r` is not given. Out-of-range values are skipped.
    pub rate: Option<i32>,
    /// Token category enumerated for voices.
    pub catalog: String,
    /// Format of WAV files written by `-o`.
    pub output: WaveFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            voice: None,
            rate: None,
            catalog: DEFAULT_CATALOG.into(),
            output: WaveFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./sapi-client.yaml
    /// 2. <user config dir>/sapi-client/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let Some(config_path) = path.map(PathBuf::from).or_else(Self::find) else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::read(&config_path) {
            Ok(config) => {
                info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    fn find() -> Option<PathBuf> {
        let candidates = [
            std::env::current_dir().ok().map(|d| d.join("sapi-client.yaml")),
            dirs::config_dir().map(|c| c.join("sapi-client").join("config.yaml")),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Parse one file. An unusable `output` section only resets the wave
    /// format; the rest of the file still applies.
    fn read(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;

        if let Err(e) = config.output.validate() {
            warn!("Ignoring output format in {}: {e}", path.display());
            config.output = WaveFormat::default();
        }
        Ok(config)
    }
}

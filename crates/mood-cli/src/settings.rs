use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use mood_core::config::Config;
use thiserror::Error;

pub const ENDPOINT_ENV: &str = "MOODCANVAS_INSIGHT_URL";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("moodcanvas").join("config.toml"))
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("moodcanvas").join("moodcanvas.log"))
}

/// Reads the config file if it exists; a missing file means defaults.
pub fn load_config(path: &Path) -> Result<Config, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn apply_env_overrides(config: &mut Config, endpoint: Option<String>) {
    if let Some(endpoint) = endpoint.filter(|value| !value.trim().is_empty()) {
        config.insight.endpoint = endpoint.trim().to_string();
    }
}

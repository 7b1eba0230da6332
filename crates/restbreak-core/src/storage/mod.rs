mod config;
mod settings;

pub use config::{
    Config, DisplayConfig, OverlayConfig, ReminderConfig, BREAK_RANGE, INTERVAL_RANGE,
};
pub use settings::SettingsStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/restbreak[-dev]/` based on RESTBREAK_ENV.
///
/// Set RESTBREAK_ENV=dev to use the development data directory, or
/// RESTBREAK_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("RESTBREAK_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir().ok_or(ConfigError::NoDataDir)?.join(".config");
            let env = std::env::var("RESTBREAK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("restbreak-dev")
            } else {
                base_dir.join("restbreak")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

mod config;

pub use config::Config;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/talktimer[-dev]/` based on TALKTIMER_ENV.
///
/// Set TALKTIMER_ENV=dev to use a separate development config directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TALKTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("talktimer-dev")
    } else {
        base_dir.join("talktimer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

mod config;
pub mod database;
pub mod migrations;

pub use config::{ClockConfig, Config, HabitsConfig, UserConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding `habitrack.db` and `config.toml`.
///
/// Resolution order:
/// 1. `HABITRACK_DATA_DIR`, used as-is
/// 2. `~/.config/habitrack-dev/` when `HABITRACK_ENV=dev`
/// 3. `~/.config/habitrack/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HABITRACK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitrack-dev")
            } else {
                base_dir.join("habitrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

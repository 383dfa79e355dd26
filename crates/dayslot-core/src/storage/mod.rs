//! On-disk state: the TOML configuration and its directory.

mod config;

pub use config::{Config, DayConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/dayslot[-dev]/` based on DAYSLOT_ENV.
///
/// Set DAYSLOT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAYSLOT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dayslot-dev")
    } else {
        base_dir.join("dayslot")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

//! Runtime configuration
//!
//! Settings come from command-line flags, environment variables and the
//! `app_settings` table, in that order of precedence.

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

use crate::db::Database;
use crate::panels::pomodoro::{DurationControl, DEFAULT_MINUTES};

// Settings keys for database storage
pub const SETTING_USER_NAME: &str = "user_name";
pub const SETTING_POMODORO_MINUTES: &str = "pomodoro_minutes";

// Environment variable names
pub const ENV_USER: &str = "DAYPLAN_USER";
pub const ENV_DB: &str = "DAYPLAN_DB";
pub const ENV_LOG: &str = "DAYPLAN_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub user_name: String,
    pub pomodoro_minutes: u32,
}

impl Config {
    /// Resolve the configuration for this run.
    ///
    /// Fails when no user name can be found anywhere.
    pub fn load(db: &Database, user_flag: Option<&str>) -> Result<Self> {
        let stored_user = db.get_setting(SETTING_USER_NAME)?;
        let user_name = resolve_user(
            user_flag,
            env::var(ENV_USER).ok().as_deref(),
            stored_user.as_deref(),
            system_user().as_deref(),
        )
        .ok_or_else(|| {
            anyhow!("No user name. Run `dayplan user <name>` or pass --user <name>.")
        })?;

        let pomodoro_minutes = db
            .get_setting(SETTING_POMODORO_MINUTES)?
            .as_deref()
            .map(parse_minutes_setting)
            .unwrap_or(DEFAULT_MINUTES);

        Ok(Self {
            user_name,
            pomodoro_minutes,
        })
    }
}

/// First non-blank candidate, trimmed
pub fn resolve_user(
    flag: Option<&str>,
    env_value: Option<&str>,
    stored: Option<&str>,
    system: Option<&str>,
) -> Option<String> {
    [flag, env_value, stored, system]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn system_user() -> Option<String> {
    env::var("USER").or_else(|_| env::var("USERNAME")).ok()
}

/// Stored timer length, snapped to what the duration control allows
fn parse_minutes_setting(value: &str) -> u32 {
    value
        .trim()
        .parse::<u32>()
        .map(DurationControl::snap)
        .unwrap_or(DEFAULT_MINUTES)
}

/// `--db` flag, then `DAYPLAN_DB`, then the platform config directory
pub fn resolve_db_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    match env::var(ENV_DB) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Database::default_path(),
    }
}

use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Error, Debug)]
#[error("Invalid {key} value: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

/// What PUT and DELETE do when the id is not in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingNotePolicy {
    /// Confirm anyway, nothing is written.
    #[default]
    Ignore,
    NotFound,
}

impl FromStr for MissingNotePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ignore" => Ok(Self::Ignore),
            "not_found" => Ok(Self::NotFound),
            other => Err(format!("expected `ignore` or `not_found`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub collection: String,
    pub missing_note_policy: MissingNotePolicy,
    pub log_json: bool,
    pub error_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            redis_url: None,
            collection: "notes".to_string(),
            missing_note_policy: MissingNotePolicy::Ignore,
            log_json: false,
            error_log: None,
        }
    }
}

/// Logging switches, read before any subscriber exists.
///
/// Unparsable values fall back to plain output here, `Config` reports them once logging is up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub json: bool,
    pub error_log: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup("LOG_JSON")
                .and_then(|value| value.parse().ok())
                .unwrap_or(false),
            error_log: lookup("ERROR_LOG").map(PathBuf::from),
        }
    }
}

impl Config {
    /// Builds a config from any key/value source, [`env_var`] for the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "PORT", "5000")?,
            redis_url: lookup("REDIS_URL").or_else(|| read_secret("REDIS_URL")),
            collection: try_load(&lookup, "NOTES_COLLECTION", "notes")?,
            missing_note_policy: try_load(&lookup, "MISSING_NOTE_POLICY", "ignore")?,
            log_json: try_load(&lookup, "LOG_JSON", "false")?,
            error_log: lookup("ERROR_LOG").map(PathBuf::from),
        })
    }
}

pub fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("{SECRETS_DIR}/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
}

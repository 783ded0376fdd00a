//! Bot credentials and tunable settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{MAX_REQUESTS_PER_MINUTE, RATE_LIMIT_SECONDS};

/// Core bot configuration read at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token issued by `@BotFather`.
    pub bot_token: String,

    /// Telegram user id allowed to open the admin panel.
    #[serde(default)]
    pub admin_id: Option<u64>,

    /// Payment provider token. Read but not used by any flow yet.
    #[serde(default)]
    pub cryptopay_token: Option<String>,

    /// SMS provider token. Read but not used by any flow yet.
    #[serde(default)]
    pub fivesim_token: Option<String>,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("bot_sms.db")
}

impl BotConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `BOT_TOKEN` to be set. `ADMIN_ID` of `0` or unset means no admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or the admin id is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        let admin_id = match lookup("ADMIN_ID") {
            Some(raw) => parse_admin_id(&raw)?,
            None => None,
        };

        Ok(Self {
            bot_token,
            admin_id,
            cryptopay_token: lookup("CRYPTOPAY_API_TOKEN").filter(|t| !t.is_empty()),
            fivesim_token: lookup("FIVESIM_API_TOKEN").filter(|t| !t.is_empty()),
            database_path: lookup("DATABASE_PATH").map_or_else(default_database_path, PathBuf::from),
        })
    }
}

fn parse_admin_id(raw: &str) -> Result<Option<u64>, ConfigError> {
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAdminId(raw.to_owned()))?;
    Ok((id != 0).then_some(id))
}

/// Rate limiter tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Minimum gap between two accepted actions of one user, in seconds.
    #[serde(default = "default_min_interval")]
    pub min_interval_secs: f64,

    /// Maximum accepted actions per user in any 60 second window.
    #[serde(default = "default_max_per_minute")]
    pub max_requests_per_minute: usize,
}

fn default_min_interval() -> f64 {
    RATE_LIMIT_SECONDS
}

fn default_max_per_minute() -> usize {
    MAX_REQUESTS_PER_MINUTE
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval(),
            max_requests_per_minute: default_max_per_minute(),
        }
    }
}

impl RateLimitSettings {
    /// Creates rate limit settings from environment variables with defaults.
    ///
    /// Values that do not parse, are not positive, or do not fit a
    /// [`Duration`] fall back to the defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            min_interval_secs: lookup("RATE_LIMIT_SECONDS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs: &f64| *secs >= 0.0 && Duration::try_from_secs_f64(*secs).is_ok())
                .unwrap_or_else(default_min_interval),
            max_requests_per_minute: lookup("MAX_REQUESTS_PER_MINUTE")
                .and_then(|s| s.trim().parse().ok())
                .filter(|max: &usize| *max > 0)
                .unwrap_or_else(default_max_per_minute),
        }
    }

    /// Minimum interval as a [`Duration`].
    ///
    /// A value out of range (only possible when set by hand) reads as the default.
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_interval_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_min_interval()))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid ADMIN_ID '{0}' (must be a numeric Telegram user id)")]
    InvalidAdminId(String),
}

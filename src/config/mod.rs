//! Configuration module for the shop bot.
//!
//! Handles loading of the bot token, admin identity, provider tokens
//! and rate limiter tunables from the environment.

mod settings;

pub use settings::{BotConfig, ConfigError, RateLimitSettings};

/// Minimum seconds between two accepted actions from the same user.
pub const RATE_LIMIT_SECONDS: f64 = 1.0;

/// Maximum accepted actions per user inside the sliding window.
pub const MAX_REQUESTS_PER_MINUTE: usize = 20;

/// Length of the sliding window used by the rate limiter, in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

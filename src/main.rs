//! SMS Shop Bot - Main Entry Point
//!
//! A Telegram bot that lets users browse services and top-up amounts
//! through inline menus and simulates number purchases.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::Bot;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use sms_shop_bot::config::{BotConfig, RateLimitSettings};
use sms_shop_bot::menu::MenuHandler;
use sms_shop_bot::storage::AccountStore;
use sms_shop_bot::telegram::{self, AppState, RateLimiter};

/// Telegram bot simulating the sale of SMS verification numbers.
#[derive(Parser, Debug)]
#[command(name = "sms_shop_bot")]
#[command(about = "Sell (simulated) SMS verification numbers over Telegram")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// SQLite database path (overrides `DATABASE_PATH`).
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    if let Err(e) = run(args).await {
        error!("Fatal error: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let mut config = BotConfig::from_env().context("Failed to load bot configuration from environment")?;
    if let Some(path) = args.database {
        config.database_path = path;
    }
    let limits = RateLimitSettings::from_env_with_defaults();

    info!("Starting SMS shop bot...");
    match config.admin_id {
        Some(id) => info!("Admin ID: {}", id),
        None => info!("No admin configured"),
    }
    info!(
        "Provider tokens: cryptopay={}, 5sim={}",
        token_status(config.cryptopay_token.as_deref()),
        token_status(config.fivesim_token.as_deref())
    );
    info!(
        "Rate limits: {} actions/min, {:.1}s between actions",
        limits.max_requests_per_minute, limits.min_interval_secs
    );

    let store = AccountStore::open(&config.database_path).context("Failed to open account database")?;

    let state = Arc::new(AppState::new(
        MenuHandler::new(store, config.admin_id),
        RateLimiter::from_settings(&limits),
    ));

    let bot = Bot::new(&config.bot_token);
    telegram::run(bot, state)
        .await
        .context("Telegram dispatcher failed")?;

    info!("Shutting down...");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn token_status(token: Option<&str>) -> &'static str {
    if token.is_some() { "set" } else { "missing" }
}

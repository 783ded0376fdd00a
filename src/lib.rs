//! SMS Shop Bot Library
//!
//! A Telegram bot that simulates selling SMS verification numbers.
//!
//! This crate provides the core functionality for:
//! - Loading the bot configuration from the environment
//! - Storing per-user accounts and balances in SQLite
//! - Throttling user actions per user
//! - Rendering inline-keyboard menus and simulating purchases and recharges

pub mod config;
pub mod menu;
pub mod shop;
pub mod storage;
pub mod telegram;

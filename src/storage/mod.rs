//! Persistent account storage.
//!
//! One SQLite table holds a row per Telegram user with their balances and
//! reserved purchase counters.

mod accounts;

pub use accounts::{AccountStats, AccountStore, StorageError};

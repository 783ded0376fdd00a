//! SQLite-backed account store.

use std::path::Path;

use chrono::NaiveDateTime;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Transaction, params};
use thiserror::Error;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS accounts (
        user_id INTEGER PRIMARY KEY,
        username TEXT,
        first_name TEXT,
        balance REAL NOT NULL DEFAULT 0.0,
        bonus_balance REAL NOT NULL DEFAULT 0.0,
        free_numbers INTEGER NOT NULL DEFAULT 0,
        registered_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        total_deposited REAL NOT NULL DEFAULT 0.0,
        total_spent REAL NOT NULL DEFAULT 0.0,
        numbers_purchased INTEGER NOT NULL DEFAULT 0
    );
";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 250;

/// Format SQLite uses for `CURRENT_TIMESTAMP`.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised by the account store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot create database directory {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("User id {0} does not fit the database key range")]
    IdOutOfRange(u64),

    #[error("Malformed registration timestamp: {0}")]
    Timestamp(String),
}

/// Aggregate figures shown on the admin panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStats {
    /// Number of registered accounts.
    pub accounts: u64,
    /// Sum of all main balances.
    pub total_balance: f64,
    /// Sum of all bonus balances.
    pub total_bonus: f64,
    /// Registration time of the newest account, if any.
    pub last_registered_at: Option<NaiveDateTime>,
}

/// Durable per-user account records.
///
/// Every operation checks a connection out of the pool and runs inside its
/// own transaction. Dropping the transaction on an error path rolls it back
/// and the connection returns to the pool.
#[derive(Clone)]
pub struct AccountStore {
    pool: Pool<SqliteConnectionManager>,
}

impl AccountStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    ///
    /// Missing parent directories are created. Store calls run on the caller's
    /// task, so a locked database fails after a short busy timeout instead of
    /// stalling the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the pool cannot
    /// be built or the schema fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(&format!(
                "PRAGMA journal_mode=WAL; PRAGMA busy_timeout={BUSY_TIMEOUT_MS};"
            ))
        });
        let pool = Pool::builder().max_size(4).build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        info!("Account store ready at {}", path.display());
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is capped at one connection so every call sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built or the schema fails.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates the accounts table if it does not exist yet.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        debug!("Accounts schema initialized");
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        Ok(self.pool.get()?)
    }

    /// Runs `f` inside a transaction on a pooled connection.
    fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Inserts a fresh account for `user_id` unless one already exists.
    ///
    /// Existing rows are never touched. Returns `true` if a row was created.
    pub fn ensure_account(
        &self,
        user_id: u64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<bool, StorageError> {
        let key = db_key(user_id)?;
        let created = self.with_transaction(|tx| {
            let changed = tx.execute(
                "INSERT OR IGNORE INTO accounts (user_id, username, first_name) VALUES (?1, ?2, ?3)",
                params![key, username, first_name],
            )?;
            Ok(changed == 1)
        })?;

        if created {
            info!("New account created: {}", user_id);
        }
        Ok(created)
    }

    /// Returns the main balance, or `0.0` for unknown users.
    pub fn get_balance(&self, user_id: u64) -> Result<f64, StorageError> {
        self.read_currency(user_id, "SELECT balance FROM accounts WHERE user_id = ?1")
    }

    /// Returns the bonus balance, or `0.0` for unknown users.
    pub fn get_bonus_balance(&self, user_id: u64) -> Result<f64, StorageError> {
        self.read_currency(user_id, "SELECT bonus_balance FROM accounts WHERE user_id = ?1")
    }

    fn read_currency(&self, user_id: u64, sql: &str) -> Result<f64, StorageError> {
        let key = db_key(user_id)?;
        self.with_transaction(|tx| {
            let value: Option<f64> = tx
                .query_row(sql, params![key], |row| row.get(0))
                .optional()?;
            Ok(value.unwrap_or(0.0))
        })
    }

    /// Collects aggregate figures over all accounts.
    pub fn stats(&self) -> Result<AccountStats, StorageError> {
        self.with_transaction(|tx| {
            let (accounts, total_balance, total_bonus, last): (i64, f64, f64, Option<String>) = tx
                .query_row(
                    "SELECT COUNT(*), COALESCE(SUM(balance), 0.0), COALESCE(SUM(bonus_balance), 0.0), \
                     MAX(registered_at) FROM accounts",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )?;

            let last_registered_at = last
                .map(|raw| {
                    NaiveDateTime::parse_from_str(&raw, SQLITE_TIMESTAMP_FORMAT)
                        .map_err(|_| StorageError::Timestamp(raw))
                })
                .transpose()?;

            Ok(AccountStats {
                accounts: u64::try_from(accounts).unwrap_or_default(),
                total_balance,
                total_bonus,
                last_registered_at,
            })
        })
    }
}

#[cfg(test)]
impl AccountStore {
    /// Overwrites both balances of an existing account.
    pub(crate) fn set_balances(&self, user_id: u64, balance: f64, bonus: f64) -> Result<(), StorageError> {
        let key = db_key(user_id)?;
        self.with_transaction(|tx| {
            tx.execute(
                "UPDATE accounts SET balance = ?1, bonus_balance = ?2 WHERE user_id = ?3",
                params![balance, bonus, key],
            )?;
            Ok(())
        })
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("max_connections", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}

/// Converts a Telegram user id into the signed SQLite key.
fn db_key(user_id: u64) -> Result<i64, StorageError> {
    i64::try_from(user_id).map_err(|_| StorageError::IdOutOfRange(user_id))
}

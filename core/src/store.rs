//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Analytic components receive plain rows — they never execute SQL directly.

use crate::{error::IntelResult, types::PaymentStatus};
use rusqlite::{Connection, OpenFlags};
use std::fmt;
use std::path::PathBuf;

mod transaction;

/// Where the `transactions` table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A database file on disk.
    File(PathBuf),
    /// A named shared-cache in-memory database. Lives as long as at
    /// least one connection to it is open.
    Memory(String),
}

impl StoreLocation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn memory(name: impl Into<String>) -> Self {
        Self::Memory(name.into())
    }

    /// The string handed to SQLite when opening a connection.
    pub fn open_target(&self) -> String {
        match self {
            Self::File(path) => path.to_string_lossy().into_owned(),
            Self::Memory(name) => format!("file:{name}?mode=memory&cache=shared"),
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory(name) => write!(f, "memory:{name}"),
        }
    }
}

/// Columns needed to summarize a date window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRow {
    pub payment_status: PaymentStatus,
    pub country:        String,
    pub payment_method: String,
    pub amount:         f64,
}

/// Columns needed for dataset-wide context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRow {
    pub amount:         f64,
    pub payment_status: PaymentStatus,
    pub device_type:    Option<String>,
    pub retry_attempts: u32,
}

pub struct PaymentStore {
    conn: Connection,
    location: StoreLocation,
}

impl PaymentStore {
    /// Open (or create) a writable database. Used by the seeder and tests.
    pub fn open(location: &StoreLocation) -> IntelResult<Self> {
        let conn = Connection::open_with_flags(
            location.open_target(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        // WAL mode only for real files (shared-memory ignores it).
        if let StoreLocation::File(_) = location {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }
        Ok(Self {
            conn,
            location: location.clone(),
        })
    }

    /// Open a connection that refuses writes. The service only ever reads.
    pub fn open_read_only(location: &StoreLocation) -> IntelResult<Self> {
        let access = match location {
            StoreLocation::File(_) => OpenFlags::SQLITE_OPEN_READ_ONLY,
            // query_only below still blocks writes on the shared cache.
            StoreLocation::Memory(_) => OpenFlags::SQLITE_OPEN_READ_WRITE,
        };
        let conn = Connection::open_with_flags(
            location.open_target(),
            access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA query_only=ON;")?;
        Ok(Self {
            conn,
            location: location.clone(),
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> IntelResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_transactions.sql"))?;
        Ok(())
    }

    /// True when the `transactions` table exists.
    pub fn has_transactions_table(&self) -> IntelResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'transactions'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

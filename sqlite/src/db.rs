//! SQLite pool and migrations.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Handle to the raffle database.
///
/// Cheap to clone; all clones share one pool.
#[derive(Clone, Debug)]
pub struct RaffleDatabase {
    pool: Pool<Sqlite>,
}

impl RaffleDatabase {
    /// Open (creating if missing) the database at `path` and run
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the file cannot be created or opened,
    /// or a migration fails.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io(e.to_string()))?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))
                .map_err(|e| DatabaseError::Connection(e.to_string()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        info!(path = %path.display(), "raffle database opened");

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Open a private in-memory database (used by tests and throwaway
    /// runs).
    ///
    /// The pool is capped at one connection: each SQLite `:memory:`
    /// connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the connection or a migration fails.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DatabaseError::Connection(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("raffle database migrations complete");
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

/// Failures opening or migrating the database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Filesystem error while preparing the database path.
    #[error("I/O error: {0}")]
    Io(String),

    /// The connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(String),
}

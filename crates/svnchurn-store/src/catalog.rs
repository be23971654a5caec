//! Connection handle for the mining catalog.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use svnchurn_core::ChurnError;

/// Handle to the catalog database.
///
/// Owned by the pipeline driver and passed down explicitly; the connection
/// is released when the handle is dropped, on every exit path.
///
/// # Examples
///
/// ```
/// use svnchurn_store::Catalog;
///
/// let catalog = Catalog::in_memory().unwrap();
/// assert!(catalog.repository_uri().is_err()); // no mining tables yet
/// ```
#[derive(Debug)]
pub struct Catalog {
    pub(crate) conn: Connection,
}

impl Catalog {
    /// Open an existing catalog database and ensure the fact table exists.
    ///
    /// The catalog must already have been populated by the upstream mining
    /// tool; a missing file is an error, never silently created.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Database`] if the database cannot be opened or
    /// the fact table cannot be created.
    pub fn open(path: &Path) -> Result<Self, ChurnError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| {
                ChurnError::Database(format!("failed to open catalog {}: {e}", path.display()))
            })?;

        let catalog = Self { conn };
        catalog.ensure_facts_table()?;
        Ok(catalog)
    }

    /// Create an empty in-memory catalog (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Database`] if schema creation fails.
    pub fn in_memory() -> Result<Self, ChurnError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ChurnError::Database(format!("failed to create in-memory catalog: {e}"))
        })?;

        let catalog = Self { conn };
        catalog.ensure_facts_table()?;
        Ok(catalog)
    }

    /// Create the `commits_files_lines` fact table if it is absent.
    ///
    /// The `(file_id, commit_id)` uniqueness constraint is what makes fact
    /// inserts idempotent across re-runs.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Database`] on DDL failure.
    pub fn ensure_facts_table(&self) -> Result<(), ChurnError> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS commits_files_lines (
                    id        INTEGER PRIMARY KEY AUTOINCREMENT,
                    file_id   INTEGER NOT NULL,
                    commit_id INTEGER NOT NULL,
                    added     INTEGER NOT NULL,
                    removed   INTEGER NOT NULL,
                    UNIQUE (file_id, commit_id)
                );
                ",
            )
            .map_err(|e| ChurnError::Database(format!("failed to create fact table: {e}")))
    }

    /// The target repository URI, read from the catalog's `repositories`
    /// table (row 1, as written by the mining tool).
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Config`] if no repository row exists, or
    /// [`ChurnError::Database`] on query failure.
    pub fn repository_uri(&self) -> Result<String, ChurnError> {
        let result = self.conn.query_row(
            "SELECT uri FROM repositories WHERE id = 1",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(uri) => Ok(uri),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(ChurnError::Config(
                "catalog has no repository URI (repositories row 1 missing)".into(),
            )),
            Err(e) => Err(ChurnError::Database(format!(
                "failed to read repository URI: {e}"
            ))),
        }
    }

    /// Count of persisted facts (operator-facing summary).
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Database`] on query failure.
    pub fn fact_count(&self) -> Result<i64, ChurnError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM commits_files_lines", [], |row| {
                row.get(0)
            })
            .map_err(|e| ChurnError::Database(format!("failed to count facts: {e}")))
    }
}

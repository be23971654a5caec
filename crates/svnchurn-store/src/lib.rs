//! Catalog access and fact persistence for svnchurn.
//!
//! The catalog is an SQLite database populated by an upstream mining tool
//! (`scmlog`, `files`, `actions`, `file_links`, `repositories`); this crate
//! only reads those tables and owns exactly one: `commits_files_lines`.
//!
//! - [`catalog`] — connection handle and schema bootstrap
//! - [`selector`] — which revisions still need processing
//! - [`resolver`] — diffstat path → file identity
//! - [`facts`] — idempotent delta-fact inserts and the per-revision loop

pub mod catalog;
pub mod facts;
pub mod resolver;
pub mod selector;

pub use catalog::Catalog;
pub use facts::{insert_fact, persist_revision, RevisionStats};
pub use resolver::{order_for_resolution, resolve_file_id};
pub use selector::pending_revisions;

#[cfg(test)]
pub(crate) mod testutil {
    use crate::catalog::Catalog;

    /// The slice of the upstream mining schema the pipeline reads.
    const MINING_SCHEMA: &str = "
        CREATE TABLE repositories (
            id INTEGER PRIMARY KEY,
            uri TEXT NOT NULL
        );
        CREATE TABLE scmlog (
            id INTEGER PRIMARY KEY,
            rev INTEGER NOT NULL,
            date INTEGER NOT NULL
        );
        CREATE TABLE files (
            id INTEGER PRIMARY KEY,
            file_name TEXT NOT NULL
        );
        CREATE TABLE actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            file_id INTEGER NOT NULL,
            commit_id INTEGER NOT NULL
        );
        CREATE TABLE file_links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL,
            parent_id INTEGER,
            file_path TEXT NOT NULL
        );
    ";

    pub(crate) fn seeded_catalog() -> Catalog {
        let catalog = Catalog::in_memory().unwrap();
        catalog.conn.execute_batch(MINING_SCHEMA).unwrap();
        catalog
            .conn
            .execute(
                "INSERT INTO repositories (id, uri) VALUES (1, 'svn://host/repo')",
                [],
            )
            .unwrap();
        catalog
    }

    pub(crate) fn insert_commit(catalog: &Catalog, id: i64, rev: i64, date: i64) {
        catalog
            .conn
            .execute(
                "INSERT INTO scmlog (id, rev, date) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, rev, date],
            )
            .unwrap();
    }

    pub(crate) fn insert_file(catalog: &Catalog, id: i64, file_name: &str) {
        catalog
            .conn
            .execute(
                "INSERT INTO files (id, file_name) VALUES (?1, ?2)",
                rusqlite::params![id, file_name],
            )
            .unwrap();
    }

    pub(crate) fn insert_action(catalog: &Catalog, kind: &str, file_id: i64, commit_id: i64) {
        catalog
            .conn
            .execute(
                "INSERT INTO actions (type, file_id, commit_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![kind, file_id, commit_id],
            )
            .unwrap();
    }

    pub(crate) fn insert_link(
        catalog: &Catalog,
        file_id: i64,
        parent_id: Option<i64>,
        file_path: &str,
    ) {
        catalog
            .conn
            .execute(
                "INSERT INTO file_links (file_id, parent_id, file_path) VALUES (?1, ?2, ?3)",
                rusqlite::params![file_id, parent_id, file_path],
            )
            .unwrap();
    }
}

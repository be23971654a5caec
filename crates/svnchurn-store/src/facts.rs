//! Idempotent persistence of per-file line deltas.

use rusqlite::params;
use svnchurn_core::{ChurnError, DeltaFact, DiffRecord};
use tracing::{debug, error};

use crate::resolver;

/// Per-revision persistence counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisionStats {
    /// Facts actually written.
    pub facts_written: u64,
    /// Records with no resolvable file identity.
    pub records_skipped: u64,
}

/// Insert a delta fact unless one already exists for its
/// `(file_id, commit_id)` pair.
///
/// Replaying the same revision twice never double-counts: the uniqueness
/// constraint turns the duplicate into a no-op. Returns whether a row was
/// actually written.
///
/// # Errors
///
/// Returns [`ChurnError::Database`] on insert failure.
///
/// # Examples
///
/// ```
/// use svnchurn_core::DeltaFact;
/// use svnchurn_store::{insert_fact, Catalog};
///
/// let catalog = Catalog::in_memory().unwrap();
/// let fact = DeltaFact { file_id: 7, commit_id: 42, added: 12, removed: 3 };
/// assert!(insert_fact(&catalog, &fact).unwrap());
/// assert!(!insert_fact(&catalog, &fact).unwrap());
/// ```
pub fn insert_fact(catalog: &crate::Catalog, fact: &DeltaFact) -> Result<bool, ChurnError> {
    let changed = catalog
        .conn
        .execute(
            "INSERT OR IGNORE INTO commits_files_lines (file_id, commit_id, added, removed)
             VALUES (?1, ?2, ?3, ?4)",
            params![fact.file_id, fact.commit_id, fact.added, fact.removed],
        )
        .map_err(|e| {
            // Identity context must not be swallowed at the write step.
            error!(
                file_id = fact.file_id,
                commit_id = fact.commit_id,
                "fact insert failed: {e}"
            );
            ChurnError::Database(format!(
                "failed to insert fact (file {}, commit {}): {e}",
                fact.file_id, fact.commit_id
            ))
        })?;
    Ok(changed > 0)
}

/// Resolve and persist one revision's parsed diff records.
///
/// Records are ordered by the resolver heuristic first; each is then
/// resolved against the commit's action set and written. Unresolvable
/// records are counted and skipped. Partial per-revision progress is fine:
/// a later re-run fills the gaps without duplicating what is already there.
///
/// # Errors
///
/// Returns [`ChurnError::Database`] on resolver ambiguity or any insert
/// failure, aborting the run.
pub fn persist_revision(
    catalog: &crate::Catalog,
    rev: i64,
    commit_id: i64,
    mut records: Vec<DiffRecord>,
) -> Result<RevisionStats, ChurnError> {
    resolver::order_for_resolution(&mut records);

    let mut stats = RevisionStats::default();
    for record in &records {
        let Some(file_id) = resolver::resolve_file_id(catalog, commit_id, &record.path)
            .map_err(|e| ChurnError::Database(format!("revision {rev}: {e}")))?
        else {
            stats.records_skipped += 1;
            continue;
        };

        let fact = DeltaFact {
            file_id,
            commit_id,
            added: record.added,
            removed: record.removed,
        };
        if insert_fact(catalog, &fact)? {
            stats.facts_written += 1;
        } else {
            debug!(rev, file_id, "fact already present; left untouched");
        }
    }

    Ok(stats)
}

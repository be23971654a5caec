//! Selection of revisions that still need delta extraction.

use rusqlite::params;
use svnchurn_core::{ChurnError, PendingRevision};
use tracing::debug;

// Copy ('C') and replace ('V') actions carry no meaningful line delta and
// are excluded from the changeset size before the admission filter applies.
const COUNTED_ACTIONS: &str =
    "(SELECT COUNT(1) FROM actions a
       WHERE a.commit_id = s.id AND a.type NOT IN ('C', 'V'))";

/// Return revisions awaiting processing, in chronological order.
///
/// A revision qualifies when its counted changeset touches between 1 and
/// `max_files` files. Without a checkpoint, only revisions strictly newer
/// than the latest commit already holding a fact are offered; with a
/// checkpoint revision, everything at or after that revision's commit time
/// is offered again (the fact table's uniqueness constraint makes the
/// replay harmless). An empty result is not an error.
///
/// # Errors
///
/// Returns [`ChurnError::Config`] if `checkpoint` names a revision the
/// catalog does not know, or [`ChurnError::Database`] on query failure.
pub fn pending_revisions(
    catalog: &crate::Catalog,
    checkpoint: Option<i64>,
    max_files: i64,
) -> Result<Vec<PendingRevision>, ChurnError> {
    let (sql, cursor) = match checkpoint {
        Some(rev) => {
            let date = checkpoint_date(catalog, rev)?;
            debug!(rev, date, "resuming from checkpoint revision");
            (
                format!(
                    "SELECT s.rev, s.id FROM scmlog s
                      WHERE s.date >= ?1
                        AND {COUNTED_ACTIONS} BETWEEN 1 AND ?2
                      ORDER BY s.date ASC, s.rev ASC"
                ),
                date,
            )
        }
        None => (
            // Dates may be stored as numbers or as datetime strings; the
            // integer fallback sorts before any text in SQLite, so an empty
            // fact table admits every revision either way.
            format!(
                "SELECT s.rev, s.id FROM scmlog s
                  WHERE s.date > COALESCE((SELECT MAX(s2.date)
                                             FROM commits_files_lines cfl
                                             JOIN scmlog s2 ON s2.id = cfl.commit_id), 0)
                    AND {COUNTED_ACTIONS} BETWEEN 1 AND ?2
                  ORDER BY s.date ASC, s.rev ASC"
            ),
            0,
        ),
    };

    let mut stmt = catalog
        .conn
        .prepare(&sql)
        .map_err(|e| ChurnError::Database(format!("failed to prepare selector query: {e}")))?;

    let rows = stmt
        .query_map(params![cursor, max_files], |row| {
            Ok(PendingRevision {
                rev: row.get(0)?,
                commit_id: row.get(1)?,
            })
        })
        .map_err(|e| ChurnError::Database(format!("failed to query revisions: {e}")))?;

    let mut pending = Vec::new();
    for row in rows {
        pending
            .push(row.map_err(|e| ChurnError::Database(format!("failed to read row: {e}")))?);
    }
    Ok(pending)
}

fn checkpoint_date(catalog: &crate::Catalog, rev: i64) -> Result<i64, ChurnError> {
    let result = catalog.conn.query_row(
        "SELECT date FROM scmlog WHERE rev = ?1",
        params![rev],
        |row| row.get(0),
    );

    match result {
        Ok(date) => Ok(date),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(ChurnError::Config(format!(
            "checkpoint revision {rev} not found in catalog"
        ))),
        Err(e) => Err(ChurnError::Database(format!(
            "failed to look up checkpoint revision {rev}: {e}"
        ))),
    }
}

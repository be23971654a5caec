//! Mapping diffstat paths to catalog file identities.
//!
//! Several files in one repository may share a name and differ only by
//! directory. Resolution therefore matches on the stored path suffix and,
//! when the diffstat path carries a parent segment, additionally on the
//! parent directory's own identity record via the `file_links` relation.

use rusqlite::params;
use svnchurn_core::{ChurnError, DiffRecord};
use tracing::debug;

/// Stable-sort records by descending path length before resolution.
///
/// When several changed files could match the same file name, resolving the most
/// path-qualified record first means its identity row is consumed before a
/// barer path can steal it. This is a workaround, not a correctness
/// guarantee for every directory shape.
pub fn order_for_resolution(records: &mut [DiffRecord]) {
    records.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
}

/// Resolve a diffstat path to the catalog file id it denotes within one
/// commit's change-action set.
///
/// Matching uses the suffix convention (`LIKE '%' || path`) to tolerate
/// repository-root-relative versus absolute stored paths, and excludes file
/// ids that already hold a fact for this commit so duplicate paths within
/// one revision cannot re-match the same row.
///
/// Returns `Ok(None)` when nothing matches: upstream mining gaps are
/// expected, and an unresolvable record is a soft skip, not a failure.
///
/// # Errors
///
/// Returns [`ChurnError::Database`] on query failure, or when more than one
/// row matches; an ambiguous match signals a resolver bug and must not be
/// silently collapsed. The error message carries the full identity context.
pub fn resolve_file_id(
    catalog: &crate::Catalog,
    commit_id: i64,
    path: &str,
) -> Result<Option<i64>, ChurnError> {
    let (parent, file_name) = split_path(path);

    let mut sql = String::from(
        "SELECT fil.id
           FROM files fil
           JOIN actions a ON a.file_id = fil.id
           JOIN file_links fl ON fl.file_id = fil.id",
    );
    if parent.is_some() {
        sql.push_str(
            "
           JOIN file_links flp ON flp.file_id = fl.parent_id
           JOIN files filp ON filp.id = flp.file_id",
        );
    }
    sql.push_str(
        "
          WHERE fl.file_path LIKE '%' || ?1
            AND fil.file_name = ?2
            AND a.commit_id = ?3
            AND fil.id NOT IN (SELECT cfl.file_id
                                 FROM commits_files_lines cfl
                                WHERE cfl.commit_id = ?3)",
    );
    if parent.is_some() {
        sql.push_str(
            "
            AND flp.file_path LIKE ?4
            AND filp.file_name = ?5",
        );
    }

    let mut stmt = catalog
        .conn
        .prepare(&sql)
        .map_err(|e| ChurnError::Database(format!("failed to prepare resolver query: {e}")))?;

    let ids: Result<Vec<i64>, rusqlite::Error> = match parent {
        Some(parent_path) => {
            let (_, parent_name) = split_path(parent_path);
            // Same suffix convention when the parent has ancestors of its own.
            let parent_pattern = if parent_path.contains('/') {
                format!("%{parent_path}")
            } else {
                parent_path.to_string()
            };
            stmt.query_map(
                params![path, file_name, commit_id, parent_pattern, parent_name],
                |row| row.get(0),
            )
            .and_then(|rows| rows.collect())
        }
        None => stmt
            .query_map(params![path, file_name, commit_id], |row| row.get(0))
            .and_then(|rows| rows.collect()),
    };

    let ids = ids.map_err(|e| ChurnError::Database(format!("resolver query failed: {e}")))?;

    match ids.as_slice() {
        [] => {
            debug!(path, commit_id, "no file identity found; skipping record");
            Ok(None)
        }
        [id] => Ok(Some(*id)),
        many => Err(ChurnError::Database(format!(
            "ambiguous file identity: {} matches for path '{path}' \
             (file name '{file_name}', parent path '{}', parent name '{}', commit {commit_id})",
            many.len(),
            parent.unwrap_or("-"),
            parent.map(|p| split_path(p).1).unwrap_or("-"),
        ))),
    }
}

/// Split a diffstat path into its parent path (if any) and final segment.
fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, path),
    }
}

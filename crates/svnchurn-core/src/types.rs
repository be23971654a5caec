use serde::{Deserialize, Serialize};

/// One per-file line from the diffstat output for a single revision.
///
/// Transient: produced by the parser, consumed by the resolver. The
/// `modified` count is reported by diffstat but not persisted; only the
/// added/removed counts become facts.
///
/// # Examples
///
/// ```
/// use svnchurn_core::DiffRecord;
///
/// let rec = DiffRecord {
///     added: 12,
///     removed: 3,
///     modified: 4,
///     path: "src/foo/bar.c".into(),
/// };
/// assert_eq!(rec.path, "src/foo/bar.c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRecord {
    /// Lines inserted in this file.
    pub added: u64,
    /// Lines deleted from this file.
    pub removed: u64,
    /// Lines modified in place (reported, not persisted).
    pub modified: u64,
    /// Repository-relative path as printed by diffstat.
    pub path: String,
}

/// The persisted per-file-per-commit line-delta fact.
///
/// Write-once: at most one fact exists per `(file_id, commit_id)` pair,
/// enforced by a uniqueness constraint in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaFact {
    /// Resolved file identity in the catalog.
    pub file_id: i64,
    /// Commit row id in the catalog (not the SVN revision number).
    pub commit_id: i64,
    /// Lines added.
    pub added: u64,
    /// Lines removed.
    pub removed: u64,
}

/// A revision offered by the selector for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRevision {
    /// SVN revision number.
    pub rev: i64,
    /// Corresponding commit row id in the catalog.
    pub commit_id: i64,
}

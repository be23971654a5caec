/// Errors that can occur across the svnchurn pipeline.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the
/// boundary.
///
/// # Examples
///
/// ```
/// use svnchurn_core::ChurnError;
///
/// let err = ChurnError::Config("no repository URI in catalog".into());
/// assert!(err.to_string().contains("repository URI"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ChurnError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// External diff/stat process failure (spawn, wait, or non-zero exit).
    #[error("diff invocation error: {0}")]
    Invoke(String),

    /// Malformed diff-tool output. Fatal for the whole run: it means the
    /// external tool's output contract changed, and continuing could
    /// silently mis-attribute deltas.
    #[error("diffstat parse error: {0}")]
    Parse(String),

    /// Catalog database failure.
    #[error("database error: {0}")]
    Database(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

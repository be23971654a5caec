use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ChurnError;

/// Top-level configuration loaded from `.svnchurn.toml`.
///
/// Everything has a sensible default; a config file is only needed to
/// tune the diff timeout, the changeset admission filter, or the external
/// binary names.
///
/// # Examples
///
/// ```
/// use svnchurn_core::ChurnConfig;
///
/// let config = ChurnConfig::default();
/// assert_eq!(config.diff.timeout_secs, 600);
/// assert_eq!(config.selector.max_files, 50);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurnConfig {
    /// External diff/stat invocation settings.
    #[serde(default)]
    pub diff: DiffConfig,
    /// Revision admission filter settings.
    #[serde(default)]
    pub selector: SelectorConfig,
}

impl ChurnConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Io`] if the file cannot be read, or
    /// [`ChurnError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ChurnError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use svnchurn_core::ChurnConfig;
    ///
    /// let toml = r#"
    /// [diff]
    /// timeout_secs = 60
    /// "#;
    /// let config = ChurnConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.diff.timeout_secs, 60);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ChurnError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// External diff/stat invocation settings.
///
/// # Examples
///
/// ```
/// use svnchurn_core::DiffConfig;
///
/// let config = DiffConfig::default();
/// assert_eq!(config.svn_bin, "svn");
/// assert_eq!(config.diffstat_bin, "diffstat");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Wall-clock bound for one revision's diff+stat invocation (default: 600).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name or path of the SVN client binary.
    #[serde(default = "default_svn_bin")]
    pub svn_bin: String,
    /// Name or path of the diffstat binary.
    #[serde(default = "default_diffstat_bin")]
    pub diffstat_bin: String,
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_svn_bin() -> String {
    "svn".into()
}

fn default_diffstat_bin() -> String {
    "diffstat".into()
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            svn_bin: default_svn_bin(),
            diffstat_bin: default_diffstat_bin(),
        }
    }
}

/// Revision admission filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Skip revisions touching more files than this (default: 50).
    /// Copy and replace actions do not count toward the limit.
    #[serde(default = "default_max_files")]
    pub max_files: i64,
}

fn default_max_files() -> i64 {
    50
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
        }
    }
}

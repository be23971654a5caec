//! Core types, configuration, and error handling for svnchurn.
//!
//! This crate provides the shared foundation used by the other svnchurn
//! crates:
//! - [`ChurnError`] — unified error type using `thiserror`
//! - [`ChurnConfig`] — configuration loaded from `.svnchurn.toml`
//! - Shared records: [`DiffRecord`], [`DeltaFact`], [`PendingRevision`]

mod config;
mod error;
mod types;

pub use config::{ChurnConfig, DiffConfig, SelectorConfig};
pub use error::ChurnError;
pub use types::{DeltaFact, DiffRecord, PendingRevision};

/// A convenience `Result` type for svnchurn operations.
pub type Result<T> = std::result::Result<T, ChurnError>;

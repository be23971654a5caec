//! External `svn diff | diffstat` invocation and output parsing.
//!
//! [`invoker`] runs the external tool pair under a wall-clock bound;
//! [`parser`] turns its tabular stdout into [`svnchurn_core::DiffRecord`]s.

pub mod invoker;
pub mod parser;

pub use invoker::{DiffOutcome, DiffStat};
pub use parser::parse_diffstat;

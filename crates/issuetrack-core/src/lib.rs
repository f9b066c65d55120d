//! issuetrack-core: Core library for the issuetrack issue tracker
//!
//! Provides the issue model, filtering, and an in-memory store that
//! partitions issues by project name. No database, no files.

pub mod config;
pub mod error;
pub mod filter;
pub mod id;
pub mod issue;
pub mod store;

pub use config::Config;
pub use error::{Action, Error};
pub use filter::IssueFilter;
pub use id::generate_id;
pub use issue::{DeleteIssue, Issue, IssueUpdate, NewIssue, OpenFlag, ValidIssue};
pub use store::Store;

/// Result type for issuetrack operations
pub type Result<T> = std::result::Result<T, Error>;

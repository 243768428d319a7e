//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Pre-flight configuration failure: nothing to assign into.
    /// Fatal for the run, raised before any planning or commits.
    #[error("No {group_type} groups found. Please create groups first.")]
    NoTargetGroups { group_type: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),
}

//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Assignment, DomainError, Group, Member};

/// Member roster access. One snapshot per assignment run.
#[async_trait::async_trait]
pub trait RosterPort: Send + Sync {
    /// Fetch all active, non-guest members with family links and open
    /// memberships expanded. A failure here aborts the run before any
    /// planning or commits.
    async fn fetch_candidates(&self) -> Result<Vec<Member>, DomainError>;
}

/// Target group access.
#[async_trait::async_trait]
pub trait GroupPort: Send + Sync {
    /// Fetch active groups of `group_type` with their open-membership counts.
    /// When `ids` is non-empty the result is restricted to those ids; ids of
    /// the wrong type or inactive ones drop out silently.
    async fn fetch_groups(
        &self,
        group_type: &str,
        ids: &[String],
    ) -> Result<Vec<Group>, DomainError>;
}

/// Membership mutation. The only write surface of the engine.
///
/// Both operations are idempotent upserts keyed by (group, member): create
/// the row if absent, clear `left_at` if it exists. Re-committing the same
/// assignment is a no-op reactivation.
#[async_trait::async_trait]
pub trait MembershipPort: Send + Sync {
    /// Upsert a single membership row.
    async fn upsert_membership(&self, assignment: &Assignment) -> Result<(), DomainError>;

    /// Upsert a chunk of rows in one atomic transaction: either every row in
    /// the chunk lands or none does.
    async fn upsert_batch(&self, assignments: &[Assignment]) -> Result<(), DomainError>;
}

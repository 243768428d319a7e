//! Batched, partially fault-tolerant persistence of a plan.
//!
//! Two-stage strategy: each chunk goes through one atomic upsert batch; a
//! chunk that fails is replayed item by item so one bad row cannot sink the
//! rest. Callers that support cancellation should cancel between chunks —
//! a chunk itself is atomic.

use crate::domain::{Assignment, DomainError, Roster};
use crate::ports::MembershipPort;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Structured partial result of a commit pass. Counts are authoritative;
/// the plan itself is discarded after commit.
#[derive(Debug, Default)]
pub struct CommitOutcome {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Commits planned assignments through the membership port.
pub struct BatchCommitter {
    store: Arc<dyn MembershipPort>,
    chunk_size: usize,
}

impl BatchCommitter {
    /// A zero `chunk_size` is treated as 1.
    pub fn new(store: Arc<dyn MembershipPort>, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Persist every assignment. Never fails as a whole: chunk failures
    /// degrade to per-item commits and individual failures become named
    /// entries in the outcome.
    pub async fn commit(&self, assignments: &[Assignment], roster: &Roster) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        if assignments.is_empty() {
            return outcome;
        }

        for chunk in assignments.chunks(self.chunk_size) {
            match self.store.upsert_batch(chunk).await {
                Ok(()) => outcome.success += chunk.len(),
                Err(e) => {
                    warn!(
                        chunk_len = chunk.len(),
                        error = %e,
                        "batch commit failed, retrying chunk item by item"
                    );
                    self.recover_chunk(chunk, roster, &mut outcome).await;
                }
            }
        }

        info!(
            success = outcome.success,
            failed = outcome.failed,
            "commit finished"
        );
        outcome
    }

    /// Recovery strategy: replay a failed chunk one row at a time, capturing
    /// each individual failure without aborting the rest.
    async fn recover_chunk(
        &self,
        chunk: &[Assignment],
        roster: &Roster,
        outcome: &mut CommitOutcome,
    ) {
        for assignment in chunk {
            match self.store.upsert_membership(assignment).await {
                Ok(()) => outcome.success += 1,
                Err(e) => {
                    outcome.failed += 1;
                    let name = roster
                        .member_by_id(&assignment.member_id)
                        .map(|m| m.full_name())
                        .unwrap_or_else(|| assignment.member_id.clone());
                    outcome.errors.push(format!("Failed to assign {name}: {e}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_store::MemoryStore;
    use crate::domain::entities::{Group, Member, MemberRole, MemberStatus};

    fn member(id: &str) -> Member {
        Member {
            id: id.into(),
            first_name: id.to_uppercase(),
            last_name: "Test".into(),
            status: MemberStatus::Active,
            role: MemberRole::Member,
            residence: None,
            city: None,
            county: None,
            spouse_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            memberships: Vec::new(),
        }
    }

    fn group(id: &str) -> Group {
        Group {
            id: id.into(),
            name: id.to_uppercase(),
            group_type: Some("connect-group".into()),
            is_active: true,
            member_count: 0,
        }
    }

    fn assignments(ids: &[&str]) -> Vec<Assignment> {
        ids.iter()
            .map(|id| Assignment {
                member_id: id.to_string(),
                group_id: "g0".into(),
            })
            .collect()
    }

    #[tokio::test]
    async fn commits_in_chunks() {
        let store = Arc::new(MemoryStore::new(
            vec![member("a"), member("b"), member("c")],
            vec![group("g0")],
        ));
        let committer = BatchCommitter::new(Arc::clone(&store) as _, 2);
        let roster = Roster::new(vec![member("a"), member("b"), member("c")]);

        let outcome = committer.commit(&assignments(&["a", "b", "c"]), &roster).await;
        assert_eq!(outcome.success, 3);
        assert_eq!(outcome.failed, 0);
        assert_eq!(store.open_count("g0").await, 3);
    }

    #[tokio::test]
    async fn batch_failure_degrades_to_per_item_commits() {
        let store = Arc::new(
            MemoryStore::new(vec![member("a"), member("b")], vec![group("g0")])
                .with_batch_failure(),
        );
        let committer = BatchCommitter::new(Arc::clone(&store) as _, 100);
        let roster = Roster::new(vec![member("a"), member("b")]);

        let outcome = committer.commit(&assignments(&["a", "b"]), &roster).await;
        assert_eq!(outcome.success, 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(store.open_count("g0").await, 2);
    }

    #[tokio::test]
    async fn individual_failures_are_named_and_do_not_abort_the_rest() {
        let store = Arc::new(
            MemoryStore::new(vec![member("a"), member("b"), member("c")], vec![group("g0")])
                .with_failing_member("b"),
        );
        let committer = BatchCommitter::new(Arc::clone(&store) as _, 100);
        let roster = Roster::new(vec![member("a"), member("b"), member("c")]);

        let outcome = committer.commit(&assignments(&["a", "b", "c"]), &roster).await;
        assert_eq!(outcome.success, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Failed to assign B Test:"));
        assert_eq!(store.open_count("g0").await, 2);
    }

    #[tokio::test]
    async fn empty_plan_is_a_no_op() {
        let store = Arc::new(MemoryStore::new(Vec::new(), vec![group("g0")]));
        let committer = BatchCommitter::new(Arc::clone(&store) as _, 100);
        let roster = Roster::new(Vec::new());

        let outcome = committer.commit(&[], &roster).await;
        assert_eq!(outcome.success, 0);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.errors.is_empty());
    }
}

//! In-memory store for tests and dry runs. No database required.
//!
//! Implements all three outbound ports over shared vectors. Batch and
//! per-member failures can be injected to exercise the commit fallback path.

use crate::domain::{Assignment, DomainError, Group, Member, Membership};
use crate::ports::{GroupPort, MembershipPort, RosterPort};
use crate::domain::entities::{MemberRole, MemberStatus};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// One row of the membership table.
#[derive(Debug, Clone)]
pub struct MembershipRow {
    pub group_id: String,
    pub member_id: String,
    pub role: String,
    pub is_leader: bool,
    pub joined_at: i64,
    pub left_at: Option<i64>,
}

#[derive(Debug, Default)]
struct StoreData {
    members: Vec<Member>,
    groups: Vec<Group>,
    rows: Vec<MembershipRow>,
}

/// In-memory implementation of the storage collaborator.
///
/// Members are held without their `memberships` field; candidate fetches
/// assemble memberships from the row table, so a rerun sees what the
/// previous run committed.
pub struct MemoryStore {
    data: RwLock<StoreData>,
    fail_batches: bool,
    failing_members: HashSet<String>,
}

impl MemoryStore {
    pub fn new(members: Vec<Member>, groups: Vec<Group>) -> Self {
        Self {
            data: RwLock::new(StoreData {
                members,
                groups,
                rows: Vec::new(),
            }),
            fail_batches: false,
            failing_members: HashSet::new(),
        }
    }

    /// Every `upsert_batch` call fails, forcing the per-item fallback.
    pub fn with_batch_failure(mut self) -> Self {
        self.fail_batches = true;
        self
    }

    /// Upserts touching this member fail (single and batch).
    pub fn with_failing_member(mut self, member_id: impl Into<String>) -> Self {
        self.failing_members.insert(member_id.into());
        self
    }

    /// Snapshot of the membership table, for assertions.
    pub async fn rows(&self) -> Vec<MembershipRow> {
        self.data.read().await.rows.clone()
    }

    /// Open memberships currently recorded for a group.
    pub async fn open_count(&self, group_id: &str) -> usize {
        self.data
            .read()
            .await
            .rows
            .iter()
            .filter(|r| r.group_id == group_id && r.left_at.is_none())
            .count()
    }

    fn apply_upsert(data: &mut StoreData, assignment: &Assignment) {
        if let Some(row) = data
            .rows
            .iter_mut()
            .find(|r| r.group_id == assignment.group_id && r.member_id == assignment.member_id)
        {
            row.left_at = None;
        } else {
            data.rows.push(MembershipRow {
                group_id: assignment.group_id.clone(),
                member_id: assignment.member_id.clone(),
                role: "member".into(),
                is_leader: false,
                joined_at: chrono::Utc::now().timestamp(),
                left_at: None,
            });
        }
    }

    fn group_type_of(data: &StoreData, group_id: &str) -> Option<String> {
        data.groups
            .iter()
            .find(|g| g.id == group_id)
            .and_then(|g| g.group_type.clone())
    }
}

#[async_trait::async_trait]
impl RosterPort for MemoryStore {
    async fn fetch_candidates(&self) -> Result<Vec<Member>, DomainError> {
        let data = self.data.read().await;
        let candidates = data
            .members
            .iter()
            .filter(|m| m.status == MemberStatus::Active && m.role != MemberRole::Guest)
            .cloned()
            .map(|mut m| {
                m.memberships = data
                    .rows
                    .iter()
                    .filter(|r| r.member_id == m.id)
                    .map(|r| Membership {
                        group_id: r.group_id.clone(),
                        group_type: Self::group_type_of(&data, &r.group_id),
                        left_at: r.left_at,
                    })
                    .collect();
                m
            })
            .collect();
        Ok(candidates)
    }
}

#[async_trait::async_trait]
impl GroupPort for MemoryStore {
    async fn fetch_groups(
        &self,
        group_type: &str,
        ids: &[String],
    ) -> Result<Vec<Group>, DomainError> {
        let data = self.data.read().await;
        let groups = data
            .groups
            .iter()
            .filter(|g| g.is_active && g.group_type.as_deref() == Some(group_type))
            .filter(|g| ids.is_empty() || ids.contains(&g.id))
            .cloned()
            .map(|mut g| {
                g.member_count = data
                    .rows
                    .iter()
                    .filter(|r| r.group_id == g.id && r.left_at.is_none())
                    .count() as u32;
                g
            })
            .collect();
        Ok(groups)
    }
}

#[async_trait::async_trait]
impl MembershipPort for MemoryStore {
    async fn upsert_membership(&self, assignment: &Assignment) -> Result<(), DomainError> {
        if self.failing_members.contains(&assignment.member_id) {
            return Err(DomainError::Store(format!(
                "simulated write failure for {}",
                assignment.member_id
            )));
        }
        let mut data = self.data.write().await;
        Self::apply_upsert(&mut data, assignment);
        Ok(())
    }

    async fn upsert_batch(&self, assignments: &[Assignment]) -> Result<(), DomainError> {
        if self.fail_batches {
            return Err(DomainError::Store("simulated transaction failure".into()));
        }
        // All-or-nothing: reject the whole chunk before touching any row.
        if let Some(bad) = assignments
            .iter()
            .find(|a| self.failing_members.contains(&a.member_id))
        {
            return Err(DomainError::Store(format!(
                "simulated transaction failure at {}",
                bad.member_id
            )));
        }
        let mut data = self.data.write().await;
        for assignment in assignments {
            Self::apply_upsert(&mut data, assignment);
        }
        Ok(())
    }
}

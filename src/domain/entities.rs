//! Domain entities. Pure data structures for the core business.
//!
//! No SQL/IO types here — these are mapped from adapters.

use serde::{Deserialize, Serialize};

/// A church member with family links and current group memberships.
///
/// Read-only snapshot for the duration of one assignment run; only membership
/// rows are mutated, through the persistence port at the very end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub status: MemberStatus,
    pub role: MemberRole,
    pub residence: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub spouse_id: Option<String>,
    pub parent_id: Option<String>,
    /// Children by id, in storage order.
    pub child_ids: Vec<String>,
    pub memberships: Vec<Membership>,
}

impl Member {
    /// Display name used in failure messages.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Admin,
    Pastor,
    Leader,
    Member,
    Guest,
}

/// One row of the member<->group join. Open while `left_at` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: String,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub left_at: Option<i64>,
}

impl Membership {
    pub fn is_open(&self) -> bool {
        self.left_at.is_none()
    }
}

/// A small group that can receive assignments.
///
/// `member_count` is the open-membership count at snapshot time; the planner
/// works on its own in-memory copy and never writes it back directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub is_active: bool,
    pub member_count: u32,
}

/// A cluster of members that must be co-assigned. Never empty; immutable
/// once emitted by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUnit {
    member_ids: Vec<String>,
}

impl FamilyUnit {
    /// Returns `None` for an empty id list — a unit always has a seed.
    pub fn new(member_ids: Vec<String>) -> Option<Self> {
        if member_ids.is_empty() {
            None
        } else {
            Some(Self { member_ids })
        }
    }

    /// Seed member: the one the traversal started from.
    pub fn seed(&self) -> &str {
        &self.member_ids[0]
    }

    pub fn members(&self) -> &[String] {
        &self.member_ids
    }

    pub fn size(&self) -> usize {
        self.member_ids.len()
    }
}

/// A planned (member, group) pairing. Purely a plan record until committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub member_id: String,
    pub group_id: String,
}

/// Outcome of one assignment run, in the wire shape the surrounding
/// application expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReport {
    pub message: String,
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub total_assignments: usize,
    pub family_units_processed: usize,
    pub regions_processed: usize,
}

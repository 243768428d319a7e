//! Roster: the member snapshot as an id-addressable adjacency structure.
//!
//! The family builder walks relations through this type only, so it never
//! touches the concrete storage representation.

use crate::domain::entities::Member;
use std::collections::HashMap;

/// Immutable member snapshot with O(1) id lookup.
///
/// Input order is preserved; traversal and planning stay deterministic because
/// every scan runs over this order.
#[derive(Debug, Default)]
pub struct Roster {
    members: Vec<Member>,
    by_id: HashMap<String, usize>,
}

impl Roster {
    /// Later duplicates of an id shadow earlier ones, matching a keyed map
    /// built by insertion.
    pub fn new(members: Vec<Member>) -> Self {
        let by_id = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self { members, by_id }
    }

    pub fn member_by_id(&self, id: &str) -> Option<&Member> {
        self.by_id.get(id).map(|&i| &self.members[i])
    }

    /// All members in input order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Related member ids in traversal order: spouse, parent, children.
    /// Ids that resolve to nobody in the roster are still yielded; callers
    /// filter through [`member_by_id`](Self::member_by_id).
    pub fn relations_of<'a>(&self, member: &'a Member) -> impl Iterator<Item = &'a str> {
        member
            .spouse_id
            .as_deref()
            .into_iter()
            .chain(member.parent_id.as_deref())
            .chain(member.child_ids.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

//! Assignment candidacy rules.

use crate::domain::entities::{Member, MemberRole, MemberStatus};

/// True iff the member may be placed into a group of `group_type`:
/// active, not a guest, and not already holding an open membership of that type.
///
/// Re-evaluated at every traversal step; relatives that fail here block only
/// themselves, never the rest of the family.
pub fn is_eligible(member: &Member, group_type: &str) -> bool {
    member.status == MemberStatus::Active
        && member.role != MemberRole::Guest
        && !has_open_membership(member, group_type)
}

/// True iff the member holds an open membership in a group of `group_type`.
pub fn has_open_membership(member: &Member, group_type: &str) -> bool {
    member
        .memberships
        .iter()
        .any(|m| m.is_open() && m.group_type.as_deref() == Some(group_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Membership;

    fn member(status: MemberStatus, role: MemberRole, memberships: Vec<Membership>) -> Member {
        Member {
            id: "m1".into(),
            first_name: "Test".into(),
            last_name: "Member".into(),
            status,
            role,
            residence: None,
            city: None,
            county: None,
            spouse_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            memberships,
        }
    }

    fn membership(group_type: &str, left_at: Option<i64>) -> Membership {
        Membership {
            group_id: "g1".into(),
            group_type: Some(group_type.into()),
            left_at,
        }
    }

    #[test]
    fn active_member_with_no_memberships_is_eligible() {
        let m = member(MemberStatus::Active, MemberRole::Member, Vec::new());
        assert!(is_eligible(&m, "connect-group"));
    }

    #[test]
    fn guests_and_inactive_members_are_not() {
        let guest = member(MemberStatus::Active, MemberRole::Guest, Vec::new());
        assert!(!is_eligible(&guest, "connect-group"));

        let inactive = member(MemberStatus::Inactive, MemberRole::Member, Vec::new());
        assert!(!is_eligible(&inactive, "connect-group"));
    }

    #[test]
    fn open_membership_of_target_type_excludes() {
        let m = member(
            MemberStatus::Active,
            MemberRole::Member,
            vec![membership("connect-group", None)],
        );
        assert!(!is_eligible(&m, "connect-group"));
    }

    #[test]
    fn departed_or_other_type_memberships_do_not_exclude() {
        let departed = member(
            MemberStatus::Active,
            MemberRole::Member,
            vec![membership("connect-group", Some(1_700_000_000))],
        );
        assert!(is_eligible(&departed, "connect-group"));

        let other_type = member(
            MemberStatus::Active,
            MemberRole::Leader,
            vec![membership("bible-study", None)],
        );
        assert!(is_eligible(&other_type, "connect-group"));
    }
}

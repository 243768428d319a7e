//! Capacity-aware placement: largest unit first, whole-unit if possible,
//! cascading to spouse pairs and then individuals.
//!
//! Among groups with enough space the lowest occupancy/capacity ratio wins;
//! ratios are compared by integer cross-multiplication and ties fall back to
//! the group's input position, so a run is reproducible bit for bit.

use crate::domain::entities::{Assignment, FamilyUnit, Group};
use crate::domain::roster::Roster;
use std::collections::HashSet;

/// In-memory occupancy tracker for one target group.
#[derive(Debug, Clone)]
pub struct GroupLoad {
    pub id: String,
    pub occupancy: u32,
    pub capacity: u32,
}

impl GroupLoad {
    fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

/// Outcome of the planning pass. `failures` carries one message per member
/// that no group could take; the run continues past them.
#[derive(Debug, Default)]
pub struct Plan {
    pub assignments: Vec<Assignment>,
    pub failures: Vec<String>,
    pub loads: Vec<GroupLoad>,
}

pub struct Planner<'a> {
    roster: &'a Roster,
    loads: Vec<GroupLoad>,
}

impl<'a> Planner<'a> {
    /// Seeds occupancy from the group snapshot. Groups of the wrong type or
    /// inactive ones are dropped here, whatever the caller fetched.
    pub fn new(roster: &'a Roster, groups: &[Group], group_type: &str, capacity: u32) -> Self {
        let loads = groups
            .iter()
            .filter(|g| g.is_active && g.group_type.as_deref() == Some(group_type))
            .map(|g| GroupLoad {
                id: g.id.clone(),
                occupancy: g.member_count,
                capacity,
            })
            .collect();
        Self { roster, loads }
    }

    /// Place all units. Consumes the planner: occupancy state is only valid
    /// for a single pass.
    pub fn plan(mut self, units: &[FamilyUnit]) -> Plan {
        // Largest first reduces fragmentation; stable sort keeps discovery
        // order between equal sizes.
        let mut ordered: Vec<&FamilyUnit> = units.iter().collect();
        ordered.sort_by(|a, b| b.size().cmp(&a.size()));

        let mut assignments = Vec::new();
        let mut failures = Vec::new();

        for unit in ordered {
            if self.try_place_whole(unit, &mut assignments) {
                continue;
            }
            self.place_split(unit, &mut assignments, &mut failures);
        }

        Plan {
            assignments,
            failures,
            loads: self.loads,
        }
    }

    /// Step 1: the entire unit into one group.
    fn try_place_whole(&mut self, unit: &FamilyUnit, assignments: &mut Vec<Assignment>) -> bool {
        let size = unit.size() as u32;
        match self.best_fit(size) {
            Some(idx) => {
                self.assign_all(unit.members(), idx, assignments);
                true
            }
            None => false,
        }
    }

    /// Cascade: spouse pairs together if any group can take them, everyone
    /// else one at a time. Splitting spouses is a recorded degradation only
    /// when even they cannot be co-placed.
    fn place_split(
        &mut self,
        unit: &FamilyUnit,
        assignments: &mut Vec<Assignment>,
        failures: &mut Vec<String>,
    ) {
        let (paired, mut singles) = self.split_spouses(unit);

        if !paired.is_empty() {
            match self.best_fit(paired.len() as u32) {
                Some(idx) => self.assign_all(&paired, idx, assignments),
                None => singles.extend(paired),
            }
        }

        for member_id in singles {
            match self.best_fit(1) {
                Some(idx) => self.assign_all(std::slice::from_ref(&member_id), idx, assignments),
                None => failures.push(format!(
                    "Could not assign member {member_id} - all groups are full"
                )),
            }
        }
    }

    /// Members whose registered spouse is in the same unit, and the rest.
    /// Both halves keep unit order.
    fn split_spouses(&self, unit: &FamilyUnit) -> (Vec<String>, Vec<String>) {
        let in_unit: HashSet<&str> = unit.members().iter().map(String::as_str).collect();
        let mut paired = Vec::new();
        let mut singles = Vec::new();
        for id in unit.members() {
            let spouse_here = self
                .roster
                .member_by_id(id)
                .and_then(|m| m.spouse_id.as_deref())
                .is_some_and(|s| in_unit.contains(s));
            if spouse_here {
                paired.push(id.clone());
            } else {
                singles.push(id.clone());
            }
        }
        (paired, singles)
    }

    /// Index of the group with `available >= needed` and the lowest
    /// occupancy/capacity ratio; first by input order on ties.
    fn best_fit(&self, needed: u32) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, load) in self.loads.iter().enumerate() {
            if load.available() < needed {
                continue;
            }
            match best {
                None => best = Some(idx),
                Some(b) => {
                    if ratio_less(load, &self.loads[b]) {
                        best = Some(idx);
                    }
                }
            }
        }
        best
    }

    fn assign_all(&mut self, member_ids: &[String], group_idx: usize, out: &mut Vec<Assignment>) {
        let group_id = self.loads[group_idx].id.clone();
        for member_id in member_ids {
            out.push(Assignment {
                member_id: member_id.clone(),
                group_id: group_id.clone(),
            });
        }
        self.loads[group_idx].occupancy += member_ids.len() as u32;
    }
}

/// a.occupancy/a.capacity < b.occupancy/b.capacity, cross-multiplied.
fn ratio_less(a: &GroupLoad, b: &GroupLoad) -> bool {
    u64::from(a.occupancy) * u64::from(b.capacity) < u64::from(b.occupancy) * u64::from(a.capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Member, MemberRole, MemberStatus};

    const GROUP_TYPE: &str = "connect-group";

    fn member(id: &str, spouse: Option<&str>) -> Member {
        Member {
            id: id.into(),
            first_name: id.to_uppercase(),
            last_name: "Test".into(),
            status: MemberStatus::Active,
            role: MemberRole::Member,
            residence: Some("nairobi".into()),
            city: None,
            county: None,
            spouse_id: spouse.map(String::from),
            parent_id: None,
            child_ids: Vec::new(),
            memberships: Vec::new(),
        }
    }

    fn group(id: &str, member_count: u32) -> Group {
        Group {
            id: id.into(),
            name: id.to_uppercase(),
            group_type: Some(GROUP_TYPE.into()),
            is_active: true,
            member_count,
        }
    }

    fn unit(ids: &[&str]) -> FamilyUnit {
        FamilyUnit::new(ids.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn group_of<'p>(plan: &'p Plan, member_id: &str) -> Option<&'p str> {
        plan.assignments
            .iter()
            .find(|a| a.member_id == member_id)
            .map(|a| a.group_id.as_str())
    }

    #[test]
    fn whole_unit_lands_in_emptiest_group() {
        // Three groups of capacity 2; only g1 can hold the pair.
        let roster = Roster::new(vec![member("a", Some("b")), member("b", Some("a"))]);
        let groups = vec![group("g0", 1), group("g1", 0), group("g2", 1)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 2);

        let plan = planner.plan(&[unit(&["a", "b"])]);
        assert_eq!(plan.failures.len(), 0);
        assert_eq!(group_of(&plan, "a"), Some("g1"));
        assert_eq!(group_of(&plan, "b"), Some("g1"));
    }

    #[test]
    fn lowest_ratio_wins_and_ties_break_by_input_order() {
        let roster = Roster::new(vec![member("a", None)]);
        let groups = vec![group("g0", 5), group("g1", 3), group("g2", 3)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 15);

        let plan = planner.plan(&[unit(&["a"])]);
        assert_eq!(group_of(&plan, "a"), Some("g1"));
    }

    #[test]
    fn spouse_pair_cascades_to_single_placement_when_full() {
        // One group of capacity 1: pair cannot stay together, one spouse
        // lands, the other is reported.
        let roster = Roster::new(vec![member("a", Some("b")), member("b", Some("a"))]);
        let groups = vec![group("g0", 0)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 1);

        let plan = planner.plan(&[unit(&["a", "b"])]);
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(group_of(&plan, "a"), Some("g0"));
        assert_eq!(plan.failures.len(), 1);
        assert!(plan.failures[0].contains("b"));
        assert!(plan.failures[0].contains("all groups are full"));
    }

    #[test]
    fn pair_kept_together_while_others_split_off() {
        // Unit of three: couple plus one. No group takes all three, but g0
        // takes the pair; the third member goes to the less loaded group.
        let roster = Roster::new(vec![
            member("a", Some("b")),
            member("b", Some("a")),
            member("c", None),
        ]);
        let groups = vec![group("g0", 3), group("g1", 3)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 5);

        let plan = planner.plan(&[unit(&["a", "b", "c"])]);
        assert_eq!(plan.failures.len(), 0);
        assert_eq!(group_of(&plan, "a"), Some("g0"));
        assert_eq!(group_of(&plan, "b"), Some("g0"));
        assert_eq!(group_of(&plan, "c"), Some("g1"));
    }

    #[test]
    fn pair_folds_into_singles_when_no_room_for_two() {
        // Every group has exactly one slot: the spouses are split up but
        // both placed, and that is a degradation, not a failure.
        let roster = Roster::new(vec![member("a", Some("b")), member("b", Some("a"))]);
        let groups = vec![group("g0", 1), group("g1", 1)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 2);

        let plan = planner.plan(&[unit(&["a", "b"])]);
        assert_eq!(plan.failures.len(), 0);
        assert_eq!(group_of(&plan, "a"), Some("g0"));
        assert_eq!(group_of(&plan, "b"), Some("g1"));
    }

    #[test]
    fn largest_units_are_placed_first() {
        // One group of 3 slots; the size-3 unit discovered second must win
        // over the earlier single.
        let roster = Roster::new(vec![
            member("x", None),
            member("a", None),
            member("b", None),
            member("c", None),
        ]);
        let groups = vec![group("g0", 0)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 3);

        let plan = planner.plan(&[unit(&["x"]), unit(&["a", "b", "c"])]);
        assert_eq!(group_of(&plan, "a"), Some("g0"));
        assert_eq!(group_of(&plan, "b"), Some("g0"));
        assert_eq!(group_of(&plan, "c"), Some("g0"));
        assert_eq!(group_of(&plan, "x"), None);
        assert_eq!(plan.failures.len(), 1);
        assert!(plan.failures[0].contains("x"));
    }

    #[test]
    fn equal_size_units_keep_discovery_order() {
        let roster = Roster::new(vec![member("a", None), member("b", None)]);
        let groups = vec![group("g0", 0)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 1);

        let plan = planner.plan(&[unit(&["a"]), unit(&["b"])]);
        assert_eq!(group_of(&plan, "a"), Some("g0"));
        assert_eq!(group_of(&plan, "b"), None);
    }

    #[test]
    fn inactive_and_wrong_type_groups_are_ignored() {
        let roster = Roster::new(vec![member("a", None)]);
        let mut inactive = group("g0", 0);
        inactive.is_active = false;
        let mut wrong_type = group("g1", 0);
        wrong_type.group_type = Some("bible-study".into());
        let groups = vec![inactive, wrong_type, group("g2", 0)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 5);

        let plan = planner.plan(&[unit(&["a"])]);
        assert_eq!(group_of(&plan, "a"), Some("g2"));
    }

    #[test]
    fn occupancy_never_exceeds_capacity_under_load() {
        // 250 independent singles into 3 groups of 100.
        let members: Vec<Member> = (0..250).map(|i| member(&format!("m{i}"), None)).collect();
        let units: Vec<FamilyUnit> = members
            .iter()
            .map(|m| unit(&[m.id.as_str()]))
            .collect();
        let roster = Roster::new(members);
        let groups = vec![group("g0", 0), group("g1", 0), group("g2", 0)];
        let planner = Planner::new(&roster, &groups, GROUP_TYPE, 100);

        let plan = planner.plan(&units);
        assert_eq!(plan.assignments.len(), 250);
        assert_eq!(plan.failures.len(), 0);
        for load in &plan.loads {
            assert!(load.occupancy <= load.capacity);
        }
        // Balanced fill: final occupancies within one member of each other.
        let max = plan.loads.iter().map(|l| l.occupancy).max().unwrap();
        let min = plan.loads.iter().map(|l| l.occupancy).min().unwrap();
        assert!(max - min <= 1, "unbalanced: max {max}, min {min}");
    }

    #[test]
    fn no_groups_means_every_member_fails() {
        let roster = Roster::new(vec![member("a", None)]);
        let planner = Planner::new(&roster, &[], GROUP_TYPE, 15);

        let plan = planner.plan(&[unit(&["a"])]);
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.failures.len(), 1);
    }
}

//! Main assignment logic: fetch snapshot -> build family units -> plan
//! placements -> commit -> report.
//!
//! One call is one synchronous pass over an immutable snapshot. Two runs
//! against overlapping groups can race; serialize per group type upstream.

use crate::domain::region::partition_by_region;
use crate::domain::{
    AssignmentReport, DomainError, Planner, RegionField, RegionResolver, Roster, UnitBuilder,
};
use crate::ports::{GroupPort, MembershipPort, RosterPort};
use crate::usecases::commit::BatchCommitter;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_GROUP_TYPE: &str = "connect-group";
pub const DEFAULT_GROUP_CAPACITY: u32 = 15;

/// Parameters of one assignment run.
#[derive(Debug, Clone)]
pub struct AssignmentRequest {
    pub group_type: String,
    pub max_members_per_group: u32,
    pub region_fields: Vec<RegionField>,
    /// Explicit target groups; empty means every active group of the type.
    pub target_group_ids: Vec<String>,
}

impl Default for AssignmentRequest {
    fn default() -> Self {
        Self {
            group_type: DEFAULT_GROUP_TYPE.to_string(),
            max_members_per_group: DEFAULT_GROUP_CAPACITY,
            region_fields: crate::domain::region::DEFAULT_REGION_FIELDS.to_vec(),
            target_group_ids: Vec::new(),
        }
    }
}

/// Assignment service. Coordinates the snapshot fetch, the pure in-memory
/// pipeline, and the batched commit.
pub struct AssignmentService {
    roster: Arc<dyn RosterPort>,
    groups: Arc<dyn GroupPort>,
    committer: BatchCommitter,
}

impl AssignmentService {
    pub fn new(
        roster: Arc<dyn RosterPort>,
        groups: Arc<dyn GroupPort>,
        memberships: Arc<dyn MembershipPort>,
        batch_size: usize,
    ) -> Self {
        Self {
            roster,
            groups,
            committer: BatchCommitter::new(memberships, batch_size),
        }
    }

    /// Run one assignment pass.
    ///
    /// Fails fast on a bad request, a snapshot fetch error, or when no
    /// qualifying target group exists. Everything after that is best-effort:
    /// unplaceable members and per-row commit failures land in the report,
    /// not in `Err`.
    pub async fn assign(&self, request: &AssignmentRequest) -> Result<AssignmentReport, DomainError> {
        if request.max_members_per_group == 0 {
            return Err(DomainError::Config(
                "max_members_per_group must be positive".into(),
            ));
        }

        let members = self.roster.fetch_candidates().await?;
        let groups = self
            .groups
            .fetch_groups(&request.group_type, &request.target_group_ids)
            .await?;
        if groups.is_empty() {
            return Err(DomainError::NoTargetGroups {
                group_type: request.group_type.clone(),
            });
        }
        info!(
            members = members.len(),
            groups = groups.len(),
            group_type = %request.group_type,
            "snapshot fetched"
        );

        let roster = Roster::new(members);
        let resolver = RegionResolver::new(request.region_fields.clone());

        let units = UnitBuilder::new(&roster, &resolver, &request.group_type).build_units();
        let regions = partition_by_region(&units, &roster, &resolver);
        info!(
            units = units.len(),
            regions = regions.len(),
            "family units built"
        );

        let planner = Planner::new(
            &roster,
            &groups,
            &request.group_type,
            request.max_members_per_group,
        );
        let plan = planner.plan(&units);
        info!(
            planned = plan.assignments.len(),
            unassignable = plan.failures.len(),
            "placement planned"
        );

        let outcome = self.committer.commit(&plan.assignments, &roster).await;

        let mut errors = outcome.errors;
        errors.extend(plan.failures);

        Ok(AssignmentReport {
            message: format!("Assigned {} members to groups", outcome.success),
            success: outcome.success,
            failed: outcome.failed,
            errors,
            total_assignments: plan.assignments.len(),
            family_units_processed: units.len(),
            regions_processed: regions.len(),
        })
    }
}

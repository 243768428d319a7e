//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod eligibility;
pub mod entities;
pub mod errors;
pub mod family;
pub mod planner;
pub mod region;
pub mod roster;

pub use entities::{
    Assignment, AssignmentReport, FamilyUnit, Group, Member, MemberRole, MemberStatus, Membership,
};
pub use errors::DomainError;
pub use family::UnitBuilder;
pub use planner::{GroupLoad, Plan, Planner};
pub use region::{RegionField, RegionResolver, UNKNOWN_REGION};
pub use roster::Roster;

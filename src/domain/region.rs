//! Region keys: canonical location string for a member.
//!
//! A configurable preference chain of location fields is walked in order; the
//! first populated field wins. Keys are trimmed and lower-cased so that
//! "Nairobi " and "nairobi" match.

use crate::domain::entities::{FamilyUnit, Member};
use crate::domain::roster::Roster;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key for members with no usable location data. Only matches itself, so
/// unrelated no-data households are never merged.
pub const UNKNOWN_REGION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionField {
    Residence,
    City,
    County,
}

impl RegionField {
    /// Parse a config token ("residence", "city", "county"). Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "residence" => Some(Self::Residence),
            "city" => Some(Self::City),
            "county" => Some(Self::County),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residence => "residence",
            Self::City => "city",
            Self::County => "county",
        }
    }
}

/// Default preference chain: residence, then city, then county.
pub const DEFAULT_REGION_FIELDS: [RegionField; 3] =
    [RegionField::Residence, RegionField::City, RegionField::County];

/// Derives region keys from a field preference chain. Pure and total.
#[derive(Debug, Clone)]
pub struct RegionResolver {
    fields: Vec<RegionField>,
}

impl Default for RegionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_FIELDS.to_vec())
    }
}

impl RegionResolver {
    /// An empty chain falls back to the default one.
    pub fn new(fields: Vec<RegionField>) -> Self {
        if fields.is_empty() {
            Self {
                fields: DEFAULT_REGION_FIELDS.to_vec(),
            }
        } else {
            Self { fields }
        }
    }

    /// Canonical region key for a member.
    ///
    /// The first populated field in the chain is normalized (trim, lowercase).
    /// A field that is whitespace-only still wins the chain and normalizes to
    /// [`UNKNOWN_REGION`]; later fields are not consulted.
    pub fn key(&self, member: &Member) -> String {
        for field in &self.fields {
            let value = match field {
                RegionField::Residence => member.residence.as_deref(),
                RegionField::City => member.city.as_deref(),
                RegionField::County => member.county.as_deref(),
            };
            if let Some(v) = value {
                if v.is_empty() {
                    continue;
                }
                let key = v.trim().to_lowercase();
                return if key.is_empty() {
                    UNKNOWN_REGION.to_string()
                } else {
                    key
                };
            }
        }
        UNKNOWN_REGION.to_string()
    }
}

/// Group family units by their seed member's region key.
///
/// Diagnostic only (feeds the report's region count); placement never looks
/// at this partition.
pub fn partition_by_region<'a>(
    units: &'a [FamilyUnit],
    roster: &Roster,
    resolver: &RegionResolver,
) -> HashMap<String, Vec<&'a FamilyUnit>> {
    let mut by_region: HashMap<String, Vec<&FamilyUnit>> = HashMap::new();
    for unit in units {
        if let Some(seed) = roster.member_by_id(unit.seed()) {
            by_region.entry(resolver.key(seed)).or_default().push(unit);
        }
    }
    by_region
}

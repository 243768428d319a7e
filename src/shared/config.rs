//! Application configuration. Paths, run defaults.

use crate::domain::region::{DEFAULT_REGION_FIELDS, RegionField};
use crate::usecases::assignment_service::{DEFAULT_GROUP_CAPACITY, DEFAULT_GROUP_TYPE};
use crate::usecases::commit::DEFAULT_BATCH_SIZE;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub data_dir: Option<String>,

    /// Group type tag targeted by a run. Read from FLOCK_GROUP_TYPE.
    #[serde(default)]
    pub group_type: Option<String>,

    /// Capacity ceiling per group. Read from FLOCK_MAX_MEMBERS_PER_GROUP.
    #[serde(default)]
    pub max_members_per_group: Option<u32>,

    /// Comma-separated region field chain. Read from FLOCK_REGION_FIELDS.
    #[serde(default)]
    pub region_fields: Option<String>,

    /// Assignments per commit transaction. Read from FLOCK_BATCH_SIZE.
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Comma-separated explicit target group ids. Read from
    /// FLOCK_TARGET_GROUP_IDS. Empty means all active groups of the type.
    #[serde(default)]
    pub target_group_ids: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("FLOCK"));
        if let Ok(path) = std::env::var("FLOCK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns the target group type. Defaults to "connect-group".
    pub fn group_type_or_default(&self) -> String {
        self.group_type
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP_TYPE.to_string())
    }

    /// Returns the per-group capacity ceiling. Defaults to 15.
    pub fn max_members_or_default(&self) -> u32 {
        self.max_members_per_group.unwrap_or(DEFAULT_GROUP_CAPACITY)
    }

    /// Returns the region field chain. Unknown tokens are dropped; an empty
    /// or all-invalid value falls back to residence,city,county.
    pub fn region_fields_or_default(&self) -> Vec<RegionField> {
        let parsed: Vec<RegionField> = self
            .region_fields
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(RegionField::parse)
            .collect();
        if parsed.is_empty() {
            DEFAULT_REGION_FIELDS.to_vec()
        } else {
            parsed
        }
    }

    /// Returns the commit batch size. Defaults to 100.
    pub fn batch_size_or_default(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Returns the explicit target group ids, empty when unset.
    pub fn target_group_ids_or_default(&self) -> Vec<String> {
        self.target_group_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.group_type_or_default(), "connect-group");
        assert_eq!(cfg.max_members_or_default(), 15);
        assert_eq!(cfg.batch_size_or_default(), 100);
        assert_eq!(cfg.region_fields_or_default(), DEFAULT_REGION_FIELDS.to_vec());
    }

    #[test]
    fn region_field_chain_parses_and_drops_junk() {
        let cfg = AppConfig {
            region_fields: Some("county, city, zip".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.region_fields_or_default(),
            vec![RegionField::County, RegionField::City]
        );
    }
}

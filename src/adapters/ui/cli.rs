//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Collects run parameters, confirms, runs the assignment with a spinner,
//! prints the report.

use crate::domain::{AssignmentReport, DomainError, RegionField};
use crate::usecases::{AssignmentRequest, AssignmentService};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, CustomType, Text};
use std::sync::Arc;
use std::time::Duration;

/// Applies the prompt theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("»").with_fg(Color::LightCyan));
    inquire::set_global_render_config(config);
}

/// CLI adapter. Inquire prompts around one assignment run.
pub struct CliInputPort {
    service: Arc<AssignmentService>,
    defaults: AssignmentRequest,
}

impl CliInputPort {
    pub fn new(service: Arc<AssignmentService>, defaults: AssignmentRequest) -> Self {
        Self { service, defaults }
    }

    fn prompt_request(&self) -> Result<AssignmentRequest, DomainError> {
        let group_type = Text::new("Group type:")
            .with_default(&self.defaults.group_type)
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;

        let max_members = CustomType::<u32>::new("Max members per group:")
            .with_default(self.defaults.max_members_per_group)
            .with_error_message("Enter a positive number")
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;

        let fields_default = self
            .defaults
            .region_fields
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let fields_raw = Text::new("Region fields (comma-separated):")
            .with_default(&fields_default)
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let region_fields = parse_region_fields(&fields_raw)?;

        let ids_default = self.defaults.target_group_ids.join(",");
        let ids_raw = Text::new("Target group ids (comma-separated, empty = all):")
            .with_default(&ids_default)
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let target_group_ids: Vec<String> = ids_raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(AssignmentRequest {
            group_type,
            max_members_per_group: max_members,
            region_fields,
            target_group_ids,
        })
    }

    fn print_report(report: &AssignmentReport) {
        println!();
        println!("{}", report.message);
        println!(
            "  planned: {}  committed: {}  failed: {}",
            report.total_assignments, report.success, report.failed
        );
        println!(
            "  family units: {}  regions: {}",
            report.family_units_processed, report.regions_processed
        );
        if !report.errors.is_empty() {
            println!("  issues:");
            for error in &report.errors {
                println!("    - {error}");
            }
        }
        if let Ok(json) = serde_json::to_string_pretty(report) {
            println!("{json}");
        }
    }
}

/// Strict parse of a comma-separated field chain; an unknown token is a
/// user error, not something to guess around.
fn parse_region_fields(raw: &str) -> Result<Vec<RegionField>, DomainError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| {
            RegionField::parse(token)
                .ok_or_else(|| DomainError::Input(format!("unknown region field: {token}")))
        })
        .collect()
}

#[async_trait]
impl crate::ports::InputPort for CliInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let request = self.prompt_request()?;

        let proceed = Confirm::new(&format!(
            "Assign all unplaced members to {} groups (capacity {})?",
            request.group_type, request.max_members_per_group
        ))
        .with_default(true)
        .prompt()
        .map_err(|e| DomainError::Input(e.to_string()))?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("assigning members...");
        spinner.enable_steady_tick(Duration::from_millis(80));

        let result = self.service.assign(&request).await;
        spinner.finish_and_clear();

        let report = result?;
        Self::print_report(&report);
        Ok(())
    }
}

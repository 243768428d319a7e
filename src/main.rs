//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use flock_assign::adapters::persistence::SqliteStore;
use flock_assign::adapters::ui::cli::CliInputPort;
use flock_assign::ports::{GroupPort, InputPort, MembershipPort, RosterPort};
use flock_assign::usecases::{AssignmentRequest, AssignmentService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    flock_assign::adapters::ui::init_ui();

    let cfg = flock_assign::shared::config::AppConfig::load().unwrap_or_default();
    let data_dir = cfg.data_dir_or_default();
    let data_path = PathBuf::from(&data_dir);
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Storage: one SQLite adapter serves all three outbound ports ---
    let store = Arc::new(
        SqliteStore::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    let roster: Arc<dyn RosterPort> = Arc::clone(&store) as Arc<dyn RosterPort>;
    let groups: Arc<dyn GroupPort> = Arc::clone(&store) as Arc<dyn GroupPort>;
    let memberships: Arc<dyn MembershipPort> = Arc::clone(&store) as Arc<dyn MembershipPort>;

    // --- Service ---
    let service = Arc::new(AssignmentService::new(
        roster,
        groups,
        memberships,
        cfg.batch_size_or_default(),
    ));

    // --- Run defaults from config; the CLI lets the user override them ---
    let defaults = AssignmentRequest {
        group_type: cfg.group_type_or_default(),
        max_members_per_group: cfg.max_members_or_default(),
        region_fields: cfg.region_fields_or_default(),
        target_group_ids: cfg.target_group_ids_or_default(),
    };

    let input_port: Arc<dyn InputPort> = Arc::new(CliInputPort::new(service, defaults));
    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

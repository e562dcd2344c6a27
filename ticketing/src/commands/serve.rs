use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ticketing_core::clock::SystemClock;
use ticketing_core::config::ServiceConfig;
use ticketing_core::launch::LaunchContract;
use ticketing_server::AppState;
use ticketing_store::Store;

pub fn cmd_serve(contract: &LaunchContract, database: Option<PathBuf>) -> Result<()> {
    let config = ServiceConfig::from_env().with_database_override(database);
    let store = Store::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    let state = AppState::new(store, Arc::new(SystemClock));
    let addr = contract.socket_addr();

    tracing::info!(
        app = %contract.entry_module,
        mode = %contract.run_mode,
        %addr,
        database = %config.database_path.display(),
        "starting ticketing service"
    );

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(ticketing_server::serve(addr, state))
        .with_context(|| format!("Server on {} failed", addr))?;
    Ok(())
}

mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);
    let state = build_state(&config)?;

    let tasks = scheduler::start_background_tasks(state, &config);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    tasks.shutdown().await;
    Ok(())
}

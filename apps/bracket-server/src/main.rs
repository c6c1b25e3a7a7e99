use std::sync::Arc;

use anyhow::{Context, Result};
use bracket_server::artifact::FsArtifactPublisher;
use bracket_server::config::{Cli, ServerConfig};
use bracket_server::generator::ProcessGenerator;
use bracket_server::routes;
use bracket_server::state::AppState;
use bracket_server::telemetry::init_tracing;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = ServerConfig::try_from(Cli::parse())?;
    init_tracing(&cfg.log_filter)?;

    let mut generator =
        ProcessGenerator::new(&cfg.generator_program).args(cfg.generator_args.iter());
    if let Some(dir) = &cfg.generator_dir {
        generator = generator.working_dir(dir);
    }
    let publisher = FsArtifactPublisher::new(cfg.source_artifact(), cfg.serving_artifact());
    let state = AppState::new(Arc::new(generator), Arc::new(publisher), cfg.bracket_url());
    let app = routes::app(state, &cfg.serving_dir);

    info!(
        addr = %cfg.listen_addr,
        generator = %cfg.generator_program,
        generator_args = ?cfg.generator_args,
        source = %cfg.source_artifact().display(),
        serving = %cfg.serving_artifact().display(),
        bracket_url = %cfg.bracket_url(),
        "starting bracket-server"
    );
    let listener = tokio::net::TcpListener::bind(cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("bracket-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

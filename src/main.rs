use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use review_assign::config::Config;
use review_assign::db::{self, Store};
use review_assign::services::{ReviewService, SeededSampler};
use review_assign::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    config.validate()?;
    logging::init(config.log_mode)?;

    log::info!(
        "[main] Starting review-assign, database {}",
        config.database_path.display()
    );

    let pool = db::initialize(&config.database_path)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    let store = Store::with_timeout(pool.clone(), config.operation_timeout());
    let mut service = ReviewService::new(store).with_policy(config.reassign_policy());
    if let Some(seed) = config.rng_seed {
        log::info!("[main] Using seeded reviewer sampler ({})", seed);
        service = service.with_sampler(Arc::new(SeededSampler::new(seed)));
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("binding {}", config.listen_addr()))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(server::shutdown_signal(shutdown.clone()));

    server::serve(listener, service, shutdown).await?;

    pool.close().await;
    log::info!("[main] Shutdown complete");
    Ok(())
}

//! Job orchestration worker binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vedit_hailuo::{HailuoClient, HiggsfieldClient};
use vedit_queue::JobQueue;
use vedit_store::{LocalPublisher, MemoryStore};
use vedit_worker::{recover_jobs, ProcessingContext, WorkerConfig, WorkerPool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vedit=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vedit-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let metrics_addr: SocketAddr = std::env::var("METRICS_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| ([0, 0, 0, 0], 9090).into());
    if let Err(e) = PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
    {
        warn!("Metrics exporter disabled: {}", e);
    }

    for dir in [config.assets_dir(), config.renders_dir(), config.frames_dir()] {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating storage directory {}", dir.display()))?;
    }

    let store = Arc::new(MemoryStore::new());
    let publisher = Arc::new(LocalPublisher::new(&config.public_base_url));

    let ctx = Arc::new(ProcessingContext {
        jobs: store.clone(),
        assets: store,
        publisher,
        hailuo: HailuoClient::from_env(),
        higgsfield: HiggsfieldClient::from_env(),
        http: reqwest::Client::new(),
        config,
        work_queue: JobQueue::new("work"),
        poll_queue: JobQueue::new("poll"),
    });

    let (recovered_work, recovered_poll) = recover_jobs(&ctx).await?;
    if recovered_work + recovered_poll > 0 {
        info!(
            "Resumed {} work and {} poll jobs from a previous run",
            recovered_work, recovered_poll
        );
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send(true).ok();
    });

    WorkerPool::new(ctx).run(shutdown_rx).await;

    info!("Worker shutdown complete");
    Ok(())
}

mod config;
mod discord_sink;
mod metrics_adapter;
mod pipeline;
mod supervisor;
mod transport;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use serenity::http::Http;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;
use vl_control::{ActivityReporter, FileLogStore, MessageSink, SessionTracker};
use vl_metrics::{MetricsConfig, MetricsServer, PresenceMetrics, SupervisorMetrics};

use crate::config::Config;
use crate::discord_sink::DiscordChannelSink;
use crate::pipeline::Pipeline;
use crate::supervisor::{Backoff, Supervisor};
use crate::transport::Handler;

const METRICS_NS: &str = "vl";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = Config::parse();

    // Metrics
    let metrics_enabled = match &cfg.metrics_listen {
        Some(listen) => {
            let ms = MetricsServer::install(MetricsConfig::new(listen.as_str(), METRICS_NS))?;
            tokio::spawn(async move {
                if let Err(e) = ms.serve().await {
                    warn!("metrics server stopped: {:#}", e);
                }
            });
            true
        }
        None => false,
    };

    // Sinks
    let store = Arc::new(FileLogStore::new(&cfg.log_file));
    info!(path = %store.path().display(), "logging voice activity to file");

    let destination = cfg
        .log_channel_id
        .map(|id| Arc::new(DiscordChannelSink::new(Arc::new(Http::new(&cfg.token)), id)));

    let mut reporter = ActivityReporter::new(
        store,
        destination.clone().map(|d| d as Arc<dyn MessageSink>),
    );
    if metrics_enabled {
        reporter = reporter.with_metrics(metrics_adapter::report_metrics(METRICS_NS));
    }
    let reporter = Arc::new(reporter);

    // Tracker + reporter tasks outlive gateway reconnects.
    let presence_metrics = metrics_enabled.then(|| Arc::new(PresenceMetrics::new(METRICS_NS)));
    let pipeline = Pipeline::spawn(
        SessionTracker::new(),
        reporter.clone(),
        cfg.queue_depth,
        presence_metrics.clone(),
    );

    let handler = Handler::new(pipeline.sender(), reporter, destination, presence_metrics);
    let supervisor = Supervisor::new(
        Backoff::new(cfg.restart_delay(), cfg.max_restart_delay()),
        metrics_enabled.then(|| SupervisorMetrics::new(METRICS_NS)),
    );

    let token = cfg.token.clone();
    tokio::select! {
        _ = supervisor.supervise(move || transport::run(token.clone(), handler.clone())) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown");
        }
    }

    if let Some(tracker) = pipeline.shutdown(SHUTDOWN_GRACE).await {
        if !tracker.store().is_empty() {
            info!(open_sessions = tracker.store().len(), "open sessions discarded at shutdown");
        }
    }

    Ok(())
}

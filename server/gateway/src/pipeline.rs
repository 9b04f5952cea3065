//! Tracker and reporter tasks.
//!
//! gateway handler --(bounded mpsc)--> tracker task --(unbounded mpsc)--> reporter task
//!
//! The tracker task is the only owner of the session map, so concurrent handler
//! invocations never race on it. Events leave the tracker before any sink I/O starts;
//! the reporter dispatches them one at a time in classification order.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::timeout,
};
use tracing::{error, info, warn};

use vl_control::{ActivityReporter, PresenceUpdate, SessionEvent, SessionTracker};
use vl_metrics::PresenceMetrics;

/// A presence update stamped with the instant it reached the process.
#[derive(Clone, Debug)]
pub struct Observed {
    pub update: PresenceUpdate,
    pub at: DateTime<Utc>,
}

pub struct Pipeline {
    updates: mpsc::Sender<Observed>,
    tracker: JoinHandle<SessionTracker>,
    reporter: JoinHandle<()>,
}

impl Pipeline {
    pub fn spawn(
        tracker: SessionTracker,
        reporter: Arc<ActivityReporter>,
        queue_depth: usize,
        metrics: Option<Arc<PresenceMetrics>>,
    ) -> Self {
        let (updates, updates_rx) = mpsc::channel(queue_depth.max(1));
        let (events, events_rx) = mpsc::unbounded_channel();

        let tracker = tokio::spawn(run_tracker(updates_rx, tracker, events, metrics));
        let reporter = tokio::spawn(run_reporter(events_rx, reporter));

        Self { updates, tracker, reporter }
    }

    pub fn sender(&self) -> mpsc::Sender<Observed> {
        self.updates.clone()
    }

    /// Stop accepting updates and flush queued events to the sinks.
    /// Returns the tracker if both tasks finished within `grace`.
    pub async fn shutdown(self, grace: Duration) -> Option<SessionTracker> {
        let Pipeline { updates, tracker, reporter } = self;
        drop(updates);

        let drained = timeout(grace, async {
            let tracker = tracker.await.ok()?;
            reporter.await.ok()?;
            Some(tracker)
        })
        .await;

        match drained {
            Ok(Some(tracker)) => Some(tracker),
            Ok(None) => {
                error!("pipeline task panicked during shutdown");
                None
            }
            Err(_) => {
                warn!(grace_secs = grace.as_secs(), "pipeline did not drain before shutdown deadline");
                None
            }
        }
    }
}

async fn run_tracker(
    mut rx: mpsc::Receiver<Observed>,
    mut tracker: SessionTracker,
    events: mpsc::UnboundedSender<SessionEvent>,
    metrics: Option<Arc<PresenceMetrics>>,
) -> SessionTracker {
    info!("session tracker started");

    while let Some(Observed { update, at }) = rx.recv().await {
        if let Some(m) = &metrics {
            m.update_rx();
        }

        match tracker.observe(&update, at) {
            Some(ev) => {
                if events.send(ev).is_err() {
                    warn!(member_id = %update.member.id, "reporter stopped; event not reported");
                }
            }
            None => {
                if update.before.is_some() && update.after.is_none() {
                    if let Some(m) = &metrics {
                        m.untracked_leave();
                    }
                }
            }
        }
    }

    info!(open_sessions = tracker.store().len(), "session tracker stopped");
    tracker
}

async fn run_reporter(mut rx: mpsc::UnboundedReceiver<SessionEvent>, reporter: Arc<ActivityReporter>) {
    while let Some(ev) = rx.recv().await {
        if let Err(e) = reporter.report(&ev).await {
            // Already logged by the reporter; keep processing other members.
            warn!(member_id = %ev.member.id, kind = ev.kind.as_str(), "activity missing from log store: {e}");
        }
    }
}

//! Restart loop around the gateway connection.
//!
//! The connection is re-established forever. Between runs the supervisor waits a back-off
//! delay that doubles per consecutive failure up to a cap (base == cap gives a fixed delay).
//! A run that stays up for `stable_after` resets the failure streak.

use std::future::Future;

use anyhow::Result;
use tokio::time::{sleep, Duration, Instant};
use tracing::{info, warn};
use vl_metrics::SupervisorMetrics;

#[derive(Clone, Debug)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
    pub stable_after: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max: max.max(base), stable_after: Duration::from_secs(60) }
    }

    /// Delay before the next run given the current failure streak.
    pub fn delay(&self, consecutive_failures: u32) -> Duration {
        let exp = consecutive_failures.saturating_sub(1).min(16);
        self.base.saturating_mul(1u32 << exp).min(self.max)
    }
}

pub struct Supervisor {
    backoff: Backoff,
    metrics: Option<SupervisorMetrics>,
}

impl Supervisor {
    pub fn new(backoff: Backoff, metrics: Option<SupervisorMetrics>) -> Self {
        Self { backoff, metrics }
    }

    /// Run `make()` to completion over and over. Never returns.
    pub async fn supervise<F, Fut>(&self, mut make: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut consecutive: u32 = 0;
        let mut runs: u64 = 0;

        loop {
            runs += 1;
            if let Some(m) = &self.metrics {
                m.run_started();
            }
            let started = Instant::now();
            let outcome = make().await;

            if started.elapsed() >= self.backoff.stable_after {
                consecutive = 0;
                if let Some(m) = &self.metrics {
                    m.run_stable();
                }
            }

            match outcome {
                Ok(()) => {
                    info!(runs, "gateway connection closed");
                }
                Err(e) => {
                    consecutive = consecutive.saturating_add(1);
                    if let Some(m) = &self.metrics {
                        m.run_failed(consecutive);
                    }
                    warn!(runs, consecutive_failures = consecutive, "gateway crashed: {:#}", e);
                }
            }

            let delay = self.backoff.delay(consecutive.max(1));
            info!(delay_secs = delay.as_secs(), "restarting gateway connection");
            sleep(delay).await;
        }
    }
}

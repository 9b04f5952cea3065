use metrics::{counter, gauge};

/// Metric names under: {ns}_supervisor_*
pub struct SupervisorMetrics {
    ns: &'static str,
}

impl SupervisorMetrics {
    pub fn new(namespace: &'static str) -> Self {
        Self { ns: namespace }
    }

    #[inline]
    pub fn run_started(&self) {
        counter!(format!("{}_supervisor_runs_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn run_failed(&self, consecutive: u32) {
        counter!(format!("{}_supervisor_failures_total", self.ns)).increment(1);
        gauge!(format!("{}_supervisor_consecutive_failures", self.ns)).set(consecutive as f64);
    }

    #[inline]
    pub fn run_stable(&self) {
        gauge!(format!("{}_supervisor_consecutive_failures", self.ns)).set(0.0);
    }
}

use metrics::{counter, histogram};

/// Metric names under: {ns}_presence_*
pub struct PresenceMetrics {
    ns: &'static str,
}

impl PresenceMetrics {
    pub fn new(namespace: &'static str) -> Self {
        Self { ns: namespace }
    }

    #[inline]
    pub fn update_rx(&self) {
        counter!(format!("{}_presence_updates_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn update_dropped(&self) {
        counter!(format!("{}_presence_updates_dropped_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn untracked_leave(&self) {
        counter!(format!("{}_presence_untracked_leaves_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn event(&self, kind: &'static str) {
        counter!(format!("{}_presence_events_total", self.ns), "kind" => kind).increment(1);
    }

    #[inline]
    pub fn short_stay(&self) {
        counter!(format!("{}_presence_short_stays_total", self.ns)).increment(1);
    }

    #[inline]
    pub fn session_seconds(&self, secs: u64) {
        histogram!(format!("{}_presence_session_seconds", self.ns)).record(secs as f64);
    }

    #[inline]
    pub fn sink_failure(&self, sink: &'static str) {
        counter!(format!("{}_presence_sink_failures_total", self.ns), "sink" => sink).increment(1);
    }
}

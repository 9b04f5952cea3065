use crate::errors::SinkError;

/// Append-only durable record of activity.
#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    /// Append one block in a single write.
    async fn append(&self, block: &str) -> Result<(), SinkError>;
}

/// Outbound chat destination accepting plain text.
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), SinkError>;
}

/// Metrics hook for reporting. Implement with Prometheus at the binary edge.
pub trait ReportMetrics: Send + Sync {
    fn inc_reported(&self, kind: &'static str);
    fn inc_short_stay(&self);
    fn observe_session_seconds(&self, secs: u64);
    fn inc_sink_failure(&self, sink: &'static str);
}

pub struct NoopMetrics;

impl ReportMetrics for NoopMetrics {
    fn inc_reported(&self, _kind: &'static str) {}
    fn inc_short_stay(&self) {}
    fn observe_session_seconds(&self, _secs: u64) {}
    fn inc_sink_failure(&self, _sink: &'static str) {}
}

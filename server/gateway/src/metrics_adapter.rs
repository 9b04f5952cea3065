use std::sync::Arc;

use vl_control::ReportMetrics;
use vl_metrics::PresenceMetrics;

pub fn report_metrics(namespace: &'static str) -> Arc<dyn ReportMetrics> {
    Arc::new(GatewayReportMetrics {
        inner: PresenceMetrics::new(namespace),
    })
}

struct GatewayReportMetrics {
    inner: PresenceMetrics,
}

impl ReportMetrics for GatewayReportMetrics {
    fn inc_reported(&self, kind: &'static str) {
        self.inner.event(kind);
    }
    fn inc_short_stay(&self) {
        self.inner.short_stay();
    }
    fn observe_session_seconds(&self, secs: u64) {
        self.inner.session_seconds(secs);
    }
    fn inc_sink_failure(&self, sink: &'static str) {
        self.inner.sink_failure(sink);
    }
}

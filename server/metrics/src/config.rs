/// Where and under which prefix metrics are exported.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Scrape endpoint bind address, e.g. 0.0.0.0:9100
    pub listen: String,

    /// Prefix for every metric name, e.g. "vl" -> vl_presence_events_total
    pub namespace: &'static str,
}

impl MetricsConfig {
    pub fn new(listen: impl Into<String>, namespace: &'static str) -> Self {
        Self { listen: listen.into(), namespace }
    }
}


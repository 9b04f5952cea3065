pub mod config;
pub mod http;
pub mod presence;
pub mod supervisor;

pub use config::MetricsConfig;
pub use http::MetricsServer;
pub use presence::PresenceMetrics;
pub use supervisor::SupervisorMetrics;

pub mod errors;
pub mod events;
pub mod ids;
pub mod logfile;
pub mod model;
pub mod render;
pub mod reporter;
pub mod sessions;
pub mod sink;
pub mod tracker;

pub use errors::{ReportError, SinkError};
pub use events::{SessionEvent, SessionEventKind, Stay, SHORT_STAY_SECS};
pub use ids::{ChannelId, MemberId};
pub use logfile::FileLogStore;
pub use model::{ChannelRef, MemberRef, PresenceUpdate, Session};
pub use reporter::ActivityReporter;
pub use sessions::SessionStore;
pub use sink::{LogStore, MessageSink, NoopMetrics, ReportMetrics};
pub use tracker::SessionTracker;

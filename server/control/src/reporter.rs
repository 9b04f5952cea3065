//! Dispatch of classified session events to the log file and the message channel.
//!
//! The two sinks are independent:
//! - the log store is the durable record; its failures are returned to the caller.
//! - the message channel is best effort; its failures are logged and swallowed.
//!
//! Both calls run concurrently so a slow channel never delays the file append.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    errors::ReportError,
    events::{SessionEvent, Stay},
    render,
    sink::{LogStore, MessageSink, NoopMetrics, ReportMetrics},
};

pub struct ActivityReporter {
    store: Arc<dyn LogStore>,
    messages: Option<Arc<dyn MessageSink>>,
    metrics: Arc<dyn ReportMetrics>,
}

impl ActivityReporter {
    pub fn new(store: Arc<dyn LogStore>, messages: Option<Arc<dyn MessageSink>>) -> Self {
        Self { store, messages, metrics: Arc::new(NoopMetrics) }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn ReportMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn report(&self, ev: &SessionEvent) -> Result<(), ReportError> {
        let summary = render::summary_line(ev);
        let block = render::log_block(ev, &summary);
        self.trace(ev, &summary);

        let (stored, _) = tokio::join!(self.store.append(&block), self.send(&summary));

        if let Err(e) = stored {
            self.metrics.inc_sink_failure("log_store");
            error!(
                member_id = %ev.member.id,
                member = %ev.member.display_name,
                kind = ev.kind.as_str(),
                error = %e,
                "failed to append activity to log store"
            );
            return Err(ReportError::LogStore(e));
        }
        Ok(())
    }

    /// Send a free-form notice to the message channel only.
    pub async fn announce(&self, text: &str) {
        self.send(text).await;
    }

    async fn send(&self, text: &str) {
        let Some(sink) = &self.messages else {
            return;
        };
        if let Err(e) = sink.send(text).await {
            self.metrics.inc_sink_failure("message");
            warn!(error = %e, text, "could not send activity message");
        }
    }

    fn trace(&self, ev: &SessionEvent, summary: &str) {
        self.metrics.inc_reported(ev.kind.as_str());
        if let Some(secs) = ev.duration_secs {
            self.metrics.observe_session_seconds(secs);
        }

        let from = ev.from.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        let to = ev.to.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        match ev.stay() {
            Some(Stay::Short) => {
                self.metrics.inc_short_stay();
                warn!(
                    kind = ev.kind.as_str(),
                    member_id = %ev.member.id,
                    member = %ev.member.display_name,
                    from,
                    to,
                    duration_secs = ev.duration_secs,
                    stay = "short",
                    "{summary}"
                );
            }
            stay => info!(
                kind = ev.kind.as_str(),
                member_id = %ev.member.id,
                member = %ev.member.display_name,
                from,
                to,
                duration_secs = ev.duration_secs,
                stay = stay.map(Stay::as_str),
                "{summary}"
            ),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{MemoryChannel, MemoryStore};
    use super::*;
    use crate::{
        errors::SinkError,
        model::{ChannelRef, MemberRef, PresenceUpdate},
        tracker::SessionTracker,
    };
    use chrono::{TimeZone, Utc};

    fn leave_event() -> SessionEvent {
        let mut tracker = SessionTracker::new();
        let member = MemberRef::new(1, "U1");
        let general = ChannelRef::new(100, "General");
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 1, 30).unwrap();
        tracker.observe(&PresenceUpdate::new(member.clone(), None, Some(general.clone())), t0);
        tracker
            .observe(&PresenceUpdate::new(member, Some(general), None), t1)
            .unwrap()
    }

    #[tokio::test]
    async fn both_sinks_receive_the_summary() {
        let store = Arc::new(MemoryStore::default());
        let channel = Arc::new(MemoryChannel::default());
        let reporter = ActivityReporter::new(store.clone(), Some(channel.clone() as Arc<dyn MessageSink>));

        reporter.report(&leave_event()).await.unwrap();

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("U1 left General after only 1m 30s"));
        let blocks = store.blocks.lock().unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains(&sent[0]));
        assert!(blocks[0].contains("Duration: 90 seconds"));
    }

    #[tokio::test]
    async fn message_failure_does_not_block_log_store() {
        let store = Arc::new(MemoryStore::default());
        let channel = Arc::new(MemoryChannel { fail: true, ..Default::default() });
        let reporter = ActivityReporter::new(store.clone(), Some(channel as Arc<dyn MessageSink>));

        assert!(reporter.report(&leave_event()).await.is_ok());
        assert_eq!(store.blocks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn log_store_failure_is_returned_but_message_still_sent() {
        let store = Arc::new(MemoryStore { fail: true, ..Default::default() });
        let channel = Arc::new(MemoryChannel::default());
        let reporter = ActivityReporter::new(store, Some(channel.clone() as Arc<dyn MessageSink>));

        let err = reporter.report(&leave_event()).await.unwrap_err();
        assert!(matches!(err, ReportError::LogStore(SinkError::Io(_))));
        assert_eq!(channel.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn file_only_mode_without_message_sink() {
        let store = Arc::new(MemoryStore::default());
        let reporter = ActivityReporter::new(store.clone(), None);

        reporter.report(&leave_event()).await.unwrap();
        reporter.announce("online").await;
        assert_eq!(store.blocks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn announce_goes_to_channel_only() {
        let store = Arc::new(MemoryStore::default());
        let channel = Arc::new(MemoryChannel::default());
        let reporter = ActivityReporter::new(store.clone(), Some(channel.clone() as Arc<dyn MessageSink>));

        reporter.announce("online").await;
        assert_eq!(*channel.sent.lock().unwrap(), vec!["online".to_string()]);
        assert!(store.blocks.lock().unwrap().is_empty());
    }
}

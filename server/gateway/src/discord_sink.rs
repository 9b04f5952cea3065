use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::debug;

use vl_control::{MessageSink, SinkError};

/// Posts activity lines to one chat channel.
///
/// Starts enabled; the ready handler disables it when the channel cannot be resolved,
/// which degrades reporting to file-only without surfacing errors per event.
pub struct DiscordChannelSink {
    http: Arc<Http>,
    channel: ChannelId,
    enabled: AtomicBool,
}

impl DiscordChannelSink {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel: ChannelId::new(channel_id),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl MessageSink for DiscordChannelSink {
    async fn send(&self, text: &str) -> Result<(), SinkError> {
        if !self.is_enabled() {
            debug!(channel_id = %self.channel, "log channel unavailable; message skipped");
            return Ok(());
        }

        self.channel
            .say(self.http.as_ref(), text)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                serenity::Error::Http(h) => SinkError::Rejected(h.to_string()),
                other => SinkError::Unavailable(other.to_string()),
            })
    }
}

use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId as DiscordChannelId;
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vl_control::{ActivityReporter, ChannelRef, MemberRef, PresenceUpdate};
use vl_metrics::PresenceMetrics;

use crate::discord_sink::DiscordChannelSink;
use crate::pipeline::Observed;

pub const STARTUP_NOTICE: &str = "Voice activity logger is online and ready.";

/// Gateway event handler. Cheap to clone; one copy per connection attempt.
#[derive(Clone)]
pub struct Handler {
    updates: mpsc::Sender<Observed>,
    reporter: Arc<ActivityReporter>,
    destination: Option<Arc<DiscordChannelSink>>,
    metrics: Option<Arc<PresenceMetrics>>,
}

impl Handler {
    pub fn new(
        updates: mpsc::Sender<Observed>,
        reporter: Arc<ActivityReporter>,
        destination: Option<Arc<DiscordChannelSink>>,
        metrics: Option<Arc<PresenceMetrics>>,
    ) -> Self {
        Self { updates, reporter, destination, metrics }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, user_id = %ready.user.id, "connected to gateway");

        let Some(dest) = &self.destination else {
            info!("no log channel configured; logging to file only");
            return;
        };

        match dest.channel().to_channel(&ctx).await {
            Ok(_) => {
                dest.set_enabled(true);
                info!(channel_id = %dest.channel(), "logging to channel");
                self.reporter.announce(STARTUP_NOTICE).await;
            }
            Err(e) => {
                dest.set_enabled(false);
                warn!(
                    channel_id = %dest.channel(),
                    error = %e,
                    "could not find log channel; check LOG_CHANNEL_ID or permissions. logging to file only"
                );
            }
        }
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        // Stamp before anything else; durations are measured from this instant.
        let at = Utc::now();
        let before = old.as_ref().and_then(|s| s.channel_id).map(|c| c.get());
        let after = new.channel_id.map(|c| c.get());
        debug!(user_id = %new.user_id, ?before, ?after, "voice state update");

        let display_name = new.member.as_ref().map(|m| m.display_name().to_string());
        let guild_id = new.guild_id.or_else(|| old.as_ref().and_then(|s| s.guild_id));

        let observed = presence_update(at, new.user_id.get(), display_name, before, after, |id| {
            let guild = ctx.cache.guild(guild_id?)?;
            guild.channels.get(&DiscordChannelId::new(id)).map(|c| c.name.clone())
        });
        let Some(observed) = observed else {
            return;
        };

        if self.updates.send(observed).await.is_err() {
            if let Some(m) = &self.metrics {
                m.update_dropped();
            }
            warn!(user_id = %new.user_id, "session tracker stopped; presence update dropped");
        }
    }
}

/// Map one voice-state change to a queued update stamped at `at`.
///
/// Returns `None` when the channel did not change (mute toggles, resume replays).
/// `channel_name` must not block; unresolved names fall back to the numeric id.
fn presence_update(
    at: DateTime<Utc>,
    user_id: u64,
    display_name: Option<String>,
    before: Option<u64>,
    after: Option<u64>,
    channel_name: impl Fn(u64) -> Option<String>,
) -> Option<Observed> {
    if before == after {
        return None;
    }

    let channel = |id: u64| {
        let name = channel_name(id).unwrap_or_else(|| {
            debug!(channel_id = id, "channel not cached; using id as name");
            id.to_string()
        });
        ChannelRef::new(id, name)
    };

    let member = MemberRef::new(user_id, display_name.unwrap_or_else(|| user_id.to_string()));
    Some(Observed {
        update: PresenceUpdate::new(member, before.map(&channel), after.map(&channel)),
        at,
    })
}

/// Connect and process gateway events until the connection ends.
pub async fn run(token: String, handler: Handler) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .context("build gateway client")?;

    client.start().await.context("gateway connection")?;
    Ok(())
}

//! Text rendering for session events.
//!
//! One summary line is produced per event; the same line goes to the log file and the
//! message channel. The file additionally gets a detail block when a duration is known.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::{
    events::{SessionEvent, SessionEventKind, Stay},
    model::ChannelRef,
};

const CLOCK_FMT: &str = "%H:%M:%S";
const STAMP_FMT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// `"{minutes}m {seconds}s"`
pub fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

pub fn summary_line(ev: &SessionEvent) -> String {
    let who = &ev.member.display_name;
    let from = channel_name(ev.from.as_ref());
    let to = channel_name(ev.to.as_ref());

    match (ev.kind, ev.duration_secs) {
        (SessionEventKind::Join, _) => {
            let at = ev.joined_at.unwrap_or(ev.at);
            format!("{who} joined {to} at {}", at.format(CLOCK_FMT))
        }
        (SessionEventKind::Leave, Some(secs)) => match Stay::classify(secs) {
            Stay::Short => format!("{who} left {from} after only {}!", format_duration(secs)),
            Stay::Normal => format!("{who} left {from} — stayed for {}", format_duration(secs)),
        },
        (SessionEventKind::Leave, None) => format!("{who} left {from}"),
        (SessionEventKind::Switch, Some(secs)) => match Stay::classify(secs) {
            Stay::Short => format!(
                "{who} switched from {from} → {to} after only {}!",
                format_duration(secs)
            ),
            Stay::Normal => format!("{who} moved from {from} → {to} (stayed {})", format_duration(secs)),
        },
        (SessionEventKind::Switch, None) => format!("{who} moved from {from} → {to}"),
    }
}

/// Block appended to the log file for one event.
pub fn log_block(ev: &SessionEvent, summary: &str) -> String {
    let mut out = format!("[{}] {summary}\n", ev.at.format(STAMP_FMT));

    let (Some(secs), Some(joined), Some(left)) = (ev.duration_secs, ev.joined_at, ev.left_at) else {
        return out;
    };

    let _ = writeln!(out, "  - User: {}", ev.member.display_name);
    match ev.kind {
        SessionEventKind::Switch => {
            let _ = writeln!(out, "  - From: {}", channel_name(ev.from.as_ref()));
            let _ = writeln!(out, "  - To: {}", channel_name(ev.to.as_ref()));
        }
        _ => {
            let _ = writeln!(out, "  - Channel: {}", channel_name(ev.from.as_ref()));
        }
    }
    let _ = writeln!(out, "  - Joined: {}", utc_clock(joined));
    let _ = writeln!(out, "  - Left: {}", utc_clock(left));
    let _ = writeln!(out, "  - Duration: {secs} seconds");
    out.push('\n');
    out
}

fn utc_clock(at: DateTime<Utc>) -> String {
    format!("{} UTC", at.format(CLOCK_FMT))
}

fn channel_name(ch: Option<&ChannelRef>) -> &str {
    ch.map(|c| c.name.as_str()).unwrap_or("unknown channel")
}

use clap::Parser;
use std::{path::PathBuf, time::Duration};

#[derive(Parser, Debug, Clone)]
#[command(name = "voicelog", about = "Voice channel activity logger")]
pub struct Config {
    /// Bot token used to connect to the chat gateway
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    pub token: String,

    /// Channel that receives one message per activity line (optional; file-only when unset)
    #[arg(long, env = "LOG_CHANNEL_ID")]
    pub log_channel_id: Option<u64>,

    /// Append-only activity log; parent directories are created on first write
    #[arg(long, env = "LOG_FILE", default_value = "voice_log.txt")]
    pub log_file: PathBuf,

    /// Delay before reconnecting after the gateway connection ends
    #[arg(long, default_value_t = 10)]
    pub restart_delay_secs: u64,

    /// Upper bound for the reconnect delay; equal to restart_delay_secs means a fixed delay
    #[arg(long, default_value_t = 10)]
    pub max_restart_delay_secs: u64,

    /// Buffered presence updates between the gateway handler and the tracker
    #[arg(long, default_value_t = 1024)]
    pub queue_depth: usize,

    /// Prometheus scrape address, e.g. 0.0.0.0:9100 (disabled when unset)
    #[arg(long, env = "METRICS_LISTEN")]
    pub metrics_listen: Option<String>,
}

impl Config {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    pub fn max_restart_delay(&self) -> Duration {
        Duration::from_secs(self.max_restart_delay_secs.max(self.restart_delay_secs))
    }
}

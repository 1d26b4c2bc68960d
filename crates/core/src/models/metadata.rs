use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL_NAME: &str = "general";

/// Per-guild bookkeeping row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub guild_id: String,
    /// `None` until the first rollover.
    pub last_week_reset: Option<DateTime<Utc>>,
    pub channel_name: String,
}

impl Metadata {
    pub fn new(guild_id: &str, channel_name: &str) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            last_week_reset: None,
            channel_name: channel_name.to_string(),
        }
    }
}

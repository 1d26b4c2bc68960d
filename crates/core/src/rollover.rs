//! Weekly summary and reset of the current-week window.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::RollcallResult;
use crate::models::{Attendance, Metadata};
use crate::ports::{ChatPlatform, RecordStore};
use crate::provision::GuildProvisioner;
use crate::render::{EventTally, render_summary};
use crate::timing::{SchedulePolicy, week_window_start};

pub struct RolloverScheduler {
    store: Arc<dyn RecordStore>,
    platform: Arc<dyn ChatPlatform>,
    provisioner: Arc<GuildProvisioner>,
    policy: SchedulePolicy,
}

impl RolloverScheduler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        platform: Arc<dyn ChatPlatform>,
        provisioner: Arc<GuildProvisioner>,
        policy: SchedulePolicy,
    ) -> Self {
        Self {
            store,
            platform,
            provisioner,
            policy,
        }
    }

    /// Rolls the week over if it is Monday and a week has passed since the
    /// last reset.
    pub async fn maybe_rollover(&self, guild_id: &str, now: DateTime<Utc>) -> RollcallResult<bool> {
        let metadata = self.provisioner.ensure_metadata(guild_id).await?;
        if !self.policy.rollover_due(now, metadata.last_week_reset) {
            return Ok(false);
        }
        self.rollover(&metadata, now).await
    }

    /// Rolls the week over regardless of weekday and elapsed time.
    pub async fn force_rollover(&self, guild_id: &str, now: DateTime<Utc>) -> RollcallResult<bool> {
        let metadata = self.provisioner.ensure_metadata(guild_id).await?;
        self.rollover(&metadata, now).await
    }

    /// Sends the summary, then advances `last_week_reset`.
    ///
    /// A crash between the two repeats the summary on the next tick. The
    /// reset itself is one conditional write; losing it to a concurrent
    /// rollover reports `false`.
    async fn rollover(&self, metadata: &Metadata, now: DateTime<Utc>) -> RollcallResult<bool> {
        let guild_id = metadata.guild_id.as_str();
        let window_start = week_window_start(now, metadata.last_week_reset);

        let events = self.store.list_events(guild_id).await?;
        let users = self.store.list_users(guild_id).await?;
        let names: HashMap<Uuid, &str> = users
            .iter()
            .map(|user| (user.id, user.display_name.as_str()))
            .collect();

        let tallies: Vec<EventTally> = events
            .iter()
            .filter(|event| event.start_time >= window_start && event.start_time < now)
            .map(|event| EventTally {
                name: event.name.clone(),
                start_time: event.start_time,
                yes_names: event
                    .answers
                    .iter()
                    .filter(|answer| answer.yes_no == Attendance::Yes)
                    .filter_map(|answer| names.get(&answer.user_id).map(|name| name.to_string()))
                    .collect(),
            })
            .collect();

        let eligible = self
            .platform
            .list_members(guild_id)
            .await?
            .iter()
            .filter(|member| !member.bot)
            .count();

        let channel = self
            .provisioner
            .ensure_channel(guild_id, &metadata.channel_name)
            .await?;
        let summary = render_summary(&tallies, eligible, window_start, now, &self.policy.timezone);
        self.platform.send_message(&channel.id, &summary).await?;

        let advanced = self
            .store
            .update_last_week_reset(guild_id, metadata.last_week_reset, now)
            .await?;
        if advanced {
            info!(guild = %guild_id, events = tallies.len(), "rolled over week");
        } else {
            warn!(guild = %guild_id, "week was rolled over concurrently");
        }
        Ok(advanced)
    }
}

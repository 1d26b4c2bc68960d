//! Announces recurring events when their day comes.
//!
//! `ensure_recurring_events` is safe to call on every tick: each template is
//! checked against today's date, the announcement window and the events
//! already posted, and only a missing instance is created.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::errors::RollcallResult;
use crate::models::{Attendance, Event, EventDraft, FixedTrainingTime, Metadata};
use crate::ports::{ChatPlatform, RecordStore};
use crate::provision::GuildProvisioner;
use crate::render::render_event;
use crate::timing::SchedulePolicy;

pub struct LifecycleManager {
    store: Arc<dyn RecordStore>,
    platform: Arc<dyn ChatPlatform>,
    provisioner: Arc<GuildProvisioner>,
    templates: Vec<FixedTrainingTime>,
    policy: SchedulePolicy,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn RecordStore>,
        platform: Arc<dyn ChatPlatform>,
        provisioner: Arc<GuildProvisioner>,
        templates: Vec<FixedTrainingTime>,
        policy: SchedulePolicy,
    ) -> Self {
        Self {
            store,
            platform,
            provisioner,
            templates,
            policy,
        }
    }

    pub fn templates(&self) -> &[FixedTrainingTime] {
        &self.templates
    }

    /// Creates today's missing template instances for one guild.
    ///
    /// A failing template is logged and skipped; the next tick retries it.
    pub async fn ensure_recurring_events(
        &self,
        guild_id: &str,
        now: DateTime<Utc>,
    ) -> RollcallResult<Vec<Event>> {
        let metadata = self.provisioner.ensure_metadata(guild_id).await?;
        let mut created = Vec::new();

        for template in &self.templates {
            match self.ensure_template_event(&metadata, template, now).await {
                Ok(Some(event)) => created.push(event),
                Ok(None) => {}
                Err(e) => warn!(
                    guild = %guild_id,
                    template = %template.name,
                    "Failed to ensure recurring event: {}",
                    e
                ),
            }
        }

        Ok(created)
    }

    async fn ensure_template_event(
        &self,
        metadata: &Metadata,
        template: &FixedTrainingTime,
        now: DateTime<Utc>,
    ) -> RollcallResult<Option<Event>> {
        let Some((start_time, end_time)) = self.policy.todays_window(template, now) else {
            return Ok(None);
        };

        if start_time < now {
            debug!(template = %template.name, "start already passed, not back-creating");
            return Ok(None);
        }

        if self.policy.is_too_early(now, start_time) {
            debug!(template = %template.name, %start_time, "too early to announce");
            return Ok(None);
        }

        let events = self.store.list_events(&metadata.guild_id).await?;
        if events
            .iter()
            .any(|event| self.policy.is_same_slot(event, template, start_time))
        {
            debug!(template = %template.name, "already announced");
            return Ok(None);
        }

        let draft = EventDraft {
            name: template.name.clone(),
            description: template.description.clone(),
            location: template.location.clone(),
            start_time,
            end_time,
        };
        self.create_event(metadata, draft).await.map(Some)
    }

    /// Posts an announcement for `draft` and starts tracking it.
    ///
    /// The event row is persisted right after the message is sent, before the
    /// reaction affordances go up, so early reactions already find it.
    pub async fn create_event(&self, metadata: &Metadata, draft: EventDraft) -> RollcallResult<Event> {
        let guild_id = metadata.guild_id.as_str();
        let channel = self
            .provisioner
            .ensure_channel(guild_id, &metadata.channel_name)
            .await?;

        let preview = draft.clone().into_event(guild_id, &channel.id, "");
        let body = render_event(&preview, &[], &[], &self.policy.timezone);
        let message = self.platform.send_message(&channel.id, &body).await?;

        let event = draft.into_event(guild_id, &message.channel_id, &message.message_id);
        let event = self.store.create_event(&event).await?;
        info!(
            guild = %guild_id,
            event = %event.name,
            start = %event.start_time,
            message_id = %event.message_id,
            "announced event"
        );

        for yes_no in Attendance::ALL {
            if let Err(e) = self.platform.add_reaction(&message, yes_no.symbol()).await {
                warn!("Failed to add {} affordance to {}: {}", yes_no, message.message_id, e);
            }
        }

        Ok(event)
    }
}

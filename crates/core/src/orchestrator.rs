//! Wires the scheduling components to inbound platform events and the
//! periodic timer.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::attendance::AttendanceReconciler;
use crate::commands::{Command, ad_hoc_draft};
use crate::errors::RollcallResult;
use crate::lifecycle::LifecycleManager;
use crate::locks::KeyedLocks;
use crate::models::{FixedTrainingTime, IncomingMessage, ReactionAdded, ReactionSymbol};
use crate::ports::{ChatPlatform, RecordStore};
use crate::provision::GuildProvisioner;
use crate::rollover::RolloverScheduler;
use crate::timing::{SchedulePolicy, week_window_start};

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct Settings {
    pub templates: Vec<FixedTrainingTime>,
    pub policy: SchedulePolicy,
    pub default_channel: String,
    pub command_prefix: String,
}

pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    platform: Arc<dyn ChatPlatform>,
    provisioner: Arc<GuildProvisioner>,
    lifecycle: LifecycleManager,
    rollover: RolloverScheduler,
    attendance: AttendanceReconciler,
    policy: SchedulePolicy,
    command_prefix: String,
    guild_locks: KeyedLocks,
    /// The bot's own platform user id, known once the gateway is ready.
    bot_user_id: OnceLock<String>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn RecordStore>, platform: Arc<dyn ChatPlatform>, settings: Settings) -> Self {
        let provisioner = Arc::new(GuildProvisioner::new(
            store.clone(),
            platform.clone(),
            settings.default_channel,
        ));
        let lifecycle = LifecycleManager::new(
            store.clone(),
            platform.clone(),
            provisioner.clone(),
            settings.templates,
            settings.policy.clone(),
        );
        let rollover = RolloverScheduler::new(
            store.clone(),
            platform.clone(),
            provisioner.clone(),
            settings.policy.clone(),
        );
        let attendance = AttendanceReconciler::new(store.clone(), platform.clone(), settings.policy.timezone);

        Self {
            store,
            platform,
            provisioner,
            lifecycle,
            rollover,
            attendance,
            policy: settings.policy,
            command_prefix: settings.command_prefix,
            guild_locks: KeyedLocks::new(),
            bot_user_id: OnceLock::new(),
        }
    }

    pub fn bot_user_id(&self) -> Option<&str> {
        self.bot_user_id.get().map(String::as_str)
    }

    /// Startup reconciliation for every visible guild: metadata row,
    /// announcement channel, and reactions missed while offline.
    pub async fn on_ready(&self, bot_user_id: &str, guild_ids: &[String], now: DateTime<Utc>) {
        if self.bot_user_id.set(bot_user_id.to_string()).is_err() {
            debug!("bot identity already known, keeping the first one");
        }

        for guild_id in guild_ids {
            if let Err(e) = self.reconcile_guild(guild_id, now).await {
                error!("Failed to reconcile guild {}: {}", guild_id, e);
            }
        }
        info!(guilds = guild_ids.len(), "startup reconciliation finished");
    }

    /// A guild became visible after startup, typically because the bot was
    /// invited. Gets the same treatment as a guild seen at ready.
    pub async fn on_guild_available(&self, guild_id: &str, now: DateTime<Utc>) {
        match self.reconcile_guild(guild_id, now).await {
            Ok(()) => info!(guild = %guild_id, "guild available"),
            Err(e) => error!("Failed to reconcile guild {}: {}", guild_id, e),
        }
    }

    async fn reconcile_guild(&self, guild_id: &str, now: DateTime<Utc>) -> RollcallResult<()> {
        let metadata = {
            let _guard = self.guild_locks.lock(guild_id).await;
            self.provisioner.provision(guild_id).await?.0
        };

        // without a known identity the bot's own affordances would be
        // swept as answers; ready sweeps again once it is known
        let Some(bot_user_id) = self.bot_user_id() else {
            debug!(guild = %guild_id, "bot identity unknown, skipping reaction sweep");
            return Ok(());
        };

        let window_start = week_window_start(now, metadata.last_week_reset);
        let events = self.store.list_events(guild_id).await?;
        for event in events.iter().filter(|event| event.start_time >= window_start) {
            if let Err(e) = self.attendance.sweep_reactions(event, bot_user_id, now).await {
                warn!("Failed to sweep reactions on {}: {}", event.message_id, e);
            }
        }
        Ok(())
    }

    /// One lifecycle and rollover pass over every known guild.
    pub async fn tick(&self, now: DateTime<Utc>) {
        let guilds = match self.store.list_metadata().await {
            Ok(guilds) => guilds,
            Err(e) => {
                error!("Failed to list guilds: {}", e);
                return;
            }
        };
        for metadata in guilds {
            if let Err(e) = self.check_guild(&metadata.guild_id, now).await {
                error!("Scheduled check of guild {} failed: {}", metadata.guild_id, e);
            }
        }
    }

    /// Runs the lifecycle manager, then the rollover check, for one guild.
    /// Returns whether the week was rolled over.
    pub async fn check_guild(&self, guild_id: &str, now: DateTime<Utc>) -> RollcallResult<bool> {
        let _guard = self.guild_locks.lock(guild_id).await;
        if let Err(e) = self.lifecycle.ensure_recurring_events(guild_id, now).await {
            warn!("Failed to ensure events of guild {}: {}", guild_id, e);
        }
        self.rollover.maybe_rollover(guild_id, now).await
    }

    /// Ticks forever. Each pass completes before the next one starts.
    pub async fn run_ticks(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?period, "starting scheduler loop");
        loop {
            interval.tick().await;
            self.tick(Utc::now()).await;
        }
    }

    pub async fn on_message(&self, message: &IncomingMessage, now: DateTime<Utc>) {
        if message.author_is_bot || Some(message.author_id.as_str()) == self.bot_user_id() {
            return;
        }
        let Some(command) = Command::parse(&message.content, &self.command_prefix) else {
            return;
        };

        if let Err(e) = self.run_command(&command, message, now).await {
            // never echoed to chat
            error!(?command, "Command failed: {}", e);
        }
    }

    async fn run_command(
        &self,
        command: &Command,
        message: &IncomingMessage,
        now: DateTime<Utc>,
    ) -> RollcallResult<()> {
        match command {
            Command::Ping => {
                self.platform.send_message(&message.channel_id, "Pong!").await?;
                return Ok(());
            }
            Command::Pong => {
                self.platform.send_message(&message.channel_id, "Ping!").await?;
                return Ok(());
            }
            _ => {}
        }

        let Some(guild_id) = message.guild_id.as_deref() else {
            debug!(?command, "ignoring guild command outside a guild");
            return Ok(());
        };
        if command.requires_admin() && !self.platform.is_admin(guild_id, &message.author_id).await? {
            debug!(?command, author = %message.author_id, "ignoring command from non-admin");
            return Ok(());
        }

        let _guard = self.guild_locks.lock(guild_id).await;
        match command {
            Command::Event(args) => {
                let draft = ad_hoc_draft(args, now, &self.policy)?;
                let metadata = self.provisioner.ensure_metadata(guild_id).await?;
                self.lifecycle.create_event(&metadata, draft).await?;
            }
            Command::Check => {
                if let Err(e) = self.lifecycle.ensure_recurring_events(guild_id, now).await {
                    warn!("Failed to ensure events of guild {}: {}", guild_id, e);
                }
                self.rollover.maybe_rollover(guild_id, now).await?;
            }
            Command::ResetWeek => {
                self.rollover.force_rollover(guild_id, now).await?;
            }
            Command::Ping | Command::Pong => {}
        }
        Ok(())
    }

    pub async fn on_reaction_added(&self, reaction: &ReactionAdded, now: DateTime<Utc>) {
        if reaction.user_is_bot || Some(reaction.user_id.as_str()) == self.bot_user_id() {
            return;
        }

        if ReactionSymbol::parse(&reaction.symbol) == ReactionSymbol::Unrecognized {
            self.strip_reaction(reaction).await;
            return;
        }

        if let Err(e) = self.attendance.record_answer(reaction, now).await {
            error!(
                message_id = %reaction.message_id,
                user = %reaction.user_id,
                "Failed to record answer: {}",
                e
            );
        }
    }

    /// Removes a reaction without attendance meaning from a tracked event.
    async fn strip_reaction(&self, reaction: &ReactionAdded) {
        match self.store.find_event(&reaction.guild_id, &reaction.message_id).await {
            Ok(Some(event)) => {
                if let Err(e) = self
                    .platform
                    .remove_user_reaction(&event.message(), &reaction.symbol, &reaction.user_id)
                    .await
                {
                    warn!("Failed to strip reaction on {}: {}", event.message_id, e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to look up event {}: {}", reaction.message_id, e),
        }
    }
}

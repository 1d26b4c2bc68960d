use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use rollcall_core::models::{IncomingMessage, ReactionAdded};
use rollcall_core::orchestrator::Orchestrator;
use serenity::{
    async_trait,
    model::{
        channel::{Message, Reaction},
        event::ResumedEvent,
        gateway::Ready,
        guild::Guild,
    },
    prelude::*,
};
use tracing::{debug, info};

use crate::platform::reaction_symbol;

/// Translates gateway events into orchestrator calls.
///
/// The periodic scheduler is started on the first ready event and keeps
/// running across reconnects.
pub struct Handler {
    orchestrator: Arc<Orchestrator>,
    tick_period: Duration,
    is_loop_running: AtomicBool,
}

impl Handler {
    pub fn new(orchestrator: Arc<Orchestrator>, tick_period: Duration) -> Self {
        Self {
            orchestrator,
            tick_period,
            is_loop_running: AtomicBool::new(false),
        }
    }
}

pub(crate) fn incoming_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        author_id: msg.author.id.to_string(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
        channel_id: msg.channel_id.to_string(),
        guild_id: msg.guild_id.map(|id| id.to_string()),
    }
}

/// Direct-message reactions and reactions without a known user are dropped.
pub(crate) fn reaction_added(reaction: &Reaction) -> Option<ReactionAdded> {
    Some(ReactionAdded {
        guild_id: reaction.guild_id?.to_string(),
        channel_id: reaction.channel_id.to_string(),
        message_id: reaction.message_id.to_string(),
        user_id: reaction.user_id?.to_string(),
        user_is_bot: reaction
            .member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .map_or(false, |user| user.bot),
        symbol: reaction_symbol(&reaction.emoji),
    })
}

#[async_trait]
impl EventHandler for Handler {
    /// Handle ready events (when bot connects to Discord)
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let guild_ids: Vec<String> = ready.guilds.iter().map(|guild| guild.id.to_string()).collect();
        self.orchestrator
            .on_ready(&ready.user.id.to_string(), &guild_ids, Utc::now())
            .await;

        if self
            .is_loop_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            tokio::spawn(self.orchestrator.clone().run_ticks(self.tick_period));
        }
    }

    /// Fires for every guild after ready and again whenever the bot joins one.
    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: bool) {
        debug!(guild = %guild.id, is_new, "guild available");
        self.orchestrator
            .on_guild_available(&guild.id.to_string(), Utc::now())
            .await;
    }

    async fn resume(&self, _ctx: Context, resume: ResumedEvent) {
        debug!("Resumed; trace: {:?}", resume.trace);
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        self.orchestrator
            .on_message(&incoming_message(&msg), Utc::now())
            .await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        match reaction_added(&reaction) {
            Some(added) => self.orchestrator.on_reaction_added(&added, Utc::now()).await,
            None => debug!(message_id = %reaction.message_id, "ignoring reaction outside a guild"),
        }
    }
}

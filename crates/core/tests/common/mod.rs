#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rollcall_core::errors::{RollcallError, RollcallResult};
use rollcall_core::memory::MemoryStore;
use rollcall_core::models::{Channel, FixedTrainingTime, Member, MessageRef, UserProfile};
use rollcall_core::orchestrator::{Orchestrator, Settings};
use rollcall_core::ports::ChatPlatform;
use rollcall_core::timing::SchedulePolicy;

#[derive(Debug, Default)]
struct Recorded {
    next_id: u64,
    channels: HashMap<String, Vec<Channel>>,
    sent: Vec<(String, String)>,
    bodies: HashMap<String, String>,
    added_reactions: Vec<(String, String)>,
    removed_reactions: Vec<(String, String, String)>,
    reaction_users: HashMap<(String, String), Vec<String>>,
    names: HashMap<String, String>,
    members: Vec<Member>,
    admins: HashSet<String>,
    failing_users: HashSet<String>,
}

/// Chat platform double that records every outbound call.
#[derive(Debug, Default)]
pub struct FakePlatform {
    state: Mutex<Recorded>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.lock().unwrap()
    }

    pub fn with_channel(self, guild_id: &str, id: &str, name: &str) -> Self {
        self.state().channels.entry(guild_id.to_string()).or_default().push(Channel {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_member(self, id: &str, display_name: &str, bot: bool) -> Self {
        {
            let mut state = self.state();
            state.names.insert(id.to_string(), display_name.to_string());
            state.members.push(Member {
                id: id.to_string(),
                display_name: display_name.to_string(),
                bot,
            });
        }
        self
    }

    pub fn with_admin(self, id: &str) -> Self {
        self.state().admins.insert(id.to_string());
        self
    }

    pub fn rename(&self, id: &str, display_name: &str) {
        self.state().names.insert(id.to_string(), display_name.to_string());
    }

    pub fn fail_user_lookup(&self, id: &str) {
        self.state().failing_users.insert(id.to_string());
    }

    pub fn set_reaction_users(&self, message_id: &str, symbol: &str, users: &[&str]) {
        self.state().reaction_users.insert(
            (message_id.to_string(), symbol.to_string()),
            users.iter().map(|u| u.to_string()).collect(),
        );
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.state().sent.clone()
    }

    pub fn body(&self, message_id: &str) -> Option<String> {
        self.state().bodies.get(message_id).cloned()
    }

    pub fn added_reactions(&self) -> Vec<(String, String)> {
        self.state().added_reactions.clone()
    }

    pub fn removed_reactions(&self) -> Vec<(String, String, String)> {
        self.state().removed_reactions.clone()
    }

    pub fn channels(&self, guild_id: &str) -> Vec<Channel> {
        self.state().channels.get(guild_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn send_message(&self, channel_id: &str, text: &str) -> RollcallResult<MessageRef> {
        let mut state = self.state();
        state.next_id += 1;
        let message_id = format!("msg-{}", state.next_id);
        state.sent.push((channel_id.to_string(), text.to_string()));
        state.bodies.insert(message_id.clone(), text.to_string());
        Ok(MessageRef {
            channel_id: channel_id.to_string(),
            message_id,
        })
    }

    async fn edit_message(&self, message: &MessageRef, text: &str) -> RollcallResult<()> {
        self.state()
            .bodies
            .insert(message.message_id.clone(), text.to_string());
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageRef, symbol: &str) -> RollcallResult<()> {
        self.state()
            .added_reactions
            .push((message.message_id.clone(), symbol.to_string()));
        Ok(())
    }

    async fn list_reaction_users(&self, message: &MessageRef, symbol: &str) -> RollcallResult<Vec<String>> {
        Ok(self
            .state()
            .reaction_users
            .get(&(message.message_id.clone(), symbol.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_user_reaction(&self, message: &MessageRef, symbol: &str, user_id: &str) -> RollcallResult<()> {
        self.state().removed_reactions.push((
            message.message_id.clone(),
            symbol.to_string(),
            user_id.to_string(),
        ));
        Ok(())
    }

    async fn list_channels(&self, guild_id: &str) -> RollcallResult<Vec<Channel>> {
        Ok(self.channels(guild_id))
    }

    async fn create_channel(&self, guild_id: &str, name: &str) -> RollcallResult<Channel> {
        let mut state = self.state();
        state.next_id += 1;
        let channel = Channel {
            id: format!("chan-{}", state.next_id),
            name: name.to_string(),
        };
        state
            .channels
            .entry(guild_id.to_string())
            .or_default()
            .push(channel.clone());
        Ok(channel)
    }

    async fn resolve_user(&self, _guild_id: &str, user_id: &str) -> RollcallResult<UserProfile> {
        let state = self.state();
        if state.failing_users.contains(user_id) {
            return Err(RollcallError::platform(eyre::eyre!("unknown member {}", user_id)));
        }
        Ok(UserProfile {
            display_name: state
                .names
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| user_id.to_string()),
        })
    }

    async fn list_members(&self, _guild_id: &str) -> RollcallResult<Vec<Member>> {
        Ok(self.state().members.clone())
    }

    async fn is_admin(&self, _guild_id: &str, user_id: &str) -> RollcallResult<bool> {
        Ok(self.state().admins.contains(user_id))
    }
}

pub const GUILD: &str = "guild-1";

/// Local time in UTC. 2026-10-19 is a Monday.
pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn monday_training() -> FixedTrainingTime {
    FixedTrainingTime {
        week_day: 1,
        start_time_hours: 18,
        start_time_minutes: 0,
        end_time_hours: 19,
        end_time_minutes: 0,
        name: "Training".to_string(),
        description: "Weekly session".to_string(),
        location: "Hall 2".to_string(),
    }
}

pub fn settings(templates: Vec<FixedTrainingTime>) -> Settings {
    Settings {
        templates,
        policy: SchedulePolicy::default(),
        default_channel: "general".to_string(),
        command_prefix: "!".to_string(),
    }
}

pub fn orchestrator(
    store: &Arc<MemoryStore>,
    platform: &Arc<FakePlatform>,
    templates: Vec<FixedTrainingTime>,
) -> Orchestrator {
    Orchestrator::new(store.clone(), platform.clone(), settings(templates))
}

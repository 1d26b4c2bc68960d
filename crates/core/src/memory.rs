//! [`RecordStore`] kept in process memory.
//!
//! Enforces the same unique keys as the relational schema. Every method takes
//! the single state lock, so each call is atomic.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{RollcallError, RollcallResult};
use crate::models::{Answer, Event, Metadata, User};
use crate::ports::RecordStore;

#[derive(Debug, Default)]
struct State {
    metadata: Vec<Metadata>,
    events: Vec<Event>,
    users: Vec<User>,
    answers: Vec<Answer>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored answers across all events.
    pub fn answer_count(&self) -> usize {
        self.state().answers.len()
    }

    pub fn event_count(&self) -> usize {
        self.state().events.len()
    }
}

impl State {
    fn answers_of(&self, event_id: Uuid) -> Vec<Answer> {
        self.answers
            .iter()
            .filter(|answer| answer.event_id == event_id)
            .cloned()
            .collect()
    }

    fn with_answers(&self, event: &Event) -> Event {
        Event {
            answers: self.answers_of(event.id),
            ..event.clone()
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_metadata(&self, guild_id: &str) -> RollcallResult<Option<Metadata>> {
        Ok(self
            .state()
            .metadata
            .iter()
            .find(|m| m.guild_id == guild_id)
            .cloned())
    }

    async fn create_metadata(&self, metadata: &Metadata) -> RollcallResult<Metadata> {
        let mut state = self.state();
        if state.metadata.iter().any(|m| m.guild_id == metadata.guild_id) {
            return Err(RollcallError::Conflict(format!(
                "metadata for guild {} already exists",
                metadata.guild_id
            )));
        }
        state.metadata.push(metadata.clone());
        Ok(metadata.clone())
    }

    async fn list_metadata(&self) -> RollcallResult<Vec<Metadata>> {
        Ok(self.state().metadata.clone())
    }

    async fn update_last_week_reset(
        &self,
        guild_id: &str,
        previous: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> RollcallResult<bool> {
        let mut state = self.state();
        let metadata = state
            .metadata
            .iter_mut()
            .find(|m| m.guild_id == guild_id)
            .ok_or_else(|| RollcallError::NotFound(format!("metadata for guild {}", guild_id)))?;

        if metadata.last_week_reset != previous {
            return Ok(false);
        }
        metadata.last_week_reset = Some(next);
        Ok(true)
    }

    async fn create_event(&self, event: &Event) -> RollcallResult<Event> {
        let mut state = self.state();
        if state
            .events
            .iter()
            .any(|e| e.guild_id == event.guild_id && e.message_id == event.message_id)
        {
            return Err(RollcallError::Conflict(format!(
                "event for message {} already exists",
                event.message_id
            )));
        }
        let stored = Event {
            answers: Vec::new(),
            ..event.clone()
        };
        state.events.push(stored.clone());
        Ok(stored)
    }

    async fn find_event(&self, guild_id: &str, message_id: &str) -> RollcallResult<Option<Event>> {
        let state = self.state();
        Ok(state
            .events
            .iter()
            .find(|e| e.guild_id == guild_id && e.message_id == message_id)
            .map(|e| state.with_answers(e)))
    }

    async fn list_events(&self, guild_id: &str) -> RollcallResult<Vec<Event>> {
        let state = self.state();
        let mut events: Vec<Event> = state
            .events
            .iter()
            .filter(|e| e.guild_id == guild_id)
            .map(|e| state.with_answers(e))
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }

    async fn find_user(&self, guild_id: &str, member_id: &str) -> RollcallResult<Option<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.guild_id == guild_id && u.member_id == member_id)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> RollcallResult<User> {
        let mut state = self.state();
        if state
            .users
            .iter()
            .any(|u| u.guild_id == user.guild_id && u.member_id == user.member_id)
        {
            return Err(RollcallError::Conflict(format!(
                "user {} already exists in guild {}",
                user.member_id, user.guild_id
            )));
        }
        state.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user_name(&self, user_id: Uuid, display_name: &str) -> RollcallResult<()> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| RollcallError::NotFound(format!("user {}", user_id)))?;
        user.display_name = display_name.to_string();
        Ok(())
    }

    async fn list_users(&self, guild_id: &str) -> RollcallResult<Vec<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| u.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn find_answer(&self, event_id: Uuid, user_id: Uuid) -> RollcallResult<Option<Answer>> {
        Ok(self
            .state()
            .answers
            .iter()
            .find(|a| a.event_id == event_id && a.user_id == user_id)
            .cloned())
    }

    async fn upsert_answer(&self, answer: &Answer) -> RollcallResult<Answer> {
        let mut state = self.state();
        if !state.events.iter().any(|e| e.id == answer.event_id) {
            return Err(RollcallError::NotFound(format!("event {}", answer.event_id)));
        }

        match state
            .answers
            .iter_mut()
            .find(|a| a.event_id == answer.event_id && a.user_id == answer.user_id)
        {
            Some(existing) => {
                existing.yes_no = answer.yes_no;
                existing.updated_at = answer.updated_at;
                Ok(existing.clone())
            }
            None => {
                state.answers.push(answer.clone());
                Ok(answer.clone())
            }
        }
    }

    async fn list_answers(&self, event_id: Uuid) -> RollcallResult<Vec<Answer>> {
        Ok(self.state().answers_of(event_id))
    }
}

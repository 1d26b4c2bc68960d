use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RollcallError;
use crate::models::platform::MessageRef;

/// A user's attendance response to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
    Maybe,
}

impl Attendance {
    pub const ALL: [Attendance; 3] = [Attendance::Yes, Attendance::No, Attendance::Maybe];

    /// Glyph used for the reaction affordance and in rendered answer lines.
    pub fn symbol(self) -> &'static str {
        match self {
            Attendance::Yes => "✅",
            Attendance::No => "❌",
            Attendance::Maybe => "❓",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Yes => "yes",
            Attendance::No => "no",
            Attendance::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attendance {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Attendance::Yes),
            "no" => Ok(Attendance::No),
            "maybe" => Ok(Attendance::Maybe),
            other => Err(RollcallError::Validation(format!(
                "unknown attendance value '{}'",
                other
            ))),
        }
    }
}

/// Raw reaction glyph as delivered by the chat platform, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionSymbol {
    Yes,
    No,
    Maybe,
    Unrecognized,
}

impl ReactionSymbol {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "✅" | "👍" => ReactionSymbol::Yes,
            "❌" | "👎" => ReactionSymbol::No,
            "❓" | "🤷" => ReactionSymbol::Maybe,
            _ => ReactionSymbol::Unrecognized,
        }
    }

    pub fn attendance(self) -> Option<Attendance> {
        match self {
            ReactionSymbol::Yes => Some(Attendance::Yes),
            ReactionSymbol::No => Some(Attendance::No),
            ReactionSymbol::Maybe => Some(Attendance::Maybe),
            ReactionSymbol::Unrecognized => None,
        }
    }
}

/// One posted announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// In the order the store returned them.
    pub answers: Vec<Answer>,
}

impl Event {
    pub fn message(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id.clone(),
            message_id: self.message_id.clone(),
        }
    }
}

/// Event fields known before the announcement message exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl EventDraft {
    pub fn into_event(self, guild_id: &str, channel_id: &str, message_id: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            guild_id: guild_id.to_string(),
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            name: self.name,
            description: self.description,
            location: self.location,
            start_time: self.start_time,
            end_time: self.end_time,
            answers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub guild_id: String,
    pub member_id: String,
    pub display_name: String,
}

impl User {
    pub fn new(guild_id: &str, member_id: &str, display_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            guild_id: guild_id.to_string(),
            member_id: member_id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub yes_no: Attendance,
    pub updated_at: DateTime<Utc>,
}

impl Answer {
    /// Fresh answer for an (event, user) pair that has none yet.
    pub fn new(event_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            yes_no: Attendance::No,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

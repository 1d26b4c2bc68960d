use serde::{Deserialize, Serialize};

/// Location of a posted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
}

/// Inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub author_id: String,
    pub author_is_bot: bool,
    pub content: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
}

/// Inbound reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionAdded {
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub user_id: String,
    pub user_is_bot: bool,
    pub symbol: String,
}

impl ReactionAdded {
    pub fn message(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id.clone(),
            message_id: self.message_id.clone(),
        }
    }
}

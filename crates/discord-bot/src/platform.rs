//! [`ChatPlatform`] over the Discord REST API.

use std::sync::Arc;

use async_trait::async_trait;
use rollcall_core::errors::{RollcallError, RollcallResult};
use rollcall_core::models::{Channel, Member, MessageRef, UserProfile};
use rollcall_core::ports::ChatPlatform;
use serenity::http::Http;
use serenity::model::channel::{ChannelType, ReactionType};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use tracing::debug;

/// Discord caps reaction user pages at 100.
const REACTION_PAGE: u8 = 100;
/// Discord caps member pages at 1000.
const MEMBER_PAGE: u64 = 1000;

pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &Http {
        &self.http
    }
}

pub(crate) fn parse_id(raw: &str) -> RollcallResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| RollcallError::Validation(format!("'{}' is not a Discord id", raw)))
}

fn channel_id(raw: &str) -> RollcallResult<ChannelId> {
    parse_id(raw).map(ChannelId)
}

fn guild_id(raw: &str) -> RollcallResult<GuildId> {
    parse_id(raw).map(GuildId)
}

fn user_id(raw: &str) -> RollcallResult<UserId> {
    parse_id(raw).map(UserId)
}

fn message_target(message: &MessageRef) -> RollcallResult<(ChannelId, MessageId)> {
    Ok((channel_id(&message.channel_id)?, MessageId(parse_id(&message.message_id)?)))
}

/// Custom emoji arrive as `<:name:id>`, everything else is unicode.
pub(crate) fn reaction_type(symbol: &str) -> RollcallResult<ReactionType> {
    ReactionType::try_from(symbol)
        .map_err(|_| RollcallError::Validation(format!("'{}' is not a reaction", symbol)))
}

/// Text form of a reaction as the core sees it.
pub(crate) fn reaction_symbol(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(symbol) => symbol.clone(),
        other => other.to_string(),
    }
}

/// Union of the `@everyone` role and the member's roles.
pub(crate) fn member_permissions(
    guild: GuildId,
    member_roles: &[RoleId],
    role_permissions: impl Fn(RoleId) -> Option<Permissions>,
) -> Permissions {
    std::iter::once(RoleId(guild.0))
        .chain(member_roles.iter().copied())
        .filter_map(role_permissions)
        .fold(Permissions::empty(), |acc, permissions| acc | permissions)
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn send_message(&self, channel: &str, text: &str) -> RollcallResult<MessageRef> {
        let message = channel_id(channel)?
            .send_message(self.http(), |m| m.content(text))
            .await
            .map_err(RollcallError::platform)?;
        Ok(MessageRef {
            channel_id: message.channel_id.to_string(),
            message_id: message.id.to_string(),
        })
    }

    async fn edit_message(&self, message: &MessageRef, text: &str) -> RollcallResult<()> {
        let (channel, message_id) = message_target(message)?;
        channel
            .edit_message(self.http(), message_id, |m| m.content(text))
            .await
            .map_err(RollcallError::platform)?;
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageRef, symbol: &str) -> RollcallResult<()> {
        let (channel, message_id) = message_target(message)?;
        channel
            .create_reaction(self.http(), message_id, reaction_type(symbol)?)
            .await
            .map_err(RollcallError::platform)
    }

    async fn list_reaction_users(&self, message: &MessageRef, symbol: &str) -> RollcallResult<Vec<String>> {
        let (channel, message_id) = message_target(message)?;
        let reaction = reaction_type(symbol)?;
        let mut users = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = channel
                .reaction_users(self.http(), message_id, reaction.clone(), Some(REACTION_PAGE), after)
                .await
                .map_err(RollcallError::platform)?;
            let full = page.len() == REACTION_PAGE as usize;
            after = page.last().map(|user| user.id);
            users.extend(page.into_iter().map(|user| user.id.to_string()));
            if !full {
                break;
            }
        }

        Ok(users)
    }

    async fn remove_user_reaction(&self, message: &MessageRef, symbol: &str, user: &str) -> RollcallResult<()> {
        let (channel, message_id) = message_target(message)?;
        channel
            .delete_reaction(self.http(), message_id, Some(user_id(user)?), reaction_type(symbol)?)
            .await
            .map_err(RollcallError::platform)
    }

    async fn list_channels(&self, guild: &str) -> RollcallResult<Vec<Channel>> {
        let channels = guild_id(guild)?
            .channels(self.http())
            .await
            .map_err(RollcallError::platform)?;
        let mut text_channels: Vec<_> = channels
            .into_values()
            .filter(|channel| channel.kind == ChannelType::Text)
            .collect();
        text_channels.sort_by_key(|channel| channel.position);

        Ok(text_channels
            .into_iter()
            .map(|channel| Channel {
                id: channel.id.to_string(),
                name: channel.name,
            })
            .collect())
    }

    async fn create_channel(&self, guild: &str, name: &str) -> RollcallResult<Channel> {
        let channel = guild_id(guild)?
            .create_channel(self.http(), |c| c.name(name).kind(ChannelType::Text))
            .await
            .map_err(RollcallError::platform)?;
        Ok(Channel {
            id: channel.id.to_string(),
            name: channel.name,
        })
    }

    async fn resolve_user(&self, guild: &str, user: &str) -> RollcallResult<UserProfile> {
        let member = guild_id(guild)?
            .member(self.http(), user_id(user)?)
            .await
            .map_err(RollcallError::platform)?;
        Ok(UserProfile {
            display_name: member.display_name().into_owned(),
        })
    }

    async fn list_members(&self, guild: &str) -> RollcallResult<Vec<Member>> {
        let guild = guild_id(guild)?;
        let mut members = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild
                .members(self.http(), Some(MEMBER_PAGE), after)
                .await
                .map_err(RollcallError::platform)?;
            let full = page.len() as u64 == MEMBER_PAGE;
            after = page.last().map(|member| member.user.id);
            members.extend(page.iter().map(|member| Member {
                id: member.user.id.to_string(),
                display_name: member.display_name().into_owned(),
                bot: member.user.bot,
            }));
            if !full {
                break;
            }
        }

        debug!(guild = %guild, count = members.len(), "listed members");
        Ok(members)
    }

    async fn is_admin(&self, guild: &str, user: &str) -> RollcallResult<bool> {
        let guild = guild_id(guild)?;
        let user = user_id(user)?;
        let partial = guild
            .to_partial_guild(self.http())
            .await
            .map_err(RollcallError::platform)?;
        if partial.owner_id == user {
            return Ok(true);
        }

        let member = guild
            .member(self.http(), user)
            .await
            .map_err(RollcallError::platform)?;
        let permissions = member_permissions(guild, &member.roles, |role| {
            partial.roles.get(&role).map(|role| role.permissions)
        });
        Ok(permissions.administrator())
    }
}

use std::sync::Arc;

use tracing::info;

use crate::errors::RollcallResult;
use crate::find_or_create::find_or_create;
use crate::models::{Channel, Metadata};
use crate::ports::{ChatPlatform, RecordStore};

/// Creates the per-guild metadata row and announcement channel on demand.
pub struct GuildProvisioner {
    store: Arc<dyn RecordStore>,
    platform: Arc<dyn ChatPlatform>,
    default_channel: String,
}

impl GuildProvisioner {
    pub fn new(
        store: Arc<dyn RecordStore>,
        platform: Arc<dyn ChatPlatform>,
        default_channel: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            default_channel: default_channel.into(),
        }
    }

    pub async fn ensure_metadata(&self, guild_id: &str) -> RollcallResult<Metadata> {
        let store = self.store.as_ref();
        let defaults = Metadata::new(guild_id, &self.default_channel);
        find_or_create(
            move || store.find_metadata(guild_id),
            || async {
                let created = store.create_metadata(&defaults).await;
                if let Ok(metadata) = &created {
                    info!(guild = %guild_id, channel = %metadata.channel_name, "created guild metadata");
                }
                created
            },
        )
        .await
    }

    /// Resolves the channel named `name`, creating it if the guild has none.
    pub async fn ensure_channel(&self, guild_id: &str, name: &str) -> RollcallResult<Channel> {
        let platform = self.platform.as_ref();
        find_or_create(
            move || async move {
                platform
                    .list_channels(guild_id)
                    .await
                    .map(|channels| channels.into_iter().find(|channel| channel.name == name))
            },
            || async {
                let created = platform.create_channel(guild_id, name).await;
                if created.is_ok() {
                    info!(guild = %guild_id, channel = %name, "created announcement channel");
                }
                created
            },
        )
        .await
    }

    /// Both halves of first contact with a guild.
    pub async fn provision(&self, guild_id: &str) -> RollcallResult<(Metadata, Channel)> {
        let metadata = self.ensure_metadata(guild_id).await?;
        let channel = self.ensure_channel(guild_id, &metadata.channel_name).await?;
        Ok((metadata, channel))
    }
}

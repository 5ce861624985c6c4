//! Serenity-backed [`AdminHost`]

use std::num::NonZeroU64;
use std::sync::Arc;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use crate::application::errors::HostError;
use crate::domain::entities::{GuildInfo, GuildSummary, InviteSummary, MemberSummary, OwnerSummary};
use crate::domain::traits::{AdminHost, Presence};

/// Discord connection as seen by the admin console
pub struct SerenityHost {
    ctx: serenity::Context,
    shard_manager: Arc<serenity::ShardManager>,
}

impl SerenityHost {
    pub fn new(ctx: serenity::Context, shard_manager: Arc<serenity::ShardManager>) -> Self {
        Self { ctx, shard_manager }
    }

    /// First text channel the bot may create invites in
    fn invite_channel(&self, guild_id: serenity::GuildId) -> Result<Option<serenity::ChannelId>, HostError> {
        let guild = self.ctx.cache.guild(guild_id).ok_or(HostError::GuildNotFound(guild_id.get()))?;
        let me = self.ctx.cache.current_user().id;
        let Some(member) = guild.members.get(&me) else {
            return Ok(None);
        };

        let mut channels: Vec<&serenity::GuildChannel> = guild
            .channels
            .values()
            .filter(|c| c.kind == serenity::ChannelType::Text)
            .collect();
        channels.sort_by_key(|c| c.position);

        Ok(channels
            .into_iter()
            .find(|c| guild.user_permissions_in(c, member).create_instant_invite())
            .map(|c| c.id))
    }
}

/// Discord ids are never zero; serenity panics when asked to build one
fn guild_id(id: u64) -> Option<serenity::GuildId> {
    NonZeroU64::new(id).map(|id| serenity::GuildId::new(id.get()))
}

fn channel_id(id: u64) -> Option<serenity::ChannelId> {
    NonZeroU64::new(id).map(|id| serenity::ChannelId::new(id.get()))
}

fn is_text(channel: &serenity::Channel) -> bool {
    match channel {
        serenity::Channel::Private(_) => true,
        serenity::Channel::Guild(c) => matches!(
            c.kind,
            serenity::ChannelType::Text
                | serenity::ChannelType::News
                | serenity::ChannelType::Voice
                | serenity::ChannelType::PublicThread
                | serenity::ChannelType::PrivateThread
                | serenity::ChannelType::NewsThread
        ),
        _ => false,
    }
}

#[async_trait]
impl AdminHost for SerenityHost {
    fn guild_count(&self) -> usize {
        self.ctx.cache.guild_count()
    }

    fn guilds(&self) -> Vec<GuildSummary> {
        self.ctx
            .cache
            .guilds()
            .into_iter()
            .filter_map(|id| {
                self.ctx.cache.guild(id).map(|g| GuildSummary {
                    id: id.get(),
                    name: g.name.clone(),
                })
            })
            .collect()
    }

    fn guild(&self, guild_id: u64) -> Option<GuildInfo> {
        let guild = self.ctx.cache.guild(self::guild_id(guild_id)?)?;
        let me = self.ctx.cache.current_user().id;

        let can_manage = guild
            .members
            .get(&me)
            .map(|member| guild.member_permissions(member).manage_guild())
            .unwrap_or(false);

        let members = guild
            .members
            .values()
            .map(|m| MemberSummary {
                id: m.user.id.get(),
                name: m.user.name.clone(),
                bot: m.user.bot,
            })
            .collect();

        Some(GuildInfo {
            id: guild.id.get(),
            name: guild.name.clone(),
            owner: OwnerSummary {
                id: guild.owner_id.get(),
                name: guild.members.get(&guild.owner_id).map(|m| m.user.name.clone()),
            },
            channel_count: guild.channels.len(),
            role_count: guild.roles.len(),
            emoji_count: guild.emojis.len(),
            can_manage,
            members,
        })
    }

    async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), HostError> {
        let id = self::channel_id(channel_id).ok_or(HostError::ChannelNotFound(channel_id))?;
        let channel = id
            .to_channel(&self.ctx)
            .await
            .map_err(|_| HostError::ChannelNotFound(channel_id))?;
        if !is_text(&channel) {
            return Err(HostError::NotTextChannel(channel_id));
        }
        id.say(&self.ctx.http, content).await?;
        Ok(())
    }

    async fn invites(&self, guild_id: u64) -> Result<Vec<InviteSummary>, HostError> {
        let id = self::guild_id(guild_id).ok_or(HostError::GuildNotFound(guild_id))?;
        let invites = id.invites(&self.ctx.http).await?;
        Ok(invites
            .into_iter()
            .map(|i| InviteSummary { code: i.code, uses: i.uses })
            .collect())
    }

    async fn create_invite(&self, guild_id: u64) -> Result<Option<String>, HostError> {
        let id = self::guild_id(guild_id).ok_or(HostError::GuildNotFound(guild_id))?;
        let Some(channel) = self.invite_channel(id)? else {
            return Ok(None);
        };
        let invite = channel
            .create_invite(&self.ctx, serenity::CreateInvite::new())
            .await?;
        Ok(Some(invite.url()))
    }

    async fn leave_guild(&self, guild_id: u64) -> Result<(), HostError> {
        let id = self::guild_id(guild_id).ok_or(HostError::GuildNotFound(guild_id))?;
        id.leave(&self.ctx.http).await?;
        Ok(())
    }

    async fn sync_commands(&self, commands: Vec<serenity::CreateCommand>) -> Result<usize, HostError> {
        let registered = serenity::Command::set_global_commands(&self.ctx.http, commands).await?;
        Ok(registered.len())
    }

    fn set_presence(&self, presence: Presence) {
        let status = if presence.do_not_disturb {
            serenity::OnlineStatus::DoNotDisturb
        } else {
            serenity::OnlineStatus::Online
        };
        self.ctx
            .set_presence(Some(serenity::ActivityData::playing(presence.activity)), status);
    }

    async fn shutdown(&self) {
        self.shard_manager.shutdown_all().await;
    }
}

//! In-memory [`AdminHost`] for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use crate::application::errors::HostError;
use crate::domain::entities::{GuildInfo, GuildSummary, InviteSummary, OwnerSummary};
use crate::domain::traits::{AdminHost, Presence};

#[derive(Default)]
pub struct FakeHost {
    pub guilds: Mutex<Vec<GuildInfo>>,
    /// Channel id to whether it accepts text
    pub channels: HashMap<u64, bool>,
    pub invites: HashMap<u64, Vec<InviteSummary>>,
    pub invite_urls: HashMap<u64, String>,
    pub sent: Mutex<Vec<(u64, String)>>,
    pub synced: Mutex<Option<usize>>,
    pub presence: Mutex<Option<Presence>>,
    pub stopped: Mutex<bool>,
}

impl FakeHost {
    pub fn with_guild(self, guild: GuildInfo) -> Self {
        if let Ok(mut guilds) = self.guilds.lock() {
            guilds.push(guild);
        }
        self
    }

    pub fn with_channel(mut self, id: u64, text: bool) -> Self {
        self.channels.insert(id, text);
        self
    }

    pub fn with_invites(mut self, guild_id: u64, invites: Vec<InviteSummary>) -> Self {
        self.invites.insert(guild_id, invites);
        self
    }

    pub fn with_invite_url(mut self, guild_id: u64, url: &str) -> Self {
        self.invite_urls.insert(guild_id, url.to_string());
        self
    }
}

/// A guild with no members and the manage-guild permission
pub fn guild(id: u64, name: &str) -> GuildInfo {
    GuildInfo {
        id,
        name: name.to_string(),
        owner: OwnerSummary { id: 1, name: Some("owner".to_string()) },
        channel_count: 3,
        role_count: 2,
        emoji_count: 1,
        can_manage: true,
        members: Vec::new(),
    }
}

#[async_trait]
impl AdminHost for FakeHost {
    fn guild_count(&self) -> usize {
        self.guilds.lock().map(|g| g.len()).unwrap_or(0)
    }

    fn guilds(&self) -> Vec<GuildSummary> {
        self.guilds
            .lock()
            .map(|g| g.iter().map(|g| GuildSummary { id: g.id, name: g.name.clone() }).collect())
            .unwrap_or_default()
    }

    fn guild(&self, guild_id: u64) -> Option<GuildInfo> {
        self.guilds.lock().ok()?.iter().find(|g| g.id == guild_id).cloned()
    }

    async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), HostError> {
        match self.channels.get(&channel_id) {
            None => Err(HostError::ChannelNotFound(channel_id)),
            Some(false) => Err(HostError::NotTextChannel(channel_id)),
            Some(true) => {
                if let Ok(mut sent) = self.sent.lock() {
                    sent.push((channel_id, content.to_string()));
                }
                Ok(())
            }
        }
    }

    async fn invites(&self, guild_id: u64) -> Result<Vec<InviteSummary>, HostError> {
        Ok(self.invites.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn create_invite(&self, guild_id: u64) -> Result<Option<String>, HostError> {
        if self.guild(guild_id).is_none() {
            return Err(HostError::GuildNotFound(guild_id));
        }
        Ok(self.invite_urls.get(&guild_id).cloned())
    }

    async fn leave_guild(&self, guild_id: u64) -> Result<(), HostError> {
        let mut guilds = self.guilds.lock().map_err(|_| HostError::GuildNotFound(guild_id))?;
        let before = guilds.len();
        guilds.retain(|g| g.id != guild_id);
        if guilds.len() == before {
            return Err(HostError::GuildNotFound(guild_id));
        }
        Ok(())
    }

    async fn sync_commands(&self, commands: Vec<serenity::CreateCommand>) -> Result<usize, HostError> {
        let count = commands.len();
        if let Ok(mut synced) = self.synced.lock() {
            *synced = Some(count);
        }
        Ok(count)
    }

    fn set_presence(&self, presence: Presence) {
        if let Ok(mut current) = self.presence.lock() {
            *current = Some(presence);
        }
    }

    async fn shutdown(&self) {
        if let Ok(mut stopped) = self.stopped.lock() {
            *stopped = true;
        }
    }
}

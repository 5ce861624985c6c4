use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use crate::domain::entities::{GuildInfo, GuildSummary, InviteSummary};
use crate::application::errors::HostError;

/// AdminHost trait - abstraction over the chat platform for administration
///
/// Cache reads are synchronous snapshots; anything that talks to the
/// platform API is async.
#[async_trait]
pub trait AdminHost: Send + Sync {
    /// Number of guilds the bot is in
    fn guild_count(&self) -> usize;

    /// All guilds the bot is in
    fn guilds(&self) -> Vec<GuildSummary>;

    /// Snapshot of a single guild
    fn guild(&self, guild_id: u64) -> Option<GuildInfo>;

    /// Send a message to a text channel
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), HostError>;

    /// List the invites of a guild
    async fn invites(&self, guild_id: u64) -> Result<Vec<InviteSummary>, HostError>;

    /// Create an invite in the first channel that allows it; `None` when no channel does
    async fn create_invite(&self, guild_id: u64) -> Result<Option<String>, HostError>;

    /// Leave a guild
    async fn leave_guild(&self, guild_id: u64) -> Result<(), HostError>;

    /// Replace the global application command set, returning how many were registered
    async fn sync_commands(&self, commands: Vec<serenity::CreateCommand>) -> Result<usize, HostError>;

    /// Update the bot presence
    fn set_presence(&self, presence: Presence);

    /// Close the connection to the platform
    async fn shutdown(&self);
}

/// Presence shown next to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub activity: String,
    pub do_not_disturb: bool,
}

impl Presence {
    pub fn for_guilds(guild_count: usize, maintenance: bool) -> Self {
        if maintenance {
            Self {
                activity: "Maintenance".to_string(),
                do_not_disturb: true,
            }
        } else {
            Self {
                activity: format!("{} servers", guild_count),
                do_not_disturb: false,
            }
        }
    }
}

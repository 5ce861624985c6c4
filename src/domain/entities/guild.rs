use std::fmt;

/// A guild the bot is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSummary {
    pub id: u64,
    pub name: String,
}

/// Guild owner as far as the cache knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub id: u64,
    pub name: Option<String>,
}

/// Cached member of a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub id: u64,
    pub name: String,
    pub bot: bool,
}

impl fmt::Display for MemberSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)?;
        if self.bot {
            write!(f, " [BOT]")?;
        }
        Ok(())
    }
}

/// Point-in-time snapshot of a guild, taken from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildInfo {
    pub id: u64,
    pub name: String,
    pub owner: OwnerSummary,
    pub channel_count: usize,
    pub role_count: usize,
    pub emoji_count: usize,
    /// Whether the bot itself has the manage-guild permission here.
    pub can_manage: bool,
    pub members: Vec<MemberSummary>,
}

impl GuildInfo {
    /// Members sorted humans first, then by name.
    pub fn sorted_members(&self) -> Vec<&MemberSummary> {
        let mut members: Vec<&MemberSummary> = self.members.iter().collect();
        members.sort_by(|a, b| (a.bot, &a.name).cmp(&(b.bot, &b.name)));
        members
    }
}

/// Invite of a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteSummary {
    pub code: String,
    pub uses: u64,
}

impl InviteSummary {
    /// The invite with the most uses.
    pub fn most_used(invites: &[InviteSummary]) -> Option<&InviteSummary> {
        invites.iter().max_by_key(|i| i.uses)
    }
}

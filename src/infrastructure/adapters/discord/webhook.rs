//! Channel webhooks and user avatars

use poise::serenity_prelude as serenity;
use crate::application::errors::BotError;

const DEFAULT_REASON: &str = "Webhook created for automated tasks by the bot";

/// Webhook named `name` in `channel`, created when missing
///
/// `name` defaults to the bot's own name. Requires the bot to have
/// `Manage Webhooks` in the channel.
pub async fn channel_webhook(
    ctx: &serenity::Context,
    channel: &serenity::GuildChannel,
    name: Option<&str>,
    reason: Option<&str>,
) -> Result<serenity::Webhook, BotError> {
    let (me, bot_name) = {
        let user = ctx.cache.current_user();
        (user.id, user.name.clone())
    };
    let can_manage = ctx
        .cache
        .guild(channel.guild_id)
        .and_then(|guild| {
            guild
                .members
                .get(&me)
                .map(|member| guild.user_permissions_in(channel, member).manage_webhooks())
        })
        .unwrap_or(false);
    if !can_manage {
        return Err(BotError::BotMissingPermissions(vec!["Manage Webhooks".to_string()]));
    }

    let name = name.unwrap_or(bot_name.as_str());
    let mut existing = channel.id.webhooks(&ctx.http).await?;
    if let Some(index) = find_named(existing.iter().map(|w| w.name.as_deref()), name) {
        return Ok(existing.swap_remove(index));
    }

    let builder = serenity::CreateWebhook::new(name).audit_log_reason(reason.unwrap_or(DEFAULT_REASON));
    Ok(channel.id.create_webhook(ctx, builder).await?)
}

/// Index of the first webhook called `name`
fn find_named<'a>(names: impl IntoIterator<Item = Option<&'a str>>, name: &str) -> Option<usize> {
    names.into_iter().position(|candidate| candidate == Some(name))
}

/// Avatar URL of a user, falling back to their default avatar
pub fn avatar_url(user: &serenity::User) -> String {
    user.face()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_webhook_is_reused() {
        let names = [None, Some("other"), Some("KurdDX"), Some("KurdDX")];
        assert_eq!(find_named(names, "KurdDX"), Some(2));
        assert_eq!(find_named(names, "missing"), None);
        assert_eq!(find_named([None], ""), None);
    }
}

//! Rendering notices and console output as Discord replies

use poise::serenity_prelude as serenity;
use crate::domain::entities::Notice;
use crate::infrastructure::storage::{self, FileSource};

/// Largest message Discord accepts
pub const MESSAGE_LIMIT: usize = 2000;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const DESCRIPTION_LIMIT: usize = 4096;

/// Embed for a notice, without the thumbnail
pub fn embed(notice: &Notice) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&notice.title)
        .colour(serenity::Colour::TEAL);
    if let Some(description) = &notice.description {
        embed = embed.description(storage::truncate(description, DESCRIPTION_LIMIT));
    }
    for field in &notice.fields {
        embed = embed.field(
            storage::truncate(&field.name, FIELD_NAME_LIMIT),
            storage::truncate(&field.value, FIELD_VALUE_LIMIT),
            field.inline,
        );
    }
    embed
}

/// Reply to the invoking message without pinging its author
pub async fn notice_reply(notice: &Notice) -> poise::CreateReply {
    let mut embed = embed(notice);
    let mut reply = poise::CreateReply::default()
        .reply(true)
        .allowed_mentions(serenity::CreateAllowedMentions::new().replied_user(false));

    if let Some(path) = notice.thumbnail {
        match storage::attach(FileSource::Path(path.into()), None).await {
            Ok(attached) => {
                embed = embed.thumbnail(attached.url);
                reply = reply.attachment(attached.attachment);
            }
            Err(e) => tracing::warn!("Thumbnail {} unavailable: {}", path, e),
        }
    }

    reply.embed(embed)
}

/// How captured console output is relayed back into chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relay {
    Inline(String),
    File(String),
    /// Nothing was captured and the caller wants the plain marker
    NoOutput,
}

/// Pick inline or file relay for console output
///
/// `force_file` is the `csf`/`csfx` behaviour: always a file, or a bare
/// "No output" message when empty. Otherwise empty output reads "No output"
/// inside the code block and anything too long goes to a file.
pub fn relay(output: &str, force_file: bool) -> Relay {
    if force_file {
        if output.is_empty() {
            return Relay::NoOutput;
        }
        return Relay::File(output.to_string());
    }

    let contents = if output.is_empty() { "No output" } else { output };
    let inline = format!("```{}```", contents);
    if inline.chars().count() > MESSAGE_LIMIT {
        Relay::File(contents.to_string())
    } else {
        Relay::Inline(inline)
    }
}

pub fn relay_reply(relay: Relay) -> poise::CreateReply {
    let reply = poise::CreateReply::default()
        .reply(true)
        .allowed_mentions(serenity::CreateAllowedMentions::new().replied_user(false));
    match relay {
        Relay::Inline(content) => reply.content(content),
        Relay::File(contents) => reply.attachment(serenity::CreateAttachment::bytes(contents.into_bytes(), "log.txt")),
        Relay::NoOutput => poise::CreateReply::default().content("No output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_output_goes_inline() {
        assert_eq!(relay("Bot is in 2 servers\n", false), Relay::Inline("```Bot is in 2 servers\n```".into()));
        assert_eq!(relay("", false), Relay::Inline("```No output```".into()));
    }

    #[test]
    fn long_output_goes_to_a_file() {
        let long = "x".repeat(MESSAGE_LIMIT);
        assert_eq!(relay(&long, false), Relay::File(long.clone()));

        let fits = "x".repeat(MESSAGE_LIMIT - 6);
        assert!(matches!(relay(&fits, false), Relay::Inline(_)));
    }

    #[test]
    fn forced_file_relay() {
        assert_eq!(relay("", true), Relay::NoOutput);
        assert_eq!(relay("a\n", true), Relay::File("a\n".into()));
    }
}

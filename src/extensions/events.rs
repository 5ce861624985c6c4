//! Gateway event logging

use std::sync::Arc;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use crate::application::errors::BotError;
use crate::infrastructure::adapters::discord::{Command, Data};
use crate::plugins::{Extension, ExtensionContext};

pub struct Events;

pub async fn setup(_ctx: ExtensionContext) -> Result<Arc<dyn Extension>, BotError> {
    Ok(Arc::new(Events))
}

pub fn commands() -> Vec<Command> {
    Vec::new()
}

#[async_trait]
impl Extension for Events {
    fn name(&self) -> &str {
        super::EVENTS
    }

    async fn on_event(
        &self,
        _ctx: &serenity::Context,
        event: &serenity::FullEvent,
        _data: &Data,
    ) -> Result<(), BotError> {
        match event {
            serenity::FullEvent::Message { new_message, .. } => {
                tracing::info!("{} > {}", new_message.author.name, new_message.content);
            }
            serenity::FullEvent::GuildCreate { guild, is_new: Some(true), .. } => {
                tracing::info!("Joined guild {} ({})", guild.name, guild.id);
            }
            serenity::FullEvent::GuildDelete { incomplete, full, .. } if !incomplete.unavailable => match full {
                Some(guild) => tracing::info!("Left guild {} ({})", guild.name, guild.id),
                None => tracing::info!("Left guild {}", incomplete.id),
            },
            _ => {}
        }
        Ok(())
    }
}

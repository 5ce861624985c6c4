//! Miscellaneous commands

use std::sync::Arc;
use crate::application::errors::BotError;
use crate::infrastructure::adapters::discord::{Command, Context};
use crate::plugins::{Extension, ExtensionContext, Plain};

pub async fn setup(_ctx: ExtensionContext) -> Result<Arc<dyn Extension>, BotError> {
    Ok(Plain::new(super::MISC))
}

pub fn commands() -> Vec<Command> {
    vec![ping()]
}

/// Returns Pong!
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), BotError> {
    let latency = ctx.ping().await;
    ctx.say(pong(latency)).await?;
    Ok(())
}

fn pong(latency: std::time::Duration) -> String {
    format!("Pong! `{}`", latency.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pong_shows_whole_milliseconds() {
        assert_eq!(pong(Duration::from_micros(42_700)), "Pong! `42`");
    }
}

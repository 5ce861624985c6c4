//! Console dispatcher - Routes raw lines to console commands

use std::collections::HashMap;
use crate::application::errors::ConsoleError;
use super::command::{ConsoleCommand, HandlerResult};

/// Registry of console commands
pub struct Console<C> {
    commands: HashMap<String, ConsoleCommand<C>>,
}

impl<C: Send + 'static> Console<C> {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a console command, replacing any command with the same name
    pub fn register(&mut self, command: ConsoleCommand<C>) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn remove(&mut self, name: &str) -> Option<ConsoleCommand<C>> {
        self.commands.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConsoleCommand<C>> {
        self.commands.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ConsoleCommand<C>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Find the command with the longest name that prefixes `line`
    pub fn resolve<'a>(&self, line: &'a str) -> Option<(&ConsoleCommand<C>, &'a str)> {
        self.commands
            .values()
            .filter(|cmd| line.starts_with(cmd.name.as_str()))
            .max_by_key(|cmd| cmd.name.len())
            .map(|cmd| (cmd, &line[cmd.name.len()..]))
    }

    /// Split a line into the matched command and its shell-quoted arguments
    pub fn parse<'a>(&self, line: &'a str) -> Result<(&ConsoleCommand<C>, Vec<String>), ConsoleError> {
        let (command, rest) = self
            .resolve(line)
            .ok_or_else(|| ConsoleError::NotFound(line.to_string()))?;
        let tokens = shlex::split(rest.trim())
            .ok_or_else(|| ConsoleError::Tokenize(rest.trim().to_string()))?;
        Ok((command, tokens))
    }

    /// Parse a raw line and run the matching command
    pub async fn dispatch(&self, ctx: C, line: &str) -> HandlerResult {
        let (command, tokens) = self.parse(line)?;
        tracing::info!("> {} {}", command.name, tokens.join(" "));
        command.execute(ctx, &tokens).await
    }

    /// One usage line per command, sorted by name
    pub fn help(&self) -> String {
        let mut lines: Vec<String> = self.commands.values().map(|cmd| {
            match &cmd.description {
                Some(desc) => format!("{} - {}", cmd.usage(), desc),
                None => cmd.usage(),
            }
        }).collect();
        lines.sort();
        lines.join("\n")
    }
}

impl<C: Send + 'static> Default for Console<C> {
    fn default() -> Self {
        Self::new()
    }
}

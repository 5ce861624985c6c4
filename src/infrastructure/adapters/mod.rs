//! Platform adapters - Discord client and the stdin console

pub mod console;
pub mod discord;

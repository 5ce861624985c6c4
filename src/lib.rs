//! KurdDX Discord bot
//!
//! Extensions, a developer console and the error routing that ties them
//! to Discord.

pub mod application;
pub mod domain;
pub mod extensions;
pub mod infrastructure;
pub mod plugins;

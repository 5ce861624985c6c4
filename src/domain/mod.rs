//! Domain layer - Core types and the platform seam
//! 
//! This layer contains:
//! - Entities: Snapshots of guilds, members and invites, and the notice model
//! - Traits: Abstractions over the chat platform (AdminHost)
//!
//! Entities are framework-free. The one serenity type in this layer is the
//! `CreateCommand` payload that `AdminHost::sync_commands` passes through.

pub mod entities;
pub mod traits;

#[cfg(test)]
pub mod test_support;

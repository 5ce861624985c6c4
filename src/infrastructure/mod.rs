//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: JSON configuration and token files
//! - Logging: Subscriber setup and log capture
//! - Storage: Local files as attachments
//! - Plugins: Extension discovery
//! - Adapters: Platform integrations (Discord, stdin console)

pub mod adapters;
pub mod config;
pub mod logging;
pub mod plugins;
pub mod storage;

//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Console: Developer console dispatcher
//! - Services: Admin commands, error routing, command guards
//! - Errors: Domain-specific errors

pub mod console;
pub mod errors;
pub mod services;

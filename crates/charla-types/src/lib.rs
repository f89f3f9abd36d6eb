//! Shared domain types for Charla.
//!
//! This crate contains the types used across the Charla client:
//! user identity and tokens, conversation and message models, the wire
//! payloads exchanged with the assistant service, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
pub mod wire;

//! Infrastructure implementations for Charla.
//!
//! Concrete backends for the abstractions defined in `charla-core`: the
//! reqwest HTTP gateway to the remote assistant service and the SQLite
//! auth vault, plus the config loader.

pub mod config;
pub mod http;
pub mod sqlite;

//! Chat session and state-orchestration engine for Charla.
//!
//! This crate is the only surface the presentation layer talks to. It owns
//! identity tokens, the anonymous session id, the conversation registry,
//! per-conversation transcripts, and the orchestrator state machine that
//! drives them. Transport and persistence are abstracted behind the
//! [`gateway::ChatGateway`] and [`storage::AuthVault`] traits; concrete
//! implementations live in charla-infra.

pub mod auth;
pub mod chat;
pub mod gateway;
pub mod session;
pub mod signal;
pub mod storage;

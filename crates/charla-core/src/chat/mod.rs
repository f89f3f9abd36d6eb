//! Conversation state: the registry of conversation summaries, the
//! per-conversation message store, and the orchestrator that drives both.

pub mod messages;
pub mod orchestrator;
pub mod registry;

//! Interactive chat session.

mod commands;
mod loop_runner;

pub use loop_runner::run_chat_loop;

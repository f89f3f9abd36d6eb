//! CLI command definitions and dispatch for the `charla` binary.
//!
//! Uses clap derive macros for argument parsing. Commands map onto the
//! account flows (`register`, `login`, `logout`, `whoami`) and the chat
//! surface (`chat`, `chats`).

pub mod auth;
pub mod chat;
pub mod chats;

use clap::{Parser, Subcommand};

/// Chat with the assistant from your terminal.
#[derive(Parser)]
#[command(name = "charla", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and log in.
    Register {
        /// Username for the new account (prompted when omitted).
        #[arg(long)]
        username: Option<String>,

        /// Email for the new account (prompted when omitted).
        #[arg(long)]
        email: Option<String>,
    },

    /// Log in with an existing account.
    Login {
        /// Username to log in as (prompted when omitted).
        #[arg(long)]
        username: Option<String>,
    },

    /// Log out and forget the saved session.
    Logout,

    /// Show the currently logged-in user.
    Whoami,

    /// List your conversations.
    #[command(alias = "ls")]
    Chats,

    /// Start an interactive chat session.
    Chat {
        /// Chat without an account; the conversation is not saved.
        #[arg(long)]
        anonymous: bool,
    },
}

//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for conversation
//! management and help.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Exit the chat session.
    Exit,
    /// Start a new conversation.
    New,
    /// Show the conversation list.
    Chats,
    /// Switch to a conversation by id.
    Select(String),
    /// Delete a conversation by id.
    Delete(String),
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/new" => Some(ChatCommand::New),
        "/chats" | "/ls" => Some(ChatCommand::Chats),
        "/select" | "/open" => match arg.filter(|a| !a.is_empty()) {
            Some(id) => Some(ChatCommand::Select(id)),
            None => Some(ChatCommand::Unknown(
                "/select requires a conversation id".to_string(),
            )),
        },
        "/delete" | "/rm" => match arg.filter(|a| !a.is_empty()) {
            Some(id) => Some(ChatCommand::Delete(id)),
            None => Some(ChatCommand::Unknown(
                "/delete requires a conversation id".to_string(),
            )),
        },
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help(anonymous: bool) {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}    {}", style("/help").cyan(), "Show this help message");
    println!("  {}    {}", style("/exit").cyan(), "End the chat session");
    if !anonymous {
        println!("  {}     {}", style("/new").cyan(), "Start a new conversation");
        println!("  {}   {}", style("/chats").cyan(), "List your conversations");
        println!("  {}  {}", style("/select").cyan(), "Switch to a conversation by id");
        println!("  {}  {}", style("/delete").cyan(), "Delete a conversation by id");
    }
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}

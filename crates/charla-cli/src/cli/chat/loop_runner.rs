//! Main chat loop orchestration.
//!
//! Coordinates the complete session lifecycle: identity check, conversation
//! list priming, welcome banner, input loop with slash commands, and the
//! out-of-band redirect signal when the session expires mid-chat.

use std::io::Write;

use anyhow::Result;
use console::style;
use tokio::io::AsyncBufReadExt;
use tracing::warn;

use charla_core::chat::orchestrator::SendOutcome;
use charla_core::signal::UiSignal;
use charla_types::chat::{ChatId, ChatMessage, ConversationKey};
use charla_types::error::ChatError;

use crate::cli::chats::render_chats_table;
use crate::state::AppState;

use super::commands::{self, ChatCommand};

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState, anonymous: bool) -> Result<()> {
    let orch = &state.orchestrator;

    if !anonymous {
        if !orch.is_authenticated() {
            println!();
            println!(
                "  {} Not logged in. Try {} first, or chat without an account: {}",
                style("i").blue().bold(),
                style("charla login").yellow(),
                style("charla chat --anonymous").yellow()
            );
            println!();
            return Ok(());
        }

        // Prime the conversation list and resume the most recent one.
        if let Err(err) = orch.refresh_chats().await {
            warn!(error = %err, "Could not load the conversation list");
            println!(
                "  {} Could not load your conversations: {err}",
                style("!").yellow().bold()
            );
        }
        if let Some(first) = orch.chats().await.first().map(|c| c.id.clone()) {
            match orch.select_conversation(first.clone()).await {
                Ok(true) => {
                    print_history(&orch.transcript(&ConversationKey::Chat(first)).await);
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(chat_id = %first, error = %err, "Could not load conversation history");
                }
            }
        }
    }

    print_banner(state, anonymous);

    let mut signals = orch.subscribe();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("  {} ", style("You >").green().bold());
        std::io::stdout().flush()?;

        let text = tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => text,
                None => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
            },
            signal = signals.recv() => {
                if let Ok(UiSignal::RedirectToLogin) = signal {
                    println!();
                    println!(
                        "  {} Your session has expired. Log in again with: {}",
                        style("!").yellow().bold(),
                        style("charla login").yellow()
                    );
                    println!();
                    break;
                }
                continue;
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            continue;
        }

        // Slash commands
        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => {
                    commands::print_help(anonymous);
                    continue;
                }
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                _ if anonymous => {
                    println!(
                        "  {} That command needs an account; only /help and /exit work here.",
                        style("!").yellow().bold()
                    );
                    continue;
                }
                ChatCommand::New => {
                    match orch.start_new_conversation().await {
                        Ok(id) => println!(
                            "  {} New conversation {} started.",
                            style("✓").green().bold(),
                            style(id.as_str()).cyan()
                        ),
                        Err(err) => println!(
                            "  {} Could not start a conversation: {err}",
                            style("✗").red().bold()
                        ),
                    }
                    continue;
                }
                ChatCommand::Chats => {
                    if let Err(err) = orch.refresh_chats().await {
                        warn!(error = %err, "Conversation list refresh failed");
                    }
                    let chats = orch.chats().await;
                    if chats.is_empty() {
                        println!("  {} No conversations yet.", style("i").blue().bold());
                    } else {
                        println!("{}", render_chats_table(&chats));
                    }
                    continue;
                }
                ChatCommand::Select(id) => {
                    let id = ChatId::from(id.as_str());
                    match orch.select_conversation(id.clone()).await {
                        Ok(started) => {
                            if started {
                                print_history(
                                    &orch.transcript(&ConversationKey::Chat(id)).await,
                                );
                            } else {
                                println!(
                                    "  {} Conversation {} is empty; say something.",
                                    style("i").blue().bold(),
                                    style(id.as_str()).cyan()
                                );
                            }
                        }
                        Err(err) => println!(
                            "  {} Could not open {}: {err}",
                            style("✗").red().bold(),
                            id.as_str()
                        ),
                    }
                    continue;
                }
                ChatCommand::Delete(id) => {
                    let id = ChatId::from(id.as_str());
                    match orch.delete_conversation(&id).await {
                        Ok(()) => println!(
                            "  {} Conversation {} deleted.",
                            style("✓").green().bold(),
                            id.as_str()
                        ),
                        Err(err) => println!(
                            "  {} Could not delete {}: {err}",
                            style("✗").red().bold(),
                            id.as_str()
                        ),
                    }
                    continue;
                }
                ChatCommand::Unknown(msg) => {
                    println!(
                        "  {} {msg} (try {})",
                        style("!").yellow().bold(),
                        style("/help").cyan()
                    );
                    continue;
                }
            }
        }

        // Regular message
        let result = if anonymous {
            orch.start_anonymous(&text).await
        } else {
            orch.start_authenticated(&text).await
        };

        match result {
            Ok(outcome) => {
                let key = if anonymous {
                    orch.anonymous_key()
                } else {
                    orch.active_key().await
                };
                if let Some(last) = orch.transcript(&key).await.last() {
                    let label = match outcome {
                        SendOutcome::Replied => style("Bot >").cyan().bold(),
                        SendOutcome::Failed(_) => style("Bot >").yellow().bold(),
                    };
                    println!("  {} {}", label, last.content);
                }
            }
            Err(ChatError::Unauthenticated) => {
                println!(
                    "  {} Your session has expired. Log in again with: {}",
                    style("!").yellow().bold(),
                    style("charla login").yellow()
                );
                break;
            }
            Err(ChatError::SendInFlight) => {
                println!(
                    "  {} Still waiting for the previous reply.",
                    style("!").yellow().bold()
                );
            }
            Err(err) => {
                println!("  {} {err}", style("✗").red().bold());
            }
        }
    }

    Ok(())
}

fn print_banner(state: &AppState, anonymous: bool) {
    println!();
    if anonymous {
        println!(
            "  {} Chatting anonymously -- this conversation is not saved.",
            style("●").yellow()
        );
    } else if let Some(user) = state.orchestrator.current_user() {
        println!(
            "  {} Chatting as {}.",
            style("●").green(),
            style(&user.username).cyan()
        );
    }
    println!(
        "  {}",
        style("Type a message, /help for commands, Ctrl+D to exit.").dim()
    );
    println!();
}

fn print_history(messages: &[ChatMessage]) {
    println!();
    for msg in messages {
        let label = if msg.from_user {
            style("You >").green().bold()
        } else {
            style("Bot >").cyan().bold()
        };
        println!("  {} {}", label, msg.content);
    }
    println!();
}

//! Conversation list command and table rendering.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use charla_types::chat::ChatSummary;

use crate::state::AppState;

/// List the user's conversations in a colored table.
pub async fn list_chats(state: &AppState, json: bool) -> Result<()> {
    if !state.orchestrator.is_authenticated() {
        anyhow::bail!("not logged in; try: charla login");
    }

    state.orchestrator.refresh_chats().await?;
    let chats = state.orchestrator.chats().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&chats)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style("charla chat").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", render_chats_table(&chats));
    println!();
    println!(
        "  {} conversation{}",
        style(chats.len()).bold(),
        if chats.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Render the conversation summaries as a table (shared with the in-chat
/// `/chats` command).
pub fn render_chats_table(chats: &[ChatSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Last Message").fg(Color::White),
        Cell::new("Last Activity").fg(Color::White),
    ]);

    for chat in chats {
        let preview = if chat.last_message.chars().count() > 50 {
            let cut: String = chat.last_message.chars().take(47).collect();
            format!("{cut}...")
        } else {
            chat.last_message.clone()
        };

        table.add_row(vec![
            Cell::new(chat.id.as_str()).fg(Color::Cyan),
            Cell::new(&chat.title).fg(Color::White),
            Cell::new(preview),
            Cell::new(format_relative_time(&chat.last_activity)).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Compact "3m ago" style timestamps for the table.
fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let delta = Utc::now().signed_duration_since(*dt);
    if delta.num_seconds() < 60 {
        "just now".to_string()
    } else if delta.num_minutes() < 60 {
        format!("{}m ago", delta.num_minutes())
    } else if delta.num_hours() < 24 {
        format!("{}h ago", delta.num_hours())
    } else {
        format!("{}d ago", delta.num_days())
    }
}

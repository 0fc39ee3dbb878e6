//! Telegram bot client - simple polling version.

use std::collections::HashMap;
use std::sync::OnceLock;

use teloxide::prelude::*;
use teloxide::RequestError;
use tokio::sync::Mutex;

use crate::config::{load_settings, load_settings_or_default};
use crate::error::Error;

use super::handler;

/// Last quote id the bot sent per chat. Lets a bare "/quote delete"
/// remove the quote the user is looking at without exposing ids in chat.
pub(crate) fn last_sent_quotes() -> &'static Mutex<HashMap<i64, String>> {
    static LAST: OnceLock<Mutex<HashMap<i64, String>>> = OnceLock::new();
    LAST.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Download a file through the bot HTTP API, returning its raw bytes.
pub async fn download_bot_file(
    token: &str,
    file_id: &str,
) -> std::result::Result<Vec<u8>, String> {
    let get_file_url = format!(
        "https://api.telegram.org/bot{}/getFile?file_id={}",
        token, file_id
    );
    let resp = reqwest::get(get_file_url).await.map_err(|e| e.to_string())?;
    let value: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
    let file_path = value
        .get("result")
        .and_then(|r| r.get("file_path"))
        .and_then(|p| p.as_str())
        .ok_or_else(|| "Telegram getFile returned no file_path".to_string())?;

    let download_url = format!("https://api.telegram.org/file/bot{}/{}", token, file_path);
    let bytes = reqwest::get(download_url)
        .await
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map_err(|e| e.to_string())?;

    Ok(bytes.to_vec())
}

/// Run the quote bot daemon using simple polling.
pub async fn run_quote_daemon() -> Result<(), Error> {
    tracing::info!("Starting quote bot...");

    let settings = load_settings()?;

    let token = settings
        .channels
        .telegram
        .bot_token
        .ok_or_else(|| Error::Telegram("No bot token configured".to_string()))?;

    let bot = Bot::new(token);

    // Set up commands
    if let Err(e) = bot
        .set_my_commands(vec![
            teloxide::types::BotCommand::new("quote", "add | random | delete | list"),
            teloxide::types::BotCommand::new("help", "Show help"),
        ])
        .await
    {
        tracing::warn!("Failed to set commands: {}", e);
    }

    tracing::info!("Quote bot commands set");

    teloxide::repl(bot, |bot, msg| async move { handle_message(bot, msg).await }).await;

    Ok(())
}

/// Handle incoming messages.
async fn handle_message(bot: Bot, msg: Message) -> Result<(), RequestError> {
    // Commands may arrive as plain text or as a photo caption.
    let text = msg.text().or_else(|| msg.caption()).unwrap_or("").trim();
    if text.is_empty() {
        return Ok(());
    }

    if text.starts_with('/') {
        let mut parts = text.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        // Group chats address commands as /quote@botname.
        let cmd = cmd.split('@').next().unwrap_or(cmd);

        match cmd {
            "/help" => {
                bot.send_message(msg.chat.id, HELP_TEXT).await?;
            }
            "/quote" => {
                let sub = parts.next().unwrap_or("");
                let arg = parts.next();
                match sub {
                    "add" | "save" => handler::cmd_add(bot, &msg).await?,
                    "random" | "r" | "" => handler::cmd_random(bot, &msg, arg).await?,
                    "delete" | "del" => handler::cmd_delete(bot, &msg, arg).await?,
                    "list" => handler::cmd_list(bot, &msg, arg).await?,
                    _ => {
                        bot.send_message(msg.chat.id, "Usage: /quote <add|random|delete|list>")
                            .await?;
                    }
                }
            }
            _ => {
                bot.send_message(msg.chat.id, "Unknown command. /help for available commands.")
                    .await?;
            }
        }
        return Ok(());
    }

    // A bare trigger phrase in a plain message fires the random flow.
    let settings = load_settings_or_default();
    if text.eq_ignore_ascii_case(settings.trigger_phrase.trim()) {
        handler::cmd_random(bot, &msg, None).await?;
    }

    Ok(())
}

const HELP_TEXT: &str = r#"Quoteboard Commands:

/quote add - Reply to a message (text or photo) to save it as a quote
/quote random [author_id] - Send a random quote as a rendered card
/quote delete [id] - Delete a quote; without an id, the last one sent here
/quote list <author_id> - List someone's quotes (or reply to them)
/help - Show this help

Sending the trigger phrase as a plain message also draws a random quote.
"#;

//! Quote command flows: add, random, delete, list.

use teloxide::prelude::*;
use teloxide::types::{InputFile, Message};
use teloxide::RequestError;

use crate::avatar::resolve_avatar;
use crate::config::{get_data_dir, load_settings_or_default, Settings};
use crate::error::Error;
use crate::mention::strip_mentions;
use crate::render;
use crate::store::images::save_image_bytes;
use crate::store::{Quote, QuoteStore};

use super::client::{download_bot_file, last_sent_quotes};

fn open_store(settings: &Settings) -> Result<QuoteStore, Error> {
    let data_dir = get_data_dir(settings)?;
    QuoteStore::open(data_dir)
}

/// Save the replied-to message as a quote.
pub async fn cmd_add(bot: Bot, msg: &Message) -> Result<(), RequestError> {
    let settings = load_settings_or_default();
    let store = match open_store(&settings) {
        Ok(s) => s,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Store unavailable: {}", e))
                .await?;
            return Ok(());
        }
    };

    let Some(replied) = msg.reply_to_message() else {
        bot.send_message(
            msg.chat.id,
            "Reply to the message you want to quote, then send /quote add.",
        )
        .await?;
        return Ok(());
    };

    // Author of the replied message.
    let (author_id, author_name) = replied
        .from
        .as_ref()
        .map(|u| (u.id.0.to_string(), u.full_name()))
        .unwrap_or_else(|| (String::new(), "Unknown".to_string()));

    // Text with mentions stripped; empty collapses to None.
    let text = replied
        .text()
        .or_else(|| replied.caption())
        .map(strip_mentions)
        .filter(|t| !t.is_empty());

    // Images from the replied message, falling back to the invoking one.
    let token = settings
        .channels
        .telegram
        .bot_token
        .clone()
        .unwrap_or_default();
    let images = match ingest_images(&token, &store, replied).await {
        Ok(saved) if saved.is_empty() => ingest_images(&token, &store, msg).await,
        other => other,
    };
    let images = match images {
        Ok(saved) => saved,
        Err(e) => {
            // Download failures are recoverable: tell the user, save nothing.
            bot.send_message(msg.chat.id, e.to_string()).await?;
            return Ok(());
        }
    };

    if text.is_none() && images.is_empty() {
        bot.send_message(msg.chat.id, Error::NoContent.to_string())
            .await?;
        return Ok(());
    }

    let saver_id = msg
        .from
        .as_ref()
        .map(|u| u.id.0.to_string())
        .unwrap_or_else(|| "0".to_string());

    let avatar = resolve_avatar(&settings, &store, &author_id)
        .await
        .unwrap_or_default();

    let quote = Quote::new(&author_id, &author_name, text, images, &saver_id).with_avatar(&avatar);

    match store.add(quote) {
        Ok(q) => {
            let reply = if q.has_images() {
                format!(
                    "Saved a quote by {} with {} image(s).",
                    q.author_name,
                    q.images.len()
                )
            } else {
                format!("Saved a quote by {}: {}", q.author_name, q.preview())
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
        Err(e) => {
            tracing::warn!("Failed to save quote: {}", e);
            bot.send_message(msg.chat.id, format!("Failed to save quote: {}", e))
                .await?;
        }
    }

    Ok(())
}

/// Send a random quote, optionally filtered to one author.
pub async fn cmd_random(
    bot: Bot,
    msg: &Message,
    author_arg: Option<&str>,
) -> Result<(), RequestError> {
    let settings = load_settings_or_default();
    let store = match open_store(&settings) {
        Ok(s) => s,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Store unavailable: {}", e))
                .await?;
            return Ok(());
        }
    };

    // Author filter: explicit argument, or the author of a replied message.
    let author = author_arg
        .map(|a| a.trim_start_matches('@').to_string())
        .or_else(|| {
            msg.reply_to_message()
                .and_then(|r| r.from.as_ref())
                .map(|u| u.id.0.to_string())
        });

    let picked = match &author {
        Some(id) => store.random_by_author(id),
        None => store.random(),
    };

    let quote = match picked {
        Ok(q) => q,
        Err(Error::EmptyStore) => {
            let note = if author.is_some() {
                "No quotes for that user yet."
            } else {
                "No quotes saved yet. Reply to a message with /quote add to save one."
            };
            bot.send_message(msg.chat.id, note).await?;
            return Ok(());
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Could not pick a quote: {}", e))
                .await?;
            return Ok(());
        }
    };

    last_sent_quotes()
        .lock()
        .await
        .insert(msg.chat.id.0, quote.id.clone());

    // A quote with stored images sends one original file untouched.
    if quote.has_images() {
        let rel = {
            use rand::seq::SliceRandom;
            quote.images.choose(&mut rand::thread_rng()).cloned()
        };
        if let Some(rel) = rel {
            let abs = store.resolve(&rel);
            if abs.exists() {
                bot.send_photo(msg.chat.id, InputFile::file(abs)).await?;
                return Ok(());
            }
            tracing::warn!("Stored image missing, falling back to card: {}", rel);
        }
    }

    // Otherwise render the card; plain text when the backend is missing.
    let backend = render::default_backend();
    match render::render_card(
        &backend,
        &store,
        &quote,
        &settings.card,
        settings.avatar.qlogo_size,
    )
    .await
    {
        Ok(path) => {
            bot.send_photo(msg.chat.id, InputFile::file(path)).await?;
        }
        Err(e) => {
            tracing::warn!("Card render failed, sending plain text: {}", e);
            let text = quote.text.as_deref().unwrap_or("[photo]");
            bot.send_message(
                msg.chat.id,
                format!("\u{300c}{}\u{300d} \u{2014} {}", text, quote.author_name),
            )
            .await?;
        }
    }

    Ok(())
}

/// Delete a quote by id, or the last one sent in this chat.
pub async fn cmd_delete(bot: Bot, msg: &Message, arg: Option<&str>) -> Result<(), RequestError> {
    let settings = load_settings_or_default();
    let store = match open_store(&settings) {
        Ok(s) => s,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Store unavailable: {}", e))
                .await?;
            return Ok(());
        }
    };

    let id = match arg {
        Some(a) => Some(a.to_string()),
        None => last_sent_quotes().lock().await.get(&msg.chat.id.0).cloned(),
    };
    let Some(id) = id else {
        bot.send_message(
            msg.chat.id,
            "Nothing to delete: pass a quote id, or draw a random quote first.",
        )
        .await?;
        return Ok(());
    };

    match store.delete_by_id(&id) {
        Ok(true) => {
            last_sent_quotes().lock().await.remove(&msg.chat.id.0);
            bot.send_message(msg.chat.id, "Deleted the quote.").await?;
        }
        Ok(false) => {
            bot.send_message(msg.chat.id, "No quote with that id, it may already be gone.")
                .await?;
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Delete failed: {}", e))
                .await?;
        }
    }

    Ok(())
}

/// List an author's quotes, oldest first.
pub async fn cmd_list(bot: Bot, msg: &Message, arg: Option<&str>) -> Result<(), RequestError> {
    let settings = load_settings_or_default();
    let store = match open_store(&settings) {
        Ok(s) => s,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Store unavailable: {}", e))
                .await?;
            return Ok(());
        }
    };

    let author = arg
        .map(|a| a.trim_start_matches('@').to_string())
        .or_else(|| {
            msg.reply_to_message()
                .and_then(|r| r.from.as_ref())
                .map(|u| u.id.0.to_string())
        });
    let Some(author) = author else {
        bot.send_message(
            msg.chat.id,
            "Usage: /quote list <author_id>, or reply to one of their messages.",
        )
        .await?;
        return Ok(());
    };

    let quotes = match store.list_by_author(&author) {
        Ok(q) => q,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("List failed: {}", e))
                .await?;
            return Ok(());
        }
    };

    if quotes.is_empty() {
        bot.send_message(msg.chat.id, "This user has no quotes yet.")
            .await?;
        return Ok(());
    }

    let name = quotes
        .last()
        .map(|q| q.author_name.clone())
        .unwrap_or_else(|| author.clone());
    let mut out = format!("Quotes by {} ({}):\n", name, quotes.len());
    for q in &quotes {
        out.push_str(&format!("\u{2022} {} - {}\n", q.id, q.preview()));
    }
    if out.len() > 3900 {
        out.truncate(3900);
        out.push_str("\n...[truncated]");
    }
    bot.send_message(msg.chat.id, out).await?;

    Ok(())
}

/// Save every image attached to a message into the store, returning the
/// stored relative paths. A failed download of a present image surfaces
/// as a Download error instead of silently saving less than was sent.
async fn ingest_images(
    token: &str,
    store: &QuoteStore,
    msg: &Message,
) -> Result<Vec<String>, Error> {
    let mut saved: Vec<String> = Vec::new();

    if let Some(photos) = msg.photo() {
        // The largest size is last.
        if let Some(last) = photos.last() {
            let bytes = download_bot_file(token, &last.file.id)
                .await
                .map_err(Error::Download)?;
            saved.push(save_image_bytes(store, &bytes, ".jpg")?);
        }
    }

    if let Some(doc) = msg.document() {
        let is_image = doc
            .mime_type
            .as_ref()
            .map(|m| m.essence_str().starts_with("image/"))
            .unwrap_or(false);
        if is_image {
            let ext = doc
                .file_name
                .as_deref()
                .and_then(|n| std::path::Path::new(n).extension().and_then(|e| e.to_str()))
                .unwrap_or("jpg");
            let bytes = download_bot_file(token, &doc.file.id)
                .await
                .map_err(Error::Download)?;
            saved.push(save_image_bytes(store, &bytes, ext)?);
        }
    }

    if let Some(sticker) = msg.sticker() {
        if let Ok(bytes) = download_bot_file(token, &sticker.file.id).await {
            saved.push(save_image_bytes(store, &bytes, ".webp")?);
        }
    }

    Ok(saved)
}

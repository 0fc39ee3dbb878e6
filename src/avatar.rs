//! Avatar resolution for quoted authors.
#![allow(dead_code)]

use crate::config::Settings;
use crate::store::images::save_image_bytes;
use crate::store::QuoteStore;
use crate::telegram::download_bot_file;

/// Avatar source mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvatarSource {
    Qlogo,
    Platform,
}

impl AvatarSource {
    pub fn from_str(s: &str) -> Self {
        match s {
            "platform" => AvatarSource::Platform,
            _ => AvatarSource::Qlogo,
        }
    }
}

/// Public qlogo avatar URL for a numeric user id.
pub fn qlogo_url(author_id: &str, size: u32) -> String {
    format!("https://q1.qlogo.cn/g?b=qq&nk={}&s={}", author_id, size)
}

/// Resolve the avatar reference for an author per the configured source:
/// a qlogo URL, or a locally saved copy of the platform profile photo.
/// Returns None when no reference could be produced; rendering then falls
/// back to a qlogo URL derived from the author id.
pub async fn resolve_avatar(
    settings: &Settings,
    store: &QuoteStore,
    author_id: &str,
) -> Option<String> {
    if author_id.is_empty() {
        return None;
    }

    match AvatarSource::from_str(&settings.avatar.source) {
        AvatarSource::Qlogo => Some(qlogo_url(author_id, settings.avatar.qlogo_size)),
        AvatarSource::Platform => {
            let token = settings.channels.telegram.bot_token.as_deref()?;
            match fetch_platform_avatar(token, author_id, store).await {
                Ok(rel) => rel,
                Err(e) => {
                    tracing::warn!("Platform avatar fetch failed for {}: {}", author_id, e);
                    None
                }
            }
        }
    }
}

/// Fetch the author's current profile photo through the bot file API and
/// save a local copy under the store's image directory.
async fn fetch_platform_avatar(
    token: &str,
    user_id: &str,
    store: &QuoteStore,
) -> std::result::Result<Option<String>, String> {
    let photos_url = format!(
        "https://api.telegram.org/bot{}/getUserProfilePhotos?user_id={}&limit=1",
        token, user_id
    );
    let resp = reqwest::get(photos_url).await.map_err(|e| e.to_string())?;
    let value: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;

    // Largest size of the first photo set.
    let file_id = value
        .get("result")
        .and_then(|r| r.get("photos"))
        .and_then(|p| p.get(0))
        .and_then(|sizes| sizes.as_array())
        .and_then(|sizes| sizes.last())
        .and_then(|ph| ph.get("file_id"))
        .and_then(|f| f.as_str());

    let Some(file_id) = file_id else {
        return Ok(None);
    };

    let bytes = download_bot_file(token, file_id).await?;
    let rel = save_image_bytes(store, &bytes, ".jpg").map_err(|e| e.to_string())?;
    tracing::debug!("Saved platform avatar for {} as {}", user_id, rel);
    Ok(Some(rel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parsing_defaults_to_qlogo() {
        assert_eq!(AvatarSource::from_str("platform"), AvatarSource::Platform);
        assert_eq!(AvatarSource::from_str("qlogo"), AvatarSource::Qlogo);
        assert_eq!(AvatarSource::from_str("anything"), AvatarSource::Qlogo);
    }

    #[test]
    fn qlogo_url_embeds_id_and_size() {
        assert_eq!(
            qlogo_url("123456", 640),
            "https://q1.qlogo.cn/g?b=qq&nk=123456&s=640"
        );
    }
}

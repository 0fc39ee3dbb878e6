//! Image intake for the quote store.
#![allow(dead_code)]

use std::path::Path;

use crate::error::Error;

use super::store::QuoteStore;

/// Download a remote image and save it under the store's image directory.
/// Returns the stored path relative to the data root.
pub async fn save_image_from_url(store: &QuoteStore, url: &str) -> Result<String, Error> {
    let resp = reqwest::get(url)
        .await
        .map_err(|e| Error::Download(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(Error::Download(format!(
            "HTTP {} fetching {}",
            resp.status(),
            url
        )));
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::Download(e.to_string()))?;

    let ext = guess_extension(content_type.as_deref(), url);
    let filename = format!("{}{}", ulid::Ulid::new(), ext);

    std::fs::create_dir_all(store.images_dir())?;
    std::fs::write(store.images_abs(&filename), &bytes)?;

    tracing::debug!("Saved remote image {} as {}", url, filename);
    Ok(QuoteStore::images_rel(&filename))
}

/// Copy a local image file into the store's image directory.
/// Returns the stored path relative to the data root.
pub fn save_image_from_fs(store: &QuoteStore, src: &Path) -> Result<String, Error> {
    if !src.exists() {
        return Err(Error::NotFound(format!("{}", src.display())));
    }

    let ext = src
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".jpg".to_string());
    let filename = format!("{}{}", ulid::Ulid::new(), ext);

    std::fs::create_dir_all(store.images_dir())?;
    std::fs::copy(src, store.images_abs(&filename))?;

    tracing::debug!("Copied local image {} as {}", src.display(), filename);
    Ok(QuoteStore::images_rel(&filename))
}

/// Write already-downloaded image bytes into the store's image directory.
pub fn save_image_bytes(store: &QuoteStore, bytes: &[u8], ext: &str) -> Result<String, Error> {
    let suffix = if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    };
    let filename = format!("{}{}", ulid::Ulid::new(), suffix);

    std::fs::create_dir_all(store.images_dir())?;
    std::fs::write(store.images_abs(&filename), bytes)?;

    Ok(QuoteStore::images_rel(&filename))
}

/// Guess a file extension: Content-Type first, then the URL path suffix.
fn guess_extension(content_type: Option<&str>, url: &str) -> String {
    let mut ext = ".jpg".to_string();
    if let Some(ct) = content_type {
        if ct.contains("png") {
            ext = ".png".to_string();
        } else if ct.contains("webp") {
            ext = ".webp".to_string();
        } else if ct.contains("gif") {
            ext = ".gif".to_string();
        }
    }

    // A short suffix on the URL path wins over the header guess.
    let path_part = url.split(['?', '#']).next().unwrap_or(url);
    if let Some(name) = path_part.rsplit('/').next() {
        if let Some(idx) = name.rfind('.') {
            let suffix = &name[idx..];
            if suffix.len() > 1 && suffix.len() <= 5 {
                ext = suffix.to_lowercase();
            }
        }
    }

    ext
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extension_from_content_type() {
        assert_eq!(guess_extension(Some("image/png"), "https://x/y"), ".png");
        assert_eq!(guess_extension(Some("image/webp"), "https://x/y"), ".webp");
        assert_eq!(guess_extension(Some("image/gif"), "https://x/y"), ".gif");
        assert_eq!(guess_extension(Some("image/jpeg"), "https://x/y"), ".jpg");
        assert_eq!(guess_extension(None, "https://x/y"), ".jpg");
    }

    #[test]
    fn url_suffix_wins_over_content_type() {
        assert_eq!(
            guess_extension(Some("image/png"), "https://x/pic.webp?sig=1"),
            ".webp"
        );
        // Overlong suffixes are not trusted.
        assert_eq!(
            guess_extension(Some("image/png"), "https://x/pic.something"),
            ".png"
        );
    }

    #[test]
    fn fs_copy_lands_in_images_dir() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let src = temp.path().join("input.png");
        std::fs::write(&src, b"fake png").unwrap();

        let rel = save_image_from_fs(&store, &src).unwrap();
        assert!(rel.starts_with("quotes/images/"));
        assert!(rel.ends_with(".png"));
        assert!(store.resolve(&rel).exists());
    }

    #[test]
    fn fs_copy_missing_source_errors() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let missing = temp.path().join("nope.jpg");
        assert!(save_image_from_fs(&store, &missing).is_err());
    }

    #[test]
    fn saved_filenames_do_not_collide() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let src = temp.path().join("input.jpg");
        std::fs::write(&src, b"bytes").unwrap();

        let a = save_image_from_fs(&store, &src).unwrap();
        let b = save_image_from_fs(&store, &src).unwrap();
        assert_ne!(a, b);
    }
}

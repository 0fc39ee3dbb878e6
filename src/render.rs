//! Quote card rendering.
#![allow(dead_code)]
//!
//! The crate builds a self-contained HTML card for a quote; turning that
//! card into pixels is the job of an external rendering collaborator
//! behind the `RenderBackend` trait.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::avatar::qlogo_url;
use crate::config::CardConfig;
use crate::store::{Quote, QuoteStore};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer not available: {0}")]
    NotAvailable(String),

    #[error("Render failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render backend trait.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &str;

    /// Check if the backend is usable (CLI installed).
    async fn is_available(&self) -> bool;

    /// Rasterize a self-contained HTML document into an image file at `out`.
    async fn render_html(&self, html: &str, width: u32, height: u32, out: &Path) -> Result<()>;
}

/// Backend shelling out to wkhtmltoimage.
pub struct WkhtmlBackend {
    cli_path: String,
}

impl WkhtmlBackend {
    pub fn new() -> Self {
        Self {
            cli_path: "wkhtmltoimage".to_string(),
        }
    }

    pub fn with_cli_path(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
        }
    }
}

impl Default for WkhtmlBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderBackend for WkhtmlBackend {
    fn name(&self) -> &str {
        "wkhtmltoimage"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.cli_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| true)
            .unwrap_or(false)
    }

    async fn render_html(&self, html: &str, width: u32, height: u32, out: &Path) -> Result<()> {
        // The CLI wants a file input; park the document next to the output.
        let html_path = out.with_extension("html");
        std::fs::write(&html_path, html)?;

        let output = Command::new(&self.cli_path)
            .arg("--quiet")
            .arg("--enable-local-file-access")
            .arg("--width")
            .arg(width.to_string())
            .arg("--height")
            .arg(height.to_string())
            .arg("--crop-w")
            .arg(width.to_string())
            .arg("--crop-h")
            .arg(height.to_string())
            .arg(&html_path)
            .arg(out)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        std::fs::remove_file(&html_path).ok();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Failed(stderr.trim().to_string()));
        }
        if !out.exists() {
            return Err(RenderError::Failed(format!(
                "no output produced at {}",
                out.display()
            )));
        }
        Ok(())
    }
}

/// The default backend.
pub fn default_backend() -> WkhtmlBackend {
    WkhtmlBackend::new()
}

/// Build the HTML card and render it to <data>/quotes/cards/<id>.png.
pub async fn render_card(
    backend: &dyn RenderBackend,
    store: &QuoteStore,
    quote: &Quote,
    card: &CardConfig,
    qlogo_size: u32,
) -> Result<PathBuf> {
    if !backend.is_available().await {
        return Err(RenderError::NotAvailable(backend.name().to_string()));
    }

    let avatar = avatar_src(store, quote, qlogo_size);
    let text = quote.text.as_deref().unwrap_or("[photo]");
    let html = build_card_html(text, &quote.author_name, &avatar, card);

    let cards_dir = store.dir().join("cards");
    std::fs::create_dir_all(&cards_dir)?;
    let out = cards_dir.join(format!("{}.png", quote.id));

    backend
        .render_html(&html, card.width, card.height, &out)
        .await?;
    tracing::debug!("Rendered quote {} to {}", quote.id, out.display());
    Ok(out)
}

/// Image `src` for the record's avatar reference: stored URLs pass
/// through, stored local paths become file URLs, an empty reference
/// falls back to a qlogo URL derived from the author id.
pub fn avatar_src(store: &QuoteStore, quote: &Quote, qlogo_size: u32) -> String {
    let stored = quote.author_avatar.trim();
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return stored.to_string();
    }
    if !stored.is_empty() {
        return format!("file://{}", store.resolve(stored).display());
    }
    qlogo_url(&quote.author_id, qlogo_size)
}

/// Minimal HTML escaping for text interpolated into the card.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Build the self-contained HTML card: avatar pane on the left third,
/// quote text centered on the right, gradient blend between them and
/// the author signature bottom-right.
pub fn build_card_html(text: &str, author_name: &str, avatar: &str, card: &CardConfig) -> String {
    let width = card.width;
    let height = card.height;
    let bg = &card.bg_color;
    let fg = &card.text_color;
    let font = &card.font_family;

    let left_w = width * 36 / 100;
    let right_w = width - left_w;
    let grad_width = std::cmp::max(200, width * 26 / 100);
    let grad_left = left_w as i64 - (grad_width as i64 * 7 / 10);

    let safe_text = escape_html(text);
    let safe_name = escape_html(author_name);
    let safe_avatar = escape_html(avatar);

    format!(
        r#"<html>
<head>
<meta charset='utf-8' />
<style>
* {{ box-sizing: border-box; }}
html, body {{ margin:0; padding:0; width:{width}px; height:{height}px; background:{bg}; }}
.root {{ position:relative; width:{width}px; height:{height}px; background:{bg}; font-family:{font}; overflow:hidden; }}
.left {{ position:absolute; left:0; top:0; width:{left_w}px; height:{height}px; overflow:hidden; z-index:0; }}
.left img {{ width:100%; height:100%; object-fit:cover; display:block; }}
.left .left-shade {{ position:absolute; inset:0; background: linear-gradient(to right, rgba(0,0,0,0) 0%, rgba(0,0,0,0.28) 58%, rgba(0,0,0,0.55) 100%); }}
.right {{ position:absolute; left:{left_w}px; top:0; width:{right_w}px; height:{height}px; background:{bg}; display:flex; align-items:center; justify-content:center; text-align:center; z-index:2; }}
.text {{ color:{fg}; font-size:38px; line-height:1.6; padding:0 80px; max-width:calc(100% - 160px); display:flex; align-items:center; justify-content:center; text-align:center; }}
.signature {{ position:absolute; right:44px; bottom:28px; color:rgba(255,255,255,0.82); font-size:22px; font-weight:300; letter-spacing:0.2px; z-index:3; }}
.quote-mark {{ color:{fg}; opacity:0.8; margin-right:14px; }}
.fade-overlay {{ position:absolute; top:0; bottom:0; left:{grad_left}px; width:{grad_width}px; pointer-events:none; z-index:1; background: linear-gradient(to right, rgba(0,0,0,0.00) 0%, rgba(0,0,0,0.35) 38%, rgba(0,0,0,0.70) 70%, {bg} 100%); }}
</style>
</head>
<body>
<div class="root">
  <div class="left"><img src="{safe_avatar}" /><div class="left-shade"></div></div>
  <div class="right">
    <div class="text">
      <span class="quote-mark">&#12300;</span>
      <div>{safe_text}</div>
      <span class="quote-mark">&#12301;</span>
    </div>
  </div>
  <div class="fade-overlay"></div>
  <div class="signature">&mdash; {safe_name}</div>
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn escapes_html_entities() {
        assert_eq!(escape_html("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn card_embeds_escaped_text_and_signature() {
        let card = CardConfig::default();
        let html = build_card_html("1 < 2", "Alice & Bob", "https://a/x.jpg", &card);

        assert!(html.contains("1 &lt; 2"));
        assert!(html.contains("&mdash; Alice &amp; Bob"));
        assert!(html.contains("src=\"https://a/x.jpg\""));
        assert!(html.contains("width:1280px"));
        assert!(html.contains("height:427px"));
    }

    #[test]
    fn avatar_src_prefers_stored_reference() {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(temp.path()).unwrap();

        let with_url = Quote::new("42", "A", Some("t".into()), vec![], "1")
            .with_avatar("https://example.com/a.png");
        assert_eq!(
            avatar_src(&store, &with_url, 640),
            "https://example.com/a.png"
        );

        let with_file =
            Quote::new("42", "A", Some("t".into()), vec![], "1").with_avatar("quotes/images/a.jpg");
        assert!(avatar_src(&store, &with_file, 640).starts_with("file://"));

        let bare = Quote::new("42", "A", Some("t".into()), vec![], "1");
        assert_eq!(
            avatar_src(&store, &bare, 640),
            "https://q1.qlogo.cn/g?b=qq&nk=42&s=640"
        );
    }
}

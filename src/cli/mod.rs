//! CLI commands for Quoteboard using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, load_settings_or_default};
use crate::store::QuoteStore;

/// Quoteboard - Telegram-first quote collector.
#[derive(Parser)]
#[command(name = "quoteboard")]
#[command(version = "0.1.0")]
#[command(about = "Save replied-to messages as quotes, get them back as rendered cards", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the quote bot daemon
    Start,

    /// Add a quote directly from the command line
    Add {
        /// Platform user id of the quoted author
        #[arg(long)]
        author_id: String,

        /// Author nickname
        #[arg(long)]
        author_name: String,

        /// Quote text
        #[arg(long)]
        text: Option<String>,

        /// Image URL or local file to attach (repeatable)
        #[arg(long)]
        image: Vec<String>,
    },

    /// Print a random quote from the store
    Random {
        /// Restrict to one author id
        #[arg(long)]
        author: Option<String>,
    },

    /// List an author's quotes, oldest first
    List {
        /// Author id
        author: String,
    },

    /// Delete a quote by id
    Delete {
        /// Quote id
        id: String,
    },

    /// Show store statistics
    Stats,

    /// Write settings to ~/.quoteboard/settings.json
    Setup {
        /// Telegram bot token
        #[arg(long)]
        token: Option<String>,

        /// Override the data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Avatar source: qlogo or platform
        #[arg(long)]
        avatar_source: Option<String>,

        /// Trigger phrase for random quotes
        #[arg(long)]
        trigger: Option<String>,
    },
}

fn open_store() -> Result<QuoteStore> {
    let settings = load_settings_or_default();
    let data_dir = config::get_data_dir(&settings)?;
    Ok(QuoteStore::open(data_dir)?)
}

impl Commands {
    /// Run the parsed command.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Start => {
                crate::telegram::run_quote_daemon().await?;
            }

            Command::Add {
                author_id,
                author_name,
                text,
                image,
            } => {
                let store = open_store()?;
                let mut images = Vec::new();
                for source in &image {
                    let rel = if source.starts_with("http://") || source.starts_with("https://") {
                        crate::store::images::save_image_from_url(&store, source).await?
                    } else {
                        crate::store::images::save_image_from_fs(
                            &store,
                            std::path::Path::new(source),
                        )?
                    };
                    images.push(rel);
                }
                let text = text.map(|t| crate::mention::strip_mentions(&t)).filter(|t| !t.is_empty());
                let quote = crate::store::Quote::new(&author_id, &author_name, text, images, "cli");
                let added = store.add(quote)?;
                println!("Added quote {}", added.id);
            }

            Command::Random { author } => {
                let store = open_store()?;
                let quote = match author.as_deref() {
                    Some(id) => store.random_by_author(id)?,
                    None => store.random()?,
                };
                println!("{} ({})", quote.preview(), quote.author_name);
                for img in &quote.images {
                    println!("  image: {}", store.resolve(img).display());
                }
            }

            Command::List { author } => {
                let store = open_store()?;
                let quotes = store.list_by_author(&author)?;
                if quotes.is_empty() {
                    println!("No quotes for author {}", author);
                } else {
                    for q in quotes {
                        let when = chrono::DateTime::from_timestamp_millis(q.created_at)
                            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        println!("{}  {}  {}  {}", q.id, when, q.author_name, q.preview());
                    }
                }
            }

            Command::Delete { id } => {
                let store = open_store()?;
                if store.delete_by_id(&id)? {
                    println!("Deleted quote {}", id);
                } else {
                    println!("No quote with id {}", id);
                }
            }

            Command::Stats => {
                let store = open_store()?;
                println!("{}", store.stats()?);
            }

            Command::Setup {
                token,
                data_dir,
                avatar_source,
                trigger,
            } => {
                let mut settings = load_settings_or_default();
                if let Some(token) = token {
                    settings.channels.telegram.bot_token = Some(token);
                    if !settings.channels.enabled.iter().any(|c| c == "telegram") {
                        settings.channels.enabled.push("telegram".to_string());
                    }
                }
                if let Some(dir) = data_dir {
                    settings.data_dir = Some(dir);
                }
                if let Some(source) = avatar_source {
                    settings.avatar.source = source;
                }
                if let Some(phrase) = trigger {
                    settings.trigger_phrase = phrase;
                }
                config::write_settings(&settings)?;
                println!("Settings written to {}", config::get_settings_path()?.display());
            }
        }

        Ok(())
    }
}

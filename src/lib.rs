//! Quoteboard library root.

pub mod avatar;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mention;
pub mod render;
pub mod store;
pub mod telegram;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use error::{Error, Result};
pub use render::{RenderBackend, WkhtmlBackend};
pub use store::{Quote, QuoteStore};
pub use telegram::run_quote_daemon;

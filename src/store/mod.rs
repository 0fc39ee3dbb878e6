//! Quote store - JSON-file persistence with image intake.

pub mod images;
pub mod lock;
pub mod quote;
pub mod store;

pub use quote::Quote;
pub use store::{QuoteStore, StoreStats};

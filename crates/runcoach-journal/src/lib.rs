//! Runcoach Journal - Durable per-user run logs in a single JSON document

pub mod error;
pub mod journal;
pub mod store;

pub use error::{JournalError, JournalResult};
pub use journal::{Journal, JournalStats};
pub use store::JournalStore;

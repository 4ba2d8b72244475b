//! Runcoach Core - Types shared by the journal, the extractor, and the transport

pub mod error;
pub mod intent;
pub mod types;

pub use error::{Error, Result};
pub use intent::*;
pub use types::*;

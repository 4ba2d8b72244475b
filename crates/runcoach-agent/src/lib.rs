//! Runcoach Agent - Intent extraction and journal dispatch

pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod prompt;

pub use dispatcher::{Dispatcher, Outcome, NOT_UNDERSTOOD_REPLY, PROGRESS_UNSUPPORTED_REPLY};
pub use error::{DispatchError, ExtractError};
pub use extractor::{extract_braced_object, ExtractorConfig, IntentExtractor};

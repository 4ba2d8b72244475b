//! Extraction and dispatch errors

use runcoach_journal::JournalError;
use runcoach_llm::LlmError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("oracle error: {0}")]
    Oracle(#[from] LlmError),

    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),

    #[error("no structured object in oracle reply: {reply:?}")]
    NoStructuredObject { reply: String },

    #[error("malformed structured object: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Journal(#[from] JournalError),
}

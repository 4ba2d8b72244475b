//! Dispatcher: classify a message, update the journal, pick the reply

use crate::error::DispatchError;
use crate::extractor::IntentExtractor;
use chrono::NaiveDate;
use runcoach_core::{display_scalar, Intent, LogEntry, UserId};
use runcoach_journal::Journal;
use std::sync::Arc;
use tracing::{debug, info};

/// Progress analysis is not implemented; the bot answers with a fixed line.
pub const PROGRESS_UNSUPPORTED_REPLY: &str = "I beg your pardon?";

pub const NOT_UNDERSTOOD_REPLY: &str =
    "Sorry, I didn’t understand that. Try logging a run or asking about your progress.";

/// What handling one message did
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Entry appended; `log_len` is the user's log length afterwards.
    Logged { entry: LogEntry, log_len: usize },
    ProgressUnsupported,
    NotUnderstood,
}

impl Outcome {
    pub fn intent(&self) -> Intent {
        match self {
            Outcome::Logged { .. } => Intent::LogRun,
            Outcome::ProgressUnsupported => Intent::AnalyzeProgress,
            Outcome::NotUnderstood => Intent::Unknown,
        }
    }

    pub fn reply(&self) -> String {
        match self {
            Outcome::Logged { entry, .. } => format!(
                "Logged: {} km run on {}.",
                display_scalar(&entry.distance_km),
                display_scalar(&entry.date)
            ),
            Outcome::ProgressUnsupported => PROGRESS_UNSUPPORTED_REPLY.to_string(),
            Outcome::NotUnderstood => NOT_UNDERSTOOD_REPLY.to_string(),
        }
    }
}

pub struct Dispatcher {
    journal: Arc<Journal>,
    extractor: IntentExtractor,
}

impl Dispatcher {
    pub fn new(journal: Arc<Journal>, extractor: IntentExtractor) -> Self {
        Self { journal, extractor }
    }

    pub fn journal(&self) -> &Arc<Journal> {
        &self.journal
    }

    pub fn extractor(&self) -> &IntentExtractor {
        &self.extractor
    }

    /// Handle one message dated by the local calendar.
    pub async fn handle(&self, user: &UserId, text: &str) -> Result<Outcome, DispatchError> {
        self.handle_on(user, text, chrono::Local::now().date_naive()).await
    }

    /// Handle one message as if received on `today`.
    ///
    /// Any error leaves the journal as it was and produces no reply.
    pub async fn handle_on(
        &self,
        user: &UserId,
        text: &str,
        today: NaiveDate,
    ) -> Result<Outcome, DispatchError> {
        let result = self.extractor.classify(text, today).await?;
        debug!("User {} classified: {:?}", user, result);

        let outcome = match result.intent {
            Intent::LogRun => {
                let entry = result.to_log_entry();
                let log_len = self.journal.append(user, entry.clone()).await?;
                info!(
                    "User {} logged {} km on {} ({} entries)",
                    user,
                    display_scalar(&entry.distance_km),
                    display_scalar(&entry.date),
                    log_len
                );
                Outcome::Logged { entry, log_len }
            }
            Intent::AnalyzeProgress => Outcome::ProgressUnsupported,
            Intent::Unknown => Outcome::NotUnderstood,
        };

        info!("User {} intent={}", user, outcome.intent());
        Ok(outcome)
    }
}

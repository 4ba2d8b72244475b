//! Polling bot: one task per inbound message

use crate::router::{Route, Router};
use crate::telegram::TelegramClient;
use runcoach_agent::{DispatchError, Dispatcher};
use runcoach_core::InboundMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Pause after a failed getUpdates before polling again.
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Routes a message and, when it reaches the core, runs the dispatcher.
pub struct MessageHandler {
    router: Router,
    dispatcher: Arc<Dispatcher>,
}

impl MessageHandler {
    pub fn new(router: Router, dispatcher: Arc<Dispatcher>) -> Self {
        Self { router, dispatcher }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The reply to send, if any. `Ok(None)` means the message was not for us.
    pub async fn process(&self, message: &InboundMessage) -> Result<Option<String>, DispatchError> {
        match self.router.route(message) {
            Route::Ignore => {
                debug!("Ignoring message in chat {}", message.chat_id);
                Ok(None)
            }
            Route::Command(command) => {
                info!("User {} command {:?}", message.user_id, command);
                Ok(Some(command.reply(message.first_name.as_deref())))
            }
            Route::Dispatch(text) => {
                info!(
                    "User {} ({}) in {:?}: {}",
                    message.user_id, message.chat_id, message.chat_kind, text
                );
                let outcome = self.dispatcher.handle(&message.user_id, &text).await?;
                Ok(Some(outcome.reply()))
            }
        }
    }
}

pub struct Bot {
    telegram: Arc<TelegramClient>,
    handler: Arc<MessageHandler>,
    poll_timeout_secs: u64,
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl Bot {
    pub fn new(
        telegram: TelegramClient,
        handler: MessageHandler,
        poll_timeout_secs: u64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            telegram: Arc::new(telegram),
            handler: Arc::new(handler),
            poll_timeout_secs,
            shutdown,
            tracker: TaskTracker::new(),
        }
    }

    /// Clear the webhook, then long-poll until shutdown. In-flight message
    /// tasks are awaited before returning.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Clearing webhooks...");
        self.telegram.delete_webhook(true).await?;
        info!("Polling...");

        let mut offset: Option<i64> = None;
        loop {
            let polled = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                polled = self.telegram.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        if let Some(message) = update.into_inbound() {
                            self.spawn_message(message);
                        }
                    }
                }
                Err(e) => {
                    warn!("getUpdates failed: {} (retrying in {:?})", e, POLL_ERROR_DELAY);
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_ERROR_DELAY) => {}
                    }
                }
            }
        }

        self.tracker.close();
        info!("Waiting for {} in-flight messages", self.tracker.len());
        self.tracker.wait().await;
        info!("Bot stopped");
        Ok(())
    }

    fn spawn_message(&self, message: InboundMessage) {
        let telegram = self.telegram.clone();
        let handler = self.handler.clone();
        self.tracker.spawn(async move {
            match handler.process(&message).await {
                Ok(Some(reply)) => {
                    if let Err(e) = telegram.send_message(message.chat_id, &reply).await {
                        report_error(&message, &e);
                    }
                }
                Ok(None) => {}
                Err(e) => report_error(&message, &e),
            }
        });
    }
}

/// The single sink for per-message failures. The user gets no reply.
fn report_error(message: &InboundMessage, error: &dyn std::fmt::Display) {
    error!(
        "Message from user {} in chat {} caused error {}",
        message.user_id, message.chat_id, error
    );
}

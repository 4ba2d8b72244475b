//! MockProvider: deterministic oracle responses for testing
//!
//! Implements `LlmProvider` with canned behaviors so the extractor and the
//! dispatcher can be exercised without network access.

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::types::{LlmRequest, StreamDelta};
use async_stream::stream;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

/// Mock behavior configuration
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Return a text-only response
    Text(String),
    /// Return a tool_use call with given name and args
    ToolCall { name: String, args: Value },
    /// Return an error before streaming starts
    Error(String),
    /// Never answer until cancelled
    Stall,
    /// Wait for the gate to open, then answer with the inner behavior
    Gated { gate: Arc<Notify>, then: Box<MockBehavior> },
}

/// A sequence of behaviors; each call to complete_stream pops the next one.
/// If the sequence is exhausted, the default behavior is used.
pub struct MockProvider {
    behaviors: Mutex<Vec<MockBehavior>>,
    default_behavior: MockBehavior,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    /// Create a mock that always returns the same behavior
    pub fn constant(behavior: MockBehavior) -> Self {
        Self {
            behaviors: Mutex::new(Vec::new()),
            default_behavior: behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock with a sequence of behaviors (consumed in order)
    pub fn sequence(behaviors: Vec<MockBehavior>) -> Self {
        Self {
            behaviors: Mutex::new(behaviors),
            default_behavior: MockBehavior::Text("(mock: sequence exhausted)".into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a free-text oracle reply
    pub fn text(reply: impl Into<String>) -> Self {
        Self::constant(MockBehavior::Text(reply.into()))
    }

    /// Get the number of calls made
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Requests received so far, oldest first
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_behavior(&self) -> MockBehavior {
        let mut behaviors = self.behaviors.lock().await;
        if behaviors.is_empty() {
            self.default_behavior.clone()
        } else {
            behaviors.remove(0)
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str { "mock" }

    fn models(&self) -> &[&str] { &["mock"] }

    fn supports_model(&self, _model: &str) -> bool { true }

    async fn complete_stream(
        &self,
        request: LlmRequest,
        cancel: Option<CancellationToken>,
    ) -> LlmResult<LlmStream> {
        self.requests.lock().await.push(request);
        let cancel = cancel.unwrap_or_else(CancellationToken::new);

        let mut behavior = self.next_behavior().await;
        while let MockBehavior::Gated { gate, then } = behavior {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LlmError::Cancelled),
                _ = gate.notified() => {}
            }
            behavior = *then;
        }

        match behavior {
            MockBehavior::Error(message) => Err(LlmError::RequestFailed(message)),
            MockBehavior::Stall => {
                cancel.cancelled().await;
                Err(LlmError::Cancelled)
            }
            MockBehavior::Text(text) => Ok(Box::pin(stream! {
                // Stream text in chunks like a real LLM
                let chars: Vec<char> = text.chars().collect();
                for chunk in chars.chunks(20) {
                    yield Ok::<_, LlmError>(StreamDelta::Text(chunk.iter().collect()));
                }
                yield Ok(StreamDelta::Done { stop_reason: Some("end_turn".into()), usage: None });
            })),
            MockBehavior::ToolCall { name, args } => Ok(Box::pin(stream! {
                let id = "toolu_mock_1".to_string();
                yield Ok::<_, LlmError>(StreamDelta::ToolCallStart { id: id.clone(), name });
                yield Ok(StreamDelta::ToolCallDelta { id: id.clone(), arguments: args.to_string() });
                yield Ok(StreamDelta::ToolCallEnd { id });
                yield Ok(StreamDelta::Done { stop_reason: Some("tool_use".into()), usage: None });
            })),
            MockBehavior::Gated { .. } => unreachable!("gates are unwrapped above"),
        }
    }
}

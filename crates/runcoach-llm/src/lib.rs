//! Runcoach LLM - Oracle provider adapters with streaming support

pub mod anthropic;
pub mod collect;
pub mod mock;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use collect::{collect, CompletedResponse};
pub use provider::{LlmError, LlmProvider, LlmResult, LlmStream};
pub use tokio_util::sync::CancellationToken;
pub use types::*;

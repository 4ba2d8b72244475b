//! Fold a delta stream into one completed response

use crate::provider::{LlmError, LlmResult, LlmStream};
use crate::types::{AccumulatedToolCall, StreamDelta, Usage};
use futures::StreamExt;

/// Everything the oracle said in one turn
#[derive(Clone, Debug, Default)]
pub struct CompletedResponse {
    pub text: String,
    pub tool_calls: Vec<AccumulatedToolCall>,
    pub stop_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl CompletedResponse {
    /// First call to the named tool, if the model made one.
    pub fn tool_call(&self, name: &str) -> Option<&AccumulatedToolCall> {
        self.tool_calls.iter().find(|tc| tc.name == name)
    }
}

/// Drain the stream. The first error, in-band or out-of-band, ends the turn.
pub async fn collect(stream: LlmStream) -> LlmResult<CompletedResponse> {
    let mut response = CompletedResponse::default();
    let mut current_tool: Option<AccumulatedToolCall> = None;

    tokio::pin!(stream);

    while let Some(delta) = stream.next().await {
        match delta? {
            StreamDelta::Text(text) => response.text.push_str(&text),
            StreamDelta::ToolCallStart { id, name } => {
                current_tool = Some(AccumulatedToolCall { id, name, arguments: String::new() });
            }
            StreamDelta::ToolCallDelta { arguments, .. } => {
                if let Some(ref mut tool) = current_tool { tool.arguments.push_str(&arguments); }
            }
            StreamDelta::ToolCallEnd { .. } => {
                if let Some(tool) = current_tool.take() { response.tool_calls.push(tool); }
            }
            StreamDelta::Done { stop_reason, usage } => {
                response.stop_reason = stop_reason;
                response.usage = usage;
            }
            StreamDelta::Error(e) => return Err(LlmError::StreamError(e)),
        }
    }

    // A stream cut off mid tool call still carries usable arguments.
    if let Some(tool) = current_tool.take() {
        response.tool_calls.push(tool);
    }

    Ok(response)
}

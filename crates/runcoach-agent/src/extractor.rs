//! Intent extractor: one oracle call per message
//!
//! The request offers a single `record_intent` tool and forces the oracle to
//! call it, so the normal answer is a tool call whose arguments follow the
//! tool's schema. Replies that come back as free text instead are scanned for
//! the outermost `{ ... }` span, which is parsed as the result.

use crate::error::ExtractError;
use crate::prompt::{classification_prompt, INTENT_TOOL_NAME};
use chrono::NaiveDate;
use runcoach_core::IntentResult;
use runcoach_llm::{
    collect, CompletedResponse, LlmMessage, LlmProvider, LlmRequest, LlmTool, ToolChoice,
    DEFAULT_MODEL,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Longest slice of a bad reply kept in an error.
const REPLY_EXCERPT_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ExtractorConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on one oracle round trip, streaming included.
    pub timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct IntentExtractor {
    provider: Arc<dyn LlmProvider>,
    config: ExtractorConfig,
    cancel: CancellationToken,
}

impl IntentExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ExtractorConfig) -> Self {
        Self {
            provider,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort in-flight oracle calls when `cancel` fires (shutdown).
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Classify one message. `today` is embedded in the instruction so the
    /// oracle can resolve a missing or relative date.
    pub async fn classify(&self, text: &str, today: NaiveDate) -> Result<IntentResult, ExtractError> {
        let request = LlmRequest {
            model: self.config.model.clone(),
            messages: vec![LlmMessage::user(text)],
            system: Some(classification_prompt(today)),
            tools: Some(vec![intent_tool()]),
            tool_choice: Some(ToolChoice::tool(INTENT_TOOL_NAME)),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(0.0),
        };

        let call = async {
            let stream = self
                .provider
                .complete_stream(request, Some(self.cancel.clone()))
                .await?;
            collect(stream).await
        };

        let response = tokio::time::timeout(self.config.timeout, call)
            .await
            .map_err(|_| ExtractError::Timeout(self.config.timeout))??;

        debug!(
            "Oracle reply: {} chars text, {} tool calls, stop_reason={:?}",
            response.text.len(),
            response.tool_calls.len(),
            response.stop_reason
        );

        parse_response(&response)
    }
}

/// Turn an oracle reply into a result: tool call arguments first, free text second.
pub fn parse_response(response: &CompletedResponse) -> Result<IntentResult, ExtractError> {
    if let Some(call) = response.tool_call(INTENT_TOOL_NAME) {
        let args = call.parse_arguments()?;
        return Ok(serde_json::from_value(args)?);
    }
    let object = extract_braced_object(&response.text)?;
    Ok(serde_json::from_str(object)?)
}

/// The span from the first `{` to the last `}`, both included.
pub fn extract_braced_object(raw: &str) -> Result<&str, ExtractError> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(ExtractError::NoStructuredObject {
            reply: raw.chars().take(REPLY_EXCERPT_CHARS).collect(),
        }),
    }
}

/// Schema of the forced tool call; mirrors `IntentResult`.
pub fn intent_tool() -> LlmTool {
    LlmTool {
        name: INTENT_TOOL_NAME.to_string(),
        description: "Record the classified intent of the user's message and any run details in it.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "intent": {
                    "type": "string",
                    "enum": ["log_run", "analyze_progress", "unknown"]
                },
                "activity": {
                    "type": ["string", "null"],
                    "description": "Kind of activity, e.g. running"
                },
                "distance_km": {
                    "type": ["number", "null"],
                    "description": "Distance in kilometers"
                },
                "date": {
                    "type": ["string", "null"],
                    "description": "Date of the activity, YYYY-MM-DD"
                },
                "request_language": {
                    "type": ["string", "null"],
                    "description": "Language of the user's message"
                }
            },
            "required": ["intent", "activity", "distance_km", "date", "request_language"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runcoach_core::Intent;
    use runcoach_llm::AccumulatedToolCall;

    #[test]
    fn braced_object_in_prose() {
        let raw = "Sure! Here you go:\n```json\n{\"intent\": \"unknown\"}\n```\nAnything else?";
        assert_eq!(extract_braced_object(raw).unwrap(), "{\"intent\": \"unknown\"}");
    }

    #[test]
    fn braced_object_spans_first_to_last_brace() {
        let raw = "{\"a\": {\"b\": 1}} trailing } brace";
        assert_eq!(extract_braced_object(raw).unwrap(), "{\"a\": {\"b\": 1}} trailing }");
    }

    #[test]
    fn braced_object_missing_braces() {
        assert!(matches!(
            extract_braced_object("no json here"),
            Err(ExtractError::NoStructuredObject { .. })
        ));
        assert!(extract_braced_object("only { open").is_err());
        assert!(extract_braced_object("only } close").is_err());
        assert!(extract_braced_object("} backwards {").is_err());
    }

    #[test]
    fn no_object_error_keeps_short_excerpt() {
        let raw = "x".repeat(1000);
        match extract_braced_object(&raw) {
            Err(ExtractError::NoStructuredObject { reply }) => {
                assert_eq!(reply.len(), REPLY_EXCERPT_CHARS)
            }
            other => panic!("Expected NoStructuredObject, got {:?}", other),
        }
    }

    #[test]
    fn parse_prefers_tool_call() {
        let response = CompletedResponse {
            text: "{\"intent\": \"unknown\"}".into(),
            tool_calls: vec![AccumulatedToolCall {
                id: "toolu_1".into(),
                name: INTENT_TOOL_NAME.into(),
                arguments: r#"{"intent":"log_run","distance_km":5,"date":"2024-05-01"}"#.into(),
            }],
            ..Default::default()
        };
        let result = parse_response(&response).unwrap();
        assert_eq!(result.intent, Intent::LogRun);
        assert_eq!(result.distance_km, Some(serde_json::json!(5)));
    }

    #[test]
    fn parse_malformed_tool_arguments() {
        let response = CompletedResponse {
            tool_calls: vec![AccumulatedToolCall {
                id: "toolu_1".into(),
                name: INTENT_TOOL_NAME.into(),
                arguments: r#"{"intent": "log_"#.into(),
            }],
            ..Default::default()
        };
        assert!(matches!(parse_response(&response), Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn parse_malformed_braced_text() {
        let response = CompletedResponse {
            text: "{intent: log_run}".into(),
            ..Default::default()
        };
        assert!(matches!(parse_response(&response), Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn tool_schema_lists_every_field() {
        let tool = intent_tool();
        let props = tool.input_schema["properties"].as_object().unwrap();
        for key in ["intent", "activity", "distance_km", "date", "request_language"] {
            assert!(props.contains_key(key), "missing {}", key);
        }
    }
}

//! Classification results and journal entries
//!
//! `IntentResult` is what the oracle hands back for one message. It is never
//! persisted; only a `LogEntry` built from a `log_run` result reaches disk.
//! Everything except the intent is kept as raw JSON: whatever the oracle
//! returned for distance and date is what gets stored, and the other fields
//! are carried along unread.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Classified purpose of a message
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    LogRun,
    /// Recognized but not yet supported; no analysis is performed.
    AnalyzeProgress,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LogRun => "log_run",
            Intent::AnalyzeProgress => "analyze_progress",
            Intent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of classifying one message
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct IntentResult {
    #[serde(default, deserialize_with = "intent_or_unknown")]
    pub intent: Intent,
    #[serde(default)]
    pub activity: Option<Value>,
    #[serde(default)]
    pub distance_km: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub request_language: Option<Value>,
}

// Anything but one of the known names (null, numbers, objects) is "unknown".
fn intent_or_unknown<'de, D>(deserializer: D) -> Result<Intent, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl IntentResult {
    pub fn with_intent(intent: Intent) -> Self {
        Self {
            intent,
            ..Default::default()
        }
    }

    /// Build the journal entry for a `log_run` result. Missing fields become `null`.
    pub fn to_log_entry(&self) -> LogEntry {
        LogEntry {
            date: self.date.clone().unwrap_or(Value::Null),
            distance_km: self.distance_km.clone().unwrap_or(Value::Null),
        }
    }
}

/// One recorded run. Immutable once appended.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub distance_km: Value,
}

impl LogEntry {
    pub fn new(date: impl Into<Value>, distance_km: impl Into<Value>) -> Self {
        Self {
            date: date.into(),
            distance_km: distance_km.into(),
        }
    }
}

/// Render an unvalidated scalar for a chat reply.
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "unknown".to_string(),
        other => other.to_string(),
    }
}

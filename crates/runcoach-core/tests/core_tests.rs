//! Tests for runcoach-core: identities, intent parsing, journal entries, errors

use runcoach_core::*;
use serde_json::json;

// ===========================================================================
// UserId
// ===========================================================================

#[test]
fn user_id_new_and_display() {
    let id = UserId::new("12345");
    assert_eq!(id.as_str(), "12345");
    assert_eq!(format!("{}", id), "12345");
}

#[test]
fn user_id_from_numeric_transport_id() {
    let id: UserId = 987654321_i64.into();
    assert_eq!(id.as_str(), "987654321");
    assert_eq!(id, UserId::from("987654321"));
}

#[test]
fn user_id_equality_and_hash() {
    use std::collections::HashSet;
    let a = UserId::new("same");
    let b = UserId::new("same");
    let c = UserId::new("other");
    let mut set = HashSet::new();
    set.insert(a.clone());
    assert!(set.contains(&b));
    assert!(!set.contains(&c));
}

// ===========================================================================
// ChatKind
// ===========================================================================

#[test]
fn chat_kind_serde_lowercase() {
    let kind: ChatKind = serde_json::from_str(r#""supergroup""#).unwrap();
    assert_eq!(kind, ChatKind::Supergroup);
    assert_eq!(serde_json::to_string(&ChatKind::Private).unwrap(), r#""private""#);
}

#[test]
fn chat_kind_multi_party() {
    assert!(ChatKind::Group.is_multi_party());
    assert!(ChatKind::Supergroup.is_multi_party());
    assert!(!ChatKind::Private.is_multi_party());
    assert!(!ChatKind::Channel.is_multi_party());
}

// ===========================================================================
// Intent
// ===========================================================================

#[test]
fn intent_known_values() {
    let i: Intent = serde_json::from_str(r#""log_run""#).unwrap();
    assert_eq!(i, Intent::LogRun);
    let i: Intent = serde_json::from_str(r#""analyze_progress""#).unwrap();
    assert_eq!(i, Intent::AnalyzeProgress);
    let i: Intent = serde_json::from_str(r#""unknown""#).unwrap();
    assert_eq!(i, Intent::Unknown);
}

#[test]
fn intent_unrecognized_value_is_unknown() {
    let i: Intent = serde_json::from_str(r#""order_pizza""#).unwrap();
    assert_eq!(i, Intent::Unknown);
}

#[test]
fn intent_display_matches_wire_name() {
    assert_eq!(Intent::LogRun.to_string(), "log_run");
    assert_eq!(
        serde_json::to_string(&Intent::AnalyzeProgress).unwrap(),
        r#""analyze_progress""#
    );
}

// ===========================================================================
// IntentResult
// ===========================================================================

#[test]
fn intent_result_full_object() {
    let r: IntentResult = serde_json::from_value(json!({
        "intent": "log_run",
        "activity": "running",
        "distance_km": 5,
        "date": "2024-05-01",
        "request_language": "en"
    }))
    .unwrap();
    assert_eq!(r.intent, Intent::LogRun);
    assert_eq!(r.activity, Some(json!("running")));
    assert_eq!(r.distance_km, Some(json!(5)));
    assert_eq!(r.date, Some(json!("2024-05-01")));
    assert_eq!(r.request_language, Some(json!("en")));
}

#[test]
fn intent_result_nulls_and_missing_fields() {
    let r: IntentResult = serde_json::from_value(json!({
        "intent": null,
        "distance_km": null
    }))
    .unwrap();
    assert_eq!(r.intent, Intent::Unknown);
    assert!(r.distance_km.is_none());
    assert!(r.date.is_none());
    assert!(r.activity.is_none());
}

#[test]
fn intent_result_non_string_intent_is_unknown() {
    for intent in [json!(7), json!(true), json!(["log_run"]), json!({"name": "log_run"})] {
        let r: IntentResult = serde_json::from_value(json!({
            "intent": intent,
            "distance_km": 5
        }))
        .unwrap();
        assert_eq!(r.intent, Intent::Unknown);
    }
}

#[test]
fn intent_result_passes_through_odd_side_fields() {
    let r: IntentResult = serde_json::from_value(json!({
        "intent": "log_run",
        "activity": 1,
        "distance_km": 5,
        "date": "2024-05-01",
        "request_language": ["en"]
    }))
    .unwrap();
    assert_eq!(r.intent, Intent::LogRun);
    assert_eq!(r.activity, Some(json!(1)));
    assert_eq!(r.request_language, Some(json!(["en"])));
}

#[test]
fn intent_result_keeps_unvalidated_distance() {
    let r: IntentResult = serde_json::from_value(json!({
        "intent": "log_run",
        "distance_km": "five-ish",
        "date": "yesterday"
    }))
    .unwrap();
    let entry = r.to_log_entry();
    assert_eq!(entry.distance_km, json!("five-ish"));
    assert_eq!(entry.date, json!("yesterday"));
}

#[test]
fn log_entry_from_result_fills_nulls() {
    let entry = IntentResult::with_intent(Intent::LogRun).to_log_entry();
    assert_eq!(entry.date, serde_json::Value::Null);
    assert_eq!(entry.distance_km, serde_json::Value::Null);
}

// ===========================================================================
// LogEntry
// ===========================================================================

#[test]
fn log_entry_wire_shape() {
    let entry = LogEntry::new("2024-05-01", 5);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json, json!({"date": "2024-05-01", "distance_km": 5}));
}

#[test]
fn display_scalar_variants() {
    assert_eq!(display_scalar(&json!(5)), "5");
    assert_eq!(display_scalar(&json!(5.5)), "5.5");
    assert_eq!(display_scalar(&json!("10")), "10");
    assert_eq!(display_scalar(&serde_json::Value::Null), "unknown");
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn error_display() {
    let e = Error::missing_secret("TELEGRAM_BOT_TOKEN");
    assert_eq!(e.to_string(), "missing secret: TELEGRAM_BOT_TOKEN");
    let e = Error::transport("bad gateway");
    assert_eq!(e.to_string(), "transport error: bad gateway");
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let e: Error = io.into();
    assert!(e.to_string().starts_with("io error:"));
}

//! Instruction sent to the oracle with every message

use chrono::NaiveDate;

/// Name of the tool the oracle is forced to call.
pub const INTENT_TOOL_NAME: &str = "record_intent";

/// System prompt for one classification. `today` is the only variable part;
/// the oracle uses it to fill in the date when the user gives none.
pub fn classification_prompt(today: NaiveDate) -> String {
    format!(
        "You are the assistant behind a running coach chat bot.\n\n\
         Decide what the user's message is about:\n\
         - Logging a run: set intent to \"log_run\" and extract the activity, \
           the distance in kilometers, and the date in YYYY-MM-DD format. \
           If no date is given, use today's date. Today is {today}.\n\
         - Asking for an analysis of their progress: set intent to \"analyze_progress\".\n\
         - Anything else: set intent to \"unknown\".\n\n\
         Also report the language the message is written in.\n\
         Answer by calling the {tool} tool. If you cannot call it, reply with \
         exactly one JSON object with the keys intent, activity, distance_km, \
         date and request_language. Use null for fields that do not apply.",
        today = today.format("%Y-%m-%d"),
        tool = INTENT_TOOL_NAME,
    )
}

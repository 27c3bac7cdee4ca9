use chrono::Utc;

/// The order id sent to the processor with each invoice: `{user_id}-{unix_millis}`.
pub fn new_order_id(user_id: &str) -> String {
    format!("{user_id}-{}", Utc::now().timestamp_millis())
}

/// Identifies one webhook event. The same correlation id reporting the same status is the same event, however often
/// it is delivered.
pub fn webhook_event_key(correlation_id: &str, status: &str) -> String {
    format!("{}:{}", correlation_id.trim(), status.trim()).to_lowercase()
}

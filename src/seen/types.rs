use chrono::{DateTime, Utc};

/// Last-activity record for a nick. Nicks are case-sensitive keys, stored
/// exactly as they appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRecord {
    pub who: String,
    pub last_seen_at: DateTime<Utc>,
    pub last_message: String,
}

impl SeenRecord {
    pub fn new(who: impl Into<String>, last_message: impl Into<String>) -> Self {
        Self {
            who: who.into(),
            last_seen_at: Utc::now(),
            last_message: last_message.into(),
        }
    }
}

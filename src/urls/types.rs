use chrono::{DateTime, Utc};

/// A cached page title, keyed by the URL exactly as it was matched in the
/// message text. No normalization: `http://a/x` and `http://a/x?y` cache
/// separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    pub title: String,
    /// Nick that most recently posted the URL.
    pub who: String,
    pub posted_at: DateTime<Utc>,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, who: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            who: who.into(),
            posted_at: Utc::now(),
        }
    }
}

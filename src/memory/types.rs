//! Conversation turn type shared by the thread buffer, the durable store, and recall.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Author label used for language-model replies.
pub const ASSISTANT_AUTHOR: &str = "assistant";

/// One timestamped conversation entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Free-text author identifier, e.g. `"user"` or `"assistant"`.
    pub author: String,
    /// The message text.
    pub content: String,
    /// UTC creation time.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(author: impl Into<String>, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Fixed-width RFC 3339 rendering with nanosecond precision, used as the stored form.
    /// Equal width keeps lexicographic order identical to time order.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Parse a timestamp written by [`Turn::timestamp_rfc3339`].
    pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
    }
}

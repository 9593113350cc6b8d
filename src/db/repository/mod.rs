//! Repository layer: conversation-scoped database operations.

mod conversation;
mod mood;

pub use conversation::*;
pub use mood::*;

use chrono::{DateTime, SecondsFormat, Utc};

use super::DatabaseError;

/// Timestamps are stored as RFC 3339 with full precision so that a
/// stored message reads back identical.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw:?}: {e}")))
}

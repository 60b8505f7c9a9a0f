//! Calendar events produced by the release pipeline.

use chrono::{DateTime, Utc};

/// One output event. Built once by [`crate::schedule`] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseEvent {
    /// Deterministic across runs for the same date (or title)
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// DTSTAMP
    pub created: DateTime<Utc>,
}

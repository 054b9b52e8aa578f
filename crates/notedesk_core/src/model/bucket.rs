//! Age bucket selector for note listing.
//!
//! # Invariants
//! - `archive` selects archived notes regardless of age.
//! - `alltime` selects active notes regardless of age.
//! - Windowed buckets select active notes with `now - created_at < window`.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Thirty days in milliseconds.
pub const MONTH_WINDOW_MS: i64 = 2_592_000_000;
/// Ninety days in milliseconds.
pub const THREE_MONTHS_WINDOW_MS: i64 = 3 * MONTH_WINDOW_MS;

/// Named recency/state filter over a user's notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "alltime")]
    AllTime,
    #[serde(rename = "archive")]
    Archive,
}

/// Raised for selectors outside the known bucket set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown age bucket `{0}`; expected 1month|3months|alltime|archive")]
pub struct UnknownBucket(pub String);

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::OneMonth,
        AgeBucket::ThreeMonths,
        AgeBucket::AllTime,
        AgeBucket::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3months",
            Self::AllTime => "alltime",
            Self::Archive => "archive",
        }
    }

    /// Recency window, `None` for age-independent buckets.
    pub fn window_ms(self) -> Option<i64> {
        match self {
            Self::OneMonth => Some(MONTH_WINDOW_MS),
            Self::ThreeMonths => Some(THREE_MONTHS_WINDOW_MS),
            Self::AllTime | Self::Archive => None,
        }
    }

    /// Archived flag value this bucket selects.
    pub fn archived(self) -> bool {
        matches!(self, Self::Archive)
    }

    /// Exclusive lower bound for `created_at` at `now_ms`.
    ///
    /// `created_at > cutoff` is the same rule as `now - created_at < window`.
    pub fn cutoff_ms(self, now_ms: i64) -> Option<i64> {
        self.window_ms()
            .map(|window| now_ms.saturating_sub(window))
    }

    /// In-memory form of the bucket predicate.
    pub fn matches(self, note: &Note, now_ms: i64) -> bool {
        if note.archived != self.archived() {
            return false;
        }
        match self.window_ms() {
            Some(window) => now_ms.saturating_sub(note.created_at) < window,
            None => true,
        }
    }
}

impl FromStr for AgeBucket {
    type Err = UnknownBucket;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1month" => Ok(Self::OneMonth),
            "3months" => Ok(Self::ThreeMonths),
            "alltime" => Ok(Self::AllTime),
            "archive" => Ok(Self::Archive),
            other => Err(UnknownBucket(other.to_string())),
        }
    }
}

impl Display for AgeBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

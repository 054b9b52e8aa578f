//! Fixed-size pagination for note listing.

use serde::{Deserialize, Serialize};

/// Number of notes per listing page.
pub const PAGE_SIZE: u32 = 10;

/// 1-based page number, always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Page(u32);

impl Page {
    pub const FIRST: Page = Page(1);

    /// Clamps numbers below 1 to the first page.
    pub fn new(number: i64) -> Self {
        let clamped = number.clamp(1, i64::from(u32::MAX));
        Self(u32::try_from(clamped).unwrap_or(1))
    }

    /// Parses a raw request value; absent or non-numeric input is page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map_or(Self::FIRST, Self::new)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Rows skipped before this page: `(page - 1) * PAGE_SIZE`.
    pub fn offset(self) -> u64 {
        u64::from(self.0.saturating_sub(1)) * u64::from(PAGE_SIZE)
    }

    pub fn limit(self) -> u32 {
        PAGE_SIZE
    }

    /// Heuristic "more pages may exist": the page came back full.
    ///
    /// Does not count rows; a full last page still reports `true`.
    pub fn has_more(returned: usize) -> bool {
        returned == PAGE_SIZE as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

//! # Pagination
//!
//! Window selection over an address's transaction log.
//!
//! Pagination inputs are never rejected: negative limits mean "everything",
//! negative offsets clamp to zero, and windows running past the end of the
//! log are shortened.

use std::ops::Range;

/// A `(limit, offset)` request as received from the API layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    /// Maximum entries to return; negative for no limit.
    pub limit: i64,
    /// Entries to skip from the start of the log; negative clamps to zero.
    pub offset: i64,
}

impl Page {
    /// The whole log.
    pub const ALL: Page = Page {
        limit: -1,
        offset: 0,
    };

    /// Create a page request.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Index range this page selects from a log of `len` entries.
    ///
    /// Always a valid (possibly empty) sub-range of `0..len`.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset.max(0)).unwrap_or(usize::MAX);
        if start >= len {
            return len..len;
        }

        let remaining = len - start;
        let take = if self.limit < 0 {
            remaining
        } else {
            usize::try_from(self.limit)
                .unwrap_or(usize::MAX)
                .min(remaining)
        };
        start..start + take
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::ALL
    }
}

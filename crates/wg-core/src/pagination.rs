//! # Comment Pagination
//!
//! Comment threads are read in fixed pages of [`COMMENTS_PER_PAGE`], newest first.
//! Page numbers are zero-based and never negative.

use crate::error::AppError;

pub const COMMENTS_PER_PAGE: u32 = 10;

/// A validated, zero-based comment page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CommentPage(u32);

impl CommentPage {
    pub const FIRST: CommentPage = CommentPage(0);

    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Parses a page number taken from a URL segment.
    /// Negative or non-numeric input is rejected rather than clamped.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        raw.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| AppError::Validation(format!("Invalid page number: {}", raw)))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Index of the first comment on this page.
    pub fn offset(self) -> u64 {
        u64::from(self.0) * u64::from(COMMENTS_PER_PAGE)
    }

    pub fn limit(self) -> u64 {
        u64::from(COMMENTS_PER_PAGE)
    }

    /// Index one past the last comment on this page.
    pub fn end(self) -> u64 {
        self.offset() + self.limit()
    }

    /// True when this page reaches or passes the end of `total` comments.
    /// `total` must be a fresh count, not one remembered from an earlier page.
    pub fn is_last(self, total: u64) -> bool {
        self.end() >= total
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Stays on the first page instead of going negative.
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    pub fn is_first(self) -> bool {
        self.0 == 0
    }
}

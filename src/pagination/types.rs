//! Pagination types
//!
//! Cursor normalization and iteration control.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an empty-but-present cursor string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorPolicy {
    /// Empty and absent cursors both mean "no more pages"
    #[default]
    #[serde(rename = "end")]
    EmptyIsEnd,
    /// An empty string returned by the service is a real token
    #[serde(rename = "token")]
    EmptyIsToken,
}

/// Opaque continuation token
///
/// Only constructed through [`Cursor::normalize`] or [`Cursor::new`], so a
/// `Some(Cursor)` always means "more pages may exist".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token as-is
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Turn a raw cursor field into a continuation, applying the policy
    pub fn normalize(raw: Option<&str>, policy: CursorPolicy) -> Option<Self> {
        match (raw, policy) {
            (None, _) => None,
            (Some(""), CursorPolicy::EmptyIsEnd) => None,
            (Some(token), _) => Some(Self(token.to_string())),
        }
    }

    /// Borrow the token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the token
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether the invoker keeps following cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationControl {
    /// Follow cursors until exhaustion
    Auto,
    /// Fetch exactly one page and hand the cursor back
    Manual,
}

impl IterationControl {
    /// Derive the mode from caller controls
    ///
    /// Auto-iteration is on unless the caller asked for a manual page or
    /// supplied a starting cursor of their own.
    pub fn from_controls(controls: &PageControls) -> Self {
        if controls.manual_page || controls.starting_cursor.is_some() {
            Self::Manual
        } else {
            Self::Auto
        }
    }

    /// Check if this is auto-iteration
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// Caller-facing paging controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageControls {
    /// Resume token from a previous manual page
    pub starting_cursor: Option<String>,
    /// Disable auto-iteration
    pub manual_page: bool,
    /// Advisory page size, passed through unchanged on every call
    pub page_size: Option<u32>,
}

impl PageControls {
    /// Create default controls (auto-iterate from the first page)
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a cursor
    #[must_use]
    pub fn with_starting_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.starting_cursor = Some(cursor.into());
        self
    }

    /// Fetch a single page
    #[must_use]
    pub fn with_manual_page(mut self, manual: bool) -> Self {
        self.manual_page = manual;
        self
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Resolve the iteration mode
    pub fn iteration(&self) -> IterationControl {
        IterationControl::from_controls(self)
    }

    /// The cursor for the first call, normalized
    pub fn initial_cursor(&self, policy: CursorPolicy) -> Option<Cursor> {
        Cursor::normalize(self.starting_cursor.as_deref(), policy)
    }
}

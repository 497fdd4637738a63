//! User-visible outcomes a front end renders
//!
//! The session keeps the latest status label and banner itself and also
//! pushes every change as a [`SessionEvent`] to an optional channel.

use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// A dismissible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub shown_at: Instant,
    /// Success banners dismiss themselves after this long
    pub auto_dismiss: Option<Duration>,
}

impl Banner {
    pub fn success(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
            shown_at: Instant::now(),
            auto_dismiss: Some(ttl),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
            shown_at: Instant::now(),
            auto_dismiss: None,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self.auto_dismiss {
            Some(ttl) => now.saturating_duration_since(self.shown_at) < ttl,
            None => true,
        }
    }
}

/// Status label shown next to the loaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    ReadyToSort,
    SortedSuccessfully,
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::ReadyToSort => f.write_str("Ready to sort"),
            StatusLabel::SortedSuccessfully => f.write_str("Sorted successfully"),
        }
    }
}

/// Change notifications emitted by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Busy indicator toggled around decode, sort and serialization
    Busy(bool),
    /// A file passed validation
    FileDetails { file_name: String, row_count: usize },
    Status(StatusLabel),
    Banner(Banner),
    BannerDismissed,
    Reset,
}

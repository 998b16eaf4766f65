use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::Result;
use crate::copier::CopyStats;
use crate::scanner::RelativePath;

/// Fields handed to the progress renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Totals since the process started
    pub global: CopyStats,
    /// Totals since the current destination was selected
    pub local: CopyStats,
    pub elapsed: Duration,
    /// Path being copied, if any
    pub current: Option<RelativePath>,
}

/// Renders progress, typically as a single overwritten status line
pub trait ProgressSink {
    fn update(&mut self, snapshot: &ProgressSnapshot);

    /// The status line is done; anything printed next starts on a fresh line
    fn finish(&mut self) {}
}

/// Discards all progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _snapshot: &ProgressSnapshot) {}
}

/// Context for asking the user where to continue after a disk-full error
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    /// Destination that ran out of space, offered as the editable default
    pub current: &'a Path,
    /// File that did not fit and will be retried
    pub failed: &'a str,
    /// Record saved before prompting, if any
    pub record: Option<&'a Path>,
}

/// Asks for a replacement destination.
///
/// Returns [`crate::SpanError::PromptCancelled`] when the user declines to
/// continue; any other error aborts the run.
pub trait DestinationPrompt {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Result<PathBuf>;
}

/// Limits how often a [`ProgressSink`] is called
#[derive(Debug)]
pub(crate) struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub(crate) fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

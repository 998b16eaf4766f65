use std::sync::{Condvar, Mutex, MutexGuard};

use super::source::RelativePath;
use crate::interrupt::Interrupts;

/// Terminal state of the scanner, set exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Running,
    Done,
    Failed(String),
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Running)
    }
}

/// What the copier should do at a given cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// A path is available at the cursor
    Path(RelativePath),
    /// Scan finished and the cursor has caught up
    Finished,
    /// Scan failed and the cursor has caught up
    Failed(String),
    /// An interrupt is pending
    Interrupted,
}

struct QueueState {
    paths: Vec<RelativePath>,
    status: ScanStatus,
}

/// Append-only list of discovered paths shared between the scanner (sole
/// writer) and the copier (sole reader). Entries are never removed or reordered.
pub struct PathQueue {
    state: Mutex<QueueState>,
    changed: Condvar,
}

impl PathQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                paths: Vec::new(),
                status: ScanStatus::Running,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, path: RelativePath) {
        let mut state = self.lock();
        debug_assert!(!state.status.is_terminal(), "push after scan finished");
        state.paths.push(path);
        self.changed.notify_all();
    }

    /// Record the terminal scan status. Only the first call has any effect.
    pub fn finish(&self, status: ScanStatus) {
        let mut state = self.lock();
        if !state.status.is_terminal() {
            state.status = status;
        }
        self.changed.notify_all();
    }

    /// Wake waiters without changing state (used when an interrupt arrives)
    pub fn wake(&self) {
        let _state = self.lock();
        self.changed.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> ScanStatus {
        self.lock().status.clone()
    }

    /// Block until there is a path at `cursor`, the scan is over, or an
    /// interrupt is pending. Interrupts take priority over ready paths.
    pub fn next(&self, cursor: usize, interrupts: &Interrupts) -> Next {
        let mut state = self.lock();
        loop {
            if interrupts.is_pending() {
                return Next::Interrupted;
            }
            if let Some(path) = state.paths.get(cursor) {
                return Next::Path(path.clone());
            }
            match &state.status {
                ScanStatus::Done => return Next::Finished,
                ScanStatus::Failed(msg) => return Next::Failed(msg.clone()),
                ScanStatus::Running => {
                    state = self.changed.wait(state).unwrap_or_else(|e| e.into_inner());
                }
            }
        }
    }

    /// Block until the scanner reaches a terminal status
    pub fn wait_done(&self) -> ScanStatus {
        let mut state = self.lock();
        while !state.status.is_terminal() {
            state = self.changed.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.status.clone()
    }

    /// Copy of every path from `cursor` on, in discovery order
    pub fn remaining_from(&self, cursor: usize) -> Vec<RelativePath> {
        let state = self.lock();
        state.paths.get(cursor..).map(<[_]>::to_vec).unwrap_or_default()
    }
}

impl Default for PathQueue {
    fn default() -> Self {
        Self::new()
    }
}

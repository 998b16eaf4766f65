use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use crate::scanner::PathQueue;

/// Second interrupt within this window after the first aborts the run
pub const GRACE_WINDOW: Duration = Duration::from_secs(2);

/// How an incoming interrupt should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Stop starting copies, finish the scan, save the remaining list
    Drain,
    /// Delete any record this run started writing and exit immediately
    Abort,
}

struct Inner {
    pending: AtomicBool,
    armed_at: Mutex<Option<Instant>>,
    grace: Duration,
    waiters: Mutex<Vec<Weak<PathQueue>>>,
}

/// Cooperative interrupt state shared by the signal handler, the engine and
/// the copier. Checked between files and between buffer chunks.
#[derive(Clone)]
pub struct Interrupts {
    inner: Arc<Inner>,
}

impl Interrupts {
    pub fn new(grace: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: AtomicBool::new(false),
                armed_at: Mutex::new(None),
                grace,
                waiters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register an interrupt. A signal arriving within the grace window of
    /// the previous one escalates to [`Signal::Abort`]; a later one re-arms
    /// the window.
    pub fn raise(&self) -> Signal {
        self.raise_at(Instant::now())
    }

    fn raise_at(&self, now: Instant) -> Signal {
        let signal = {
            let mut armed = self.inner.armed_at.lock().unwrap_or_else(|e| e.into_inner());
            match *armed {
                Some(first) if now.saturating_duration_since(first) <= self.inner.grace => {
                    Signal::Abort
                }
                _ => {
                    *armed = Some(now);
                    Signal::Drain
                }
            }
        };

        self.inner.pending.store(true, Ordering::SeqCst);
        self.wake_waiters();
        signal
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst)
    }

    pub fn grace(&self) -> Duration {
        self.inner.grace
    }

    /// Wake `queue` waiters whenever an interrupt is raised
    pub(crate) fn attach(&self, queue: &Arc<PathQueue>) {
        if let Ok(mut waiters) = self.inner.waiters.lock() {
            waiters.retain(|w| w.strong_count() > 0);
            waiters.push(Arc::downgrade(queue));
        }
    }

    fn wake_waiters(&self) {
        let waiters = match self.inner.waiters.lock() {
            Ok(w) => w.iter().filter_map(Weak::upgrade).collect::<Vec<_>>(),
            Err(_) => return,
        };
        for queue in waiters {
            queue.wake();
        }
    }
}

impl Default for Interrupts {
    fn default() -> Self {
        Self::new(GRACE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_signal_drains() {
        let interrupts = Interrupts::default();
        assert!(!interrupts.is_pending());
        assert_eq!(interrupts.raise(), Signal::Drain);
        assert!(interrupts.is_pending());
    }

    #[test]
    fn test_second_signal_within_window_aborts() {
        let interrupts = Interrupts::default();
        let start = Instant::now();
        assert_eq!(interrupts.raise_at(start), Signal::Drain);
        assert_eq!(
            interrupts.raise_at(start + Duration::from_millis(500)),
            Signal::Abort
        );
    }

    #[test]
    fn test_late_signal_rearms_window() {
        let interrupts = Interrupts::default();
        let start = Instant::now();
        assert_eq!(interrupts.raise_at(start), Signal::Drain);

        let late = start + GRACE_WINDOW + Duration::from_millis(1);
        assert_eq!(interrupts.raise_at(late), Signal::Drain);
        assert_eq!(
            interrupts.raise_at(late + Duration::from_millis(100)),
            Signal::Abort
        );
    }

    #[test]
    fn test_clones_share_state() {
        let interrupts = Interrupts::default();
        let handler_side = interrupts.clone();
        handler_side.raise();
        assert!(interrupts.is_pending());
    }
}

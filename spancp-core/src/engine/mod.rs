mod config;
mod progress;

pub use config::{CopyConfig, DEFAULT_PROGRESS_INTERVAL};
pub use progress::{DestinationPrompt, NoProgress, ProgressSink, ProgressSnapshot, PromptRequest};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::copier::{FileCopier, SessionStats};
use crate::interrupt::Interrupts;
use crate::resume::ResumeStore;
use crate::scanner::{CancellationToken, Next, PathQueue, ScanStatus, Scanner};
use crate::{Result, SpanError};
use progress::Throttle;

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every discovered path was copied (or skipped as missing)
    Completed { stats: SessionStats },
    /// Stopped on user request after saving what was left
    Interrupted {
        stats: SessionStats,
        /// Record written, `None` if nothing was left
        saved: Option<PathBuf>,
        /// Number of paths in the record
        remaining: usize,
        /// Scan status at save time; a failed scan means the record is partial
        scan: ScanStatus,
    },
}

impl RunOutcome {
    pub fn stats(&self) -> SessionStats {
        match self {
            RunOutcome::Completed { stats } | RunOutcome::Interrupted { stats, .. } => *stats,
        }
    }
}

/// Result of the disk-full protocol
enum Recovery {
    /// New destination selected, retry at the same cursor
    Retry,
    /// User declined to continue
    Stop(RunOutcome),
}

/// Drives a background [`Scanner`] and copies what it discovers, one file
/// at a time and in discovery order.
///
/// The first interrupt drains: no new copies start, the scan runs to the
/// end and everything from the cursor on is saved to the [`ResumeStore`].
/// A full destination pauses the run and asks for a new one; the failed
/// file is retried there.
pub struct CopyEngine {
    config: CopyConfig,
    interrupts: Interrupts,
    store: Arc<ResumeStore>,
    destination: PathBuf,
    stats: SessionStats,
    started: Instant,
}

impl CopyEngine {
    pub fn new(config: CopyConfig, interrupts: Interrupts) -> Self {
        let store = Arc::new(ResumeStore::for_source(&config.source, &config.record_dir));
        let destination = config.destination.clone();
        Self {
            config,
            interrupts,
            store,
            destination,
            stats: SessionStats::default(),
            started: Instant::now(),
        }
    }

    /// Shared with the signal handler so a forced abort can discard the record
    pub fn store(&self) -> Arc<ResumeStore> {
        Arc::clone(&self.store)
    }

    /// Current destination root
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn run(
        &mut self,
        copier: &dyn FileCopier,
        prompt: &mut dyn DestinationPrompt,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunOutcome> {
        self.started = Instant::now();
        let cancel_token = CancellationToken::new();
        let (queue, scan_handle) = Scanner::new(self.config.path_source())
            .with_cancellation(cancel_token.clone())
            .scan();
        self.interrupts.attach(&queue);

        info!(
            source = %self.config.source.display(),
            destination = %self.destination.display(),
            "copy started"
        );

        let mut throttle = Throttle::new(self.config.progress_interval);
        // Only moves forward; a disk-full retry leaves it where it is
        let mut cursor = 0usize;
        let result = self.copy_loop(&queue, &mut cursor, copier, prompt, progress, &mut throttle);

        self.report(progress, None);
        progress.finish();

        match &result {
            Ok(_) => {
                // The scan is terminal on every successful path
                let _ = scan_handle.join();
            }
            Err(e) => {
                warn!(error = %e, "copy aborted");
                cancel_token.cancel();
                self.refresh_record(&queue, cursor);
            }
        }

        result
    }

    /// A record saved earlier in this run lists paths copied since; bring it
    /// up to date with `cursor` before giving up.
    fn refresh_record(&self, queue: &PathQueue, cursor: usize) {
        // Only a disk-full save writes before the end, and it drained the scan
        if !self.store.has_written() || !queue.status().is_terminal() {
            return;
        }
        match self.store.save(&queue.remaining_from(cursor)) {
            Ok(Some(path)) => info!(path = %path.display(), cursor, "record updated"),
            Ok(None) => debug!("nothing remaining, record removed"),
            Err(e) => warn!(error = %e, "cannot update record, it may list copied files"),
        }
    }

    fn copy_loop(
        &mut self,
        queue: &PathQueue,
        cursor: &mut usize,
        copier: &dyn FileCopier,
        prompt: &mut dyn DestinationPrompt,
        progress: &mut dyn ProgressSink,
        throttle: &mut Throttle,
    ) -> Result<RunOutcome> {
        loop {
            let relative = match queue.next(*cursor, &self.interrupts) {
                Next::Path(p) => p,
                Next::Interrupted => return self.drain(queue, *cursor),
                Next::Failed(msg) => return Err(SpanError::Scan(msg)),
                Next::Finished => {
                    if self.store.discard() {
                        debug!("removed record made stale by completion");
                    }
                    info!(
                        files = self.stats.global.files,
                        bytes = self.stats.global.bytes,
                        "copy complete"
                    );
                    return Ok(RunOutcome::Completed { stats: self.stats });
                }
            };

            if throttle.due(Instant::now()) {
                self.report(progress, Some(&relative));
            }

            let src = self.config.source.join(&relative);
            let dst = self.destination.join(&relative);

            match copier.copy_file(&src, &dst, &self.interrupts) {
                Ok(bytes) => {
                    debug!(path = %relative, bytes, "copied");
                    self.stats.record(bytes);
                    *cursor += 1;
                }
                Err(SpanError::SourceMissing { path, source }) => {
                    warn!(path = %path.display(), error = %source, "source vanished, skipping");
                    *cursor += 1;
                }
                Err(SpanError::Interrupted) => {
                    debug!(path = %relative, "in-flight copy abandoned");
                }
                Err(e) if e.is_storage_full() => {
                    progress.finish();
                    match self.recover_from_full_disk(queue, *cursor, &relative, prompt)? {
                        Recovery::Retry => {}
                        Recovery::Stop(outcome) => return Ok(outcome),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Let the scan finish, then persist everything from `cursor` on
    fn drain(&mut self, queue: &PathQueue, cursor: usize) -> Result<RunOutcome> {
        info!(cursor, "interrupted, finishing scan before saving");
        let (scan, saved, remaining) = self.save_remaining(queue, cursor)?;
        Ok(RunOutcome::Interrupted {
            stats: self.stats,
            saved,
            remaining,
            scan,
        })
    }

    fn save_remaining(
        &self,
        queue: &PathQueue,
        cursor: usize,
    ) -> Result<(ScanStatus, Option<PathBuf>, usize)> {
        let scan = queue.wait_done();
        if let ScanStatus::Failed(msg) = &scan {
            warn!(error = %msg, "scan failed, remaining list is incomplete");
        }

        let remaining = queue.remaining_from(cursor);
        let saved = self.store.save(&remaining)?;
        Ok((scan, saved, remaining.len()))
    }

    fn recover_from_full_disk(
        &mut self,
        queue: &PathQueue,
        cursor: usize,
        relative: &str,
        prompt: &mut dyn DestinationPrompt,
    ) -> Result<Recovery> {
        warn!(
            destination = %self.destination.display(),
            path = %relative,
            "destination full"
        );

        // Saved up front so giving up at the prompt still leaves a record
        let (scan, saved, remaining) = self.save_remaining(queue, cursor)?;

        if self.interrupts.is_pending() {
            info!("interrupted while the destination was full, not prompting");
            return Ok(Recovery::Stop(RunOutcome::Interrupted {
                stats: self.stats,
                saved,
                remaining,
                scan,
            }));
        }

        let request = PromptRequest {
            current: &self.destination,
            failed: relative,
            record: saved.as_deref(),
        };

        match prompt.ask(&request) {
            Ok(new_destination) => {
                info!(
                    destination = %new_destination.display(),
                    copied_here = self.stats.local.files,
                    "switching destination"
                );
                self.destination = new_destination;
                self.stats.reset_local();
                Ok(Recovery::Retry)
            }
            Err(SpanError::PromptCancelled) => Ok(Recovery::Stop(RunOutcome::Interrupted {
                stats: self.stats,
                saved,
                remaining,
                scan,
            })),
            Err(e) => Err(e),
        }
    }

    fn report(&self, progress: &mut dyn ProgressSink, current: Option<&str>) {
        progress.update(&ProgressSnapshot {
            global: self.stats.global,
            local: self.stats.local,
            elapsed: self.started.elapsed(),
            current: current.map(str::to_owned),
        });
    }
}

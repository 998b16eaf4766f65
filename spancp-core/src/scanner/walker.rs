use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use super::queue::{PathQueue, ScanStatus};
use super::source::PathSource;

/// Cancellation token for abandoning a scan nobody is consuming any more
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes the paths of a [`PathSource`] into a [`PathQueue`] from a
/// background thread
pub struct Scanner {
    source: PathSource,
    cancel_token: CancellationToken,
}

impl Scanner {
    pub fn new(source: PathSource) -> Self {
        Self {
            source,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Spawn the scan. The returned queue fills up while the thread runs;
    /// the handle yields the terminal status.
    pub fn scan(self) -> (Arc<PathQueue>, JoinHandle<ScanStatus>) {
        let queue = Arc::new(PathQueue::new());
        let producer = Arc::clone(&queue);

        let handle = std::thread::spawn(move || {
            let status = self.scan_sync(&producer);
            producer.finish(status.clone());
            status
        });

        (queue, handle)
    }

    /// Synchronous scan (runs in thread)
    fn scan_sync(self, queue: &PathQueue) -> ScanStatus {
        debug!(source = ?self.source, "scan started");

        let paths = match self.source.into_paths() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "cannot open path source");
                return ScanStatus::Failed(e.to_string());
            }
        };

        let mut discovered = 0u64;
        for entry in paths {
            if self.cancel_token.is_cancelled() {
                debug!(discovered, "scan abandoned");
                return ScanStatus::Failed("scan cancelled".to_string());
            }

            match entry {
                Ok(path) => {
                    queue.push(path);
                    discovered += 1;
                }
                Err(e) => {
                    warn!(error = %e, discovered, "scan stopped");
                    return ScanStatus::Failed(e.to_string());
                }
            }
        }

        info!(discovered, "scan complete");
        ScanStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_empty_dir() {
        let temp = TempDir::new().unwrap();
        let (queue, handle) = Scanner::new(PathSource::Walk(temp.path().to_path_buf())).scan();

        assert_eq!(handle.join().unwrap(), ScanStatus::Done);
        assert!(queue.is_empty());
        assert_eq!(queue.status(), ScanStatus::Done);
    }

    #[test]
    fn test_scan_with_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file1.txt"), "hello").unwrap();
        fs::write(temp.path().join("file2.txt"), "world").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();
        fs::write(temp.path().join("subdir/file3.txt"), "test").unwrap();

        let (queue, handle) = Scanner::new(PathSource::Walk(temp.path().to_path_buf())).scan();
        assert_eq!(handle.join().unwrap(), ScanStatus::Done);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_scan_missing_list_fails() {
        let temp = TempDir::new().unwrap();
        let (queue, handle) =
            Scanner::new(PathSource::List(temp.path().join("gone.remainingfiles"))).scan();

        assert!(matches!(handle.join().unwrap(), ScanStatus::Failed(_)));
        assert!(queue.is_empty());
        assert!(matches!(queue.status(), ScanStatus::Failed(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subtree_fails_the_scan() {
        use std::os::unix::fs::PermissionsExt;

        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "h").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let (queue, handle) = Scanner::new(PathSource::Walk(temp.path().to_path_buf())).scan();
        let status = handle.join().unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(status, ScanStatus::Failed(_)), "got {status:?}");
        assert!(matches!(queue.status(), ScanStatus::Failed(_)));
        assert!(queue.remaining_from(0).iter().all(|p| !p.starts_with("locked")));
    }

    #[test]
    fn test_cancelled_scan_stops_publishing() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("list");
        fs::write(&list, "a\nb\nc\n").unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let (queue, handle) = Scanner::new(PathSource::List(list))
            .with_cancellation(token)
            .scan();

        assert!(matches!(handle.join().unwrap(), ScanStatus::Failed(_)));
        assert!(queue.is_empty());
    }
}

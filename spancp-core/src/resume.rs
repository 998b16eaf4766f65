use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::Result;
use crate::scanner::{PathSource, RelativePath};

/// File extension of remaining-files records
pub const RECORD_EXTENSION: &str = "remainingfiles";

/// Persists the paths a run did not get to, as a newline-delimited UTF-8
/// list that can be fed back through [`PathSource::List`].
#[derive(Debug)]
pub struct ResumeStore {
    path: PathBuf,
    written: AtomicBool,
    /// Set by [`ResumeStore::abandon`]; no record is written afterwards
    closed: AtomicBool,
    /// Held across a save or a discard so the two never interleave
    lock: Mutex<()>,
}

impl ResumeStore {
    /// Record for `source`, named `<basename(source)>.remainingfiles` inside `dir`
    pub fn for_source(source: &Path, dir: &Path) -> Self {
        Self {
            path: dir.join(record_name(source)),
            written: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write `remaining` in order. An empty list writes nothing and removes
    /// any record this run wrote earlier.
    pub fn save(&self, remaining: &[RelativePath]) -> Result<Option<PathBuf>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.closed.load(Ordering::SeqCst) {
            debug!(path = %self.path.display(), "store abandoned, record not written");
            return Ok(None);
        }

        if remaining.is_empty() {
            if self.remove_own() {
                debug!(path = %self.path.display(), "nothing remaining, earlier record removed");
            }
            return Ok(None);
        }

        self.written.store(true, Ordering::SeqCst);

        let temp_path = self.temp_path();
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        for path in remaining {
            writeln!(writer, "{}", path)?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;

        info!(path = %self.path.display(), count = remaining.len(), "remaining paths saved");
        Ok(Some(self.path.clone()))
    }

    /// Whether this store has started writing a record during this run
    pub fn has_written(&self) -> bool {
        self.written.load(Ordering::SeqCst)
    }

    /// Remove a record written (or being written) by this run. Records that
    /// existed before, such as the list being resumed from, are left alone.
    pub fn discard(&self) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.remove_own()
    }

    /// Discard, then refuse every later save. Used on a forced abort, which
    /// may race a save running on the copy thread.
    pub fn abandon(&self) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.closed.store(true, Ordering::SeqCst);
        self.remove_own()
    }

    fn remove_own(&self) -> bool {
        if !self.written.swap(false, Ordering::SeqCst) {
            return false;
        }
        let _ = fs::remove_file(self.temp_path());
        fs::remove_file(&self.path).is_ok()
    }

    /// Source that replays this record
    pub fn as_source(&self) -> PathSource {
        PathSource::List(self.path.clone())
    }
}

/// `<basename(source)>.remainingfiles`; a nameless source (a filesystem root) maps to `root`
pub fn record_name(source: &Path) -> String {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string());
    format!("{}.{}", base, RECORD_EXTENSION)
}

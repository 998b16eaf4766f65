mod metadata;
mod stats;

pub use stats::{CopyStats, SessionStats};

use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::interrupt::Interrupts;
use crate::{Result, SpanError};

/// Default streaming buffer size
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Copies a single file (or symlink) from `src` to `dst`.
///
/// Implementations must leave no partial file at `dst` when they fail, and
/// must report a full destination as [`SpanError::StorageFull`].
pub trait FileCopier {
    /// Returns the number of content bytes written.
    fn copy_file(&self, src: &Path, dst: &Path, interrupts: &Interrupts) -> Result<u64>;
}

/// Write target whose data can be forced to stable storage. Some
/// filesystems (NFS, quotas) only report a full volume at this point.
trait Durable: Write {
    fn persist(&mut self) -> io::Result<()>;
}

impl Durable for File {
    fn persist(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Streaming copier that preserves timestamps and (optionally) ownership
#[derive(Debug, Clone)]
pub struct Copier {
    buffer_size: usize,
    preserve_ownership: bool,
}

impl Copier {
    pub fn new(buffer_size: usize, preserve_ownership: bool) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            preserve_ownership,
        }
    }

    fn copy_regular(
        &self,
        src: &Path,
        src_meta: &Metadata,
        dst: &Path,
        interrupts: &Interrupts,
    ) -> Result<u64> {
        let mut reader = File::open(src).map_err(|e| missing_or_copy(src, e))?;

        // Writing through an existing link would clobber its target
        if fs::symlink_metadata(dst).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(dst).map_err(|e| SpanError::from_write(dst, e))?;
        }
        let mut writer = File::create(dst).map_err(|e| SpanError::from_write(dst, e))?;

        let result = self.stream(&mut reader, src, &mut writer, dst, interrupts);
        drop(writer);

        match result {
            Ok(bytes) => {
                metadata::preserve_file(src_meta, dst, self.preserve_ownership);
                Ok(bytes)
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(dst) {
                    debug!(path = %dst.display(), error = %rm, "could not remove partial file");
                }
                Err(e)
            }
        }
    }

    fn stream<R: Read, W: Durable>(
        &self,
        reader: &mut R,
        src: &Path,
        writer: &mut W,
        dst: &Path,
        interrupts: &Interrupts,
    ) -> Result<u64> {
        let mut buf = vec![0u8; self.buffer_size];
        let mut total = 0u64;

        loop {
            if interrupts.is_pending() {
                return Err(SpanError::Interrupted);
            }

            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(SpanError::Copy {
                        path: src.to_path_buf(),
                        source: e,
                    });
                }
            };

            writer
                .write_all(&buf[..n])
                .map_err(|e| SpanError::from_write(dst, e))?;
            total += n as u64;
        }

        writer.flush().map_err(|e| SpanError::from_write(dst, e))?;
        writer.persist().map_err(|e| SpanError::from_write(dst, e))?;
        Ok(total)
    }

    fn copy_symlink(&self, src: &Path, src_meta: &Metadata, dst: &Path) -> Result<u64> {
        let target = fs::read_link(src).map_err(|e| missing_or_copy(src, e))?;

        if let Ok(existing) = fs::symlink_metadata(dst) {
            let removed = if existing.is_dir() {
                fs::remove_dir(dst)
            } else {
                fs::remove_file(dst)
            };
            removed.map_err(|e| SpanError::from_write(dst, e))?;
        }

        create_symlink(src, &target, dst).map_err(|e| SpanError::from_write(dst, e))?;
        metadata::preserve_symlink(src_meta, dst, self.preserve_ownership);
        Ok(0)
    }
}

impl Default for Copier {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE, true)
    }
}

impl FileCopier for Copier {
    fn copy_file(&self, src: &Path, dst: &Path, interrupts: &Interrupts) -> Result<u64> {
        let src_meta = fs::symlink_metadata(src).map_err(|e| SpanError::SourceMissing {
            path: src.to_path_buf(),
            source: e,
        })?;

        if let Some(parent) = dst.parent() {
            create_parent_dirs(parent).map_err(|e| SpanError::from_write(parent, e))?;
        }

        if src_meta.file_type().is_symlink() {
            self.copy_symlink(src, &src_meta, dst)
        } else {
            self.copy_regular(src, &src_meta, dst, interrupts)
        }
    }
}

/// A source that vanished after being stat'ed is still a per-file skip
fn missing_or_copy(src: &Path, err: io::Error) -> SpanError {
    if err.kind() == ErrorKind::NotFound {
        SpanError::SourceMissing {
            path: src.to_path_buf(),
            source: err,
        }
    } else {
        SpanError::Copy {
            path: src.to_path_buf(),
            source: err,
        }
    }
}

fn create_parent_dirs(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

#[cfg(unix)]
fn create_symlink(_src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn create_symlink(src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};

    if fs::metadata(src).is_ok_and(|m| m.is_dir()) {
        symlink_dir(target, dst)
    } else {
        symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_src: &Path, _target: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "Symbolic links are unsupported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_contents_and_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        let dst = temp.path().join("out/nested/dst.txt");
        fs::write(&src, "hello world").unwrap();
        let mtime = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&src, mtime).unwrap();

        let bytes = Copier::default()
            .copy_file(&src, &dst, &Interrupts::default())
            .unwrap();

        assert_eq!(bytes, 11);
        assert_eq!(fs::read(&dst).unwrap(), b"hello world");
        let dst_meta = fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&dst_meta), mtime);
    }

    #[test]
    fn test_small_buffer_streams_whole_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("big.bin");
        let dst = temp.path().join("copy.bin");
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let bytes = Copier::new(64, false)
            .copy_file(&src, &dst, &Interrupts::default())
            .unwrap();

        assert_eq!(bytes, data.len() as u64);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }

    #[test]
    fn test_overwrites_existing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "much older content").unwrap();

        Copier::default()
            .copy_file(&src, &dst, &Interrupts::default())
            .unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn test_missing_source_is_skippable() {
        let temp = TempDir::new().unwrap();
        let result = Copier::default().copy_file(
            &temp.path().join("vanished"),
            &temp.path().join("dst"),
            &Interrupts::default(),
        );

        assert!(matches!(result, Err(SpanError::SourceMissing { .. })));
        assert!(!temp.path().join("dst").exists());
    }

    #[test]
    fn test_interrupt_removes_partial_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::write(&src, vec![7u8; 4096]).unwrap();

        let interrupts = Interrupts::default();
        interrupts.raise();

        let result = Copier::new(16, false).copy_file(&src, &dst, &interrupts);
        assert!(matches!(result, Err(SpanError::Interrupted)));
        assert!(!dst.exists());
    }

    /// Accepts every write, then fails when asked to sync
    struct FullOnSync {
        written: Vec<u8>,
        error: Option<io::Error>,
    }

    impl Write for FullOnSync {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Durable for FullOnSync {
        fn persist(&mut self) -> io::Result<()> {
            match self.error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_full_volume_reported_at_sync_fails_copy() {
        let mut writer = FullOnSync {
            written: Vec::new(),
            error: Some(io::Error::new(ErrorKind::StorageFull, "quota exceeded")),
        };
        let mut reader = io::Cursor::new(b"truncated later".to_vec());

        let result = Copier::new(4, false).stream(
            &mut reader,
            Path::new("src"),
            &mut writer,
            Path::new("dst"),
            &Interrupts::default(),
        );

        assert!(matches!(result, Err(SpanError::StorageFull { .. })));
        assert_eq!(writer.written, b"truncated later");
    }

    #[test]
    fn test_sync_success_returns_byte_count() {
        let mut writer = FullOnSync {
            written: Vec::new(),
            error: None,
        };
        let mut reader = io::Cursor::new(vec![1u8; 100]);

        let bytes = Copier::new(7, false)
            .stream(
                &mut reader,
                Path::new("src"),
                &mut writer,
                Path::new("dst"),
                &Interrupts::default(),
            )
            .unwrap();

        assert_eq!(bytes, 100);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_recreated_not_dereferenced() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("src");
        fs::create_dir(&src_dir).unwrap();
        fs::write(src_dir.join("real.txt"), "payload").unwrap();
        std::os::unix::fs::symlink("real.txt", src_dir.join("link")).unwrap();

        let dst = temp.path().join("dst/link");
        let bytes = Copier::default()
            .copy_file(&src_dir.join("link"), &dst, &Interrupts::default())
            .unwrap();

        assert_eq!(bytes, 0);
        assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&dst).unwrap(), Path::new("real.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_copy_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("link");
        std::os::unix::fs::symlink("/nowhere/at/all", &src).unwrap();
        let dst = temp.path().join("out/link");

        let copier = Copier::default();
        copier.copy_file(&src, &dst, &Interrupts::default()).unwrap();
        copier.copy_file(&src, &dst, &Interrupts::default()).unwrap();

        assert_eq!(fs::read_link(&dst).unwrap(), Path::new("/nowhere/at/all"));
    }
}

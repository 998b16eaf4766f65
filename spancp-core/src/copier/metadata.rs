//! Best-effort metadata preservation. Nothing in here fails a copy; every
//! problem is reported through `tracing` and otherwise ignored.

use std::fs::Metadata;
use std::path::Path;

use filetime::{FileTime, set_file_times, set_symlink_file_times};
use tracing::warn;

/// Apply ownership and timestamps of `src_meta` to a regular file
pub(crate) fn preserve_file(src_meta: &Metadata, dst: &Path, preserve_ownership: bool) {
    if preserve_ownership {
        preserve_owner(src_meta, dst, false);
    }

    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    if let Err(e) = set_file_times(dst, atime, mtime) {
        warn!(path = %dst.display(), error = %e, "failed to preserve timestamps");
    }
}

/// Ownership and timestamps of the link itself, never its target
pub(crate) fn preserve_symlink(src_meta: &Metadata, dst: &Path, preserve_ownership: bool) {
    if preserve_ownership {
        preserve_owner(src_meta, dst, true);
    }

    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    if let Err(e) = set_symlink_file_times(dst, atime, mtime) {
        warn!(path = %dst.display(), error = %e, "failed to preserve link timestamps");
    }
}

#[cfg(unix)]
fn preserve_owner(src_meta: &Metadata, dst: &Path, is_link: bool) {
    use std::os::unix::fs::{MetadataExt, chown, lchown};

    let (uid, gid) = (Some(src_meta.uid()), Some(src_meta.gid()));
    let result = if is_link {
        lchown(dst, uid, gid)
    } else {
        chown(dst, uid, gid)
    };
    if let Err(e) = result {
        warn!(path = %dst.display(), error = %e, "failed to preserve ownership");
    }
}

/// No POSIX owner/group on this platform
#[cfg(not(unix))]
fn preserve_owner(_src_meta: &Metadata, _dst: &Path, _is_link: bool) {}

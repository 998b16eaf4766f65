use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

use jwalk::WalkDir;

use crate::{Result, SpanError};

/// A file location relative to the source root, as written to resume lists
pub type RelativePath = String;

/// Where the work list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSource {
    /// Recursive walk of a source directory
    Walk(PathBuf),
    /// Newline-delimited list of relative paths, typically a saved `.remainingfiles` record
    List(PathBuf),
}

/// Lazy, single-use sequence of relative paths produced by a [`PathSource`]
pub struct Paths {
    inner: Box<dyn Iterator<Item = Result<RelativePath>>>,
}

impl Iterator for Paths {
    type Item = Result<RelativePath>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl PathSource {
    /// Start producing paths. Opening the list file happens here, so a missing
    /// resume list fails before anything is yielded.
    pub fn into_paths(self) -> Result<Paths> {
        let inner: Box<dyn Iterator<Item = Result<RelativePath>>> = match self {
            PathSource::Walk(root) => Box::new(walk(root)),
            PathSource::List(file) => Box::new(read_list(&file)?),
        };
        Ok(Paths { inner })
    }
}

fn walk(root: PathBuf) -> impl Iterator<Item = Result<RelativePath>> {
    // Directory order as returned by the OS; hidden entries and symlinks are
    // yielded like any other file, links are not followed.
    let walker = WalkDir::new(&root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false);

    walker.into_iter().filter_map(move |entry_result| {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => return Some(Err(SpanError::Scan(e.to_string()))),
        };

        // A directory that could not be listed still arrives as `Ok`
        if let Some(e) = &entry.read_children_error {
            return Some(Err(SpanError::Scan(format!(
                "{}: {}",
                entry.path().display(),
                e
            ))));
        }

        if entry.file_type().is_dir() {
            return None;
        }

        let path = entry.path();
        let relative = match path.strip_prefix(&root) {
            Ok(rel) => rel,
            Err(_) => return Some(Err(SpanError::Scan(format!(
                "{} is outside of {}",
                path.display(),
                root.display()
            )))),
        };

        Some(
            relative
                .to_str()
                .map(str::to_owned)
                .ok_or_else(|| SpanError::NonUtf8Path(path.clone())),
        )
    })
}

fn read_list(file: &Path) -> Result<impl Iterator<Item = Result<RelativePath>> + use<>> {
    let reader = BufReader::new(File::open(file)?);

    Ok(reader.lines().enumerate().filter_map(|(idx, line)| {
        let line = match line {
            Ok(l) => l,
            Err(e) => return Some(Err(SpanError::Scan(format!("line {}: {}", idx + 1, e)))),
        };

        let entry = line.trim_end();
        if entry.is_empty() {
            return None;
        }

        if !is_contained(Path::new(entry)) {
            return Some(Err(SpanError::InvalidResumeEntry {
                line: idx + 1,
                entry: entry.to_string(),
            }));
        }

        Some(Ok(entry.to_string()))
    }))
}

/// A listed path must stay inside the root it is joined onto
fn is_contained(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

use std::path::PathBuf;
use std::time::Duration;

use crate::copier::{Copier, DEFAULT_BUFFER_SIZE};
use crate::scanner::PathSource;

/// Default minimum delay between two progress updates
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(300);

/// Copy run configuration
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Source root; also names the remaining-files record
    pub source: PathBuf,
    /// Initial destination root (replaced on disk-full)
    pub destination: PathBuf,
    /// Saved list to replay instead of walking `source`
    pub resume_list: Option<PathBuf>,
    /// Directory the remaining-files record is written to
    pub record_dir: PathBuf,
    /// Streaming buffer size in bytes
    pub buffer_size: usize,
    /// Minimum delay between progress updates
    pub progress_interval: Duration,
    /// Copy owner/group where the platform allows it
    pub preserve_ownership: bool,
}

impl CopyConfig {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            resume_list: None,
            record_dir: PathBuf::from("."),
            buffer_size: DEFAULT_BUFFER_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            preserve_ownership: true,
        }
    }

    /// Walk the source unless a resume list was given
    pub fn path_source(&self) -> PathSource {
        match &self.resume_list {
            Some(list) => PathSource::List(list.clone()),
            None => PathSource::Walk(self.source.clone()),
        }
    }
}

impl From<&CopyConfig> for Copier {
    fn from(config: &CopyConfig) -> Self {
        Copier::new(config.buffer_size, config.preserve_ownership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_source_selection() {
        let mut config = CopyConfig::new("/src", "/dst");
        assert_eq!(config.path_source(), PathSource::Walk(PathBuf::from("/src")));

        config.resume_list = Some(PathBuf::from("src.remainingfiles"));
        assert_eq!(
            config.path_source(),
            PathSource::List(PathBuf::from("src.remainingfiles"))
        );
    }
}

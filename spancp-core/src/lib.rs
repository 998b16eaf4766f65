pub mod copier;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod resume;
pub mod scanner;
pub mod size;

pub use copier::{Copier, CopyStats, FileCopier, SessionStats};
pub use engine::{
    CopyConfig, CopyEngine, DestinationPrompt, NoProgress, ProgressSink, ProgressSnapshot,
    PromptRequest, RunOutcome,
};
pub use error::{Result, SpanError};
pub use interrupt::{GRACE_WINDOW, Interrupts, Signal};
pub use resume::{RECORD_EXTENSION, ResumeStore, record_name};
pub use scanner::{CancellationToken, PathQueue, PathSource, RelativePath, ScanStatus, Scanner};
pub use size::{format_count, format_elapsed, format_size, throughput};

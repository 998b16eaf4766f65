mod queue;
mod source;
mod walker;

pub use queue::{Next, PathQueue, ScanStatus};
pub use source::{PathSource, Paths, RelativePath};
pub use walker::{CancellationToken, Scanner};

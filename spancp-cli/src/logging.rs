use std::io::{self, IsTerminal, Write};

use crossterm::{
    cursor::MoveToColumn,
    queue,
    terminal::{Clear, ClearType},
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "SPANCP_LOG";

/// Install the stderr subscriber; `warn` unless `SPANCP_LOG` says otherwise
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(StatusAwareStderr {
            tty: io::stderr().is_terminal(),
        })
        .init();
}

/// Stderr writer that wipes the live status line before each event
struct StatusAwareStderr {
    tty: bool,
}

impl<'a> MakeWriter<'a> for StatusAwareStderr {
    type Writer = ClearingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ClearingWriter {
            pending_clear: self.tty,
        }
    }
}

struct ClearingWriter {
    pending_clear: bool,
}

impl Write for ClearingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        if self.pending_clear {
            queue!(err, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.pending_clear = false;
        }
        err.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

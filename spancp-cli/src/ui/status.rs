use std::io::{Stdout, Write, stdout};

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use spancp_core::{
    ProgressSink, ProgressSnapshot, format_count, format_elapsed, format_size, throughput,
};

/// Fallback when the terminal width cannot be read
const DEFAULT_WIDTH: usize = 80;

/// Single overwritten status line on stdout
pub struct StatusLine {
    out: Stdout,
    active: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            active: false,
        }
    }
}

impl ProgressSink for StatusLine {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        // Polled every time so resizes are picked up
        let width = terminal::size()
            .map(|(w, _)| w as usize)
            .unwrap_or(DEFAULT_WIDTH);
        let line = render_line(snapshot, width);

        let _ = queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        );
        let _ = self.out.flush();
        self.active = true;
    }

    fn finish(&mut self) {
        if self.active {
            let _ = writeln!(self.out);
            self.active = false;
        }
    }
}

/// `elapsed | total | this volume | path`, cut to fit `width` columns
pub fn render_line(snapshot: &ProgressSnapshot, width: usize) -> String {
    let rate = throughput(snapshot.global.bytes, snapshot.elapsed);
    let stats = format!(
        "{} | {} files, {} ({}/s) | this volume: {} files, {}",
        format_elapsed(snapshot.elapsed),
        format_count(snapshot.global.files),
        format_size(snapshot.global.bytes),
        format_size(rate),
        format_count(snapshot.local.files),
        format_size(snapshot.local.bytes),
    );

    // Leave the last column free so the terminal never wraps
    let width = width.saturating_sub(1);
    let stats_len = stats.chars().count();
    if stats_len >= width {
        return stats.chars().take(width).collect();
    }

    match &snapshot.current {
        Some(path) if stats_len + 3 < width => {
            let room = width - stats_len - 3;
            format!("{} | {}", stats, truncate_left(path, room))
        }
        _ => stats,
    }
}

/// Keep the tail of `text`, marking the cut with `...`
fn truncate_left(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    if max <= 3 {
        return ".".repeat(max);
    }
    let tail: String = text.chars().skip(len - (max - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spancp_core::CopyStats;
    use std::time::Duration;

    fn snapshot(current: Option<&str>) -> ProgressSnapshot {
        ProgressSnapshot {
            global: CopyStats {
                files: 1500,
                bytes: 2048,
            },
            local: CopyStats { files: 2, bytes: 15 },
            elapsed: Duration::from_secs(2),
            current: current.map(str::to_owned),
        }
    }

    #[test]
    fn test_render_line_contents() {
        let line = render_line(&snapshot(Some("a/1.txt")), 200);
        assert_eq!(
            line,
            "00:00:02 | 1,500 files, 2.0 KB (1.0 KB/s) | this volume: 2 files, 15 B | a/1.txt"
        );
    }

    #[test]
    fn test_render_line_fits_width() {
        let long_path = "very/".repeat(40) + "deep.txt";
        for width in [10, 40, 80, 120] {
            let line = render_line(&snapshot(Some(&long_path)), width);
            assert!(line.chars().count() < width, "width {width}: {line}");
        }
        let line = render_line(&snapshot(Some(&long_path)), 120);
        assert!(line.ends_with("very/deep.txt"));
    }

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("abcdef", 10), "abcdef");
        assert_eq!(truncate_left("abcdef", 5), "...ef");
        assert_eq!(truncate_left("ΑΒΓΔΕΖ", 4), "...Ζ");
        assert_eq!(truncate_left("abcdef", 2), "..");
    }
}

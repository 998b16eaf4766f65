// Run with: cargo run -p spancp-core --example debug_scan -- /path/to/scan [resume-list]

use spancp_core::{PathSource, ScanStatus, Scanner};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn main() {
    let mut args = std::env::args().skip(1);
    let root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let source = match args.next() {
        Some(list) => PathSource::List(PathBuf::from(list)),
        None => PathSource::Walk(root),
    };

    println!("Scanning: {:?}", source);

    let (queue, handle) = Scanner::new(source).scan();
    let start = Instant::now();
    let mut last_len = 0;

    // Poll the queue the way a slow copier would see it
    loop {
        let len = queue.len();
        let status = queue.status();
        if len != last_len || status.is_terminal() {
            println!(
                "[{:>6.1}s] discovered={:<8} latest={:?}",
                start.elapsed().as_secs_f64(),
                len,
                queue.remaining_from(len.saturating_sub(1)).first()
            );
            last_len = len;
        }
        if status.is_terminal() {
            break;
        }
        std::thread::sleep(Duration::from_millis(250));
    }

    match handle.join() {
        Ok(ScanStatus::Done) => println!("\nFinal: {} paths", queue.len()),
        Ok(ScanStatus::Failed(e)) => println!("\nFAILED after {} paths: {}", queue.len(), e),
        Ok(ScanStatus::Running) => println!("\nscanner exited while running"),
        Err(_) => println!("\nscanner panicked"),
    }
}

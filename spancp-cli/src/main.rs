mod logging;
mod signals;
mod tui;
mod ui;

use std::io::{IsTerminal, stdout};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use color_eyre::Result;
use spancp_core::copier::DEFAULT_BUFFER_SIZE;
use spancp_core::{
    Copier, CopyConfig, CopyEngine, Interrupts, NoProgress, ProgressSink, RunOutcome, ScanStatus,
    format_count, format_elapsed, format_size,
};

use tui::DestinationEditor;
use ui::StatusLine;

/// spancp - copy a directory tree across several destination volumes
#[derive(Parser, Debug)]
#[command(name = "spancp")]
#[command(about = "Copy a directory tree, resumable after Ctrl+C or a full destination")]
#[command(version)]
struct Args {
    /// Source directory
    source: PathBuf,

    /// Destination directory
    destination: PathBuf,

    /// Text file of relative paths to copy instead of walking SOURCE
    #[arg(short, long, value_name = "FILE")]
    resume: Option<PathBuf>,

    /// Streaming buffer size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Do not copy file owner and group
    #[arg(long)]
    no_owner: bool,

    /// Directory the remaining-files record is written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    record_dir: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();

    let args = Args::parse();

    // Resolve path so the record is named after a real directory
    let source = args
        .source
        .clone()
        .canonicalize()
        .unwrap_or(args.source.clone());

    // Validate paths
    if !source.exists() {
        eprintln!("Error: Source does not exist: {}", source.display());
        process::exit(1);
    }
    if !source.is_dir() {
        eprintln!("Error: Source is not a directory: {}", source.display());
        process::exit(1);
    }
    if let Some(list) = &args.resume
        && !list.is_file()
    {
        eprintln!("Error: Resume list not found: {}", list.display());
        process::exit(1);
    }

    let config = CopyConfig {
        resume_list: args.resume.clone(),
        record_dir: args.record_dir.clone(),
        buffer_size: args.buffer_size,
        preserve_ownership: !args.no_owner,
        ..CopyConfig::new(source, args.destination.clone())
    };

    let interrupts = Interrupts::default();
    let mut engine = CopyEngine::new(config.clone(), interrupts.clone());
    signals::install(interrupts, engine.store())?;

    let copier = Copier::from(&config);
    let mut prompt = DestinationEditor::new();
    let mut progress: Box<dyn ProgressSink> = if stdout().is_terminal() {
        Box::new(StatusLine::new())
    } else {
        Box::new(NoProgress)
    };

    let started = Instant::now();
    let outcome = engine.run(&copier, &mut prompt, progress.as_mut())?;
    print_summary(&outcome, &config, started);

    Ok(())
}

fn print_summary(outcome: &RunOutcome, config: &CopyConfig, started: Instant) {
    let stats = outcome.stats();
    let copied = format!(
        "{} files ({})",
        format_count(stats.global.files),
        format_size(stats.global.bytes)
    );
    let elapsed = format_elapsed(started.elapsed());

    match outcome {
        RunOutcome::Completed { .. } => {
            println!("Done: {} copied in {}", copied, elapsed);
        }
        RunOutcome::Interrupted {
            saved,
            remaining,
            scan,
            ..
        } => {
            println!("Stopped: {} copied in {}", copied, elapsed);
            if let ScanStatus::Failed(msg) = scan {
                eprintln!("Warning: scan failed ({}), the saved list may be incomplete", msg);
            }
            match saved {
                Some(path) => {
                    println!(
                        "Remaining paths saved to: {} ({} files)",
                        path.display(),
                        format_count(*remaining as u64)
                    );
                    println!(
                        "Resume with: spancp \"{}\" <DESTINATION> --resume \"{}\"",
                        config.source.display(),
                        path.display()
                    );
                }
                None => println!("Nothing left to copy"),
            }
        }
    }
}

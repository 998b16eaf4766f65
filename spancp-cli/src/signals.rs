use std::process;
use std::sync::Arc;
use std::thread;

use color_eyre::Result;
use crossterm::terminal;
use spancp_core::{Interrupts, ResumeStore, Signal};

/// Route SIGINT/SIGTERM into `interrupts`.
///
/// The handler only forwards; a watcher thread applies the grace-window
/// escalation and performs the forced abort, which never returns.
pub fn install(interrupts: Interrupts, store: Arc<ResumeStore>) -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded::<()>(4);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })?;

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for () in rx.iter() {
                match interrupts.raise() {
                    Signal::Drain => {
                        eprintln!();
                        eprintln!("Interrupt received. Finishing source directory tree scan...");
                        eprintln!(
                            "Press Ctrl+C again within {}s to cancel and delete the incomplete progress file",
                            interrupts.grace().as_secs()
                        );
                    }
                    Signal::Abort => abort(&store),
                }
            }
        })?;

    Ok(())
}

fn abort(store: &ResumeStore) -> ! {
    let _ = terminal::disable_raw_mode();
    // Waits out a save in flight on the copy thread, and blocks later ones
    if store.abandon() {
        eprintln!("\nCancelled. Progress file deleted.");
    } else {
        eprintln!("\nCancelled.");
    }
    process::exit(1);
}

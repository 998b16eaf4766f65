use std::io::{self, Write, stdout};
use std::path::PathBuf;

use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use spancp_core::{DestinationPrompt, PromptRequest, Result, SpanError};

use super::complete::complete_dir;
use super::handler::{EditAction, handle_key};
use super::line::LineBuffer;

const PROMPT: &str = "> ";

/// Leaves raw mode however the prompt ends
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Interactive destination prompt with directory-name Tab completion
#[derive(Debug, Default)]
pub struct DestinationEditor;

impl DestinationEditor {
    pub fn new() -> Self {
        Self
    }

    /// Read one line, starting from `default`. `None` means the user cancelled.
    fn read_line(&self, default: &str) -> io::Result<Option<String>> {
        let _raw = RawModeGuard::enable()?;
        let mut out = stdout();
        let mut line = LineBuffer::new(default);
        redraw(&mut out, &line)?;

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };

            match handle_key(key) {
                EditAction::Insert(c) => line.insert(c),
                EditAction::Backspace => line.backspace(),
                EditAction::Delete => line.delete(),
                EditAction::Left => line.left(),
                EditAction::Right => line.right(),
                EditAction::Home => line.home(),
                EditAction::End => line.end(),
                EditAction::ClearToStart => line.clear_to_start(),
                EditAction::Complete => {
                    let completion = complete_dir(&line.text());
                    if let Some(completed) = &completion.line {
                        line.set(completed);
                    } else if !completion.candidates.is_empty() {
                        queue!(
                            out,
                            Print("\r\n"),
                            Print(completion.candidates.join("  ")),
                            Print("\r\n")
                        )?;
                    }
                }
                EditAction::Submit => {
                    queue!(out, Print("\r\n"))?;
                    out.flush()?;
                    return Ok(Some(line.text()));
                }
                EditAction::Cancel => {
                    queue!(out, Print("\r\n"))?;
                    out.flush()?;
                    return Ok(None);
                }
                EditAction::Ignore => continue,
            }

            redraw(&mut out, &line)?;
        }
    }
}

fn redraw(out: &mut impl Write, line: &LineBuffer) -> io::Result<()> {
    let column = (PROMPT.chars().count() + line.cursor()) as u16;
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(PROMPT),
        Print(line.text()),
        MoveToColumn(column)
    )?;
    out.flush()
}

impl DestinationPrompt for DestinationEditor {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Result<PathBuf> {
        println!();
        println!("Disk full: {}", request.failed);
        if let Some(record) = request.record {
            println!("Remaining paths saved to: {}", record.display());
        }
        println!("Enter new destination path (ie. \"Disk 2\"). Tab completes, Esc gives up:");

        let mut default = request.current.to_string_lossy().to_string();
        loop {
            let Some(input) = self.read_line(&default).map_err(SpanError::Prompt)? else {
                return Err(SpanError::PromptCancelled);
            };

            let trimmed = input.trim();
            if trimmed.is_empty() {
                println!("Destination cannot be empty");
                default = String::new();
                continue;
            }
            return Ok(PathBuf::from(trimmed));
        }
    }
}

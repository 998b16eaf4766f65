mod complete;
mod handler;
mod line;
mod prompt;

pub use prompt::DestinationEditor;

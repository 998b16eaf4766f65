mod status;

pub use status::StatusLine;

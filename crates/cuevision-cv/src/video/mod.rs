//! File-backed frame sources and sinks, and scripted commands

pub mod commands;
pub mod sink;
pub mod source;

pub use commands::ScriptedCommands;
pub use sink::{ImageSequenceSink, VideoFileSink, DEFAULT_OUTPUT_FPS};
pub use source::VideoFileSource;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Could not open video {path:?}")]
    OpenFailed { path: PathBuf },

    #[error("Could not create video writer {path:?}")]
    WriterFailed { path: PathBuf },
}

//! Frame pipeline: configuration, per-frame state and the run loop

pub mod config;
pub mod run;
pub mod state;

pub use config::{FeatureFlags, PipelineConfig};
pub use run::{run, run_with_debug, RunSummary};
pub use state::{FrameOutput, FramePipeline};

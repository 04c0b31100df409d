use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cuevision")]
#[command(about = "Track billiard balls and rectify the table into an overhead view")]
#[command(version)]
pub struct Args {
    /// Input video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Annotated output video (MJPG)
    #[arg(short, long, default_value = "cuevision_result.avi")]
    pub output: PathBuf,

    /// JSON pipeline configuration; defaults are used for missing fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the overhead image sequence
    #[arg(long)]
    pub overhead_dir: Option<PathBuf>,

    /// Keep every n-th overhead frame
    #[arg(long, default_value_t = 1)]
    pub overhead_stride: u64,

    /// Track the object ball and detect contacts
    #[arg(long)]
    pub secondary: bool,

    /// Disable overhead rectification
    #[arg(long)]
    pub no_overhead: bool,

    /// Write ball-mask and table-contour debug frames into the overhead
    /// directory (ignored without --overhead-dir)
    #[arg(long)]
    pub debug: bool,

    /// Keep input frames at their native size
    #[arg(long)]
    pub native_size: bool,

    /// Clear tracks before reading these frame indices
    #[arg(long, value_delimiter = ',')]
    pub reset_at: Vec<u64>,

    /// Stop before reading this frame index
    #[arg(long)]
    pub quit_at: Option<u64>,

    /// Write the run summary as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

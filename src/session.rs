use crate::cli::Args;
use anyhow::{Context, Result};
use cuevision_cv::pipeline::{run_with_debug, FramePipeline, PipelineConfig, RunSummary};
use cuevision_cv::traits::FrameSink;
use cuevision_cv::video::{ImageSequenceSink, ScriptedCommands, VideoFileSink, VideoFileSource};
use tracing::{info, warn};

/// Configuration file (or defaults) with the command-line overrides applied
pub fn resolve_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if args.secondary {
        config.features.track_secondary = true;
    }
    if args.no_overhead || args.overhead_dir.is_none() {
        config.features.overhead = false;
    }
    if args.debug {
        config.features.debug_overlay = true;
    }
    if config.features.debug_overlay && args.overhead_dir.is_none() {
        warn!("debug frames need --overhead-dir; debug overlay disabled");
        config.features.debug_overlay = false;
    }
    if args.native_size {
        config.frame_size = None;
    }
    Ok(config)
}

pub fn run(args: &Args) -> Result<RunSummary> {
    let config = resolve_config(args)?;
    info!(?config.features, frame_size = ?config.frame_size, "pipeline configured");

    let mut source = VideoFileSource::open(&args.input)?;
    let mut sink = VideoFileSink::new(&args.output, source.fps());

    let mut overhead_sink = match (&args.overhead_dir, config.features.overhead) {
        (Some(dir), true) => Some(ImageSequenceSink::new(dir, "overhead", args.overhead_stride)?),
        _ => None,
    };
    let mut debug_sink = match (&args.overhead_dir, config.features.debug_overlay) {
        (Some(dir), true) => Some(ImageSequenceSink::new(dir, "debug", args.overhead_stride)?),
        _ => None,
    };
    let mut commands = ScriptedCommands::new(args.reset_at.iter().copied(), args.quit_at);

    let mut pipeline = FramePipeline::new(config);
    let summary = run_with_debug(
        &mut pipeline,
        &mut source,
        &mut sink,
        overhead_sink.as_mut().map(|sink| sink as &mut dyn FrameSink),
        debug_sink.as_mut().map(|sink| sink as &mut dyn FrameSink),
        &mut commands,
    )
    .with_context(|| format!("Processing {:?} failed", args.input))?;

    if let Some(path) = &args.summary {
        summary.export_json(path)?;
        info!(path = ?path, "summary written");
    }
    Ok(summary)
}

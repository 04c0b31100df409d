//! Sequential frame loop wiring a pipeline to its collaborators

use super::state::FramePipeline;
use crate::traits::{Command, CommandSource, FrameSink, FrameSource};
use crate::Result;
use anyhow::Context;
use cuevision_core::{CollisionEvent, Point, VisionError};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub frames_processed: u64,
    /// Frames dropped after a recovered processing error
    pub frames_skipped: u64,
    /// Frames on which a collision triggered
    pub collisions: u64,
    pub resets: u64,
    pub quit_requested: bool,
    pub primary_trajectory: Vec<Point>,
    pub secondary_trajectory: Vec<Point>,
    pub last_collision: Option<CollisionEvent>,
    /// Area of the table reference region, 0 when none was found
    pub table_area: f64,
}

impl RunSummary {
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run summary")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write run summary: {:?}", path.as_ref()))
    }
}

/// Drive `pipeline` until the source is exhausted or a quit command arrives.
///
/// Commands are polled at every frame boundary before the next frame is
/// read. Source and sink failures are fatal; processing failures skip the
/// frame.
pub fn run(
    pipeline: &mut FramePipeline,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    overhead_sink: Option<&mut dyn FrameSink>,
    commands: &mut dyn CommandSource,
) -> Result<RunSummary> {
    run_with_debug(pipeline, source, sink, overhead_sink, None, commands)
}

/// [`run`], additionally writing debug frames when the pipeline emits them
pub fn run_with_debug(
    pipeline: &mut FramePipeline,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    mut overhead_sink: Option<&mut dyn FrameSink>,
    mut debug_sink: Option<&mut dyn FrameSink>,
    commands: &mut dyn CommandSource,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut frame_index: u64 = 0;

    loop {
        match commands.poll(frame_index) {
            Some(Command::Quit) => {
                info!(frame = frame_index, "quit requested");
                summary.quit_requested = true;
                break;
            }
            Some(Command::ResetTracks) => {
                pipeline.reset_tracks();
                summary.resets += 1;
            }
            None => {}
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) if matches!(err.downcast_ref::<VisionError>(), Some(VisionError::EmptyFrameSource)) => break,
            Err(err) => return Err(err.context(format!("Frame source failed at frame {}", frame_index))),
        };
        frame_index += 1;

        let output = match pipeline.process(&frame) {
            Ok(output) => output,
            Err(err) => {
                warn!(frame = frame_index, error = %err, "frame skipped");
                summary.frames_skipped += 1;
                continue;
            }
        };

        if let Some(event) = output.collision {
            info!(
                frame = frame_index,
                x = event.contact.x,
                y = event.contact.y,
                "collision"
            );
            summary.collisions += 1;
            summary.last_collision = Some(event);
        }

        sink.write_frame(&output.annotated)?;
        if let (Some(overhead_sink), Some(overhead)) = (overhead_sink.as_deref_mut(), &output.overhead) {
            overhead_sink.write_frame(overhead)?;
        }
        if let (Some(debug_sink), Some(debug)) = (debug_sink.as_deref_mut(), &output.debug) {
            debug_sink.write_frame(debug)?;
        }
        summary.frames_processed += 1;
    }

    sink.finish()?;
    if let Some(overhead_sink) = overhead_sink {
        overhead_sink.finish()?;
    }
    if let Some(debug_sink) = debug_sink {
        debug_sink.finish()?;
    }

    summary.primary_trajectory = pipeline.primary().object().trajectory().to_vec();
    summary.secondary_trajectory = pipeline.secondary().object().trajectory().to_vec();
    summary.table_area = pipeline.calibrator().best_area();

    info!(
        processed = summary.frames_processed,
        skipped = summary.frames_skipped,
        collisions = summary.collisions,
        "run finished"
    );
    Ok(summary)
}

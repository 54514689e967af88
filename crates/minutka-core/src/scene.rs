//! Scene-change detection.
//!
//! Walks the frame sequence at a coarse, configurable stride and scores
//! consecutive sampled frames with SSIM. A drop below the configured
//! threshold, after the minimum scene duration has elapsed, emits a
//! [`SceneChangeEvent`] and persists a snapshot of the raw frame.
//!
//! Similarity is always measured between consecutive *sampled* frames,
//! not between the current frame and the last scene-change frame, so a
//! slow continuous drift can accumulate past the threshold without any
//! single comparison tripping it. That is the intended behavior.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compare::{preprocess, ssim};
use crate::config::DetectionConfig;
use crate::error::Result;
use crate::format::{filesystem_safe_timestamp, format_timestamp_readable};
use crate::source::RawFrame;

/// A detected scene change, immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneChangeEvent {
    /// 0-based, assigned in detection order; always equals the event's
    /// position in the returned list.
    pub index: u32,
    pub timestamp: f64,
    pub timestamp_readable: String,
    /// Best-effort: the file may be missing if the snapshot write
    /// failed. Consumers must check existence before rendering it.
    pub snapshot_path: PathBuf,
    /// SSIM against the previous sampled frame, in [0, 1].
    pub similarity: f64,
}

/// How a scan ended. A `Truncated` scan still carries every event
/// accumulated before the decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanStatus {
    Complete,
    Truncated { frames_read: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneScan {
    pub events: Vec<SceneChangeEvent>,
    pub status: ScanStatus,
}

/// Progress snapshot handed to the optional scan callback once per
/// sampled frame.
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    pub frames_read: u64,
    pub events: usize,
}

/// Scan a frame sequence for scene changes.
///
/// Zero events is a valid outcome; a scan that could not start at all is
/// the caller's error (this function only ever sees an opened stream).
/// Fewer than two sampled frames yield an empty `Complete` scan.
pub fn detect_scenes<I>(
    frames: I,
    fps: f64,
    config: &DetectionConfig,
    snapshot_dir: &Path,
    progress: Option<&dyn Fn(ScanProgress)>,
) -> SceneScan
where
    I: IntoIterator<Item = Result<RawFrame>>,
{
    if let Err(e) = std::fs::create_dir_all(snapshot_dir) {
        // Snapshots are best-effort; detection itself proceeds.
        warn!(dir = %snapshot_dir.display(), error = %e, "could not create snapshot directory");
    }

    let stride = config.frame_sample_rate.max(1) as u64;
    let mut events: Vec<SceneChangeEvent> = Vec::new();
    let mut previous_buffer: Option<image::GrayImage> = None;
    let mut previous_event_time = 0.0;
    let mut frames_read: u64 = 0;

    for item in frames {
        let frame = match item {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, frames_read, "frame stream interrupted, returning partial scan");
                return SceneScan {
                    events,
                    status: ScanStatus::Truncated { frames_read },
                };
            }
        };
        frames_read += 1;

        if frame.position % stride != 0 {
            continue;
        }

        let current_time = frame.timestamp(fps);
        let current_buffer = preprocess(&frame.image);

        if let Some(previous) = &previous_buffer {
            let similarity = ssim(previous, &current_buffer);

            if similarity < config.scene_change_threshold
                && current_time - previous_event_time >= config.min_scene_duration
            {
                let index = events.len() as u32;
                let snapshot_path = snapshot_dir.join(format!(
                    "scene_{:04}_{}.jpg",
                    index,
                    filesystem_safe_timestamp(current_time)
                ));

                // The event is recorded even when the snapshot cannot be
                // written; its path field is best-effort.
                if let Err(e) = frame.image.save(&snapshot_path) {
                    warn!(path = %snapshot_path.display(), error = %e, "snapshot write failed");
                }

                debug!(
                    timestamp = %format_timestamp_readable(current_time),
                    similarity, "scene change detected"
                );

                events.push(SceneChangeEvent {
                    index,
                    timestamp: current_time,
                    timestamp_readable: format_timestamp_readable(current_time),
                    snapshot_path,
                    similarity,
                });
                previous_event_time = current_time;
            }
        }

        previous_buffer = Some(current_buffer);

        if let Some(callback) = progress {
            callback(ScanProgress { frames_read, events: events.len() });
        }
    }

    SceneScan { events, status: ScanStatus::Complete }
}

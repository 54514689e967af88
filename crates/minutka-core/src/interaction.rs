//! UI interaction detection (clicks, hovers, small localized changes).
//!
//! Walks the frame sequence at an FPS-derived stride (~10 comparisons
//! per second) and scores consecutive sampled frames by raw mean
//! absolute pixel difference. A magnitude above the threshold emits an
//! [`InteractionEvent`], unless the timestamp coincides with a known
//! scene change or falls inside the debounce window of the previous
//! interaction.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compare::{mean_abs_diff, preprocess};
use crate::config::DetectionConfig;
use crate::error::Result;
use crate::format::format_timestamp_readable;
use crate::scene::{ScanProgress, ScanStatus, SceneChangeEvent};
use crate::source::RawFrame;

/// A scene cut dominates the frame-difference signal; any candidate this
/// close to one would double-report the cut as an interaction.
pub const SCENE_COINCIDENCE_WINDOW: f64 = 1.0;

/// One physical click manifests across several consecutive sampled
/// frames; candidates this close to the previous accepted event collapse
/// into it.
pub const INTERACTION_DEBOUNCE: f64 = 0.5;

/// Comparisons per second the sampling stride aims for.
const TARGET_SAMPLES_PER_SECOND: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub timestamp: f64,
    pub timestamp_readable: String,
    /// Mean absolute pixel difference on the 0-255 scale.
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionScan {
    pub events: Vec<InteractionEvent>,
    pub status: ScanStatus,
}

/// Sampling stride targeting ~10 comparisons/second regardless of the
/// source frame rate. An invalid fps degrades to analyzing every frame.
fn sample_stride(fps: f64) -> u64 {
    ((fps / TARGET_SAMPLES_PER_SECOND).round() as u64).max(1)
}

/// Scan a frame sequence for interactions.
///
/// `scene_events` is the finished scene-change list, consumed read-only
/// for the coincidence filter; the two scanners share no live state.
/// Failure semantics match [`crate::scene::detect_scenes`]: decode
/// errors truncate the scan into a partial result, never a failure.
pub fn detect_interactions<I>(
    frames: I,
    fps: f64,
    scene_events: &[SceneChangeEvent],
    config: &DetectionConfig,
    progress: Option<&dyn Fn(ScanProgress)>,
) -> InteractionScan
where
    I: IntoIterator<Item = Result<RawFrame>>,
{
    let stride = sample_stride(fps);
    let magnitude_threshold = config.click_threshold * 255.0;

    let mut events: Vec<InteractionEvent> = Vec::new();
    let mut previous_buffer: Option<image::GrayImage> = None;
    let mut last_interaction_time: Option<f64> = None;
    let mut frames_read: u64 = 0;

    for item in frames {
        let frame = match item {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, frames_read, "frame stream interrupted, returning partial scan");
                return InteractionScan {
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
            let diff_mean = mean_abs_diff(previous, &current_buffer);

            let coincides_with_scene = scene_events
                .iter()
                .any(|scene| (scene.timestamp - current_time).abs() < SCENE_COINCIDENCE_WINDOW);
            let debounced = last_interaction_time
                .is_some_and(|last| current_time - last < INTERACTION_DEBOUNCE);

            if diff_mean > magnitude_threshold && !coincides_with_scene && !debounced {
                debug!(
                    timestamp = %format_timestamp_readable(current_time),
                    intensity = diff_mean,
                    "interaction detected"
                );
                events.push(InteractionEvent {
                    timestamp: current_time,
                    timestamp_readable: format_timestamp_readable(current_time),
                    intensity: diff_mean,
                });
                last_interaction_time = Some(current_time);
            }
        }

        previous_buffer = Some(current_buffer);

        if let Some(callback) = progress {
            callback(ScanProgress { frames_read, events: events.len() });
        }
    }

    InteractionScan { events, status: ScanStatus::Complete }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::gray_frame;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    /// 32x32 solid frame with an optional 18x18 bright square overlay.
    fn square_frame(position: u64, base: u8, square: bool) -> Result<RawFrame> {
        let mut image = RgbImage::from_pixel(32, 32, Rgb([base, base, base]));
        if square {
            for y in 4..22 {
                for x in 4..22 {
                    image.put_pixel(x, y, Rgb([255, 255, 255]));
                }
            }
        }
        Ok(RawFrame { position, image })
    }

    /// 10 seconds at 30 fps of solid gray with the square visible during
    /// `visible`, expressed in raw frame positions.
    fn square_burst(visible: std::ops::Range<u64>) -> Vec<Result<RawFrame>> {
        (0..300)
            .map(|pos| square_frame(pos, 60, visible.contains(&pos)))
            .collect()
    }

    fn scene_at(timestamp: f64) -> SceneChangeEvent {
        SceneChangeEvent {
            index: 0,
            timestamp,
            timestamp_readable: format_timestamp_readable(timestamp),
            snapshot_path: PathBuf::from("scene_0000.jpg"),
            similarity: 0.1,
        }
    }

    #[test]
    fn stride_targets_ten_samples_per_second() {
        assert_eq!(sample_stride(30.0), 3);
        assert_eq!(sample_stride(60.0), 6);
        assert_eq!(sample_stride(24.0), 2);
        assert_eq!(sample_stride(5.0), 1);
        assert_eq!(sample_stride(0.0), 1);
        assert_eq!(sample_stride(-1.0), 1);
    }

    #[test]
    fn brief_square_at_three_seconds_yields_one_event_near_it() {
        let frames = square_burst(90..99);
        let scan =
            detect_interactions(frames, 30.0, &[], &DetectionConfig::default(), None);

        assert_eq!(scan.status, ScanStatus::Complete);
        assert!(!scan.events.is_empty());
        assert!((scan.events[0].timestamp - 3.0).abs() < 0.1);
        // Appearance and disappearance collapse into a single event.
        assert_eq!(scan.events.len(), 1);
    }

    #[test]
    fn scene_coincidence_suppresses_interactions() {
        let frames = square_burst(90..99);
        let scenes = [scene_at(3.0)];
        let scan =
            detect_interactions(frames, 30.0, &scenes, &DetectionConfig::default(), None);
        assert!(scan.events.is_empty());

        // The same stimulus two seconds away from the cut is kept.
        let frames = square_burst(150..159);
        let scan =
            detect_interactions(frames, 30.0, &scenes, &DetectionConfig::default(), None);
        assert_eq!(scan.events.len(), 1);
        for event in &scan.events {
            for scene in &scenes {
                assert!((event.timestamp - scene.timestamp).abs() >= SCENE_COINCIDENCE_WINDOW);
            }
        }
    }

    #[test]
    fn debounce_enforces_minimum_event_spacing() {
        // The square toggles every 9 frames (0.3 s), faster than the
        // debounce window.
        let frames: Vec<Result<RawFrame>> = (0..300)
            .map(|pos| square_frame(pos, 60, (pos / 9) % 2 == 1))
            .collect();
        let scan =
            detect_interactions(frames, 30.0, &[], &DetectionConfig::default(), None);

        assert!(scan.events.len() > 1);
        for pair in scan.events.windows(2) {
            assert!(pair[1].timestamp - pair[0].timestamp >= INTERACTION_DEBOUNCE);
        }
    }

    #[test]
    fn diff_equal_to_threshold_does_not_fire() {
        // 256 of 1024 pixels differing by 255 gives a mean of exactly
        // 63.75, which equals click_threshold 0.25 * 255 with no
        // rounding error.
        let mut second = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        for y in 0..16 {
            for x in 0..16 {
                second.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let frames = vec![
            Ok(RawFrame { position: 0, image: RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])) }),
            Ok(RawFrame { position: 1, image: second.clone() }),
        ];
        let config = DetectionConfig { click_threshold: 0.25, ..DetectionConfig::default() };
        let scan = detect_interactions(frames, 5.0, &[], &config, None);
        assert!(scan.events.is_empty(), "strict > must not fire at equality");

        let frames = vec![
            Ok(RawFrame { position: 0, image: RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])) }),
            Ok(RawFrame { position: 1, image: second }),
        ];
        let config = DetectionConfig { click_threshold: 0.2, ..DetectionConfig::default() };
        let scan = detect_interactions(frames, 5.0, &[], &config, None);
        assert_eq!(scan.events.len(), 1);
        assert!((scan.events[0].intensity - 63.75).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_yield_empty_complete_scans() {
        let config = DetectionConfig::default();
        let scan = detect_interactions(Vec::new(), 30.0, &[], &config, None);
        assert!(scan.events.is_empty());
        assert_eq!(scan.status, ScanStatus::Complete);

        let scan = detect_interactions(vec![gray_frame(0, 50)], 30.0, &[], &config, None);
        assert!(scan.events.is_empty());
        assert_eq!(scan.status, ScanStatus::Complete);
    }

    #[test]
    fn zero_fps_emits_zero_timestamps_without_panicking() {
        let frames: Vec<Result<RawFrame>> = (0..20)
            .map(|pos| square_frame(pos, 60, pos >= 10))
            .collect();
        let scan =
            detect_interactions(frames, 0.0, &[], &DetectionConfig::default(), None);

        for event in &scan.events {
            assert_eq!(event.timestamp, 0.0);
        }
    }

    #[test]
    fn decode_error_returns_partial_result() {
        let mut frames = square_burst(90..99);
        frames.truncate(200);
        frames.push(Err(crate::error::MinutkaError::FrameDecode(
            "truncated frame at position 200".to_string(),
        )));
        let scan =
            detect_interactions(frames, 30.0, &[], &DetectionConfig::default(), None);

        assert_eq!(scan.events.len(), 1);
        assert_eq!(scan.status, ScanStatus::Truncated { frames_read: 200 });
    }

    #[test]
    fn repeated_scans_are_deterministic() {
        let config = DetectionConfig::default();
        let first = detect_interactions(square_burst(90..99), 30.0, &[], &config, None);
        let second = detect_interactions(square_burst(90..99), 30.0, &[], &config, None);
        assert_eq!(first, second);
    }
}

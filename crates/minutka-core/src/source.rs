//! Decoded frame access for a local video file.
//!
//! Metadata comes from `ffprobe`; frames come from an `ffmpeg` child
//! process writing raw RGB24 video to its stdout, read here one
//! fixed-size buffer at a time. Each [`FrameStream`] owns its own decode
//! session, so two scanners can run over the same file concurrently
//! without sharing a handle.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;

use crate::error::{MinutkaError, Result};

/// A single decoded frame at a known ordinal position.
pub struct RawFrame {
    /// 0-based position in the raw frame sequence.
    pub position: u64,
    pub image: RgbImage,
}

impl RawFrame {
    /// Derived timestamp in seconds; 0.0 when the source reported an
    /// invalid frame rate.
    pub fn timestamp(&self, fps: f64) -> f64 {
        if fps > 0.0 {
            self.position as f64 / fps
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub total_frames: u64,
    pub duration: f64,
}

/// Probe a video file with ffprobe.
///
/// Fatal when the file is missing or carries no video stream: a scan
/// that cannot start is an error, distinct from a scan that found zero
/// events.
pub fn probe_video(path: &Path) -> Result<VideoMetadata> {
    if !path.exists() {
        return Err(MinutkaError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| MinutkaError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: format!("failed to run ffprobe: {e}"),
        })?;

    if !output.status.success() {
        return Err(MinutkaError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    metadata_from_probe(&value).ok_or_else(|| MinutkaError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: "no video stream found".to_string(),
    })
}

fn metadata_from_probe(value: &serde_json::Value) -> Option<VideoMetadata> {
    let stream = value["streams"]
        .as_array()?
        .iter()
        .find(|s| s["codec_type"] == "video")?;

    let width = stream["width"].as_u64()? as u32;
    let height = stream["height"].as_u64()? as u32;
    let fps = stream["r_frame_rate"]
        .as_str()
        .map(parse_frame_rate)
        .unwrap_or(0.0);

    let duration = value["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    // Not every container reports nb_frames; fall back to duration * fps.
    let total_frames = stream["nb_frames"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if fps > 0.0 && duration > 0.0 {
                (duration * fps).round() as u64
            } else {
                0
            }
        });

    Some(VideoMetadata { fps, width, height, total_frames, duration })
}

/// Parse ffprobe's fractional frame rate ("30000/1001", "25/1" or "25").
/// Unparseable or zero-denominator input maps to 0.0 so the caller can
/// apply its zero-fps degraded mode instead of dividing by zero.
fn parse_frame_rate(raw: &str) -> f64 {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().unwrap_or(0.0);
        let den: f64 = den.parse().unwrap_or(0.0);
        if den > 0.0 { num / den } else { 0.0 }
    } else {
        raw.parse().unwrap_or(0.0)
    }
}

/// Blocking iterator over decoded RGB frames of one video file.
///
/// Decode failure partway through the stream yields exactly one `Err`
/// item, after which the stream is exhausted; the consumer is expected
/// to keep the events accumulated so far.
pub struct FrameStream {
    child: Child,
    stdout: ChildStdout,
    path: PathBuf,
    frame_len: usize,
    width: u32,
    height: u32,
    position: u64,
    done: bool,
}

impl FrameStream {
    /// Spawn a decode session for `path` using the probed dimensions.
    pub fn open(path: &Path, metadata: &VideoMetadata) -> Result<Self> {
        if metadata.width == 0 || metadata.height == 0 {
            return Err(MinutkaError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: "video stream reports zero dimensions".to_string(),
            });
        }

        let mut child = Command::new("ffmpeg")
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(path)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-an")
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MinutkaError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: format!("failed to spawn ffmpeg: {e}"),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| MinutkaError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: "ffmpeg stdout unavailable".to_string(),
        })?;

        Ok(Self {
            child,
            stdout,
            path: path.to_path_buf(),
            frame_len: metadata.width as usize * metadata.height as usize * 3,
            width: metadata.width,
            height: metadata.height,
            position: 0,
            done: false,
        })
    }

    /// Fill one frame buffer. `Ok(None)` is a clean end of stream (no
    /// bytes at a frame boundary); a short read mid-frame is a decode
    /// interruption.
    fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;

        while filled < self.frame_len {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => {
                    if filled == 0 {
                        return Ok(None);
                    }
                    return Err(MinutkaError::FrameDecode(format!(
                        "truncated frame at position {} in {} ({} of {} bytes)",
                        self.position,
                        self.path.display(),
                        filled,
                        self.frame_len
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(MinutkaError::FrameDecode(format!(
                        "read failed at position {} in {}: {}",
                        self.position,
                        self.path.display(),
                        e
                    )));
                }
            }
        }

        Ok(Some(buf))
    }
}

impl Iterator for FrameStream {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_frame() {
            Ok(Some(buf)) => {
                let Some(image) = RgbImage::from_raw(self.width, self.height, buf) else {
                    self.done = true;
                    return Some(Err(MinutkaError::FrameDecode(format!(
                        "buffer size mismatch at position {}",
                        self.position
                    ))));
                };
                let frame = RawFrame { position: self.position, image };
                self.position += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        // Reap the decode session even when the consumer bails early.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fractional_frame_rates() {
        assert!((parse_frame_rate("30000/1001") - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25/1"), 25.0);
        assert_eq!(parse_frame_rate("24"), 24.0);
    }

    #[test]
    fn invalid_frame_rates_map_to_zero() {
        assert_eq!(parse_frame_rate("0/0"), 0.0);
        assert_eq!(parse_frame_rate("nonsense"), 0.0);
        assert_eq!(parse_frame_rate("30/0"), 0.0);
    }

    #[test]
    fn metadata_prefers_reported_frame_count() {
        let probe = json!({
            "streams": [{
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30/1",
                "nb_frames": "300"
            }],
            "format": { "duration": "10.0" }
        });
        let meta = metadata_from_probe(&probe).unwrap();
        assert_eq!(meta.total_frames, 300);
        assert_eq!(meta.fps, 30.0);
        assert_eq!((meta.width, meta.height), (1920, 1080));
    }

    #[test]
    fn metadata_falls_back_to_duration_times_fps() {
        let probe = json!({
            "streams": [{
                "codec_type": "video",
                "width": 1280,
                "height": 720,
                "r_frame_rate": "25/1"
            }],
            "format": { "duration": "8.0" }
        });
        let meta = metadata_from_probe(&probe).unwrap();
        assert_eq!(meta.total_frames, 200);
    }

    #[test]
    fn metadata_requires_a_video_stream() {
        let probe = json!({
            "streams": [{ "codec_type": "audio" }],
            "format": { "duration": "8.0" }
        });
        assert!(metadata_from_probe(&probe).is_none());
    }

    #[test]
    fn frame_timestamp_handles_zero_fps() {
        let frame = RawFrame { position: 90, image: RgbImage::new(1, 1) };
        assert_eq!(frame.timestamp(30.0), 3.0);
        assert_eq!(frame.timestamp(0.0), 0.0);
        assert_eq!(frame.timestamp(-1.0), 0.0);
    }
}

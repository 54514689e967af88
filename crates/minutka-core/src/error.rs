use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinutkaError {
    #[error("Video source unavailable at {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Audio extraction failed for {video_path}: {reason}")]
    AudioExtractionFailed { video_path: PathBuf, reason: String },

    #[error("Transcription failed for {audio_path}: {reason}")]
    TranscriptFailed { audio_path: PathBuf, reason: String },

    #[error("Caption burn failed for {video_path}: {reason}")]
    CaptionBurnFailed { video_path: PathBuf, reason: String },

    #[error("Invalid detection config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Frame decode failed: {0}")]
    FrameDecode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MinutkaError>;

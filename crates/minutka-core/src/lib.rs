//! Minutka Core Library
//!
//! Core functionality for processing meeting recordings: frame-level
//! scene-change and UI-interaction detection, plus the orchestration
//! wrappers around video acquisition, audio extraction, Whisper
//! transcription, subtitle generation, and report rendering.

pub mod compare;
pub mod config;
pub mod error;
pub mod format;
pub mod interaction;
pub mod pipeline;
pub mod report;
pub mod scene;
pub mod source;
pub mod transcript;
pub mod workspace;

// Re-export commonly used items at crate root
pub use compare::{mean_abs_diff, preprocess, ssim};
pub use config::{DetectionConfig, MAX_COMPARE_DIM};
pub use error::{MinutkaError, Result};
pub use format::{
    format_timestamp, format_timestamp_readable, format_timestamp_srt,
    format_transcript_with_timestamps,
};
pub use interaction::{
    INTERACTION_DEBOUNCE, InteractionEvent, InteractionScan, SCENE_COINCIDENCE_WINDOW,
    detect_interactions,
};
pub use pipeline::{
    acquire_video, burn_captions, download_video, extract_audio, load_interaction_scan,
    load_scene_scan, load_transcript, save_interaction_scan, save_scene_scan, transcribe_audio,
    write_srt,
};
pub use report::{MeetingReport, format_report_readable};
pub use scene::{ScanProgress, ScanStatus, SceneChangeEvent, SceneScan, detect_scenes};
pub use source::{FrameStream, RawFrame, VideoMetadata, probe_video};
pub use transcript::{Segment, Transcript, render_srt};

use serde::{Deserialize, Serialize};

use crate::format::format_timestamp_srt;

/// Whisper transcription output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Transcript {
    /// End timestamp of the last segment, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}

/// Render a transcript as SRT subtitle text.
pub fn render_srt(transcript: &Transcript) -> String {
    let mut output = String::new();
    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp_srt(segment.start),
            format_timestamp_srt(segment.end)
        ));
        output.push_str(segment.text.trim());
        output.push_str("\n\n");
    }
    output
}

//! Meeting report assembly and Markdown rendering.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::format_timestamp_readable;
use crate::interaction::InteractionEvent;
use crate::scene::SceneChangeEvent;
use crate::transcript::Transcript;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingReport {
    pub video_file: String,
    pub video_size_mb: f64,
    pub generated_at: String,
    pub duration_seconds: f64,
    pub scenes: Vec<SceneChangeEvent>,
    pub interactions: Vec<InteractionEvent>,
    pub transcript: Transcript,
}

impl MeetingReport {
    pub fn new(
        video_path: &Path,
        transcript: Transcript,
        scenes: Vec<SceneChangeEvent>,
        interactions: Vec<InteractionEvent>,
    ) -> Self {
        let video_size_mb = std::fs::metadata(video_path)
            .map(|m| m.len() as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0);

        Self {
            video_file: video_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            video_size_mb,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_seconds: transcript.duration_seconds(),
            scenes,
            interactions,
            transcript,
        }
    }
}

/// Render a meeting report as human-readable Markdown.
pub fn format_report_readable(report: &MeetingReport) -> String {
    let mut output = String::new();

    output.push_str("# Meeting Video Report\n\n");

    output.push_str("## Video Information\n\n");
    output.push_str("| | |\n|---|---|\n");
    output.push_str(&format!("| Video File | {} |\n", report.video_file));
    output.push_str(&format!("| File Size | {:.2} MB |\n", report.video_size_mb));
    output.push_str(&format!("| Report Generated | {} |\n", report.generated_at));
    output.push_str(&format!(
        "| Total Duration | {} |\n\n",
        format_timestamp_readable(report.duration_seconds)
    ));

    output.push_str("## Scene Changes & Screenshots\n\n");
    output.push_str(&format!(
        "Total scene changes detected: {}\n\n",
        report.scenes.len()
    ));
    for scene in &report.scenes {
        output.push_str(&format!(
            "### Scene {} — {}\n\n",
            scene.index + 1,
            scene.timestamp_readable
        ));
        // The snapshot path is best-effort; only reference files that
        // actually exist.
        if scene.snapshot_path.exists() {
            output.push_str(&format!(
                "![Scene {}]({})\n\n",
                scene.index + 1,
                scene.snapshot_path.display()
            ));
        }
        output.push_str(&format!("Similarity score: {:.3}\n\n", scene.similarity));
    }

    output.push_str("## Full Transcript\n\n");
    let full_text = report.transcript.text.trim();
    if full_text.is_empty() {
        output.push_str("No transcript available.\n\n");
    } else {
        output.push_str(full_text);
        output.push_str("\n\n");
    }

    output.push_str("## Segmented Transcript\n\n");
    if report.transcript.segments.is_empty() {
        output.push_str("No segments available.\n\n");
    } else {
        for segment in &report.transcript.segments {
            output.push_str(&format!(
                "[{}] {}\n",
                format_timestamp_readable(segment.start),
                segment.text.trim()
            ));
        }
        output.push('\n');
    }

    output.push_str("## UI Interactions\n\n");
    if report.interactions.is_empty() {
        output.push_str("No interactions detected.\n\n");
    } else {
        output.push_str("| Timestamp | Intensity |\n|---|---|\n");
        for interaction in &report.interactions {
            output.push_str(&format!(
                "| {} | {:.2} |\n",
                interaction.timestamp_readable, interaction.intensity
            ));
        }
        output.push('\n');
    }

    output.push_str("## Summary\n\n");
    output.push_str(&format!(
        "This meeting video contains {} major scene changes and {} UI interactions. \
         The total duration is approximately {}.\n",
        report.scenes.len(),
        report.interactions.len(),
        format_timestamp_readable(report.duration_seconds)
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Segment;
    use std::path::PathBuf;

    fn sample_transcript() -> Transcript {
        Transcript {
            text: "Welcome everyone.".to_string(),
            language: "en".to_string(),
            segments: vec![Segment { start: 0.0, end: 300.0, text: " Welcome everyone.".to_string() }],
        }
    }

    fn scene(index: u32, timestamp: f64, snapshot_path: PathBuf) -> SceneChangeEvent {
        SceneChangeEvent {
            index,
            timestamp,
            timestamp_readable: format_timestamp_readable(timestamp),
            snapshot_path,
            similarity: 0.15,
        }
    }

    #[test]
    fn report_contains_all_sections() {
        let report = MeetingReport {
            video_file: "standup.mp4".to_string(),
            video_size_mb: 12.5,
            generated_at: "2026-01-05 10:00:00".to_string(),
            duration_seconds: 300.0,
            scenes: vec![scene(0, 65.0, PathBuf::from("/nonexistent/scene_0000_01-05.jpg"))],
            interactions: vec![InteractionEvent {
                timestamp: 30.0,
                timestamp_readable: "00:30".to_string(),
                intensity: 42.5,
            }],
            transcript: sample_transcript(),
        };

        let rendered = format_report_readable(&report);
        assert!(rendered.contains("# Meeting Video Report"));
        assert!(rendered.contains("| Video File | standup.mp4 |"));
        assert!(rendered.contains("### Scene 1 — 01:05"));
        assert!(rendered.contains("Similarity score: 0.150"));
        assert!(rendered.contains("| 00:30 | 42.50 |"));
        assert!(rendered.contains("1 major scene changes and 1 UI interactions"));
    }

    #[test]
    fn missing_snapshots_are_not_referenced() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("scene_0000_00-05.jpg");
        std::fs::write(&existing, b"jpg").unwrap();

        let report = MeetingReport {
            video_file: "standup.mp4".to_string(),
            video_size_mb: 1.0,
            generated_at: "2026-01-05 10:00:00".to_string(),
            duration_seconds: 10.0,
            scenes: vec![
                scene(0, 5.0, existing.clone()),
                scene(1, 8.0, dir.path().join("scene_0001_00-08.jpg")),
            ],
            interactions: Vec::new(),
            transcript: sample_transcript(),
        };

        let rendered = format_report_readable(&report);
        assert!(rendered.contains(&format!("![Scene 1]({})", existing.display())));
        assert!(!rendered.contains("![Scene 2]"));
        assert!(rendered.contains("No interactions detected."));
    }
}

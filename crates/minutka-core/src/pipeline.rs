//! Orchestration wrappers around the external tools the pipeline
//! delegates to: yt-dlp for acquisition, ffmpeg for audio extraction and
//! caption burning, the whisper CLI for transcription. Thin subprocess
//! layers; all detection logic lives in [`crate::scene`] and
//! [`crate::interaction`].

use std::path::{Path, PathBuf};

use tokio::{fs, process::Command};

use crate::{
    error::{MinutkaError, Result},
    interaction::InteractionScan,
    scene::SceneScan,
    transcript::{Transcript, render_srt},
};

/// Resolve a video source to a local file. An existing local path is
/// used as-is; anything else is treated as a URL and handed to yt-dlp
/// (which covers YouTube, cloud storage shares, and plain HTTP).
pub async fn acquire_video(source: &str, workspace_dir: &Path) -> Result<PathBuf> {
    let local = Path::new(source);
    if local.is_file() {
        return Ok(local.to_path_buf());
    }

    download_video(source, workspace_dir).await
}

/// Download a video from URL using yt-dlp
pub async fn download_video(url: &str, workspace_dir: &Path) -> Result<PathBuf> {
    let output_template = workspace_dir.join("video.%(ext)s");
    let output = Command::new("yt-dlp")
        .arg(url)
        .arg("--print")
        .arg("after_move:filepath")
        .arg("-f")
        .arg("best")
        .arg("-o")
        .arg(&output_template)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MinutkaError::DownloadFailed {
            url: url.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout_str = String::from_utf8_lossy(output.stdout.as_slice());
    let filepath = stdout_str.trim();
    Ok(PathBuf::from(filepath))
}

/// Extract the audio track as 16 kHz mono PCM WAV using ffmpeg
pub async fn extract_audio(video_path: &Path, audio_path: &Path) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(video_path)
        .arg("-vn")
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ar")
        .arg("16000")
        .arg("-ac")
        .arg("1")
        .arg(audio_path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MinutkaError::AudioExtractionFailed {
            video_path: video_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Transcribe audio using the whisper CLI
pub async fn transcribe_audio(audio_path: &Path, output_path: &Path) -> Result<Transcript> {
    let output_dir = output_path.parent().unwrap_or(Path::new("."));

    let output = Command::new("whisper")
        .arg(audio_path)
        .arg("--model")
        .arg("base")
        .arg("--output_format")
        .arg("json")
        .arg("--output_dir")
        .arg(output_dir)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MinutkaError::TranscriptFailed {
            audio_path: audio_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    // Whisper names its output after the input file
    let whisper_output = output_dir.join("audio.json");
    if whisper_output != output_path {
        fs::rename(&whisper_output, output_path).await?;
    }

    let json_content = fs::read_to_string(output_path).await?;
    let transcript: Transcript = serde_json::from_str(&json_content)?;

    Ok(transcript)
}

/// Load a transcript from a cached file
pub async fn load_transcript(path: &Path) -> Result<Transcript> {
    let json_content = fs::read_to_string(path).await?;
    let transcript: Transcript = serde_json::from_str(&json_content)?;
    Ok(transcript)
}

/// Write a transcript as an SRT subtitle file
pub async fn write_srt(transcript: &Transcript, path: &Path) -> Result<()> {
    fs::write(path, render_srt(transcript)).await?;
    Ok(())
}

/// Burn SRT captions into the video using ffmpeg's subtitles filter.
/// Video is re-encoded with libx264; the audio track is copied.
pub async fn burn_captions(video_path: &Path, srt_path: &Path, output_path: &Path) -> Result<()> {
    let force_style = "FontName=Arial,FontSize=24,PrimaryColour=&H00FFFFFF&,\
                       OutlineColour=&H00000000&,BorderStyle=1,Outline=2,Shadow=0,Alignment=2";
    let vf_filter = format!(
        "subtitles='{}':force_style='{}'",
        escape_filter_path(&srt_path.to_string_lossy()),
        force_style
    );

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(video_path)
        .arg("-sub_charenc")
        .arg("UTF-8")
        .arg("-vf")
        .arg(&vf_filter)
        .arg("-c:v")
        .arg("libx264")
        .arg("-c:a")
        .arg("copy")
        .arg("-preset")
        .arg("medium")
        .arg("-crf")
        .arg("23")
        .arg(output_path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MinutkaError::CaptionBurnFailed {
            video_path: video_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Escape a path for use inside an ffmpeg filter argument (colons
/// delimit filter options, quotes delimit the value).
fn escape_filter_path(path: &str) -> String {
    path.replace(':', r"\:").replace('\'', r"\'")
}

/// Save a scene scan to a file as pretty JSON
pub async fn save_scene_scan(scan: &SceneScan, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(scan)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

/// Load a scene scan from a cached file
pub async fn load_scene_scan(path: &Path) -> Result<SceneScan> {
    let json_content = fs::read_to_string(path).await?;
    let scan: SceneScan = serde_json::from_str(&json_content)?;
    Ok(scan)
}

/// Save an interaction scan to a file as pretty JSON
pub async fn save_interaction_scan(scan: &InteractionScan, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(scan)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

/// Load an interaction scan from a cached file
pub async fn load_interaction_scan(path: &Path) -> Result<InteractionScan> {
    let json_content = fs::read_to_string(path).await?;
    let scan: InteractionScan = serde_json::from_str(&json_content)?;
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ScanStatus, SceneChangeEvent};

    #[test]
    fn filter_paths_escape_colons_and_quotes() {
        assert_eq!(escape_filter_path("/tmp/captions.srt"), "/tmp/captions.srt");
        assert_eq!(escape_filter_path("C:/x/it's.srt"), r"C\:/x/it\'s.srt");
    }

    #[tokio::test]
    async fn scene_scans_round_trip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenes.json");
        let scan = SceneScan {
            events: vec![SceneChangeEvent {
                index: 0,
                timestamp: 5.0,
                timestamp_readable: "00:05".to_string(),
                snapshot_path: dir.path().join("scene_0000_00-05.jpg"),
                similarity: 0.12,
            }],
            status: ScanStatus::Complete,
        };

        save_scene_scan(&scan, &path).await.unwrap();
        let loaded = load_scene_scan(&path).await.unwrap();
        assert_eq!(loaded, scan);
    }
}

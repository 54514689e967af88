use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

/// Get the working directory for a given source (local path or URL).
/// Each source gets its own directory so repeated runs reuse downloaded
/// and derived artifacts.
pub fn get_workspace_dir(source: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    let source_hash = hasher.finish();

    get_root_workspace_dir().join(source_hash.to_string())
}

pub fn get_root_workspace_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("minutka")
}

/// Find a previously acquired video file in the workspace directory
pub fn find_video_in_workspace(workspace_dir: &Path) -> Option<PathBuf> {
    let Ok(entries) = std::fs::read_dir(workspace_dir) else {
        return None;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if matches!(ext.as_str(), "mp4" | "webm" | "mkv" | "mov" | "avi" | "flv") {
                return Some(path);
            }
        }
    }
    None
}

pub fn get_audio_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("audio.wav")
}

pub fn get_transcript_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("transcript.json")
}

pub fn get_captions_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("captions.srt")
}

/// Directory where scene snapshots are written, one JPEG per event.
pub fn get_frames_dir(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("frames")
}

pub fn get_scene_events_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("scenes.json")
}

pub fn get_interaction_events_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("interactions.json")
}

pub fn get_report_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("report.md")
}

pub fn get_captioned_video_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("captioned.mp4")
}

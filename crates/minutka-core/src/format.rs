use crate::transcript::Transcript;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format seconds as HH:MM:SS, dropping the hour part when zero
pub fn format_timestamp_readable(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp_srt(seconds: f64) -> String {
    let clamped = seconds.max(0.0);
    let total = clamped as u64;
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    let millis = (clamped.fract() * 1000.0) as u32;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

/// Readable timestamp with colons swapped out, safe for filenames
pub fn filesystem_safe_timestamp(seconds: f64) -> String {
    format_timestamp_readable(seconds).replace(':', "-")
}

/// Format transcript segments with timestamps
pub fn format_transcript_with_timestamps(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp_readable(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

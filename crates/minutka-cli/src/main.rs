use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;

use minutka_core::{
    DetectionConfig, FrameStream, MeetingReport, ScanStatus, acquire_video, burn_captions,
    detect_interactions, detect_scenes, extract_audio, format_report_readable,
    load_interaction_scan, load_scene_scan, load_transcript, probe_video, save_interaction_scan,
    save_scene_scan, transcribe_audio, write_srt,
};
use minutka_core::workspace::{
    find_video_in_workspace, get_audio_path, get_captioned_video_path, get_captions_path,
    get_frames_dir, get_interaction_events_path, get_report_path, get_scene_events_path,
    get_transcript_path, get_workspace_dir,
};

#[derive(Parser)]
#[command(name = "minutka")]
#[command(
    about = "Process a meeting recording: transcribe, detect scene changes and UI interactions, and generate captions plus a written report"
)]
struct Cli {
    /// Video source: local file path or URL (YouTube, cloud storage share)
    source: String,

    /// SSIM threshold below which a scene change is detected
    #[arg(long, default_value_t = 0.3)]
    scene_threshold: f64,

    /// Minimum seconds between scene changes
    #[arg(long, default_value_t = 2.0)]
    min_scene_duration: f64,

    /// Frame-difference threshold for interaction detection
    #[arg(long, default_value_t = 0.1)]
    click_threshold: f64,

    /// Scene scanner analyzes every Nth frame
    #[arg(long, default_value_t = 1)]
    sample_rate: u32,

    /// Burn the generated captions into a copy of the video
    #[arg(short, long)]
    burn: bool,

    /// Force re-processing even if cached files exist
    #[arg(short, long)]
    force: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_frame_bar(total_frames: u64, msg: &str) -> ProgressBar {
    let pb = if total_frames > 0 {
        let pb = ProgressBar::new(total_frames);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} {bar:32.cyan/blue} {pos}/{len} frames")
                .unwrap(),
        );
        pb
    } else {
        create_spinner(msg)
    };
    pb.set_message(msg.to_string());
    pb
}

fn report_truncation(status: &ScanStatus) {
    if let ScanStatus::Truncated { frames_read } = status {
        println!(
            "{} Frame stream ended early after {} frames; results are partial",
            style("!").yellow().bold(),
            frames_read
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = DetectionConfig {
        scene_change_threshold: cli.scene_threshold,
        min_scene_duration: cli.min_scene_duration,
        click_threshold: cli.click_threshold,
        frame_sample_rate: cli.sample_rate,
    };
    if let Err(e) = config.validate() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    let workspace_dir = get_workspace_dir(&cli.source);
    fs::create_dir_all(&workspace_dir).await?;

    println!(
        "\n{}  {}\n",
        style("minutka").cyan().bold(),
        style("Meeting Recording Analyzer").dim()
    );

    // Step 1: Acquire video (check workspace)
    let video_file = if !cli.force && !Path::new(&cli.source).is_file() {
        if let Some(cached) = find_video_in_workspace(&workspace_dir) {
            println!(
                "{} Video ready {}",
                style("✓").green().bold(),
                style("(cached)").dim()
            );
            cached
        } else {
            let spinner = create_spinner("Acquiring video...");
            let video = acquire_video(&cli.source, &workspace_dir).await?;
            spinner.finish_with_message(format!(
                "{} Video ready: {}",
                style("✓").green().bold(),
                style(video.file_name().unwrap_or_default().to_string_lossy()).dim()
            ));
            video
        }
    } else {
        let spinner = create_spinner("Acquiring video...");
        let video = acquire_video(&cli.source, &workspace_dir).await?;
        spinner.finish_with_message(format!(
            "{} Video ready: {}",
            style("✓").green().bold(),
            style(video.file_name().unwrap_or_default().to_string_lossy()).dim()
        ));
        video
    };

    // Step 2: Extract audio (check workspace)
    let audio_file = get_audio_path(&workspace_dir);
    if !cli.force && audio_file.exists() {
        println!(
            "{} Audio extracted {}",
            style("✓").green().bold(),
            style("(cached)").dim()
        );
    } else {
        let spinner = create_spinner("Extracting audio...");
        extract_audio(&video_file, &audio_file).await?;
        spinner.finish_with_message(format!("{} Audio extracted", style("✓").green().bold()));
    }

    // Step 3: Transcribe (check workspace) and write SRT captions
    let transcript_path = get_transcript_path(&workspace_dir);
    let transcript = if !cli.force && transcript_path.exists() {
        let transcript = load_transcript(&transcript_path).await?;
        println!(
            "{} Transcribed {}",
            style("✓").green().bold(),
            style("(cached)").dim()
        );
        transcript
    } else {
        let spinner = create_spinner("Transcribing with Whisper...");
        let transcript = transcribe_audio(&audio_file, &transcript_path).await?;
        spinner.finish_with_message(format!(
            "{} Transcribed: {:.1} min, {} detected",
            style("✓").green().bold(),
            transcript.duration_seconds() / 60.0,
            style(&transcript.language).yellow()
        ));
        transcript
    };

    let captions_path = get_captions_path(&workspace_dir);
    write_srt(&transcript, &captions_path).await?;

    // Step 4: Scene detection (check workspace)
    let scene_events_path = get_scene_events_path(&workspace_dir);
    let scene_scan = if !cli.force && scene_events_path.exists() {
        let scan = load_scene_scan(&scene_events_path).await?;
        println!(
            "{} Scene detection: {} changes {}",
            style("✓").green().bold(),
            scan.events.len(),
            style("(cached)").dim()
        );
        scan
    } else {
        let metadata = {
            let video = video_file.clone();
            tokio::task::spawn_blocking(move || probe_video(&video)).await??
        };
        let bar = create_frame_bar(metadata.total_frames, "Detecting scenes...");
        let scan = {
            let video = video_file.clone();
            let config = config.clone();
            let frames_dir = get_frames_dir(&workspace_dir);
            let bar = bar.clone();
            tokio::task::spawn_blocking(move || {
                let frames = FrameStream::open(&video, &metadata)?;
                let progress = |p: minutka_core::ScanProgress| bar.set_position(p.frames_read);
                Ok::<_, minutka_core::MinutkaError>(detect_scenes(
                    frames,
                    metadata.fps,
                    &config,
                    &frames_dir,
                    Some(&progress),
                ))
            })
            .await??
        };
        bar.finish_and_clear();
        save_scene_scan(&scan, &scene_events_path).await?;
        println!(
            "{} Scene detection: {} changes",
            style("✓").green().bold(),
            scan.events.len()
        );
        report_truncation(&scan.status);
        scan
    };

    // Step 5: Interaction detection (check workspace)
    let interaction_events_path = get_interaction_events_path(&workspace_dir);
    let interaction_scan = if !cli.force && interaction_events_path.exists() {
        let scan = load_interaction_scan(&interaction_events_path).await?;
        println!(
            "{} Interaction detection: {} interactions {}",
            style("✓").green().bold(),
            scan.events.len(),
            style("(cached)").dim()
        );
        scan
    } else {
        let metadata = {
            let video = video_file.clone();
            tokio::task::spawn_blocking(move || probe_video(&video)).await??
        };
        let bar = create_frame_bar(metadata.total_frames, "Detecting interactions...");
        let scan = {
            let video = video_file.clone();
            let config = config.clone();
            let scene_events = scene_scan.events.clone();
            let bar = bar.clone();
            tokio::task::spawn_blocking(move || {
                let frames = FrameStream::open(&video, &metadata)?;
                let progress = |p: minutka_core::ScanProgress| bar.set_position(p.frames_read);
                Ok::<_, minutka_core::MinutkaError>(detect_interactions(
                    frames,
                    metadata.fps,
                    &scene_events,
                    &config,
                    Some(&progress),
                ))
            })
            .await??
        };
        bar.finish_and_clear();
        save_interaction_scan(&scan, &interaction_events_path).await?;
        println!(
            "{} Interaction detection: {} interactions",
            style("✓").green().bold(),
            scan.events.len()
        );
        report_truncation(&scan.status);
        scan
    };

    // Step 6: Generate report
    let report_path = get_report_path(&workspace_dir);
    let report = MeetingReport::new(
        &video_file,
        transcript,
        scene_scan.events,
        interaction_scan.events,
    );
    fs::write(&report_path, format_report_readable(&report)).await?;
    println!("{} Report generated", style("✓").green().bold());

    // Step 7 (optional): Burn captions into a copy of the video
    if cli.burn {
        let captioned_path = get_captioned_video_path(&workspace_dir);
        let spinner = create_spinner("Burning captions (this may take a while)...");
        burn_captions(&video_file, &captions_path, &captioned_path).await?;
        spinner.finish_with_message(format!(
            "{} Captions burned: {}",
            style("✓").green().bold(),
            style(captioned_path.display()).dim()
        ));
    }

    println!("\n{}", style("─".repeat(60)).dim());
    println!(
        "{} {}",
        style("Workspace:").dim(),
        style(workspace_dir.display()).cyan()
    );
    println!(
        "{} {}",
        style("Captions: ").dim(),
        style(captions_path.display()).cyan()
    );
    println!(
        "{} {}",
        style("Report:   ").dim(),
        style(report_path.display()).cyan()
    );

    Ok(())
}

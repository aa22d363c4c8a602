//! Extract the thumbnail filmstrip for a video.

use std::path::PathBuf;

use scrubline_common::config::ScrublineConfig;
use scrubline_engine::{RecordingPlayer, TimelineEngine};
use scrubline_extract::probe_duration;
use scrubline_model::frame::FrameSlot;
use scrubline_model::selection::VideoSelection;

pub async fn run(
    mut config: ScrublineConfig,
    video: PathBuf,
    cache_dir: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(dir) = cache_dir {
        config.cache_dir = dir;
    }
    config
        .layout
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid layout: {e}"))?;

    let duration = probe_duration(&config.extraction.ffprobe_binary, &video)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", video.display()))?;

    let mut engine = TimelineEngine::from_config(&config, RecordingPlayer::new());
    engine.on_video_selected(VideoSelection::new(video.to_string_lossy()));
    let count = engine.on_video_metadata_loaded(duration)?;

    if !json {
        println!("Extracting {count} frames from {}", video.display());
        println!("  Duration: {duration:.2}s");
        println!("  Cache: {}", config.cache_dir.display());
    }

    if let Some(outcome) = engine.next_extraction().await {
        outcome.map_err(|e| anyhow::anyhow!("Extraction failed: {e}"))?;
    }

    let snapshot = engine.frame_snapshot_for_render();
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    for (index, slot) in snapshot.iter().enumerate() {
        match slot {
            FrameSlot::Ready(path) => println!("  {:>4}  {}", index + 1, path.display()),
            FrameSlot::Pending => println!("  {:>4}  (pending)", index + 1),
        }
    }
    let ready = snapshot.iter().filter(|slot| slot.is_ready()).count();
    println!();
    println!("{ready}/{} frames ready", snapshot.len());

    Ok(())
}

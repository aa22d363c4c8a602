//! Replay a JSONL script of host events.
//!
//! Each event is printed followed by the player commands it produced.
//! Gesture events are marked `~`, player and picker events `>`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use scrubline_common::config::ScrublineConfig;
use scrubline_common::error::{ScrublineError, ScrublineResult};
use scrubline_engine::{RecordingPlayer, TimelineEngine};
use scrubline_extract::{ExtractionJob, FfmpegExtractor, FrameExtractor, FramePathTemplate};
use scrubline_model::event::parse_events;

/// Logs the `ffmpeg` invocation a job would run and reports it as unsupported.
struct DryRunExtractor {
    inner: FfmpegExtractor,
}

#[async_trait]
impl FrameExtractor for DryRunExtractor {
    async fn extract(&self, job: &ExtractionJob) -> ScrublineResult<FramePathTemplate> {
        let template = self.inner.output_template(job)?;
        let args = self.inner.build_args(job, &template);
        tracing::info!(args = %args.join(" "), "Dry run: skipping frame extraction");
        Err(ScrublineError::unsupported("dry run"))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

pub async fn run(config: &ScrublineConfig, script: PathBuf, extract: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&script)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", script.display()))?;
    let events = parse_events(&content)
        .map_err(|e| anyhow::anyhow!("Invalid event script {}: {e}", script.display()))?;

    let ffmpeg = FfmpegExtractor::new(config);
    let extractor: Arc<dyn FrameExtractor> = if extract {
        Arc::new(ffmpeg)
    } else {
        Arc::new(DryRunExtractor { inner: ffmpeg })
    };
    let mut engine = TimelineEngine::new(config.layout, RecordingPlayer::new(), extractor);

    let total = events.len();
    let gestures = events.iter().filter(|event| event.is_gesture()).count();
    for event in events {
        let marker = if event.is_gesture() { "~" } else { ">" };
        println!("{marker} {}", serde_json::to_string(&event)?);
        if let Err(e) = engine.dispatch(event) {
            println!("  ! {e}");
        }
        for command in engine.player().commands.iter() {
            println!("  {}", serde_json::to_string(command)?);
        }
        engine.player_mut().clear();
    }

    if extract {
        while let Some(outcome) = engine.next_extraction().await {
            match outcome {
                Ok(marked) => println!("= {marked} frames ready"),
                Err(e) => println!("= {e}"),
            }
        }
    }

    let window = engine.window();
    println!();
    println!("Replayed {total} events ({gestures} gestures)");
    println!(
        "Final: offset {}px, window [{:.3}s, {:.3}s], state {:?}",
        engine.scroll_offset(),
        window.left_secs,
        window.right_secs,
        engine.loop_state()
    );
    let snapshot = engine.frame_snapshot_for_render();
    let ready = snapshot.iter().filter(|slot| slot.is_ready()).count();
    println!("Frames: {ready}/{} ready", snapshot.len());

    Ok(())
}

//! End-to-end timeline scenarios driven through `TimelineEngine`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use scrubline_common::config::{ExtractionConfig, LayoutConstants};
use scrubline_common::error::{ScrublineError, ScrublineResult};
use scrubline_engine::{LoopState, PlayerCommand, RecordingPlayer, TimelineEngine};
use scrubline_extract::{ExtractionJob, FfmpegExtractor, FrameExtractor, FramePathTemplate};
use scrubline_model::frame::FrameSlot;
use scrubline_model::selection::VideoSelection;

/// Extractor that writes into `/cache` and holds back jobs for `gated_stem`
/// until the gate is opened.
struct ScriptedExtractor {
    gated_stem: Option<String>,
    gate: Notify,
    fail: bool,
    jobs: Mutex<Vec<ExtractionJob>>,
}

impl ScriptedExtractor {
    fn new() -> Self {
        Self {
            gated_stem: None,
            gate: Notify::new(),
            fail: false,
            jobs: Mutex::new(Vec::new()),
        }
    }

    fn gated(stem: &str) -> Self {
        Self {
            gated_stem: Some(stem.to_string()),
            ..Self::new()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl FrameExtractor for ScriptedExtractor {
    async fn extract(&self, job: &ExtractionJob) -> ScrublineResult<FramePathTemplate> {
        self.jobs.lock().unwrap().push(job.clone());
        if self.gated_stem.as_deref() == Some(job.output_stem.as_str()) {
            self.gate.notified().await;
        }
        if self.fail {
            return Err(ScrublineError::extraction(Some(1), "moov atom not found"));
        }
        FramePathTemplate::parse(format!("/cache/{}_%4d.png", job.output_stem))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn engine_with(extractor: Arc<ScriptedExtractor>) -> TimelineEngine<RecordingPlayer> {
    TimelineEngine::new(LayoutConstants::default(), RecordingPlayer::new(), extractor)
}

fn loaded_engine(duration: f64) -> TimelineEngine<RecordingPlayer> {
    let mut engine = engine_with(Arc::new(ScriptedExtractor::new()));
    engine.on_video_selected(VideoSelection::new("/videos/clip.mp4"));
    engine.on_video_metadata_loaded(duration).unwrap();
    engine.player_mut().clear();
    engine
}

#[test]
fn test_window_at_rest_and_scrolled() {
    let engine = engine_with(Arc::new(ScriptedExtractor::new()));
    let mapper = engine.mapper();

    assert_eq!(mapper.window_left_edge_time(0.0), 0.0);
    assert_eq!(mapper.window_right_edge_time(0.0), 4.0);
    assert_eq!(mapper.pop_line_time(0.0), 2.0);

    assert_eq!(mapper.window_left_edge_time(200.0), 5.0);
    assert_eq!(mapper.window_right_edge_time(200.0), 9.0);
    assert_eq!(mapper.pop_line_time(200.0), 7.0);
}

#[tokio::test]
async fn test_fractional_duration_rounds_slot_count_up() {
    let mut engine = engine_with(Arc::new(ScriptedExtractor::new()));
    engine.on_video_selected(VideoSelection::new("/videos/clip.mp4"));

    assert_eq!(engine.on_video_metadata_loaded(10.4).unwrap(), 11);
    let snapshot = engine.frame_snapshot_for_render();
    assert_eq!(snapshot.len(), 11);
    assert!(snapshot.iter().all(|slot| *slot == FrameSlot::Pending));
    assert_eq!(engine.loop_state(), Some(LoopState::Playing));
    assert!(!engine.player().paused);
}

#[tokio::test]
async fn test_successful_extraction_marks_every_frame_once() {
    let extractor = Arc::new(ScriptedExtractor::new());
    let mut engine = engine_with(extractor.clone());
    engine.on_video_selected(VideoSelection::new("/videos/clip.mp4"));
    engine.on_video_metadata_loaded(3.0).unwrap();

    assert_eq!(engine.next_extraction().await.unwrap().unwrap(), 3);
    assert_eq!(
        engine.frame_snapshot_for_render(),
        &[
            FrameSlot::Ready(PathBuf::from("/cache/clip_0001.png")),
            FrameSlot::Ready(PathBuf::from("/cache/clip_0002.png")),
            FrameSlot::Ready(PathBuf::from("/cache/clip_0003.png")),
        ]
    );
    assert_eq!(extractor.jobs.lock().unwrap().len(), 1);
    assert!(engine.next_extraction().await.is_none());
}

#[tokio::test]
async fn test_loop_back_at_right_edge() {
    let mut engine = loaded_engine(20.0);
    engine.on_scroll(200.0);
    engine.player_mut().clear();

    engine.on_playback_progress(9.2);

    assert_eq!(
        engine.player().commands,
        vec![PlayerCommand::Seek { time_secs: 5.0 }]
    );
    assert_eq!(engine.scroll_offset(), 200.0);
}

#[tokio::test]
async fn test_scrub_seeks_once_per_tick_without_loop_back() {
    let mut engine = loaded_engine(20.0);

    engine.on_touch_start();
    for offset in [40.0, 200.0, 320.0] {
        engine.on_scroll(offset);
        // Progress still arrives while scrubbing, well past the window.
        engine.on_playback_progress(19.0);
    }
    engine.on_touch_end();

    assert_eq!(engine.player().seeks(), vec![3.0, 7.0, 10.0]);
    assert_eq!(
        engine.player().commands.first(),
        Some(&PlayerCommand::Pause)
    );
    assert_eq!(
        engine.player().commands.last(),
        Some(&PlayerCommand::Resume)
    );
    assert_eq!(engine.loop_state(), Some(LoopState::Playing));
    assert_eq!(engine.scroll_offset(), 320.0);
}

#[tokio::test]
async fn test_playing_after_scrub_loops_in_new_window() {
    let mut engine = loaded_engine(20.0);
    engine.on_touch_start();
    engine.on_scroll(200.0);
    engine.on_touch_end();
    engine.player_mut().clear();

    engine.on_playback_progress(8.5);
    engine.on_playback_progress(9.0);

    assert_eq!(engine.player().seeks(), vec![5.0]);
}

#[tokio::test]
async fn test_momentum_keeps_scrubbing_after_release() {
    let mut engine = loaded_engine(20.0);

    engine.on_touch_start();
    engine.on_scroll(80.0);
    engine.on_momentum_begin();
    engine.on_touch_end();
    assert_eq!(engine.loop_state(), Some(LoopState::Scrubbing));
    engine.on_scroll(160.0);
    engine.on_playback_progress(12.0);
    engine.on_momentum_settle();

    assert_eq!(engine.player().seeks(), vec![4.0, 6.0]);
    assert_eq!(engine.loop_state(), Some(LoopState::Playing));
}

#[tokio::test]
async fn test_bounce_offsets_clamp_seek_targets() {
    let mut engine = loaded_engine(10.0);

    engine.on_touch_start();
    engine.on_scroll(-120.0);
    engine.on_scroll(1000.0);
    engine.on_touch_end();
    assert_eq!(engine.player().seeks(), vec![0.0, 10.0]);

    // Bounce back after release glides until momentum settles at -40.
    engine.player_mut().clear();
    engine.on_scroll(-40.0);
    engine.on_momentum_settle();
    engine.player_mut().clear();
    engine.on_playback_progress(3.1);
    assert_eq!(engine.player().seeks(), vec![0.0]);
}

#[tokio::test]
async fn test_glide_without_momentum_begin_never_loops_back() {
    let mut engine = loaded_engine(20.0);

    engine.on_touch_start();
    engine.on_scroll(120.0);
    engine.on_touch_end();
    engine.on_scroll(160.0);
    engine.on_playback_progress(9.5);
    engine.on_scroll(200.0);
    engine.on_momentum_settle();

    assert_eq!(engine.player().seeks(), vec![5.0, 6.0, 7.0]);
    assert_eq!(
        engine.player().commands.last(),
        Some(&PlayerCommand::Resume)
    );
    assert_eq!(engine.loop_state(), Some(LoopState::Playing));

    engine.player_mut().clear();
    engine.on_playback_progress(9.0);
    assert_eq!(engine.player().seeks(), vec![5.0]);
}

#[tokio::test]
async fn test_reselection_discards_stale_extraction() {
    let extractor = Arc::new(ScriptedExtractor::gated("first"));
    let mut engine = engine_with(extractor.clone());

    let first = engine.on_video_selected(VideoSelection::new("/videos/first.mp4"));
    engine.on_video_metadata_loaded(5.0).unwrap();
    let second = engine.on_video_selected(VideoSelection::new("/videos/second.mov"));
    assert!(second > first);
    assert!(engine.frame_snapshot_for_render().is_empty());
    engine.on_video_metadata_loaded(2.0).unwrap();
    assert_eq!(engine.extractions_in_flight(), 2);

    assert_eq!(engine.next_extraction().await.unwrap().unwrap(), 2);

    extractor.gate.notify_one();
    let stale = engine.next_extraction().await.unwrap().unwrap_err();
    assert!(stale.is_stale());

    let snapshot = engine.frame_snapshot_for_render();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(
        snapshot[1],
        FrameSlot::Ready(PathBuf::from("/cache/second_0002.png"))
    );
    assert_eq!(engine.player().source.as_deref(), Some("/videos/second.mov"));
}

#[tokio::test]
async fn test_failed_extraction_leaves_frames_pending() {
    let mut engine = engine_with(Arc::new(ScriptedExtractor::failing()));
    engine.on_video_selected(VideoSelection::new("/videos/broken.mp4"));
    engine.on_video_metadata_loaded(4.0).unwrap();

    let err = engine.next_extraction().await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        ScrublineError::ExtractionFailed {
            status: Some(1),
            ..
        }
    ));
    assert_eq!(engine.frame_snapshot_for_render().len(), 4);
    assert!(engine
        .frame_snapshot_for_render()
        .iter()
        .all(|slot| !slot.is_ready()));

    // Looping still works without thumbnails.
    engine.on_playback_progress(4.0);
    assert_eq!(engine.player().seeks(), vec![0.0]);
}

#[tokio::test]
async fn test_repeated_metadata_keeps_single_request() {
    let extractor = Arc::new(ScriptedExtractor::new());
    let mut engine = engine_with(extractor.clone());
    engine.on_video_selected(VideoSelection::new("/videos/clip.mp4"));

    assert_eq!(engine.on_video_metadata_loaded(6.0).unwrap(), 6);
    assert_eq!(engine.on_video_metadata_loaded(6.0).unwrap(), 6);
    assert_eq!(engine.extractions_in_flight(), 1);

    engine.next_extraction().await.unwrap().unwrap();
    assert_eq!(extractor.jobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_degenerate_window_never_loops() {
    let layout = LayoutConstants {
        window_duration_secs: 0.0,
        ..LayoutConstants::default()
    };
    let mut engine =
        TimelineEngine::new(layout, RecordingPlayer::new(), Arc::new(ScriptedExtractor::new()));
    engine.on_video_selected(VideoSelection::new("/videos/clip.mp4"));
    engine.on_video_metadata_loaded(10.0).unwrap();
    engine.player_mut().clear();

    for t in [0.0, 2.5, 5.0, 9.9] {
        engine.on_playback_progress(t);
    }
    assert!(engine.player().commands.is_empty());
}

/// Stand-in `ffmpeg`: writes the source URI into frame 1 of the output
/// template, lingering on sources under `/a/`.
#[cfg(unix)]
const FAKE_FFMPEG: &str = r#"#!/bin/sh
src=""
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-i" ]; then shift; src="$1"; fi
  out="$1"
  shift
done
case "$src" in
  /a/*) sleep 1 ;;
esac
frame=$(printf '%s' "$out" | sed 's/%4d/0001/')
printf '%s' "$src" > "$frame"
"#;

#[cfg(unix)]
#[tokio::test]
async fn test_superseded_run_cannot_overwrite_current_frames() {
    use std::os::unix::fs::PermissionsExt;

    let dir = std::env::temp_dir().join(format!("scrubline-stale-frames-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let binary = dir.join("ffmpeg");
    std::fs::write(&binary, FAKE_FFMPEG).unwrap();
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

    let extraction = ExtractionConfig {
        ffmpeg_binary: binary.to_string_lossy().into_owned(),
        ..ExtractionConfig::default()
    };
    let extractor = FfmpegExtractor::with_settings(&extraction, dir.join("cache"), 1.0);
    let mut engine = TimelineEngine::new(
        LayoutConstants::default(),
        RecordingPlayer::new(),
        Arc::new(extractor),
    );

    engine.on_video_selected(VideoSelection::new("/a/clip.mp4"));
    engine.on_video_metadata_loaded(2.0).unwrap();
    engine.on_video_selected(VideoSelection::new("/b/clip.mov"));
    engine.on_video_metadata_loaded(2.0).unwrap();

    assert_eq!(engine.next_extraction().await.unwrap().unwrap(), 2);
    let current = engine.frame_snapshot_for_render()[0]
        .path()
        .unwrap()
        .to_path_buf();
    assert_eq!(std::fs::read_to_string(&current).unwrap(), "/b/clip.mov");

    let stale = engine.next_extraction().await.unwrap().unwrap_err();
    assert!(stale.is_stale());
    assert_eq!(std::fs::read_to_string(&current).unwrap(), "/b/clip.mov");

    let superseded = dir.join("cache").join("clip_1_0001.png");
    assert_ne!(superseded, current);
    assert_eq!(std::fs::read_to_string(&superseded).unwrap(), "/a/clip.mp4");

    std::fs::remove_dir_all(&dir).ok();
}

//! Timeline engine: the single entry point for host events.

use std::sync::Arc;

use tokio::runtime::Handle;

use scrubline_common::config::{LayoutConstants, ScrublineConfig};
use scrubline_common::error::{ScrublineError, ScrublineResult};
use scrubline_extract::{ExtractionCompletion, ExtractionRequestHandler, FfmpegExtractor, FrameExtractor};
use scrubline_model::event::HostEvent;
use scrubline_model::frame::{expected_frame_count, FrameInventory, FrameSlot};
use scrubline_model::selection::{PickedAsset, SelectionId, VideoSelection};

use crate::controller::{LoopState, PlaybackLoopController};
use crate::mapper::{CoordinateMapper, SelectionWindow};
use crate::player::{PlayerCommand, PlayerTransport};

/// State scoped to one video selection. Replaced as a whole on re-selection.
#[derive(Debug)]
struct SelectionSession {
    id: SelectionId,
    selection: VideoSelection,
    scroll_offset: f64,
    timeline: Option<LoadedTimeline>,
}

/// Filmstrip state that exists once the duration is known.
#[derive(Debug)]
struct LoadedTimeline {
    inventory: FrameInventory,
    controller: PlaybackLoopController,
}

/// Wires the mapper, frame inventory, extraction, and playback loop together.
///
/// Every host event is delivered through `&mut self` on one thread; only
/// extraction runs elsewhere, and its completions are applied here.
pub struct TimelineEngine<P: PlayerTransport> {
    mapper: CoordinateMapper,
    player: P,
    extraction: ExtractionRequestHandler,
    last_selection: SelectionId,
    session: Option<SelectionSession>,
}

impl<P: PlayerTransport> TimelineEngine<P> {
    /// Engine whose extractions run on the Tokio runtime current at
    /// construction, or at request time when built outside one.
    pub fn new(layout: LayoutConstants, player: P, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self::with_handler(layout, player, ExtractionRequestHandler::new(extractor))
    }

    /// Engine driven from a non-runtime thread, spawning extraction on `runtime`.
    pub fn with_runtime(
        layout: LayoutConstants,
        player: P,
        extractor: Arc<dyn FrameExtractor>,
        runtime: Handle,
    ) -> Self {
        Self::with_handler(
            layout,
            player,
            ExtractionRequestHandler::with_runtime(extractor, runtime),
        )
    }

    fn with_handler(layout: LayoutConstants, player: P, extraction: ExtractionRequestHandler) -> Self {
        Self {
            mapper: CoordinateMapper::new(layout),
            player,
            extraction,
            last_selection: SelectionId(0),
            session: None,
        }
    }

    /// Engine using the `ffmpeg` extractor configured in `config`.
    pub fn from_config(config: &ScrublineConfig, player: P) -> Self {
        Self::new(
            config.layout,
            player,
            Arc::new(FfmpegExtractor::new(config)),
        )
    }

    /// Start a new selection, discarding all state of the previous one.
    pub fn on_video_selected(&mut self, selection: VideoSelection) -> SelectionId {
        let id = self.last_selection.next();
        self.last_selection = id;

        if let Some(previous) = &self.session {
            tracing::info!(
                previous = %previous.id,
                selection = %id,
                "Replacing video selection"
            );
        }
        tracing::info!(
            selection = %id,
            source = %selection.source_uri,
            name = %selection.display_name,
            "Video selected"
        );

        self.player.load(&selection.source_uri);
        self.session = Some(SelectionSession {
            id,
            selection,
            scroll_offset: 0.0,
            timeline: None,
        });
        id
    }

    /// Accept a picker result. On failure the current state is kept.
    pub fn select_picked_asset(&mut self, asset: &PickedAsset) -> ScrublineResult<SelectionId> {
        match VideoSelection::from_picked(asset) {
            Ok(selection) => Ok(self.on_video_selected(selection)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring picker result");
                Err(e)
            }
        }
    }

    /// The player determined the duration; size the filmstrip and request frames.
    ///
    /// Returns the number of frame slots. Repeated calls for the same
    /// selection keep the existing filmstrip. If frames cannot be requested
    /// (no Tokio runtime), every slot stays pending and looping still works.
    pub fn on_video_metadata_loaded(&mut self, duration_secs: f64) -> ScrublineResult<usize> {
        let Some(session) = self.session.as_mut() else {
            return Err(ScrublineError::metadata("no video selected"));
        };
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            tracing::warn!(selection = %session.id, duration_secs, "Invalid video duration");
            return Err(ScrublineError::metadata(format!(
                "invalid duration {duration_secs}"
            )));
        }
        if let Some(timeline) = &session.timeline {
            tracing::debug!(selection = %session.id, "Metadata already loaded");
            return Ok(timeline.inventory.len());
        }

        let frame_count =
            expected_frame_count(duration_secs, self.mapper.layout().frames_per_second);
        tracing::info!(
            selection = %session.id,
            duration_secs,
            frame_count,
            backend = self.extraction.extractor_name(),
            "Video metadata loaded"
        );

        session.timeline = Some(LoadedTimeline {
            inventory: FrameInventory::initialize(session.id, frame_count),
            controller: PlaybackLoopController::new(self.mapper, duration_secs),
        });
        self.player.set_paused(false);

        if frame_count > 0 {
            if let Err(e) =
                self.extraction
                    .request_frames(session.id, &session.selection, frame_count)
            {
                tracing::warn!(selection = %session.id, error = %e, "Frames not requested");
            }
        }
        Ok(frame_count)
    }

    /// The player could not read the source. The filmstrip stays absent.
    pub fn on_video_metadata_failed(&mut self, message: &str) {
        match &self.session {
            Some(session) => tracing::warn!(
                selection = %session.id,
                message,
                "Video metadata failed to load"
            ),
            None => tracing::warn!(message, "Video metadata failed without a selection"),
        }
    }

    /// The filmstrip scrolled to `offset` pixels.
    pub fn on_scroll(&mut self, offset: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.scroll_offset = offset;
        if let Some(timeline) = session.timeline.as_mut() {
            for command in timeline.controller.scroll(offset) {
                self.player.apply(command);
            }
        }
    }

    pub fn on_touch_start(&mut self) {
        self.drive_controller(PlaybackLoopController::touch_start);
    }

    pub fn on_touch_end(&mut self) {
        self.drive_controller(PlaybackLoopController::touch_end);
    }

    pub fn on_momentum_begin(&mut self) {
        self.drive_controller(PlaybackLoopController::momentum_begin);
    }

    pub fn on_momentum_settle(&mut self) {
        self.drive_controller(PlaybackLoopController::momentum_settle);
    }

    /// Periodic playback position report from the player.
    pub fn on_playback_progress(&mut self, current_time_secs: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let offset = session.scroll_offset;
        if let Some(timeline) = session.timeline.as_mut() {
            if let Some(command) = timeline.controller.progress(current_time_secs, offset) {
                self.player.apply(command);
            }
        }
    }

    /// Slot states for rendering; empty until metadata has loaded.
    pub fn frame_snapshot_for_render(&self) -> &[FrameSlot] {
        self.timeline()
            .map(|timeline| timeline.inventory.snapshot())
            .unwrap_or(&[])
    }

    /// Apply an extraction completion, returning the number of slots marked.
    ///
    /// Completions for a replaced selection are discarded with
    /// `StaleExtractionResult`; a failed extraction leaves every slot pending.
    pub fn apply_extraction(&mut self, completion: ExtractionCompletion) -> ScrublineResult<usize> {
        let tag = completion.selection;
        let inventory = self
            .session
            .as_mut()
            .filter(|session| session.id == tag)
            .and_then(|session| session.timeline.as_mut())
            .map(|timeline| &mut timeline.inventory);

        let Some(inventory) = inventory else {
            tracing::debug!(selection = %tag, "Discarding stale extraction result");
            return Err(ScrublineError::StaleExtractionResult { selection: tag.0 });
        };

        match ExtractionRequestHandler::apply(completion, inventory) {
            Ok(marked) => {
                tracing::info!(
                    selection = %tag,
                    marked,
                    ready = inventory.ready_count(),
                    total = inventory.len(),
                    "Frames ready"
                );
                Ok(marked)
            }
            Err(e) if e.is_stale() => {
                tracing::debug!(selection = %tag, "Discarding stale extraction result");
                Err(e)
            }
            Err(e) => {
                tracing::warn!(selection = %tag, error = %e, "Frame extraction failed");
                Err(e)
            }
        }
    }

    /// Apply every completion that has already arrived.
    ///
    /// Returns the outcome of each applied completion in arrival order.
    pub fn pump_extractions(&mut self) -> Vec<ScrublineResult<usize>> {
        let mut outcomes = Vec::new();
        while let Some(completion) = self.extraction.try_next_completion() {
            outcomes.push(self.apply_extraction(completion));
        }
        outcomes
    }

    /// Wait for the next extraction completion and apply it.
    ///
    /// Returns `None` when no extraction is in flight.
    pub async fn next_extraction(&mut self) -> Option<ScrublineResult<usize>> {
        let completion = self.extraction.next_completion().await?;
        Some(self.apply_extraction(completion))
    }

    /// Route a host event to the matching handler.
    pub fn dispatch(&mut self, event: HostEvent) -> ScrublineResult<()> {
        match event {
            HostEvent::Picked { asset } => {
                self.select_picked_asset(&asset)?;
            }
            HostEvent::Loaded { duration_secs } => {
                self.on_video_metadata_loaded(duration_secs)?;
            }
            HostEvent::LoadFailed { message } => self.on_video_metadata_failed(&message),
            HostEvent::Scroll { offset } => self.on_scroll(offset),
            HostEvent::TouchStart => self.on_touch_start(),
            HostEvent::TouchEnd => self.on_touch_end(),
            HostEvent::MomentumBegin => self.on_momentum_begin(),
            HostEvent::MomentumSettle => self.on_momentum_settle(),
            HostEvent::Progress { current_time_secs } => {
                self.on_playback_progress(current_time_secs)
            }
        }
        Ok(())
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn selection(&self) -> Option<&VideoSelection> {
        self.session.as_ref().map(|session| &session.selection)
    }

    pub fn selection_id(&self) -> Option<SelectionId> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Current scroll offset; 0 without a selection.
    pub fn scroll_offset(&self) -> f64 {
        self.session
            .as_ref()
            .map(|session| session.scroll_offset)
            .unwrap_or(0.0)
    }

    /// Playback loop state, once metadata has loaded.
    pub fn loop_state(&self) -> Option<LoopState> {
        self.timeline().map(|timeline| timeline.controller.state())
    }

    /// Duration of the current video, once known.
    pub fn duration_secs(&self) -> Option<f64> {
        self.timeline()
            .map(|timeline| timeline.controller.duration_secs())
    }

    /// Window times at the current scroll offset.
    pub fn window(&self) -> SelectionWindow {
        self.mapper.window(self.scroll_offset())
    }

    /// Slot under the pop line at the current scroll offset.
    pub fn pop_line_frame_index(&self) -> Option<usize> {
        let timeline = self.timeline()?;
        self.mapper
            .frame_index_at(self.window().pop_line_secs, timeline.inventory.len())
    }

    /// Number of extractions whose completion has not been applied.
    pub fn extractions_in_flight(&self) -> usize {
        self.extraction.in_flight()
    }

    fn timeline(&self) -> Option<&LoadedTimeline> {
        self.session.as_ref()?.timeline.as_ref()
    }

    fn drive_controller(
        &mut self,
        transition: fn(&mut PlaybackLoopController) -> Option<PlayerCommand>,
    ) {
        let Some(timeline) = self
            .session
            .as_mut()
            .and_then(|session| session.timeline.as_mut())
        else {
            return;
        };
        if let Some(command) = transition(&mut timeline.controller) {
            self.player.apply(command);
        }
    }
}

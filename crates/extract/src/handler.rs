//! One extraction per selection, completions tagged with their selection.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use scrubline_common::error::{ScrublineError, ScrublineResult};
use scrubline_model::frame::{FrameInventory, MarkOutcome};
use scrubline_model::selection::{SelectionId, VideoSelection};

use crate::template::FramePathTemplate;
use crate::{ExtractionJob, FrameExtractor};

/// Terminal outcome of one extraction, tagged with the selection it serves.
#[derive(Debug)]
pub struct ExtractionCompletion {
    /// Selection the request was issued for.
    pub selection: SelectionId,

    /// Number of frames requested.
    pub expected_count: usize,

    /// Output template on success.
    pub outcome: ScrublineResult<FramePathTemplate>,
}

/// Issues extraction requests and adapts their results into inventory updates.
pub struct ExtractionRequestHandler {
    extractor: Arc<dyn FrameExtractor>,
    tx: mpsc::UnboundedSender<ExtractionCompletion>,
    rx: mpsc::UnboundedReceiver<ExtractionCompletion>,
    last_requested: Option<SelectionId>,
    in_flight: usize,
    runtime: Option<Handle>,
}

impl ExtractionRequestHandler {
    /// Create a handler that spawns on the runtime current at construction.
    ///
    /// Outside a runtime, the runtime current at request time is used.
    pub fn new(extractor: Arc<dyn FrameExtractor>) -> Self {
        Self::build(extractor, Handle::try_current().ok())
    }

    /// Create a handler that spawns extraction tasks on `runtime`.
    ///
    /// Lets requests come from a thread that is not inside the runtime.
    pub fn with_runtime(extractor: Arc<dyn FrameExtractor>, runtime: Handle) -> Self {
        Self::build(extractor, Some(runtime))
    }

    fn build(extractor: Arc<dyn FrameExtractor>, runtime: Option<Handle>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            extractor,
            tx,
            rx,
            last_requested: None,
            in_flight: 0,
            runtime,
        }
    }

    /// Backend used for extraction.
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Number of requests whose completion has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start the extraction for `selection`.
    ///
    /// Returns `Ok(false)` without starting anything if this selection
    /// already has a request, and `Unsupported` when no Tokio runtime is
    /// available to run it on.
    pub fn request_frames(
        &mut self,
        selection_id: SelectionId,
        selection: &VideoSelection,
        expected_count: usize,
    ) -> ScrublineResult<bool> {
        if self
            .last_requested
            .is_some_and(|last| last >= selection_id)
        {
            tracing::warn!(
                selection = %selection_id,
                "Extraction already requested for this selection"
            );
            return Ok(false);
        }
        let Some(runtime) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            return Err(ScrublineError::unsupported(
                "frame extraction needs a Tokio runtime",
            ));
        };
        self.last_requested = Some(selection_id);
        self.in_flight += 1;

        let job = ExtractionJob {
            selection: selection_id,
            source_uri: selection.source_uri.clone(),
            output_stem: selection.display_name.clone(),
            frame_count: expected_count,
        };
        tracing::info!(
            selection = %selection_id,
            backend = self.extractor.name(),
            frames = expected_count,
            source = %job.source_uri,
            "Requesting frame extraction"
        );

        let extractor = Arc::clone(&self.extractor);
        let tx = self.tx.clone();
        runtime.spawn(async move {
            let outcome = extractor.extract(&job).await;
            // The receiver lives as long as the handler; a send error only
            // means the handler was dropped.
            let _ = tx.send(ExtractionCompletion {
                selection: selection_id,
                expected_count,
                outcome,
            });
        });
        Ok(true)
    }

    /// Next completion if one has arrived, without waiting.
    pub fn try_next_completion(&mut self) -> Option<ExtractionCompletion> {
        let completion = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Wait for the next completion. Returns `None` if nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<ExtractionCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Apply a completion to `inventory`, returning the number of slots marked.
    ///
    /// Completions for another selection are rejected as stale and leave the
    /// inventory untouched. On failure every slot stays `Pending`.
    pub fn apply(
        completion: ExtractionCompletion,
        inventory: &mut FrameInventory,
    ) -> ScrublineResult<usize> {
        if completion.selection != inventory.selection() {
            return Err(ScrublineError::StaleExtractionResult {
                selection: completion.selection.0,
            });
        }

        let template = completion.outcome?;
        let mut marked = 0;
        for (index, path) in template
            .enumerate(completion.expected_count)
            .into_iter()
            .enumerate()
        {
            if inventory.mark_ready(completion.selection, index, path) == MarkOutcome::Marked {
                marked += 1;
            }
        }
        Ok(marked)
    }
}

//! Scrubline Frame Extraction
//!
//! Issues one bulk thumbnail extraction per video selection and turns
//! its single terminal outcome into frame inventory updates.
//!
//! # Flow
//!
//! ```text
//! request_frames(selection #n) ──► tokio task ──► FrameExtractor::extract
//!                                                      │
//!                                        output template | failure
//!                                                      │
//! apply(completion #n, inventory) ◄── mpsc ◄───────────┘
//!        │
//!        ├─ tag != inventory owner ──► StaleExtractionResult (discarded)
//!        ├─ failure ─────────────────► ExtractionFailed (slots stay Pending)
//!        └─ success ─────────────────► mark_ready for frames 1..=count
//! ```
//!
//! The transcoder reports no per-file progress, so frames become ready
//! together when the batch finishes.

use async_trait::async_trait;

use scrubline_common::error::ScrublineResult;
use scrubline_model::selection::SelectionId;

pub mod ffmpeg;
pub mod handler;
pub mod template;

pub use ffmpeg::{command_exists, probe_duration, FfmpegExtractor};
pub use handler::{ExtractionCompletion, ExtractionRequestHandler};
pub use template::FramePathTemplate;

/// One bulk extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionJob {
    /// Selection the frames are extracted for.
    pub selection: SelectionId,

    /// URI or path of the source video.
    pub source_uri: String,

    /// Name used for the output files.
    pub output_stem: String,

    /// Number of frames to extract.
    pub frame_count: usize,
}

/// Trait for bulk frame extraction backends.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Run the extraction to completion.
    ///
    /// On success returns the template the frames were written to.
    async fn extract(&self, job: &ExtractionJob) -> ScrublineResult<FramePathTemplate>;

    /// Check if this backend can run on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

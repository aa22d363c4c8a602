//! Scrubline Engine
//!
//! Keeps a scrollable thumbnail filmstrip and a video player in sync:
//! - **Mapper:** scroll offset to window edge, pop line, and frame index
//! - **Controller:** the Playing/Scrubbing loop state machine
//! - **Player:** the transport seam the engine drives
//! - **Engine:** routes host events and applies extraction results
//!
//! ```text
//! host events ──► TimelineEngine ──► PlayerTransport (seek/pause/resume)
//!                     │    ▲
//!     request_frames  ▼    │ completions
//!               ExtractionRequestHandler
//! ```

pub mod controller;
pub mod engine;
pub mod mapper;
pub mod player;

pub use controller::{LoopState, PlaybackLoopController};
pub use engine::TimelineEngine;
pub use mapper::{clamp_seek_target, CoordinateMapper, SelectionWindow};
pub use player::{PlayerCommand, PlayerTransport, RecordingPlayer};

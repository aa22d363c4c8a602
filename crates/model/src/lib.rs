//! Scrubline Model
//!
//! Defines the data contracts shared by the engine and its hosts:
//! - **Selection:** the picked video and its identity tag
//! - **Frames:** per-second thumbnail slots and their inventory
//! - **Events:** gesture, player, and picker events delivered by the host
//!
//! Nothing here performs I/O or knows about playback.

pub mod event;
pub mod frame;
pub mod selection;

pub use event::*;
pub use frame::*;
pub use selection::*;

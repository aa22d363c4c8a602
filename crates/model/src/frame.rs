//! Per-second thumbnail slots for the filmstrip.
//!
//! Slots start `Pending` and move to `Ready` once their image exists on
//! disk. The transition is one-way: nothing reverts a ready slot, and the
//! slot count is fixed when the inventory is created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::selection::SelectionId;

/// State of one thumbnail slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum FrameSlot {
    /// No image yet; rendered as a neutral placeholder.
    Pending,
    /// Image extracted to the given path.
    Ready(PathBuf),
}

impl FrameSlot {
    pub fn is_ready(&self) -> bool {
        matches!(self, FrameSlot::Ready(_))
    }

    /// Image path, if the slot is ready.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FrameSlot::Ready(path) => Some(path),
            FrameSlot::Pending => None,
        }
    }
}

/// Result of a [`FrameInventory::mark_ready`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The slot moved from `Pending` to `Ready`.
    Marked,
    /// The slot was already ready; it keeps its first path.
    AlreadyReady,
    /// The index is outside the inventory.
    OutOfRange,
    /// The update belongs to another selection.
    Stale,
}

/// Number of slots for a video of the given duration.
///
/// One slot per started second at 1 fps (`ceil(duration)`). Non-finite or
/// negative durations yield no slots.
pub fn expected_frame_count(duration_secs: f64, frames_per_second: f64) -> usize {
    let frames = (duration_secs * frames_per_second).ceil();
    if frames.is_finite() && frames > 0.0 {
        frames as usize
    } else {
        0
    }
}

/// Ordered thumbnail slots for one video selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInventory {
    selection: SelectionId,
    slots: Vec<FrameSlot>,
}

impl FrameInventory {
    /// Create `expected_count` pending slots owned by `selection`.
    pub fn initialize(selection: SelectionId, expected_count: usize) -> Self {
        Self {
            selection,
            slots: vec![FrameSlot::Pending; expected_count],
        }
    }

    /// Selection this inventory belongs to.
    pub fn selection(&self) -> SelectionId {
        self.selection
    }

    /// Transition slot `index` to `Ready(path)`.
    pub fn mark_ready(
        &mut self,
        selection: SelectionId,
        index: usize,
        path: impl Into<PathBuf>,
    ) -> MarkOutcome {
        if selection != self.selection {
            return MarkOutcome::Stale;
        }
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::debug!(index, len = self.slots.len(), "Ignoring out-of-range frame");
            return MarkOutcome::OutOfRange;
        };
        if slot.is_ready() {
            return MarkOutcome::AlreadyReady;
        }
        *slot = FrameSlot::Ready(path.into());
        MarkOutcome::Marked
    }

    /// Slot states in filmstrip order.
    pub fn snapshot(&self) -> &[FrameSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots with an image.
    pub fn ready_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_ready()).count()
    }

    /// Whether every slot is ready.
    pub fn is_complete(&self) -> bool {
        self.ready_count() == self.slots.len()
    }
}

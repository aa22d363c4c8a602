//! Host events delivered to the timeline engine.
//!
//! Hosts deliver these serially on one thread. Scripted sessions store them
//! as JSONL, one object per line, with `#` comment lines allowed.

use serde::{Deserialize, Serialize};

use crate::selection::PickedAsset;

/// Discriminated union of host events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The media picker returned an asset.
    Picked {
        #[serde(flatten)]
        asset: PickedAsset,
    },

    /// The player loaded the current source.
    Loaded {
        /// Video duration in seconds.
        duration_secs: f64,
    },

    /// The player could not read the source.
    LoadFailed {
        #[serde(default)]
        message: String,
    },

    /// The filmstrip scrolled.
    Scroll {
        /// Horizontal content offset in pixels.
        offset: f64,
    },

    /// A finger touched the filmstrip.
    TouchStart,

    /// The finger lifted.
    TouchEnd,

    /// The filmstrip kept moving after release.
    MomentumBegin,

    /// Momentum scrolling came to rest.
    MomentumSettle,

    /// Periodic playback position report.
    Progress {
        /// Current playback time in seconds.
        #[serde(rename = "t")]
        current_time_secs: f64,
    },
}

impl HostEvent {
    /// Whether this event comes from the filmstrip scroll surface.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            HostEvent::Scroll { .. }
                | HostEvent::TouchStart
                | HostEvent::TouchEnd
                | HostEvent::MomentumBegin
                | HostEvent::MomentumSettle
        )
    }
}

/// Parse events from JSONL content (one JSON object per line).
pub fn parse_events(jsonl: &str) -> Result<Vec<HostEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

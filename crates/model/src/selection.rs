//! Video selections produced by the media picker.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use scrubline_common::error::{ScrublineError, ScrublineResult};

/// Identity tag for one accepted selection.
///
/// Ids increase monotonically within an engine, so a completion tagged with
/// an older id can always be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionId(pub u64);

impl SelectionId {
    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw asset as reported by the media picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedAsset {
    /// Original location of the asset, if the picker reports one.
    #[serde(default)]
    pub source_url: Option<String>,

    /// Local file path of the (possibly copied) asset.
    pub path: String,

    /// Creation date as epoch milliseconds or RFC 3339.
    #[serde(default)]
    pub creation_date: Option<String>,
}

/// An accepted video selection. Immutable for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSelection {
    /// URI handed to the player and the extractor.
    pub source_uri: String,

    /// Name derived from the file path, used to name extracted frames.
    pub display_name: String,

    /// When the video was created, if known.
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl VideoSelection {
    /// Create a selection directly from a URI.
    pub fn new(source_uri: impl Into<String>) -> Self {
        let source_uri = source_uri.into();
        let display_name = display_name_from_path(&source_uri);
        Self {
            source_uri,
            display_name,
            creation_timestamp: None,
        }
    }

    /// Derive a selection from a picker result.
    pub fn from_picked(asset: &PickedAsset) -> ScrublineResult<Self> {
        let path = asset.path.trim();
        if path.is_empty() {
            return Err(ScrublineError::selection("picked asset has no path"));
        }

        let source_uri = asset
            .source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(path)
            .to_string();

        Ok(Self {
            source_uri,
            display_name: display_name_from_path(path),
            creation_timestamp: asset
                .creation_date
                .as_deref()
                .and_then(parse_creation_date),
        })
    }
}

/// Strip the directory and extension from a path.
///
/// Everything from the first `.` of the file name on is treated as the
/// extension. Hidden files without a stem keep their full name.
pub fn display_name_from_path(path: &str) -> String {
    let file_name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    match file_name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

fn parse_creation_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

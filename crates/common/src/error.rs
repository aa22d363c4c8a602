//! Error types shared across Scrubline crates.

/// Top-level error type for Scrubline operations.
///
/// None of these are fatal: every kind is absorbed by the component that
/// raised it and leaves the filmstrip in an inert state.
#[derive(Debug, thiserror::Error)]
pub enum ScrublineError {
    /// The media picker was dismissed or produced an unusable asset.
    #[error("Selection failed: {message}")]
    SelectionFailed { message: String },

    /// The player could not determine the video duration.
    #[error("Metadata load failed: {message}")]
    MetadataLoadFailed { message: String },

    /// The bulk frame extractor returned a non-success outcome.
    #[error("Frame extraction failed{}: {message}", status_suffix(.status))]
    ExtractionFailed {
        status: Option<i32>,
        message: String,
    },

    /// An extraction result arrived for a selection that has been replaced.
    #[error("Stale extraction result for selection {selection}")]
    StaleExtractionResult { selection: u64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn status_suffix(status: &Option<i32>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Result type alias using ScrublineError.
pub type ScrublineResult<T> = Result<T, ScrublineError>;

impl ScrublineError {
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::SelectionFailed {
            message: msg.into(),
        }
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::MetadataLoadFailed {
            message: msg.into(),
        }
    }

    pub fn extraction(status: Option<i32>, msg: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            status,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether the error is a silently discarded stale result.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleExtractionResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_message_includes_status() {
        let err = ScrublineError::extraction(Some(1), "bad input");
        assert_eq!(err.to_string(), "Frame extraction failed (status 1): bad input");

        let err = ScrublineError::extraction(None, "ffmpeg not found");
        assert_eq!(err.to_string(), "Frame extraction failed: ffmpeg not found");
    }

    #[test]
    fn test_is_stale() {
        assert!(ScrublineError::StaleExtractionResult { selection: 3 }.is_stale());
        assert!(!ScrublineError::metadata("no duration").is_stale());
    }
}

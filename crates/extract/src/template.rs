//! Output path templates with a frame-index placeholder.

use std::fmt;
use std::path::PathBuf;

use scrubline_common::error::{ScrublineError, ScrublineResult};

/// A path containing one printf-style frame placeholder (`%d`, `%4d`, `%04d`).
///
/// The transcoder zero-pads the 1-based frame number to the placeholder
/// width, so `clip_%4d.png` yields `clip_0001.png`, `clip_0002.png`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePathTemplate {
    raw: String,
    prefix: String,
    suffix: String,
    width: usize,
}

impl FramePathTemplate {
    /// Parse a template, locating its placeholder.
    pub fn parse(raw: impl Into<String>) -> ScrublineResult<Self> {
        let raw = raw.into();
        let (start, end, width) = find_placeholder(&raw).ok_or_else(|| {
            ScrublineError::extraction(None, format!("output template has no frame placeholder: {raw}"))
        })?;
        Ok(Self {
            prefix: raw[..start].to_string(),
            suffix: raw[end..].to_string(),
            width,
            raw,
        })
    }

    /// Template text as handed to the transcoder.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Zero-padding width of the frame number.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Path of the 1-based frame `number`.
    pub fn frame_path(&self, number: usize) -> PathBuf {
        PathBuf::from(format!(
            "{}{:0width$}{}",
            self.prefix,
            number,
            self.suffix,
            width = self.width
        ))
    }

    /// Paths of frames `1..=count`, in filmstrip order.
    pub fn enumerate(&self, count: usize) -> Vec<PathBuf> {
        (1..=count).map(|number| self.frame_path(number)).collect()
    }
}

impl fmt::Display for FramePathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Find the first `%[0][N]d` in `raw`; returns byte range and width.
fn find_placeholder(raw: &str) -> Option<(usize, usize, usize)> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'd' {
            let width = raw[start + 1..j].parse::<usize>().unwrap_or(0);
            return Some((start, j + 1, width));
        }
        i = j.max(i + 1);
    }
    None
}

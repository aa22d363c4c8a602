//! Conversions between scroll offset, playback time, and frame index.
//!
//! The filmstrip advances `frames_per_second * tile_width` pixels per
//! second of video. The selection window is a fixed-width overlay whose
//! left edge sits at the scroll offset; the pop line sits at
//! `window_anchor_fraction` of its width. Offsets outside the content
//! (scroll bounce) are accepted as-is; callers clamp seek targets.

use scrubline_common::config::LayoutConstants;

/// Playback times under the selection window for one scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWindow {
    pub left_secs: f64,
    pub pop_line_secs: f64,
    pub right_secs: f64,
}

impl SelectionWindow {
    /// Duration between the window edges.
    pub fn span_secs(&self) -> f64 {
        self.right_secs - self.left_secs
    }

    /// Whether the window covers a positive span of time.
    pub fn is_degenerate(&self) -> bool {
        !(self.span_secs() > 0.0)
    }
}

/// Pure offset/time mapping over fixed layout constants.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    layout: LayoutConstants,
}

impl CoordinateMapper {
    pub fn new(layout: LayoutConstants) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutConstants {
        &self.layout
    }

    /// Filmstrip pixels per second of video.
    pub fn px_per_second(&self) -> f64 {
        self.layout.frames_per_second * self.layout.tile_width
    }

    /// Width of the selection window in pixels.
    pub fn window_width_px(&self) -> f64 {
        self.layout.window_duration_secs * self.px_per_second()
    }

    pub fn window_left_edge_time(&self, offset: f64) -> f64 {
        offset / self.px_per_second()
    }

    pub fn window_right_edge_time(&self, offset: f64) -> f64 {
        (offset + self.window_width_px()) / self.px_per_second()
    }

    pub fn pop_line_time(&self, offset: f64) -> f64 {
        (offset + self.layout.window_anchor_fraction * self.window_width_px())
            / self.px_per_second()
    }

    /// All three window times for `offset`.
    pub fn window(&self, offset: f64) -> SelectionWindow {
        SelectionWindow {
            left_secs: self.window_left_edge_time(offset),
            pop_line_secs: self.pop_line_time(offset),
            right_secs: self.window_right_edge_time(offset),
        }
    }

    /// Scroll offset that puts the pop line at `time_secs`.
    pub fn offset_for_pop_line_time(&self, time_secs: f64) -> f64 {
        time_secs * self.px_per_second()
            - self.layout.window_anchor_fraction * self.window_width_px()
    }

    /// Thumbnail slot showing `time_secs`, if it lies within the filmstrip.
    pub fn frame_index_at(&self, time_secs: f64, frame_count: usize) -> Option<usize> {
        let index = (time_secs * self.layout.frames_per_second).floor();
        if index.is_finite() && index >= 0.0 && index < frame_count as f64 {
            Some(index as usize)
        } else {
            None
        }
    }
}

/// Clamp a seek target into `[0, duration]`; non-finite targets map to 0.
pub fn clamp_seek_target(time_secs: f64, duration_secs: f64) -> f64 {
    if !time_secs.is_finite() {
        return 0.0;
    }
    time_secs.clamp(0.0, duration_secs.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(LayoutConstants {
            tile_width: 40.0,
            tile_height: 80.0,
            frames_per_second: 1.0,
            window_duration_secs: 4.0,
            window_anchor_fraction: 0.5,
        })
    }

    #[test]
    fn test_window_at_origin() {
        let window = mapper().window(0.0);
        assert_eq!(window.left_secs, 0.0);
        assert_eq!(window.right_secs, 4.0);
        assert_eq!(window.pop_line_secs, 2.0);
    }

    #[test]
    fn test_window_scrolled() {
        let window = mapper().window(200.0);
        assert_eq!(window.left_secs, 5.0);
        assert_eq!(window.right_secs, 9.0);
        assert_eq!(window.pop_line_secs, 7.0);
    }

    #[test]
    fn test_negative_offset_is_not_clamped() {
        let window = mapper().window(-40.0);
        assert_eq!(window.left_secs, -1.0);
        assert_eq!(window.pop_line_secs, 1.0);
    }

    #[test]
    fn test_window_width() {
        assert_eq!(mapper().window_width_px(), 160.0);
        assert_eq!(mapper().px_per_second(), 40.0);
    }

    #[test]
    fn test_offset_for_pop_line_time_inverts() {
        let m = mapper();
        assert_eq!(m.offset_for_pop_line_time(7.0), 200.0);
        assert_eq!(m.pop_line_time(m.offset_for_pop_line_time(3.25)), 3.25);
    }

    #[test]
    fn test_frame_index_at() {
        let m = mapper();
        assert_eq!(m.frame_index_at(0.0, 11), Some(0));
        assert_eq!(m.frame_index_at(10.4, 11), Some(10));
        assert_eq!(m.frame_index_at(11.0, 11), None);
        assert_eq!(m.frame_index_at(-0.1, 11), None);
        assert_eq!(m.frame_index_at(f64::NAN, 11), None);
    }

    #[test]
    fn test_clamp_seek_target() {
        assert_eq!(clamp_seek_target(-1.5, 10.0), 0.0);
        assert_eq!(clamp_seek_target(12.0, 10.0), 10.0);
        assert_eq!(clamp_seek_target(4.0, 10.0), 4.0);
        assert_eq!(clamp_seek_target(f64::INFINITY, 10.0), 0.0);
        assert_eq!(clamp_seek_target(3.0, -1.0), 0.0);
    }

    #[test]
    fn test_degenerate_window() {
        let m = CoordinateMapper::new(LayoutConstants {
            window_duration_secs: 0.0,
            ..LayoutConstants::default()
        });
        assert!(m.window(120.0).is_degenerate());
        assert!(!mapper().window(120.0).is_degenerate());
    }

    proptest! {
        #[test]
        fn window_width_is_translation_invariant(offset in -1.0e6f64..1.0e6) {
            let m = mapper();
            let span = m.window_right_edge_time(offset) - m.window_left_edge_time(offset);
            prop_assert!((span - 4.0).abs() < 1e-9);
        }

        #[test]
        fn eighth_second_offsets_give_exact_span(steps in -100_000i32..100_000) {
            let m = mapper();
            let offset = steps as f64 * 5.0;
            let span = m.window_right_edge_time(offset) - m.window_left_edge_time(offset);
            prop_assert_eq!(span, 4.0);
        }

        #[test]
        fn pop_line_lies_strictly_inside_window(
            offset in -1.0e5f64..1.0e5,
            anchor in 0.01f64..0.99,
        ) {
            let m = CoordinateMapper::new(LayoutConstants {
                window_anchor_fraction: anchor,
                ..LayoutConstants::default()
            });
            let window = m.window(offset);
            prop_assert!(window.left_secs < window.pop_line_secs);
            prop_assert!(window.pop_line_secs < window.right_secs);
        }
    }
}

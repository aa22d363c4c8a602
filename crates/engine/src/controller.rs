//! Looping playback state machine.
//!
//! Exactly one side owns the playback position at a time:
//!
//! ```text
//!            touch_start / momentum_begin
//!   ┌─────────┐ ────────────────────────► ┌───────────┐
//!   │ Playing │        (Pause)            │ Scrubbing │
//!   └─────────┘ ◄──────────────────────── └───────────┘
//!      │  ▲      touch ended AND momentum       │
//!      │  │      settled (Resume)               │ scroll: Seek(pop line)
//!      └──┘ progress >= right edge:             ▼
//!           Seek(left edge)                 scroll offset
//! ```
//!
//! While scrubbing, scroll drives the player and progress reports are
//! ignored, so a seek never feeds back into the scroll offset. While
//! playing, progress past the window's right edge wraps to its left edge;
//! the window itself does not move.
//!
//! Hosts that never report the start of momentum still get a held scrub: a
//! scroll tick between `touch_end` and `momentum_settle` counts as momentum.

use crate::mapper::{clamp_seek_target, CoordinateMapper};
use crate::player::PlayerCommand;

/// Who currently owns the playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Playback advances on its own and loops within the window.
    Playing,
    /// The user's gesture drives playback through scroll seeks.
    Scrubbing,
}

/// Coordinates scrubbing and autonomous looping for one selection.
#[derive(Debug, Clone)]
pub struct PlaybackLoopController {
    mapper: CoordinateMapper,
    duration_secs: f64,
    state: LoopState,
    touch_active: bool,
    momentum_active: bool,
    released: bool,
    last_progress_secs: Option<f64>,
    wrap_count: u64,
}

impl PlaybackLoopController {
    /// Create a controller for a video of known duration, initially playing.
    pub fn new(mapper: CoordinateMapper, duration_secs: f64) -> Self {
        Self {
            mapper,
            duration_secs,
            state: LoopState::Playing,
            touch_active: false,
            momentum_active: false,
            released: false,
            last_progress_secs: None,
            wrap_count: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_scrubbing(&self) -> bool {
        self.state == LoopState::Scrubbing
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Latest reported playback time.
    pub fn last_progress_secs(&self) -> Option<f64> {
        self.last_progress_secs
    }

    /// Number of loop-back seeks issued so far.
    pub fn wrap_count(&self) -> u64 {
        self.wrap_count
    }

    /// A touch landed on the filmstrip.
    pub fn touch_start(&mut self) -> Option<PlayerCommand> {
        self.touch_active = true;
        self.released = false;
        self.enter_scrubbing()
    }

    /// The filmstrip keeps gliding after release.
    pub fn momentum_begin(&mut self) -> Option<PlayerCommand> {
        self.momentum_active = true;
        self.enter_scrubbing()
    }

    /// The touch lifted.
    pub fn touch_end(&mut self) -> Option<PlayerCommand> {
        self.released = self.touch_active;
        self.touch_active = false;
        self.maybe_resume()
    }

    /// Momentum scrolling came to rest.
    pub fn momentum_settle(&mut self) -> Option<PlayerCommand> {
        self.momentum_active = false;
        self.released = false;
        self.maybe_resume()
    }

    /// The filmstrip moved to `offset`; returns the commands in issue order,
    /// ending with the seek to the pop line.
    ///
    /// The caller records `offset` as the new scroll offset. A tick after a
    /// release that has not settled yet pauses first. Other ticks that
    /// arrive while playing seek but leave the player running.
    pub fn scroll(&mut self, offset: f64) -> Vec<PlayerCommand> {
        let mut commands = Vec::with_capacity(2);
        if self.released && !self.momentum_active {
            self.momentum_active = true;
            tracing::debug!("Scroll after release, treating as momentum");
            commands.extend(self.enter_scrubbing());
        }

        let target = clamp_seek_target(self.mapper.pop_line_time(offset), self.duration_secs);
        tracing::trace!(offset, target, state = ?self.state, "Scroll seek");
        commands.push(PlayerCommand::Seek { time_secs: target });
        commands
    }

    /// A progress report from the player at `current_secs`.
    ///
    /// Returns the loop-back seek when playback reached the window's right
    /// edge. Never touches the scroll offset.
    pub fn progress(&mut self, current_secs: f64, offset: f64) -> Option<PlayerCommand> {
        self.last_progress_secs = Some(current_secs);
        if self.state == LoopState::Scrubbing {
            return None;
        }

        let window = self.mapper.window(offset);
        if window.is_degenerate() {
            tracing::trace!(span = window.span_secs(), "Skipping wrap for degenerate window");
            return None;
        }
        let past_right_edge = current_secs >= window.right_secs;
        if !past_right_edge {
            return None;
        }

        let target = clamp_seek_target(window.left_secs, self.duration_secs);
        self.wrap_count += 1;
        tracing::debug!(
            current_secs,
            right_secs = window.right_secs,
            target,
            "Looping playback to window start"
        );
        Some(PlayerCommand::Seek { time_secs: target })
    }

    fn enter_scrubbing(&mut self) -> Option<PlayerCommand> {
        if self.state == LoopState::Scrubbing {
            return None;
        }
        self.state = LoopState::Scrubbing;
        tracing::debug!("Scrubbing started");
        Some(PlayerCommand::Pause)
    }

    fn maybe_resume(&mut self) -> Option<PlayerCommand> {
        if self.state != LoopState::Scrubbing || self.touch_active || self.momentum_active {
            return None;
        }
        self.state = LoopState::Playing;
        tracing::debug!("Scrubbing ended, resuming playback");
        Some(PlayerCommand::Resume)
    }
}

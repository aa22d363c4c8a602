//! Player transport seam.

use serde::{Deserialize, Serialize};

/// Command issued to the player. All commands are fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Jump to the given playback time.
    Seek { time_secs: f64 },
    /// Stop advancing playback.
    Pause,
    /// Continue playback from the current position.
    Resume,
}

/// Trait for video player backends.
///
/// The player reports its duration and progress back to the engine through
/// the host; nothing here returns a result.
pub trait PlayerTransport {
    /// Replace the current source.
    fn load(&mut self, source_uri: &str);

    /// Seek to `time_secs`.
    fn seek(&mut self, time_secs: f64);

    /// Pause or resume playback.
    fn set_paused(&mut self, paused: bool);

    /// Forward a command to the matching transport call.
    fn apply(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Seek { time_secs } => self.seek(time_secs),
            PlayerCommand::Pause => self.set_paused(true),
            PlayerCommand::Resume => self.set_paused(false),
        }
    }
}

/// Player that records every command it receives.
///
/// Used for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingPlayer {
    pub source: Option<String>,
    pub paused: bool,
    pub commands: Vec<PlayerCommand>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seek targets in the order they were issued.
    pub fn seeks(&self) -> Vec<f64> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PlayerCommand::Seek { time_secs } => Some(*time_secs),
                _ => None,
            })
            .collect()
    }

    /// Drop recorded commands, keeping source and pause state.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl PlayerTransport for RecordingPlayer {
    fn load(&mut self, source_uri: &str) {
        self.source = Some(source_uri.to_string());
    }

    fn seek(&mut self, time_secs: f64) {
        self.commands.push(PlayerCommand::Seek { time_secs });
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.commands.push(if paused {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Resume
        });
    }
}

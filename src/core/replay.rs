//! Replay module - command logs and determinism checking
//!
//! A replay is the full seed state plus the timestamped command log; that
//! is everything a session needs to reproduce bit-for-bit. [`Replay::run`]
//! replays the log at a chosen elapse granularity, and [`Replay::verify`]
//! runs the log at a fine and a coarse granularity and demands identical
//! outcomes - the executable form of the determinism contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::{GameRng, RngState};
use crate::core::state::{State, StateEvent};
use crate::types::{Command, Moment, GRID_HEIGHT, GRID_WIDTH};

/// Settle horizon after the last command: long enough for any cascade on a
/// standard grid to finish.
const SETTLE_MS: u64 = 60_000;

/// One logged command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEntry {
    pub command: Command,
    pub moment: Moment,
}

/// A recorded session: seed, board shape, level and the command log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub seed: RngState,
    #[serde(default = "default_width")]
    pub width: u8,
    #[serde(default = "default_height")]
    pub height: u8,
    pub level: u32,
    #[serde(default)]
    pub entries: Vec<ReplayEntry>,
}

fn default_width() -> u8 {
    GRID_WIDTH
}

fn default_height() -> u8 {
    GRID_HEIGHT
}

/// The observable result of running a replay to its settle horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub checksum: u64,
    pub score: u32,
    pub spawn_count: u32,
    pub moment: Moment,
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("replay outcomes diverged: fine {fine:?}, coarse {coarse:?}")]
pub struct ReplayMismatch {
    pub fine: ReplayOutcome,
    pub coarse: ReplayOutcome,
}

impl Replay {
    pub fn new(seed: RngState, level: u32) -> Self {
        Self {
            seed,
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            level,
            entries: Vec::new(),
        }
    }

    /// Append a command. Moments must be non-decreasing; a replay recorded
    /// out of order would elapse commands at the wrong times.
    pub fn record(&mut self, command: Command, moment: Moment) {
        if let Some(last) = self.entries.last() {
            assert!(moment >= last.moment, "replay entries out of order");
        }
        self.entries.push(ReplayEntry { command, moment });
    }

    /// Run the log against a fresh state, elapsing in steps of at most
    /// `step_ms` between commands, then settle to a fixed horizon past the
    /// last command. The outcome must not depend on `step_ms`.
    pub fn run(&self, step_ms: u64) -> ReplayOutcome {
        let mut state = State::custom(self.width, self.height, self.level, GameRng::new(self.seed));
        state.elapse(Moment::ZERO);

        let mut cursor = Moment::ZERO;
        for entry in &self.entries {
            while step_ms > 0 && entry.moment.since(cursor) > step_ms {
                cursor = cursor.plus(step_ms);
                state.elapse(cursor);
            }
            state.handle_command(entry.command, entry.moment);
            cursor = entry.moment;
        }

        let end = cursor.plus(SETTLE_MS);
        let settle_step = step_ms.clamp(1, SETTLE_MS);
        while state.now() < end {
            let step = settle_step.min(end.since(state.now()));
            state.elapse(state.now().plus(step));
        }

        ReplayOutcome {
            checksum: state.grid().checksum(),
            score: state.score(),
            spawn_count: state.spawn_count(),
            moment: state.now(),
            game_over: state.is_game_over(),
        }
    }

    /// Run at a fine (16 ms) and a coarse (single-jump) granularity and
    /// check the outcomes agree.
    pub fn verify(&self) -> Result<ReplayOutcome, ReplayMismatch> {
        let fine = self.run(16);
        let coarse = self.run(u64::MAX);
        if fine == coarse {
            Ok(fine)
        } else {
            Err(ReplayMismatch { fine, coarse })
        }
    }
}

/// Record commands into a replay while applying them to a live state.
/// Keeps the log and the session in lockstep for interactive frontends.
#[derive(Debug)]
pub struct Recorder {
    state: State,
    replay: Replay,
}

impl Recorder {
    /// Start a standard game and its log from one seed.
    pub fn start(seed: RngState, level: u32) -> Self {
        let mut state = State::standard(level, GameRng::new(seed));
        state.elapse(Moment::ZERO);
        Self {
            state,
            replay: Replay::new(seed, level),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    pub fn elapse(&mut self, moment: Moment) {
        self.state.elapse(moment);
    }

    /// Apply and log a command. Ineffective commands are logged too: they
    /// still elapse time in the replayed session.
    pub fn handle_command(&mut self, command: Command, moment: Moment) -> bool {
        self.replay.record(command, moment);
        self.state.handle_command(command, moment)
    }

    /// Whether the underlying session has ended.
    pub fn is_game_over(&self) -> bool {
        matches!(self.state.event(), StateEvent::GameEnded)
    }
}

//! Deterministic simulation core for a falling-pair matching game.
//!
//! A grid of enemies is cleared by dropping linked catalyst pairs;
//! same-color runs of four destroy, destruction triggers gravity, and
//! cascades accumulate into scored combos. Everything runs on a logical
//! clock: given the same seed and the same timestamped command log, a
//! session reproduces bit-for-bit regardless of how the caller slices
//! time. No rendering, no input handling, no wall clock.
//!
//! # Quick start
//!
//! ```
//! use catalyst_core::{Command, GameRng, Moment, State};
//!
//! let mut game = State::standard(0, GameRng::seeded(42));
//! game.elapse(Moment::ZERO);
//! assert!(game.is_waiting_for_input());
//!
//! game.handle_command(Command::Left, Moment(250));
//! game.handle_command(Command::Plummet, Moment(400));
//! game.elapse(Moment(5_000));
//! ```

pub mod core;
pub mod types;

pub use crate::core::clock::{Appointment, Scheduler};
pub use crate::core::combo::{Combo, ComboInfo, PayoutTable};
pub use crate::core::deck::InfiniteDeck;
pub use crate::core::grid::Grid;
pub use crate::core::hooks::{CompositeHook, GameHook};
pub use crate::core::mover::Mover;
pub use crate::core::replay::{Recorder, Replay, ReplayOutcome};
pub use crate::core::rng::{GameRng, RngState};
pub use crate::core::state::{State, StateEvent};
pub use crate::types::{Color, Command, Direction, Kind, Loc, Moment, Occupant, SpawnItem};

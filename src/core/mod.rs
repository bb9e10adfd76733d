//! Simulation core: grid, gravity, destruction, scheduling and the state
//! machine that ties them together.

pub mod clock;
pub mod combo;
pub mod deck;
pub mod destruction;
pub mod gravity;
pub mod grid;
pub mod hooks;
pub mod mover;
pub mod replay;
pub mod rng;
pub mod state;

pub use clock::{Appointment, Scheduler};
pub use combo::{Combo, ComboInfo, PayoutTable};
pub use deck::InfiniteDeck;
pub use grid::Grid;
pub use hooks::{CompositeHook, GameHook};
pub use mover::Mover;
pub use replay::{Recorder, Replay, ReplayOutcome};
pub use rng::{GameRng, RngState};
pub use state::{State, StateEvent};

//! Hooks module - mode extension points on the core loop
//!
//! Game modes customize the simulation through [`GameHook`]: spawn
//! notifications, combo tracking, pre-spawn grid injection (garbage dumps,
//! scripted setups) and external end conditions. Every method has a no-op
//! default so a mode implements only what it needs.
//!
//! Hooks run at fixed points of the resolution loop and receive the
//! scheduler mutably, so a mode can book its own appointments on either
//! clock line. They must stay deterministic: no wall-clock reads, no
//! private randomness outside the game generator.

use crate::core::clock::Scheduler;
use crate::core::combo::ComboInfo;
use crate::core::grid::Grid;
use crate::types::{Loc, Occupant, SpawnItem};

/// Mode callbacks invoked by `State` as the game progresses.
pub trait GameHook {
    /// A new catalyst pair entered play under player control.
    fn on_catalyst_spawned(&mut self, _item: &SpawnItem) {}

    /// A destruction pass just extended the running combo. `previous` holds
    /// the counters before the pass, `current` after it.
    fn on_combo_updated(
        &mut self,
        _previous: &ComboInfo,
        _current: &ComboInfo,
        _scheduler: &mut Scheduler,
    ) {
    }

    /// The cascade settled with no further matches; the combo's payout has
    /// been scored and its counters are about to reset. `grid` is the
    /// settled field, so a mode can inspect what the cascade left behind.
    fn on_combo_likely_completed(
        &mut self,
        _grid: &Grid,
        _combo: &ComboInfo,
        _scheduler: &mut Scheduler,
    ) {
    }

    /// Called before each spawn. Returning cells defers the spawn: they are
    /// written into vacant grid cells and resolved (falls, matches) first.
    /// A mode must eventually return `None` for the same spawn index or the
    /// piece never appears.
    fn pre_spawn(&mut self, _grid: &Grid, _spawn_count: u32) -> Option<Vec<(Loc, Occupant)>> {
        None
    }

    /// External end condition (time limit, mode objective). Checked after
    /// every settled cascade.
    fn game_over(&self) -> bool {
        false
    }
}

/// Fans every callback out to a list of hooks, in registration order.
/// `pre_spawn` takes the first dump offered; `game_over` is true when any
/// hook says so.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Box<dyn GameHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: Box<dyn GameHook>) {
        self.hooks.push(hook);
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl GameHook for CompositeHook {
    fn on_catalyst_spawned(&mut self, item: &SpawnItem) {
        for hook in &mut self.hooks {
            hook.on_catalyst_spawned(item);
        }
    }

    fn on_combo_updated(
        &mut self,
        previous: &ComboInfo,
        current: &ComboInfo,
        scheduler: &mut Scheduler,
    ) {
        for hook in &mut self.hooks {
            hook.on_combo_updated(previous, current, scheduler);
        }
    }

    fn on_combo_likely_completed(
        &mut self,
        grid: &Grid,
        combo: &ComboInfo,
        scheduler: &mut Scheduler,
    ) {
        for hook in &mut self.hooks {
            hook.on_combo_likely_completed(grid, combo, scheduler);
        }
    }

    fn pre_spawn(&mut self, grid: &Grid, spawn_count: u32) -> Option<Vec<(Loc, Occupant)>> {
        self.hooks
            .iter_mut()
            .find_map(|hook| hook.pre_spawn(grid, spawn_count))
    }

    fn game_over(&self) -> bool {
        self.hooks.iter().any(|hook| hook.game_over())
    }
}

impl std::fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

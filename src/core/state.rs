//! State module - the game state machine
//!
//! One [`State`] owns a grid, the active mover, the spawn deck, the
//! scheduler and the score, and advances through [`StateEvent`]s. Every
//! transition is driven by logical time handed to [`State::elapse`] (or to
//! [`State::handle_command`], which elapses first), so a state is a pure
//! function of its construction inputs and the command log.
//!
//! The resolution loop after every commit: let everything fall, then
//! destroy matched runs, repeat until the grid settles, then score the
//! combo and spawn the next pair. Each phase occupies one event with an
//! appointment; nothing happens between appointments.

use crate::core::clock::{Appointment, Scheduler};
use crate::core::combo::{ComboInfo, PayoutTable};
use crate::core::deck::InfiniteDeck;
use crate::core::destruction::{self, DestructionResult};
use crate::core::gravity::{self, FallSampler};
use crate::core::grid::Grid;
use crate::core::hooks::{CompositeHook, GameHook};
use crate::core::mover::Mover;
use crate::core::rng::GameRng;
use crate::types::{
    Color, Command, Direction, Loc, Moment, Occupant, SpawnItem, BURST_WINDOW_MS, COLORS,
    DESTROY_MS, GRID_HEIGHT, GRID_WIDTH, PLUMMET_MS, SPAWN_MS,
};

/// What the game is currently doing. Events that take time carry the
/// appointment that ends them.
#[derive(Debug, Clone)]
pub enum StateEvent {
    /// Fresh state; the first `elapse` runs the initial resolution.
    Constructed,
    /// A pair is under player control; the clock is in the waiting state.
    /// Carries the item that spawned for observers that missed the draw.
    Spawned(Appointment, SpawnItem),
    /// Occupants are falling; the sampler holds per-cell distances.
    Fell(Appointment, FallSampler),
    /// Matched runs are flashing out.
    Destroyed(Appointment, DestructionResult),
    /// A burst commit is inside its cancellation window.
    BurstBegan(Appointment),
    /// A plummet commit is pausing before resolution.
    Plummeted(Appointment),
    /// Terminal. No transition leaves this event.
    GameEnded,
}

impl StateEvent {
    /// The appointment ending this event, if it takes time.
    pub fn appointment(&self) -> Option<Appointment> {
        match self {
            StateEvent::Constructed | StateEvent::GameEnded => None,
            StateEvent::Spawned(appt, _)
            | StateEvent::Fell(appt, _)
            | StateEvent::Destroyed(appt, _)
            | StateEvent::BurstBegan(appt)
            | StateEvent::Plummeted(appt) => Some(*appt),
        }
    }
}

/// A complete game: grid, mover, deck, clock, combo and score.
#[derive(Debug)]
pub struct State {
    grid: Grid,
    mover: Option<Mover>,
    deck: InfiniteDeck<SpawnItem>,
    scheduler: Scheduler,
    event: StateEvent,
    combo: ComboInfo,
    combo_active: bool,
    score: u32,
    spawn_count: u32,
    hooks: CompositeHook,
    reward_table: PayoutTable,
}

/// One of every ordered color pair; the source deck for spawning.
fn standard_deck() -> Vec<SpawnItem> {
    let mut items = Vec::with_capacity(COLORS.len() * COLORS.len());
    for &first in &COLORS {
        for &second in &COLORS {
            items.push(SpawnItem::pair(first, second));
        }
    }
    items
}

/// Whether placing `color` at `loc` would line up three same-color cells
/// on either axis.
fn makes_adjacent_run(grid: &Grid, loc: Loc, color: Color) -> bool {
    for axis in [Direction::Right, Direction::Up] {
        let mut run = 1;
        for dir in [axis, axis.opposite()] {
            let mut cur = loc.offset(dir);
            while grid.contains(cur) && !grid.is_vacant(cur) && grid.get(cur).color() == color {
                run += 1;
                cur = cur.offset(dir);
            }
        }
        if run >= 3 {
            return true;
        }
    }
    false
}

/// Scatter the level's enemies across the lower band of the grid, never
/// pre-building a run of three.
fn scatter_enemies(grid: &mut Grid, level: u32, rng: &mut GameRng) {
    let band = grid.height().saturating_sub(4).max(1) as u32;
    let capacity = grid.width() as u32 * band;
    let target = ((level + 1) * 4).min(capacity / 2);

    let mut placed = 0;
    let mut attempts = 0;
    while placed < target && attempts < target * 100 {
        attempts += 1;
        let loc = Loc::new(
            rng.next_int32(grid.width() as u32) as i8,
            rng.next_int32(band) as i8,
        );
        if !grid.is_vacant(loc) {
            continue;
        }
        let color = COLORS[rng.next_int32(COLORS.len() as u32) as usize];
        if makes_adjacent_run(grid, loc, color) {
            continue;
        }
        grid.set(loc, Occupant::enemy(color));
        placed += 1;
    }
}

impl State {
    /// Build a game over an explicit grid. The generator seeds the deck;
    /// further draws consume it through the deck only.
    pub fn new(grid: Grid, rng: GameRng) -> Self {
        Self {
            grid,
            mover: None,
            deck: InfiniteDeck::new(standard_deck(), rng),
            scheduler: Scheduler::new(),
            event: StateEvent::Constructed,
            combo: ComboInfo::default(),
            combo_active: false,
            score: 0,
            spawn_count: 0,
            hooks: CompositeHook::new(),
            reward_table: PayoutTable::reward(),
        }
    }

    /// Build a standard game: default grid dimensions with the level's
    /// enemy count scattered across the lower band.
    pub fn standard(level: u32, rng: GameRng) -> Self {
        State::custom(GRID_WIDTH, GRID_HEIGHT, level, rng)
    }

    /// A standard setup on explicit grid dimensions.
    pub fn custom(width: u8, height: u8, level: u32, mut rng: GameRng) -> Self {
        let mut grid = Grid::new(width, height);
        scatter_enemies(&mut grid, level, &mut rng);
        State::new(grid, rng)
    }

    /// Register a mode hook. Call before the first `elapse`.
    pub fn add_hook(&mut self, hook: Box<dyn GameHook>) {
        self.hooks.push(hook);
    }

    /// Replace the combo payout table (mode tuning).
    pub fn set_reward_table(&mut self, table: PayoutTable) {
        self.reward_table = table;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mover(&self) -> Option<&Mover> {
        self.mover.as_ref()
    }

    pub fn event(&self) -> &StateEvent {
        &self.event
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn deck(&self) -> &InfiniteDeck<SpawnItem> {
        &self.deck
    }

    pub fn combo(&self) -> &ComboInfo {
        &self.combo
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    pub fn now(&self) -> Moment {
        self.scheduler.now()
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.event, StateEvent::GameEnded)
    }

    /// Whether a pair is under player control right now.
    pub fn is_waiting_for_input(&self) -> bool {
        matches!(self.event, StateEvent::Spawned(..))
    }

    /// The sampler of the fall in progress, if the game is mid-fall.
    pub fn fall_animator(&self) -> Option<&FallSampler> {
        match &self.event {
            StateEvent::Fell(_, sampler) => Some(sampler),
            _ => None,
        }
    }

    /// The result of the destruction pass in progress, if any.
    pub fn destruction_animator(&self) -> Option<&DestructionResult> {
        match &self.event {
            StateEvent::Destroyed(_, result) => Some(result),
            _ => None,
        }
    }

    /// Progress of the current event in 0..=1 (1 when the event has no
    /// appointment). Presentation only.
    pub fn event_progress(&self) -> f64 {
        match self.event.appointment() {
            Some(appt) => appt.progress(&self.scheduler),
            None => 1.0,
        }
    }

    /// Advance logical time to `target`, firing every due transition on the
    /// way. Landing is boundary-exact: one call to `elapse(t)` produces the
    /// same transitions as any sequence of calls ending at `t`.
    pub fn elapse(&mut self, target: Moment) {
        let target = target.max(self.scheduler.now());
        self.fire_due();
        while self.scheduler.now() < target {
            let step = self.scheduler.next_boundary(target);
            self.scheduler.advance_to(step);
            self.fire_due();
        }
    }

    /// Apply a player command at `moment` (elapsing to it first). Returns
    /// whether the command had any effect.
    pub fn handle_command(&mut self, command: Command, moment: Moment) -> bool {
        self.elapse(moment);
        match command {
            Command::Left | Command::Right | Command::RotateCw | Command::RotateCcw => {
                self.steer(command)
            }
            Command::Plummet | Command::BurstBegin => self.commit(command),
            Command::BurstCancel => self.cancel_burst(),
        }
    }

    fn steer(&mut self, command: Command) -> bool {
        if !self.is_waiting_for_input() {
            return false;
        }
        let Some(mut mover) = self.mover else {
            return false;
        };
        let (w, h) = (self.grid.width(), self.grid.height());
        let moved = match command {
            Command::Left => mover.translate(Direction::Left, w),
            Command::Right => mover.translate(Direction::Right, w),
            Command::RotateCw => mover.rotate(true, w, h),
            Command::RotateCcw => mover.rotate(false, w, h),
            _ => unreachable!("steer called with a non-steering command"),
        };
        if !moved || mover.locs.iter().any(|&loc| !self.grid.is_vacant(loc)) {
            return false;
        }
        self.mover = Some(mover);
        true
    }

    /// Drop the mover into the grid and start the post-commit event:
    /// a plain plummet pause, or a burst with its cancellation window.
    fn commit(&mut self, command: Command) -> bool {
        if !self.is_waiting_for_input() {
            return false;
        }
        let Some(mover) = self.mover else {
            return false;
        };
        let Some(landed) = mover.preview_plummet(&self.grid) else {
            return false;
        };

        for (loc, occupant) in landed.locs.iter().zip(landed.occupants) {
            self.grid.set(*loc, occupant);
        }
        self.mover = None;
        self.scheduler.set_waiting(false);
        self.event = if command == Command::BurstBegin {
            StateEvent::BurstBegan(self.scheduler.create_appointment(BURST_WINDOW_MS))
        } else {
            StateEvent::Plummeted(self.scheduler.create_appointment(PLUMMET_MS))
        };
        true
    }

    /// Cut a burst's cancellation window short; the committed pair resolves
    /// as a plain plummet from here.
    fn cancel_burst(&mut self) -> bool {
        if !matches!(self.event, StateEvent::BurstBegan(_)) {
            return false;
        }
        self.event = StateEvent::Plummeted(self.scheduler.create_appointment(PLUMMET_MS));
        true
    }

    /// Run every transition whose appointment has arrived. `Spawned` and
    /// `GameEnded` wait for outside input and never fire on time alone.
    fn fire_due(&mut self) {
        loop {
            let due = match &self.event {
                StateEvent::Constructed => true,
                StateEvent::Spawned(..) | StateEvent::GameEnded => false,
                StateEvent::Fell(appt, _)
                | StateEvent::Destroyed(appt, _)
                | StateEvent::BurstBegan(appt)
                | StateEvent::Plummeted(appt) => appt.has_arrived(&self.scheduler),
            };
            if !due {
                return;
            }
            self.step_resolution();
        }
    }

    /// One step of the settle loop: fall if anything can, otherwise destroy
    /// if anything matches, otherwise conclude the combo and spawn.
    fn step_resolution(&mut self) {
        let sampler = gravity::resolve(&mut self.grid);
        if sampler.any() {
            let appt = self.scheduler.create_appointment(sampler.duration_ms());
            self.event = StateEvent::Fell(appt, sampler);
            return;
        }

        let previous = self.combo;
        if let Some(result) = destruction::destroy_groups(&mut self.grid, &mut self.combo) {
            self.combo_active = true;
            let current = self.combo;
            self.hooks
                .on_combo_updated(&previous, &current, &mut self.scheduler);
            let appt = self.scheduler.create_appointment(DESTROY_MS);
            self.event = StateEvent::Destroyed(appt, result);
            return;
        }

        if self.combo_active {
            let payout = self
                .reward_table
                .payout(self.combo.permissive.adjusted_group_count());
            self.score = self.score.saturating_add(payout);
            self.hooks
                .on_combo_likely_completed(&self.grid, &self.combo, &mut self.scheduler);
            self.combo_active = false;
        }

        if self.grid.count_enemies() == 0 || self.hooks.game_over() {
            self.scheduler.set_waiting(false);
            self.event = StateEvent::GameEnded;
            return;
        }

        self.spawn();
    }

    fn spawn(&mut self) {
        // A mode may defer the spawn by injecting cells that must settle
        // first.
        if let Some(dump) = self.hooks.pre_spawn(&self.grid, self.spawn_count) {
            for (loc, occupant) in dump {
                if self.grid.contains(loc) && self.grid.is_vacant(loc) {
                    self.grid.set(loc, occupant);
                }
            }
            self.step_resolution();
            return;
        }

        assert!(self.mover.is_none(), "spawn with an active mover");
        let item = self.deck.pop();
        let mover = Mover::spawn(item, self.grid.width(), self.grid.height());
        if mover.locs.iter().any(|&loc| !self.grid.is_vacant(loc)) {
            // Top-out: the entry cells are buried.
            self.scheduler.set_waiting(false);
            self.event = StateEvent::GameEnded;
            return;
        }

        self.hooks.on_catalyst_spawned(&item);
        self.mover = Some(mover);
        self.combo = ComboInfo::default();
        self.spawn_count += 1;
        self.scheduler.set_waiting(true);
        let appt = self.scheduler.create_appointment(SPAWN_MS);
        self.event = StateEvent::Spawned(appt, item);
    }
}

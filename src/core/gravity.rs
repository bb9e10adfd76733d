//! Gravity module - recursive blocked/unblocked resolution
//!
//! A cell may fall only if everything it depends on can also fall: the cell
//! below it, and - for a linked catalyst - its partner cell. Linked pairs
//! can depend on each other (directly for a horizontal pair, through
//! perpendicular links for stacked pairs), so the analysis cannot treat
//! cells independently.
//!
//! The resolver answers each top-level query with a recursive probe that
//! first marks the queried cell "assume unblocked". The assumption, checked
//! before the memo table, short-circuits mutual dependencies so a pair falls
//! together; it is restored when the probe returns so it never leaks between
//! top-level queries. Only the outermost query commits a result to the memo
//! for the pass - values computed under an assumption are provisional.
//!
//! Application is a separate pass: every unblocked, non-empty cell moves
//! exactly one row down, column by column from the bottom, so a vacated
//! origin is always consumed before its occupant's new home is read.

use crate::core::grid::Grid;
use crate::types::{Direction, Loc, Occupant, FALL_CELL_MS};

/// Scratch for one resolution pass.
struct Resolution<'g> {
    grid: &'g Grid,
    /// Committed blocked/unblocked per cell, written by top-level queries.
    memo: Vec<Option<bool>>,
    /// Speculative "assume unblocked" flags for the probe in flight.
    assumed: Vec<bool>,
}

impl<'g> Resolution<'g> {
    fn new(grid: &'g Grid) -> Self {
        let n = grid.width() as usize * grid.height() as usize;
        Self {
            grid,
            memo: vec![None; n],
            assumed: vec![false; n],
        }
    }

    fn slot(&self, loc: Loc) -> usize {
        loc.y as usize * self.grid.width() as usize + loc.x as usize
    }

    /// Answer for one cell, committing it to the memo.
    fn resolve(&mut self, loc: Loc) -> bool {
        let slot = self.slot(loc);
        if let Some(blocked) = self.memo[slot] {
            return blocked;
        }
        let blocked = self.probe(loc);
        self.memo[slot] = Some(blocked);
        blocked
    }

    /// Recursive blocked query. Does not write the memo; see `resolve`.
    fn probe(&mut self, loc: Loc) -> bool {
        if !self.grid.contains(loc) {
            return true;
        }
        let slot = self.slot(loc);
        // The assumption outranks the memo: inside a probe, the cell under
        // query is treated as falling so cyclic dependencies resolve.
        if self.assumed[slot] {
            return false;
        }
        if let Some(blocked) = self.memo[slot] {
            return blocked;
        }

        let occupant = self.grid.get(loc);
        if occupant.is_vacant() {
            return false;
        }

        let saved = self.assumed[slot];
        self.assumed[slot] = true;

        let mut blocked = self.probe(loc.below());
        let link = occupant.direction();
        if !blocked && link != Direction::None {
            blocked = self.probe(loc.offset(link));
        }

        self.assumed[slot] = saved;
        blocked
    }
}

/// One resolution pass: compute blocked flags for every cell, then move
/// every unblocked occupant one row down. Returns the origins that moved,
/// in application order (per column, bottom row first).
fn fall_pass_moves(grid: &mut Grid) -> Vec<Loc> {
    let mut resolution = Resolution::new(grid);
    let (w, h) = (grid.width() as i8, grid.height() as i8);

    let mut unblocked = Vec::new();
    for y in (0..h).rev() {
        for x in 0..w {
            let loc = Loc::new(x, y);
            if !resolution.resolve(loc) && !grid.get(loc).is_vacant() {
                unblocked.push(loc);
            }
        }
    }
    drop(resolution);

    // Apply column-independently, bottom row first, so every move lands in
    // a cell already vacated this pass (or vacant before it).
    unblocked.sort_by_key(|loc| (loc.x, loc.y));
    for &loc in &unblocked {
        let occupant = grid.get(loc);
        debug_assert!(grid.is_vacant(loc.below()), "fall target still occupied");
        grid.set(loc.below(), occupant);
        grid.set(loc, Occupant::NONE);
    }
    unblocked
}

/// Drop every unblocked occupant one cell. Returns whether anything moved.
pub fn fall_pass(grid: &mut Grid) -> bool {
    !fall_pass_moves(grid).is_empty()
}

/// Per-cell fall distances of one full resolution, keyed by the cell the
/// faller ended up in. Read-only sampler for fall animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallSampler {
    width: u8,
    distances: Vec<u8>,
}

impl FallSampler {
    fn empty(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            distances: vec![0; grid.width() as usize * grid.height() as usize],
        }
    }

    fn slot(&self, loc: Loc) -> usize {
        loc.y as usize * self.width as usize + loc.x as usize
    }

    /// How many rows the occupant now at `loc` fell.
    pub fn distance(&self, loc: Loc) -> u8 {
        self.distances[self.slot(loc)]
    }

    /// Whether anything fell at all.
    pub fn any(&self) -> bool {
        self.distances.iter().any(|&d| d > 0)
    }

    /// The longest fall of the resolution, in rows.
    pub fn max_distance(&self) -> u8 {
        self.distances.iter().copied().max().unwrap_or(0)
    }

    /// Animation duration for this resolution, in logical milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.max_distance() as u64 * FALL_CELL_MS
    }

    /// Vertical offset (in rows) to draw the occupant at `loc` above its
    /// final cell, given event progress in 0..=1. Presentation only.
    pub fn offset(&self, loc: Loc, progress: f64) -> f64 {
        self.distance(loc) as f64 * (1.0 - progress.clamp(0.0, 1.0))
    }
}

/// Run [`fall_pass`] to a fixed point, accumulating per-cell distances.
pub fn resolve(grid: &mut Grid) -> FallSampler {
    let mut sampler = FallSampler::empty(grid);
    loop {
        let moves = fall_pass_moves(grid);
        if moves.is_empty() {
            return sampler;
        }
        // Moves are ordered bottom-first per column, so each occupant's
        // accumulated distance shifts down before the cell above lands.
        for origin in moves {
            let slot = sampler.slot(origin);
            let below = sampler.slot(origin.below());
            sampler.distances[below] = sampler.distances[slot] + 1;
            sampler.distances[slot] = 0;
        }
    }
}

//! Mover module - the player-controlled catalyst pair
//!
//! The mover is a temporary overlay of two `(Loc, Occupant)` cells; it is
//! never written into the grid until it commits (plummet or burst). The
//! cells are always orthogonally adjacent and their directions point at
//! each other.
//!
//! Orientation is the direction from the first cell to the second, cycling
//! Right -> Down -> Left -> Up under clockwise rotation. Rotation pivots
//! the second cell around the first and applies a one-cell wall kick on
//! either axis when the rotated cell would leave the grid.

use crate::core::grid::Grid;
use crate::types::{Command, Direction, Loc, Occupant, SpawnItem};

/// The currently falling/controlled piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mover {
    pub locs: [Loc; 2],
    pub occupants: [Occupant; 2],
}

impl Mover {
    /// Place a fresh spawn item at the top center of a grid of the given
    /// dimensions: first cell left of center, second right of it.
    pub fn spawn(item: SpawnItem, width: u8, height: u8) -> Self {
        let x = (width / 2) as i8 - 1;
        let y = height as i8 - 1;
        Self {
            locs: [Loc::new(x, y), Loc::new(x + 1, y)],
            occupants: [
                item.first.with_direction(Direction::Right),
                item.second.with_direction(Direction::Left),
            ],
        }
    }

    /// Direction from the first cell to the second.
    pub fn orientation(&self) -> Direction {
        let (dx, dy) = (
            self.locs[1].x - self.locs[0].x,
            self.locs[1].y - self.locs[0].y,
        );
        match (dx, dy) {
            (1, 0) => Direction::Right,
            (-1, 0) => Direction::Left,
            (0, 1) => Direction::Up,
            (0, -1) => Direction::Down,
            _ => unreachable!("mover cells not adjacent: {:?}", self.locs),
        }
    }

    fn shifted(&self, dx: i8, dy: i8) -> Self {
        let mut next = *self;
        for loc in &mut next.locs {
            loc.x += dx;
            loc.y += dy;
        }
        next
    }

    fn in_bounds_x(&self, width: u8) -> bool {
        self.locs
            .iter()
            .all(|loc| loc.x >= 0 && loc.x < width as i8)
    }

    fn in_bounds(&self, width: u8, height: u8) -> bool {
        self.in_bounds_x(width)
            && self
                .locs
                .iter()
                .all(|loc| loc.y >= 0 && loc.y < height as i8)
    }

    /// Move one cell left or right. Rejected when the resulting X would
    /// leave the grid.
    pub fn translate(&mut self, direction: Direction, width: u8) -> bool {
        let dx = match direction {
            Direction::Left => -1,
            Direction::Right => 1,
            _ => return false,
        };
        let next = self.shifted(dx, 0);
        if !next.in_bounds_x(width) {
            return false;
        }
        *self = next;
        true
    }

    /// Rotate the second cell around the first, with a one-cell kick on
    /// either axis when the rotated position would exit the grid.
    pub fn rotate(&mut self, clockwise: bool, width: u8, height: u8) -> bool {
        let orientation = self.orientation();
        let next_orientation = if clockwise {
            orientation.rotated_cw()
        } else {
            orientation.rotated_ccw()
        };

        let mut next = *self;
        next.locs[1] = next.locs[0].offset(next_orientation);
        next.occupants[0] = next.occupants[0].with_direction(next_orientation);
        next.occupants[1] = next.occupants[1].with_direction(next_orientation.opposite());

        // Wall kick: pull the pair back in by one cell per violated axis.
        for loc in next.locs {
            if loc.x < 0 {
                next = next.shifted(1, 0);
            } else if loc.x >= width as i8 {
                next = next.shifted(-1, 0);
            }
        }
        for loc in next.locs {
            if loc.y < 0 {
                next = next.shifted(0, 1);
            } else if loc.y >= height as i8 {
                next = next.shifted(0, -1);
            }
        }

        if !next.in_bounds(width, height) {
            return false;
        }
        *self = next;
        true
    }

    /// Landing position of a straight drop: lift to the topmost row, then
    /// descend cell by cell while both cells stay in bounds and vacant.
    /// `None` when even the top row overlaps.
    pub fn preview_plummet(&self, grid: &Grid) -> Option<Mover> {
        let top = grid.height() as i8 - 1;
        let highest = self.locs[0].y.max(self.locs[1].y);
        let mut current = self.shifted(0, top - highest);

        let fits =
            |m: &Mover| m.locs.iter().all(|&loc| grid.contains(loc) && grid.is_vacant(loc));
        if !fits(&current) {
            return None;
        }

        loop {
            let next = current.shifted(0, -1);
            if !fits(&next) {
                return Some(current);
            }
            current = next;
        }
    }

    /// The single command that moves this mover toward `target`: rotation
    /// first, then horizontal distance. `None` when already matching.
    /// Used by automated solvers and puzzle tooling.
    pub fn approach(&self, target: &Mover) -> Option<Command> {
        let from = self.orientation().cw_index().expect("real orientation");
        let to = target.orientation().cw_index().expect("real orientation");
        let cw_steps = (4 + to - from) % 4;
        match cw_steps {
            0 => {}
            3 => return Some(Command::RotateCcw),
            _ => return Some(Command::RotateCw),
        }

        match self.locs[0].x.cmp(&target.locs[0].x) {
            std::cmp::Ordering::Greater => Some(Command::Left),
            std::cmp::Ordering::Less => Some(Command::Right),
            std::cmp::Ordering::Equal => None,
        }
    }
}

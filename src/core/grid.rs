//! Grid module - owns the cell storage for one game
//!
//! The grid is a `width x height` field of [`Occupant`] values in a flat,
//! row-major array (`y * width + x`) for cache locality. `y = 0` is the
//! bottom row. Out-of-bounds `get`/`set` is a programming error and panics;
//! callers that need to probe uncertain coordinates go through
//! [`Grid::contains`] first.
//!
//! The grid is exclusively owned by one `State`; speculative analysis
//! (puzzle tooling, solvers) works on an explicit [`Clone`].

use crate::types::{Color, Direction, Loc, Occupant, MAX_GRID_DIM};

/// The playing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    cells: Vec<Occupant>,
}

impl Grid {
    /// Create an empty grid. Panics if either dimension is zero or exceeds
    /// [`MAX_GRID_DIM`].
    pub fn new(width: u8, height: u8) -> Self {
        assert!(
            width > 0 && height > 0 && width <= MAX_GRID_DIM && height <= MAX_GRID_DIM,
            "grid dimensions {width}x{height} out of range"
        );
        Self {
            width,
            height,
            cells: vec![Occupant::NONE; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether `loc` names a cell of this grid.
    pub fn contains(&self, loc: Loc) -> bool {
        loc.x >= 0 && loc.x < self.width as i8 && loc.y >= 0 && loc.y < self.height as i8
    }

    fn index(&self, loc: Loc) -> usize {
        assert!(self.contains(loc), "grid access out of bounds: {loc:?}");
        loc.y as usize * self.width as usize + loc.x as usize
    }

    /// The occupant at `loc`. Bounds are a precondition.
    pub fn get(&self, loc: Loc) -> Occupant {
        self.cells[self.index(loc)]
    }

    /// Replace the occupant at `loc`. Bounds are a precondition.
    pub fn set(&mut self, loc: Loc, occupant: Occupant) {
        let idx = self.index(loc);
        self.cells[idx] = occupant;
    }

    /// Whether the in-bounds cell at `loc` is empty.
    pub fn is_vacant(&self, loc: Loc) -> bool {
        self.get(loc).is_vacant()
    }

    /// All cell locations in raster order (top row first, left to right).
    pub fn locations(&self) -> impl Iterator<Item = Loc> + '_ {
        let (w, h) = (self.width as i8, self.height as i8);
        (0..h)
            .rev()
            .flat_map(move |y| (0..w).map(move |x| Loc::new(x, y)))
    }

    /// Number of enemy cells still on the field.
    pub fn count_enemies(&self) -> u32 {
        self.cells.iter().filter(|occ| occ.is_enemy()).count() as u32
    }

    /// FNV-1a checksum over the packed cell values, in storage order.
    /// Stable across runs; used to compare replay outcomes.
    pub fn checksum(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        for occ in &self.cells {
            for byte in occ.bits().to_le_bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        hash
    }

    /// Build a grid from a row picture, top row first. Characters:
    /// `.` vacant, `r`/`y`/`b` enemy, `R`/`Y`/`B` catalyst with no partner.
    /// Intended for tests and puzzle tooling; panics on malformed input.
    pub fn from_rows(rows: &[&str]) -> Self {
        assert!(!rows.is_empty(), "empty row picture");
        let width = rows[0].len();
        assert!(
            rows.iter().all(|r| r.len() == width),
            "ragged row picture"
        );

        let mut grid = Grid::new(width as u8, rows.len() as u8);
        for (i, row) in rows.iter().enumerate() {
            let y = (rows.len() - 1 - i) as i8;
            for (x, c) in row.chars().enumerate() {
                let occ = match c {
                    '.' => Occupant::NONE,
                    c if c.is_lowercase() => {
                        let color = Color::from_char(c)
                            .unwrap_or_else(|| panic!("bad cell char {c:?}"));
                        Occupant::enemy(color)
                    }
                    c => {
                        let color = Color::from_char(c)
                            .unwrap_or_else(|| panic!("bad cell char {c:?}"));
                        Occupant::catalyst(color, Direction::None)
                    }
                };
                grid.set(Loc::new(x as i8, y), occ);
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    #[test]
    fn test_grid_new_is_vacant() {
        let grid = Grid::new(8, 16);
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 16);
        for loc in grid.locations() {
            assert!(grid.is_vacant(loc));
        }
    }

    #[test]
    fn test_grid_set_and_get() {
        let mut grid = Grid::new(8, 16);
        let occ = Occupant::enemy(Color::Red);
        grid.set(Loc::new(3, 5), occ);
        assert_eq!(grid.get(Loc::new(3, 5)), occ);
        assert!(!grid.is_vacant(Loc::new(3, 5)));

        grid.set(Loc::new(3, 5), Occupant::NONE);
        assert!(grid.is_vacant(Loc::new(3, 5)));
    }

    #[test]
    fn test_grid_contains() {
        let grid = Grid::new(8, 16);
        assert!(grid.contains(Loc::new(0, 0)));
        assert!(grid.contains(Loc::new(7, 15)));
        assert!(!grid.contains(Loc::new(-1, 0)));
        assert!(!grid.contains(Loc::new(0, -1)));
        assert!(!grid.contains(Loc::new(8, 0)));
        assert!(!grid.contains(Loc::new(0, 16)));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_grid_get_out_of_bounds_panics() {
        let grid = Grid::new(8, 16);
        let _ = grid.get(Loc::new(8, 0));
    }

    #[test]
    fn test_grid_clone_is_independent() {
        let mut grid = Grid::new(4, 4);
        grid.set(Loc::new(1, 1), Occupant::enemy(Color::Blue));

        let mut copy = grid.clone();
        copy.set(Loc::new(1, 1), Occupant::NONE);
        copy.set(Loc::new(2, 2), Occupant::enemy(Color::Red));

        assert_eq!(grid.get(Loc::new(1, 1)), Occupant::enemy(Color::Blue));
        assert!(grid.is_vacant(Loc::new(2, 2)));
    }

    #[test]
    fn test_grid_checksum_tracks_content() {
        let mut a = Grid::new(8, 16);
        let b = Grid::new(8, 16);
        assert_eq!(a.checksum(), b.checksum());

        a.set(Loc::new(0, 0), Occupant::enemy(Color::Yellow));
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_grid_from_rows() {
        let grid = Grid::from_rows(&[
            "....", //
            "R..y", //
            "r.b.", //
        ]);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        // Bottom row is the last picture row.
        assert_eq!(grid.get(Loc::new(0, 0)).kind(), Kind::Enemy);
        assert_eq!(grid.get(Loc::new(0, 0)).color(), Color::Red);
        assert_eq!(grid.get(Loc::new(2, 0)).color(), Color::Blue);
        assert_eq!(grid.get(Loc::new(0, 1)).kind(), Kind::Catalyst);
        assert_eq!(grid.get(Loc::new(3, 1)).kind(), Kind::Enemy);
        assert!(grid.is_vacant(Loc::new(1, 2)));
        assert_eq!(grid.count_enemies(), 3);
    }
}

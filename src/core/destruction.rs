//! Destruction module - simultaneous row/column run matching
//!
//! Scans every row (left to right) and every column (bottom to top) for
//! maximal same-color runs. A run of [`MATCH_LENGTH`] or more marks all of
//! its cells; a cell is destroyed when *either* axis marks it, so crossing
//! runs clear together in one pass. Each qualifying run counts as one group
//! toward the combo - permissive always, strict only when the run contains
//! an enemy.
//!
//! After removal, a divorce pass restores the pairing invariant: any
//! surviving catalyst whose partner cell is now vacant has its direction
//! reset to `None`.

use arrayvec::ArrayVec;

use crate::core::combo::ComboInfo;
use crate::core::grid::Grid;
use crate::types::{Color, Direction, Loc, Occupant, MATCH_LENGTH, MAX_GRID_DIM};

/// Per-cell record of the best run touching the cell on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    color: Color,
    horizontal: u16,
    vertical: u16,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            color: Color::Blank,
            horizontal: 0,
            vertical: 0,
        }
    }
}

/// Which axis a qualifying run lay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Read-only view of one destruction pass, for animation and scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestructionResult {
    width: u8,
    destroyed: Vec<bool>,
    vertical_groups: u16,
    horizontal_groups: u16,
    enemies_destroyed: u32,
}

impl DestructionResult {
    fn slot(&self, loc: Loc) -> usize {
        loc.y as usize * self.width as usize + loc.x as usize
    }

    /// Whether the cell at `loc` was cleared this pass.
    pub fn is_destroyed(&self, loc: Loc) -> bool {
        self.destroyed[self.slot(loc)]
    }

    pub fn vertical_groups(&self) -> u16 {
        self.vertical_groups
    }

    pub fn horizontal_groups(&self) -> u16 {
        self.horizontal_groups
    }

    pub fn enemies_destroyed(&self) -> u32 {
        self.enemies_destroyed
    }

    /// Destruction flash intensity at `progress` in 0..=1 (rises then
    /// decays). Presentation only.
    pub fn intensity(&self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        1.0 - (2.0 * p - 1.0).abs()
    }
}

/// Matchable color of a cell: enemies and catalysts match by color, vacant
/// cells never match.
fn match_color(occupant: Occupant) -> Option<Color> {
    if occupant.is_vacant() {
        None
    } else {
        Some(occupant.color())
    }
}

/// Walk one row or column, folding every qualifying run into the per-cell
/// group buffer and the qualifying-run list.
fn scan_line(
    grid: &Grid,
    line: &[Loc],
    axis: Axis,
    groups: &mut [Group],
    qualifying: &mut Vec<(Axis, bool)>,
) {
    let width = grid.width() as usize;
    let slot = |loc: Loc| loc.y as usize * width + loc.x as usize;

    let mut run: ArrayVec<Loc, { MAX_GRID_DIM as usize }> = ArrayVec::new();
    let mut run_color = Color::Blank;

    let mut flush = |run: &mut ArrayVec<Loc, { MAX_GRID_DIM as usize }>,
                     color: Color,
                     groups: &mut [Group]| {
        if color != Color::Blank && run.len() as u16 >= MATCH_LENGTH {
            let has_enemy = run.iter().any(|&loc| grid.get(loc).is_enemy());
            qualifying.push((axis, has_enemy));
            for &loc in run.iter() {
                let g = &mut groups[slot(loc)];
                g.color = color;
                match axis {
                    Axis::Horizontal => g.horizontal = g.horizontal.max(run.len() as u16),
                    Axis::Vertical => g.vertical = g.vertical.max(run.len() as u16),
                }
            }
        }
        run.clear();
    };

    for &loc in line {
        match match_color(grid.get(loc)) {
            Some(color) if color == run_color => run.push(loc),
            Some(color) => {
                flush(&mut run, run_color, groups);
                run_color = color;
                run.push(loc);
            }
            None => {
                flush(&mut run, run_color, groups);
                run_color = Color::Blank;
            }
        }
    }
    flush(&mut run, run_color, groups);
}

/// Find and clear all qualifying runs. Updates `combo` with the groups and
/// enemies destroyed. Returns `None` when nothing matched.
pub fn destroy_groups(grid: &mut Grid, combo: &mut ComboInfo) -> Option<DestructionResult> {
    let (w, h) = (grid.width() as i8, grid.height() as i8);
    let mut groups = vec![Group::default(); w as usize * h as usize];
    let mut qualifying: Vec<(Axis, bool)> = Vec::new();

    let mut line: ArrayVec<Loc, { MAX_GRID_DIM as usize }> = ArrayVec::new();
    for y in 0..h {
        line.clear();
        line.extend((0..w).map(|x| Loc::new(x, y)));
        scan_line(grid, &line, Axis::Horizontal, &mut groups, &mut qualifying);
    }
    for x in 0..w {
        line.clear();
        line.extend((0..h).map(|y| Loc::new(x, y)));
        scan_line(grid, &line, Axis::Vertical, &mut groups, &mut qualifying);
    }

    if qualifying.is_empty() {
        return None;
    }

    // Destroy every cell a qualifying run touched on either axis.
    let width = w as usize;
    let mut destroyed = vec![false; width * h as usize];
    let mut enemies_destroyed = 0u32;
    for y in 0..h {
        for x in 0..w {
            let loc = Loc::new(x, y);
            let slot = loc.y as usize * width + loc.x as usize;
            let g = groups[slot];
            if g.horizontal >= MATCH_LENGTH || g.vertical >= MATCH_LENGTH {
                if grid.get(loc).is_enemy() {
                    enemies_destroyed += 1;
                }
                grid.set(loc, Occupant::NONE);
                destroyed[slot] = true;
            }
        }
    }

    divorce_widows(grid);

    let mut vertical_groups = 0u16;
    let mut horizontal_groups = 0u16;
    for &(axis, has_enemy) in &qualifying {
        match axis {
            Axis::Vertical => {
                vertical_groups += 1;
                combo.permissive.verticals += 1;
                if has_enemy {
                    combo.strict.verticals += 1;
                }
            }
            Axis::Horizontal => {
                horizontal_groups += 1;
                combo.permissive.horizontals += 1;
                if has_enemy {
                    combo.strict.horizontals += 1;
                }
            }
        }
    }
    combo.permissive.enemies += enemies_destroyed;
    combo.strict.enemies += enemies_destroyed;

    Some(DestructionResult {
        width: w as u8,
        destroyed,
        vertical_groups,
        horizontal_groups,
        enemies_destroyed,
    })
}

/// Reset the pairing direction of any catalyst whose partner cell is gone.
fn divorce_widows(grid: &mut Grid) {
    let (w, h) = (grid.width() as i8, grid.height() as i8);
    for y in 0..h {
        for x in 0..w {
            let loc = Loc::new(x, y);
            let occupant = grid.get(loc);
            if !occupant.is_catalyst() || occupant.direction() == Direction::None {
                continue;
            }
            let partner = loc.offset(occupant.direction());
            // TODO: an in-bounds partner should be guaranteed here, since
            // destruction runs before any fall can strand a link at the
            // edge; re-verify against the destroy/fall ordering before
            // removing the guard.
            if !grid.contains(partner) || grid.is_vacant(partner) {
                grid.set(loc, occupant.with_direction(Direction::None));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_of_three_never_destructs() {
        let mut grid = Grid::from_rows(&[
            "........", //
            "rrr.....",
        ]);
        let mut combo = ComboInfo::default();
        assert!(destroy_groups(&mut grid, &mut combo).is_none());
        assert_eq!(grid.count_enemies(), 3);
        assert_eq!(combo, ComboInfo::default());
    }

    #[test]
    fn test_run_of_four_destructs() {
        let mut grid = Grid::from_rows(&[
            "........", //
            "rrrr....",
        ]);
        let mut combo = ComboInfo::default();
        let result = destroy_groups(&mut grid, &mut combo).unwrap();
        assert_eq!(result.horizontal_groups(), 1);
        assert_eq!(result.vertical_groups(), 0);
        assert_eq!(result.enemies_destroyed(), 4);
        assert_eq!(grid.count_enemies(), 0);
        for x in 0..4 {
            assert!(result.is_destroyed(Loc::new(x, 0)));
        }
    }

    #[test]
    fn test_run_of_five_is_one_group() {
        let mut grid = Grid::from_rows(&[
            "........", //
            "YYYYY...",
        ]);
        let mut combo = ComboInfo::default();
        let result = destroy_groups(&mut grid, &mut combo).unwrap();
        assert_eq!(result.horizontal_groups(), 1);
        assert_eq!(combo.permissive.horizontals, 1);
        for x in 0..5 {
            assert!(grid.is_vacant(Loc::new(x as i8, 0)));
        }
    }

    #[test]
    fn test_crossing_runs_destroy_together() {
        // Vertical red column crossing a horizontal red row at (0, 0).
        let mut grid = Grid::from_rows(&[
            "R.......", //
            "R.......",
            "R.......",
            "RRRR....",
        ]);
        let mut combo = ComboInfo::default();
        let result = destroy_groups(&mut grid, &mut combo).unwrap();
        assert_eq!(result.horizontal_groups(), 1);
        assert_eq!(result.vertical_groups(), 1);
        // All seven distinct cells cleared in the same pass.
        for y in 0..4 {
            assert!(grid.is_vacant(Loc::new(0, y)));
        }
        for x in 1..4 {
            assert!(grid.is_vacant(Loc::new(x, 0)));
        }
    }

    #[test]
    fn test_strict_vs_permissive_group_counting() {
        // One all-catalyst run, one run containing an enemy.
        let mut grid = Grid::from_rows(&[
            "YYYY....", //
            "RRRr....",
        ]);
        let mut combo = ComboInfo::default();
        destroy_groups(&mut grid, &mut combo).unwrap();
        assert_eq!(combo.permissive.horizontals, 2);
        assert_eq!(combo.strict.horizontals, 1);
        assert_eq!(combo.strict.enemies, 1);
        assert_eq!(combo.permissive.enemies, 1);
    }

    #[test]
    fn test_divorce_resets_surviving_partner() {
        let mut grid = Grid::new(8, 4);
        // Vertical blue run capped by the lower half of a pair; the upper
        // half survives and must be divorced.
        grid.set(Loc::new(0, 0), Occupant::enemy(Color::Blue));
        grid.set(Loc::new(0, 1), Occupant::enemy(Color::Blue));
        grid.set(Loc::new(0, 2), Occupant::enemy(Color::Blue));
        grid.set(Loc::new(0, 3), Occupant::catalyst(Color::Blue, Direction::Right));
        grid.set(Loc::new(1, 3), Occupant::catalyst(Color::Red, Direction::Left));

        let mut combo = ComboInfo::default();
        let result = destroy_groups(&mut grid, &mut combo).unwrap();
        assert_eq!(result.vertical_groups(), 1);
        assert!(grid.is_vacant(Loc::new(0, 3)));

        let widow = grid.get(Loc::new(1, 3));
        assert!(widow.is_catalyst());
        assert_eq!(widow.direction(), Direction::None);
        assert_eq!(widow.color(), Color::Red);
    }

    #[test]
    fn test_intact_pairs_keep_their_links() {
        let mut grid = Grid::new(8, 4);
        grid.set(Loc::new(4, 0), Occupant::catalyst(Color::Red, Direction::Right));
        grid.set(Loc::new(5, 0), Occupant::catalyst(Color::Yellow, Direction::Left));
        grid.set(Loc::new(0, 0), Occupant::enemy(Color::Blue));
        grid.set(Loc::new(1, 0), Occupant::enemy(Color::Blue));
        grid.set(Loc::new(2, 0), Occupant::enemy(Color::Blue));
        grid.set(Loc::new(3, 0), Occupant::enemy(Color::Blue));

        let mut combo = ComboInfo::default();
        destroy_groups(&mut grid, &mut combo).unwrap();
        // The blue run is gone; the pair next to it is untouched.
        assert_eq!(grid.get(Loc::new(4, 0)).direction(), Direction::Right);
        assert_eq!(grid.get(Loc::new(5, 0)).direction(), Direction::Left);
    }

    #[test]
    fn test_blue_is_its_own_color() {
        // Red|Yellow packing must not make blue match red or yellow.
        let mut grid = Grid::from_rows(&[
            "........", //
            "bbrr....",
        ]);
        let mut combo = ComboInfo::default();
        assert!(destroy_groups(&mut grid, &mut combo).is_none());
    }
}

//! Core types module - shared data structures and constants
//!
//! Pure data types used throughout the simulation core: the bit-packed
//! [`Occupant`] cell value, grid locations, player commands, spawn items and
//! the logical-time [`Moment`]. No external dependencies beyond serde derives
//! for the types that appear in replay records.
//!
//! # Grid conventions
//!
//! - `x` runs 0..width, left to right
//! - `y` runs 0..height, **bottom to top** - falling decreases `y`
//! - pieces spawn on the top row (`y = height - 1`)
//!
//! # Game timing constants
//!
//! All timing is logical milliseconds on the scheduler's clock, never
//! wall-clock time:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FALL_CELL_MS` | 120 | Fall animation time per cell of drop |
//! | `DESTROY_MS` | 300 | Destruction flash duration |
//! | `SPAWN_MS` | 100 | Spawn animation duration |
//! | `PLUMMET_MS` | 150 | Plummet commit pause |
//! | `BURST_WINDOW_MS` | 500 | Cancellation window after a burst begins |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default grid width in cells.
pub const GRID_WIDTH: u8 = 8;

/// Default grid height in cells.
pub const GRID_HEIGHT: u8 = 16;

/// Upper bound on either grid dimension. Keeps run-scan scratch buffers
/// fixed-capacity (see `core::destruction`).
pub const MAX_GRID_DIM: u8 = 32;

/// Minimum same-color run length that destructs.
pub const MATCH_LENGTH: u16 = 4;

/// Fall animation time per cell of drop distance (milliseconds).
pub const FALL_CELL_MS: u64 = 120;

/// Destruction flash duration (milliseconds).
pub const DESTROY_MS: u64 = 300;

/// Spawn animation duration (milliseconds).
pub const SPAWN_MS: u64 = 100;

/// Plummet commit pause (milliseconds).
pub const PLUMMET_MS: u64 = 150;

/// Cancellation window after `BurstBegin` (milliseconds).
pub const BURST_WINDOW_MS: u64 = 500;

/// What a cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    None,
    Enemy,
    Catalyst,
}

/// Cell color. `Blue` is the bitwise union of `Red` and `Yellow`, matching
/// the packed encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Blank,
    Red,
    Yellow,
    Blue,
}

/// The playable colors, in palette order.
pub const COLORS: [Color; 3] = [Color::Red, Color::Yellow, Color::Blue];

impl Color {
    /// Parse a color from its single-letter form (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'r' => Some(Color::Red),
            'y' => Some(Color::Yellow),
            'b' => Some(Color::Blue),
            _ => None,
        }
    }
}

/// Pairing direction of a catalyst: which neighbor its partner occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    None,
    Up,
    Right,
    Down,
    Left,
}

/// The four real directions, in clockwise order starting from `Right`.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

impl Direction {
    /// Unit offset of this direction, y-up.
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        }
    }

    /// The direction pointing back at this one.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Rotate a real direction 90 degrees clockwise (screen sense, y-up).
    pub fn rotated_cw(&self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    /// Rotate a real direction 90 degrees counter-clockwise.
    pub fn rotated_ccw(&self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Index into [`DIRECTIONS`] for the real directions.
    pub fn cw_index(&self) -> Option<usize> {
        DIRECTIONS.iter().position(|d| d == self)
    }
}

// Bit layout of the packed occupant value.
const KIND_SHIFT: u16 = 0;
const KIND_MASK: u16 = 0b0000_0011;
const COLOR_SHIFT: u16 = 2;
const COLOR_MASK: u16 = 0b0000_1100;
const DIR_SHIFT: u16 = 4;
const DIR_MASK: u16 = 0b0111_0000;

/// A single grid cell's contents: kind, color and pairing direction packed
/// into disjoint bit ranges of one `u16`. Equality is bitwise. Values are
/// immutable; "mutation" returns a new value with one field replaced.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant(u16);

impl Occupant {
    /// The vacant cell.
    pub const NONE: Occupant = Occupant(0);

    /// Build an enemy of the given color.
    pub fn enemy(color: Color) -> Self {
        Occupant(pack_kind(Kind::Enemy) | pack_color(color))
    }

    /// Build a catalyst of the given color and pairing direction.
    pub fn catalyst(color: Color, direction: Direction) -> Self {
        Occupant(pack_kind(Kind::Catalyst) | pack_color(color) | pack_direction(direction))
    }

    pub fn kind(&self) -> Kind {
        match (self.0 & KIND_MASK) >> KIND_SHIFT {
            0 => Kind::None,
            1 => Kind::Enemy,
            2 => Kind::Catalyst,
            tag => unreachable!("corrupt occupant kind tag {tag}"),
        }
    }

    pub fn color(&self) -> Color {
        match (self.0 & COLOR_MASK) >> COLOR_SHIFT {
            0 => Color::Blank,
            1 => Color::Red,
            2 => Color::Yellow,
            3 => Color::Blue,
            _ => unreachable!(),
        }
    }

    pub fn direction(&self) -> Direction {
        match (self.0 & DIR_MASK) >> DIR_SHIFT {
            0 => Direction::None,
            1 => Direction::Up,
            2 => Direction::Right,
            3 => Direction::Down,
            4 => Direction::Left,
            tag => unreachable!("corrupt occupant direction tag {tag}"),
        }
    }

    /// New value with the color field replaced.
    pub fn with_color(&self, color: Color) -> Self {
        Occupant((self.0 & !COLOR_MASK) | pack_color(color))
    }

    /// New value with the direction field replaced.
    pub fn with_direction(&self, direction: Direction) -> Self {
        Occupant((self.0 & !DIR_MASK) | pack_direction(direction))
    }

    pub fn is_vacant(&self) -> bool {
        self.kind() == Kind::None
    }

    pub fn is_enemy(&self) -> bool {
        self.kind() == Kind::Enemy
    }

    pub fn is_catalyst(&self) -> bool {
        self.kind() == Kind::Catalyst
    }

    /// Raw packed bits (stable input for checksums).
    pub fn bits(&self) -> u16 {
        self.0
    }
}

fn pack_kind(kind: Kind) -> u16 {
    let tag = match kind {
        Kind::None => 0,
        Kind::Enemy => 1,
        Kind::Catalyst => 2,
    };
    tag << KIND_SHIFT
}

fn pack_color(color: Color) -> u16 {
    let tag = match color {
        Color::Blank => 0,
        Color::Red => 1,
        Color::Yellow => 2,
        Color::Blue => 3,
    };
    tag << COLOR_SHIFT
}

fn pack_direction(direction: Direction) -> u16 {
    let tag = match direction {
        Direction::None => 0,
        Direction::Up => 1,
        Direction::Right => 2,
        Direction::Down => 3,
        Direction::Left => 4,
    };
    tag << DIR_SHIFT
}

impl fmt::Debug for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_vacant() {
            return write!(f, "Occupant(None)");
        }
        write!(
            f,
            "Occupant({:?} {:?} {:?})",
            self.kind(),
            self.color(),
            self.direction()
        )
    }
}

/// A grid location. May hold out-of-bounds coordinates (including negative
/// ones) so that neighbor arithmetic never wraps; bounds are the grid's
/// concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    pub x: i8,
    pub y: i8,
}

impl Loc {
    pub fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// The neighbor one step in `direction`.
    pub fn offset(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Loc::new(self.x + dx, self.y + dy)
    }

    /// The cell one row down (the fall target).
    pub fn below(&self) -> Self {
        Loc::new(self.x, self.y - 1)
    }
}

/// Player commands consumed by `State::handle_command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Left,
    Right,
    RotateCw,
    RotateCcw,
    Plummet,
    BurstBegin,
    BurstCancel,
}

impl Command {
    /// Parse a command from its camelCase wire form (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Command::Left),
            "right" => Some(Command::Right),
            "rotatecw" => Some(Command::RotateCw),
            "rotateccw" => Some(Command::RotateCcw),
            "plummet" => Some(Command::Plummet),
            "burstbegin" => Some(Command::BurstBegin),
            "burstcancel" => Some(Command::BurstCancel),
            _ => None,
        }
    }

    /// camelCase wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Left => "left",
            Command::Right => "right",
            Command::RotateCw => "rotateCw",
            Command::RotateCcw => "rotateCcw",
            Command::Plummet => "plummet",
            Command::BurstBegin => "burstBegin",
            Command::BurstCancel => "burstCancel",
        }
    }
}

/// One upcoming piece: a pair of catalysts, already linked left/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnItem {
    pub first: Occupant,
    pub second: Occupant,
}

impl SpawnItem {
    /// Build a pair from two colors, linked pointing at each other.
    pub fn pair(first: Color, second: Color) -> Self {
        Self {
            first: Occupant::catalyst(first, Direction::Right),
            second: Occupant::catalyst(second, Direction::Left),
        }
    }
}

/// A logical millisecond timestamp, independent of wall-clock and frame
/// delivery. All gameplay timing is expressed in these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Moment(pub u64);

impl Moment {
    pub const ZERO: Moment = Moment(0);

    pub fn millis(&self) -> u64 {
        self.0
    }

    /// This moment advanced by `ms` logical milliseconds.
    pub fn plus(&self, ms: u64) -> Moment {
        Moment(self.0 + ms)
    }

    /// Milliseconds since `earlier` (saturating).
    pub fn since(&self, earlier: Moment) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

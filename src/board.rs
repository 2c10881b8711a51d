//! Grid model: cell coordinates, wall masks, and open-way bookkeeping.
//!
//! Cells are addressed by `(row, col)` in `[0, 8] x [0, 8]`. Walls are
//! anchored at the top-left cell of the 2x2 block they split, so anchors
//! range over `[0, 7] x [0, 7]`. A horizontal wall at `(r, c)` separates rows
//! `r` and `r + 1` across columns `c` and `c + 1`; a vertical wall at `(r, c)`
//! separates columns `c` and `c + 1` across rows `r` and `r + 1`.

use std::fmt;

use crate::constants::{N, WALL_N};

/// A cell on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell in `dir`, or `None` off the board.
    /// Walls are not considered.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < N && col < N).then_some(Position { row, col })
    }

    /// Whether `other` is orthogonally adjacent.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// The direction leading from `self` to an adjacent `other`.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| self.step(d) == Some(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four cardinal moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order in which pawn destinations are generated.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(row, col)` offset of one step.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The two sideways directions used for diagonal jumps.
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 4,
            Direction::Right => 8,
        }
    }
}

/// Small set of directions packed into a byte.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.contains(d))
    }
}

/// Wall orientation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// Whether `(row, col)` is a valid wall anchor.
#[inline]
pub fn in_wall_range(row: usize, col: usize) -> bool {
    row < WALL_N && col < WALL_N
}

/// A pair of 8x8 boolean grids, one per orientation.
///
/// Used for placed walls, structurally valid slots, and heuristic pools.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WallMask {
    pub horizontal: [[bool; WALL_N]; WALL_N],
    pub vertical: [[bool; WALL_N]; WALL_N],
}

impl WallMask {
    pub const fn filled(value: bool) -> Self {
        Self {
            horizontal: [[value; WALL_N]; WALL_N],
            vertical: [[value; WALL_N]; WALL_N],
        }
    }

    pub const fn empty() -> Self {
        Self::filled(false)
    }

    /// Out-of-range anchors read as `false`.
    pub fn get(&self, orientation: Orientation, row: usize, col: usize) -> bool {
        if !in_wall_range(row, col) {
            return false;
        }
        match orientation {
            Orientation::Horizontal => self.horizontal[row][col],
            Orientation::Vertical => self.vertical[row][col],
        }
    }

    /// Out-of-range anchors are ignored.
    pub fn set(&mut self, orientation: Orientation, row: usize, col: usize, value: bool) {
        if !in_wall_range(row, col) {
            return;
        }
        match orientation {
            Orientation::Horizontal => self.horizontal[row][col] = value,
            Orientation::Vertical => self.vertical[row][col] = value,
        }
    }

    /// Element-wise conjunction with `other`.
    pub fn and(&self, other: &WallMask) -> WallMask {
        let mut out = *self;
        for r in 0..WALL_N {
            for c in 0..WALL_N {
                out.horizontal[r][c] &= other.horizontal[r][c];
                out.vertical[r][c] &= other.vertical[r][c];
            }
        }
        out
    }

    /// Anchors set for one orientation, row-major.
    pub fn anchors(&self, orientation: Orientation) -> Vec<(usize, usize)> {
        let grid = match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        };
        let mut out = Vec::new();
        for (r, row) in grid.iter().enumerate() {
            for (c, &set) in row.iter().enumerate() {
                if set {
                    out.push((r, c));
                }
            }
        }
        out
    }

    pub fn count(&self) -> usize {
        self.horizontal
            .iter()
            .chain(self.vertical.iter())
            .map(|row| row.iter().filter(|&&b| b).count())
            .sum()
    }
}

/// Which edges between adjacent cells are still open.
///
/// `up_down[r][c]` is the edge between `(r, c)` and `(r + 1, c)`;
/// `left_right[r][c]` is the edge between `(r, c)` and `(r, c + 1)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpenWays {
    up_down: [[bool; N]; WALL_N],
    left_right: [[bool; WALL_N]; N],
}

impl Default for OpenWays {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenWays {
    pub const fn new() -> Self {
        Self {
            up_down: [[true; N]; WALL_N],
            left_right: [[true; WALL_N]; N],
        }
    }

    /// Whether a pawn at `pos` may step in `dir` as far as walls and the
    /// board edge are concerned.
    #[inline]
    pub fn is_open(&self, pos: Position, dir: Direction) -> bool {
        match dir {
            Direction::Up => pos.row > 0 && self.up_down[pos.row - 1][pos.col],
            Direction::Down => pos.row < N - 1 && self.up_down[pos.row][pos.col],
            Direction::Left => pos.col > 0 && self.left_right[pos.row][pos.col - 1],
            Direction::Right => pos.col < N - 1 && self.left_right[pos.row][pos.col],
        }
    }

    /// The cell reached by an open step, if any.
    #[inline]
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        if self.is_open(pos, dir) {
            pos.step(dir)
        } else {
            None
        }
    }

    /// Whether both segments of a wall at the anchor are currently open.
    pub fn wall_segments_open(&self, orientation: Orientation, row: usize, col: usize) -> bool {
        match orientation {
            Orientation::Horizontal => self.up_down[row][col] && self.up_down[row][col + 1],
            Orientation::Vertical => self.left_right[row][col] && self.left_right[row + 1][col],
        }
    }

    /// Close the two segments covered by a wall. The anchor must be in range.
    pub fn close_wall(&mut self, orientation: Orientation, row: usize, col: usize) {
        match orientation {
            Orientation::Horizontal => {
                self.up_down[row][col] = false;
                self.up_down[row][col + 1] = false;
            }
            Orientation::Vertical => {
                self.left_right[row][col] = false;
                self.left_right[row + 1][col] = false;
            }
        }
    }

    /// A copy with the wall's segments closed, leaving `self` untouched.
    pub fn with_wall(&self, orientation: Orientation, row: usize, col: usize) -> OpenWays {
        let mut ways = *self;
        ways.close_wall(orientation, row, col);
        ways
    }
}

/// Walls on the board: what has been placed, which edges remain open, and
/// which slots are not yet structurally precluded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub placed: WallMask,
    pub open: OpenWays,
    pub valid_slots: WallMask,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const fn new() -> Self {
        Self {
            placed: WallMask::empty(),
            open: OpenWays::new(),
            valid_slots: WallMask::filled(true),
        }
    }

    /// Whether the slot is in range and not precluded by an earlier wall.
    pub fn is_slot_free(&self, orientation: Orientation, row: usize, col: usize) -> bool {
        self.valid_slots.get(orientation, row, col) && self.open.wall_segments_open(orientation, row, col)
    }

    /// Record a wall. The anchor must be in range.
    ///
    /// Invalidates the slot itself, the crossing slot at the same anchor, and
    /// the two collinear slots that would overlap one of its segments.
    pub fn place_wall(&mut self, orientation: Orientation, row: usize, col: usize) {
        self.open.close_wall(orientation, row, col);
        self.placed.set(orientation, row, col, true);
        self.valid_slots.set(Orientation::Horizontal, row, col, false);
        self.valid_slots.set(Orientation::Vertical, row, col, false);
        match orientation {
            Orientation::Horizontal => {
                if col > 0 {
                    self.valid_slots.set(orientation, row, col - 1, false);
                }
                self.valid_slots.set(orientation, row, col + 1, false);
            }
            Orientation::Vertical => {
                if row > 0 {
                    self.valid_slots.set(orientation, row - 1, col, false);
                }
                self.valid_slots.set(orientation, row + 1, col, false);
            }
        }
    }

    /// Number of walls placed so far.
    pub fn wall_count(&self) -> usize {
        self.placed.count()
    }
}

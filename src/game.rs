//! Game state, move legality, and move execution.
//!
//! This module provides the core rules:
//! - Pawn destinations including straight and diagonal jumps
//! - Wall placement with the "every pawn keeps a path" rule
//! - Turn bookkeeping and goal-row detection
//!
//! [`GameState`] is plain fixed-size data, so cloning it for search is a
//! memcpy. There is no undo; callers keep a clone if they need to go back.

use std::fmt;

use thiserror::Error;

use crate::board::{Board, Direction, Orientation, Position, in_wall_range};
use crate::constants::{FAR_ROW, N, NEAR_ROW, START_COL, WALL_N, WALLS_PER_PAWN};
use crate::paths::{self, PathTree};

/// Index of a pawn in [`GameState::pawns`]. Pawn 0 moves first.
pub type PawnIndex = usize;

/// Which end of the board a pawn starts from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Starts on row 8, heads for row 0.
    Near,
    /// Starts on row 0, heads for row 8.
    Far,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pawn {
    pub is_human: bool,
    pub position: Position,
    pub goal_row: usize,
    pub walls_left: u8,
}

impl Pawn {
    pub fn new(side: Side, is_human: bool) -> Self {
        let (row, goal_row) = match side {
            Side::Near => (NEAR_ROW, FAR_ROW),
            Side::Far => (FAR_ROW, NEAR_ROW),
        };
        Self {
            is_human,
            position: Position::new(row, START_COL),
            goal_row,
            walls_left: WALLS_PER_PAWN,
        }
    }

    #[inline]
    pub fn has_reached_goal(&self) -> bool {
        self.position.row == self.goal_row
    }
}

/// A single ply.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pawn(Position),
    HorizontalWall(usize, usize),
    VerticalWall(usize, usize),
}

impl Move {
    pub fn wall(orientation: Orientation, row: usize, col: usize) -> Self {
        match orientation {
            Orientation::Horizontal => Move::HorizontalWall(row, col),
            Orientation::Vertical => Move::VerticalWall(row, col),
        }
    }

    pub fn is_pawn_move(&self) -> bool {
        matches!(self, Move::Pawn(_))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pawn(p) => write!(f, "pawn {} {}", p.row, p.col),
            Move::HorizontalWall(r, c) => write!(f, "h {r} {c}"),
            Move::VerticalWall(r, c) => write!(f, "v {r} {c}"),
        }
    }
}

/// Reasons a move is rejected. A rejected move never mutates the state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: coordinates out of range")]
    OutOfBounds,
    #[error("illegal move: pawn cannot reach {0}")]
    IllegalPawnMove(Position),
    #[error("illegal move: {orientation} wall slot ({row}, {col}) is occupied or overlaps a wall")]
    WallSlotUnavailable {
        orientation: Orientation,
        row: usize,
        col: usize,
    },
    #[error("illegal move: wall would leave a pawn without a path to its goal")]
    WallBlocksPath,
    #[error("illegal move: no walls left")]
    NoWallsLeft,
    #[error("game is already over")]
    AlreadyTerminal,
}

/// Every move available to the side to move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegalMoves {
    pub pawn_destinations: Vec<Position>,
    pub horizontal_walls: Vec<(usize, usize)>,
    pub vertical_walls: Vec<(usize, usize)>,
}

impl LegalMoves {
    pub fn len(&self) -> usize {
        self.pawn_destinations.len() + self.horizontal_walls.len() + self.vertical_walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, mv: &Move) -> bool {
        match *mv {
            Move::Pawn(p) => self.pawn_destinations.contains(&p),
            Move::HorizontalWall(r, c) => self.horizontal_walls.contains(&(r, c)),
            Move::VerticalWall(r, c) => self.vertical_walls.contains(&(r, c)),
        }
    }

    /// Flatten into a move list: pawn moves first, then walls.
    pub fn into_moves(self) -> Vec<Move> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.pawn_destinations.into_iter().map(Move::Pawn));
        out.extend(
            self.horizontal_walls
                .into_iter()
                .map(|(r, c)| Move::HorizontalWall(r, c)),
        );
        out.extend(
            self.vertical_walls
                .into_iter()
                .map(|(r, c)| Move::VerticalWall(r, c)),
        );
        out
    }
}

/// A Quoridor game state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub pawns: [Pawn; 2],
    pub board: Board,
    /// Plies played so far; parity selects the side to move.
    pub turn: usize,
    pub winner: Option<PawnIndex>,
}

impl GameState {
    /// A fresh game. Pawn 0 moves first and starts on the near side.
    pub fn new(first_mover_is_human: bool) -> Self {
        Self {
            pawns: [
                Pawn::new(Side::Near, first_mover_is_human),
                Pawn::new(Side::Far, !first_mover_is_human),
            ],
            board: Board::new(),
            turn: 0,
            winner: None,
        }
    }

    /// Index of the pawn to move.
    #[inline]
    pub fn current(&self) -> PawnIndex {
        self.turn % 2
    }

    /// Index of the pawn not to move.
    #[inline]
    pub fn opponent(&self) -> PawnIndex {
        (self.turn + 1) % 2
    }

    #[inline]
    pub fn pawn_to_move(&self) -> &Pawn {
        &self.pawns[self.current()]
    }

    #[inline]
    pub fn waiting_pawn(&self) -> &Pawn {
        &self.pawns[self.opponent()]
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether the two pawns stand on orthogonally adjacent cells.
    pub fn pawns_adjacent(&self) -> bool {
        self.pawns[0].position.is_adjacent(self.pawns[1].position)
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Cells the pawn to move may step or jump to.
    ///
    /// A step onto the opponent becomes a jump over it; if the cell behind the
    /// opponent is walled off or off the board, the jump deflects diagonally.
    pub fn valid_pawn_destinations(&self) -> Vec<Position> {
        let open = &self.board.open;
        let me = self.pawn_to_move().position;
        let other = self.waiting_pawn().position;
        let mut out = Vec::with_capacity(5);

        for dir in Direction::ALL {
            let Some(next) = open.neighbor(me, dir) else {
                continue;
            };
            if next != other {
                out.push(next);
                continue;
            }
            if let Some(beyond) = open.neighbor(next, dir) {
                out.push(beyond);
                continue;
            }
            for side in dir.perpendicular() {
                if let Some(diag) = open.neighbor(next, side) {
                    out.push(diag);
                }
            }
        }

        out
    }

    pub fn is_valid_pawn_destination(&self, pos: Position) -> bool {
        self.valid_pawn_destinations().contains(&pos)
    }

    /// Whether both pawns keep a path to their goal rows.
    pub fn exist_paths_to_goals(&self) -> bool {
        self.pawns
            .iter()
            .all(|p| paths::exists_path_to_goal(&self.board.open, p.position, p.goal_row))
    }

    /// Whether a wall may be placed at the anchor: in range, structurally
    /// free, and leaving both pawns a path. Never mutates `self`.
    pub fn can_place_wall(&self, orientation: Orientation, row: usize, col: usize) -> bool {
        self.check_wall(orientation, row, col).is_ok()
    }

    fn check_wall(&self, orientation: Orientation, row: usize, col: usize) -> Result<(), MoveError> {
        if !in_wall_range(row, col) {
            return Err(MoveError::OutOfBounds);
        }
        if !self.board.is_slot_free(orientation, row, col) {
            return Err(MoveError::WallSlotUnavailable {
                orientation,
                row,
                col,
            });
        }
        if !self.wall_keeps_paths(orientation, row, col) {
            return Err(MoveError::WallBlocksPath);
        }
        Ok(())
    }

    /// Path-only half of [`Self::can_place_wall`]. Anchors out of range
    /// never keep paths.
    pub fn wall_keeps_paths(&self, orientation: Orientation, row: usize, col: usize) -> bool {
        if !in_wall_range(row, col) {
            return false;
        }
        let open = self.board.open.with_wall(orientation, row, col);
        self.pawns
            .iter()
            .all(|p| paths::exists_path_to_goal(&open, p.position, p.goal_row))
    }

    /// Slots not structurally precluded by earlier walls. No path check.
    pub fn valid_wall_slots(&self) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
        (
            self.board.valid_slots.anchors(Orientation::Horizontal),
            self.board.valid_slots.anchors(Orientation::Vertical),
        )
    }

    /// Structurally valid slots that also keep both paths open.
    pub fn placeable_walls(&self, orientation: Orientation) -> Vec<(usize, usize)> {
        self.board
            .valid_slots
            .anchors(orientation)
            .into_iter()
            .filter(|&(r, c)| self.wall_keeps_paths(orientation, r, c))
            .collect()
    }

    /// All moves for the side to move, with walls filtered by path blocking.
    /// No wall slots are reported once the mover is out of walls.
    pub fn legal_moves(&self) -> LegalMoves {
        if self.is_terminal() {
            return LegalMoves::default();
        }
        let mut moves = LegalMoves {
            pawn_destinations: self.valid_pawn_destinations(),
            ..LegalMoves::default()
        };
        if self.pawn_to_move().walls_left > 0 {
            moves.horizontal_walls = self.placeable_walls(Orientation::Horizontal);
            moves.vertical_walls = self.placeable_walls(Orientation::Vertical);
        }
        moves
    }

    /// Whether `mv` would be accepted by a checked [`Self::apply`].
    pub fn is_legal(&self, mv: Move) -> bool {
        let mut probe = *self;
        probe.apply(mv, true).is_ok()
    }

    // -------------------------------------------------------------------------
    // Path queries
    // -------------------------------------------------------------------------

    pub fn shortest_path_tree(&self, pawn: PawnIndex) -> PathTree {
        paths::shortest_path_tree(&self.board.open, self.pawns[pawn].position)
    }

    pub fn shortest_distance(&self, pawn: PawnIndex) -> Option<u32> {
        let p = &self.pawns[pawn];
        paths::shortest_distance(&self.board.open, p.position, p.goal_row)
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Move the pawn to move to `pos`.
    ///
    /// With `check` set, `pos` must be one of [`Self::valid_pawn_destinations`];
    /// without it only the board range is enforced.
    pub fn move_pawn(&mut self, pos: Position, check: bool) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::AlreadyTerminal);
        }
        if pos.row >= N || pos.col >= N {
            return Err(MoveError::OutOfBounds);
        }
        if check && !self.is_valid_pawn_destination(pos) {
            return Err(MoveError::IllegalPawnMove(pos));
        }

        let mover = self.current();
        let pawn = &mut self.pawns[mover];
        pawn.position = pos;
        if pawn.has_reached_goal() {
            self.winner = Some(mover);
        }
        self.turn += 1;
        Ok(())
    }

    pub fn place_horizontal_wall(&mut self, row: usize, col: usize, check: bool) -> Result<(), MoveError> {
        self.place_wall(Orientation::Horizontal, row, col, check)
    }

    pub fn place_vertical_wall(&mut self, row: usize, col: usize, check: bool) -> Result<(), MoveError> {
        self.place_wall(Orientation::Vertical, row, col, check)
    }

    /// Place a wall for the side to move.
    ///
    /// With `check` set, the slot must be structurally free and keep both
    /// paths open. Range, wall supply and game end are always enforced.
    pub fn place_wall(
        &mut self,
        orientation: Orientation,
        row: usize,
        col: usize,
        check: bool,
    ) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::AlreadyTerminal);
        }
        if !in_wall_range(row, col) {
            return Err(MoveError::OutOfBounds);
        }
        if self.pawn_to_move().walls_left == 0 {
            return Err(MoveError::NoWallsLeft);
        }
        if check {
            self.check_wall(orientation, row, col)?;
        }

        self.board.place_wall(orientation, row, col);
        let mover = self.current();
        self.pawns[mover].walls_left -= 1;
        self.turn += 1;
        Ok(())
    }

    /// Apply any move.
    pub fn apply(&mut self, mv: Move, check: bool) -> Result<(), MoveError> {
        match mv {
            Move::Pawn(pos) => self.move_pawn(pos, check),
            Move::HorizontalWall(r, c) => self.place_horizontal_wall(r, c, check),
            Move::VerticalWall(r, c) => self.place_vertical_wall(r, c, check),
        }
    }
}

// =============================================================================
// Entry points for the front end
// =============================================================================

/// Start a match. The first mover is pawn 0 at `(8, 4)`.
pub fn new_game(first_mover_is_human: bool) -> GameState {
    GameState::new(first_mover_is_human)
}

/// Apply a fully checked move, returning the successor state.
pub fn apply_move(state: &GameState, mv: Move) -> Result<GameState, MoveError> {
    let mut next = *state;
    next.apply(mv, true)?;
    Ok(next)
}

/// Path-filtered legal moves for the side to move.
pub fn legal_moves(state: &GameState) -> LegalMoves {
    state.legal_moves()
}

// =============================================================================
// Text rendering
// =============================================================================

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = &self.board.open;
        let placed = &self.board.placed;

        write!(f, "   ")?;
        for c in 0..N {
            write!(f, " {c}  ")?;
        }
        writeln!(f)?;

        for r in 0..N {
            write!(f, "{r}  ")?;
            for c in 0..N {
                let pos = Position::new(r, c);
                let ch = if self.pawns[0].position == pos {
                    '0'
                } else if self.pawns[1].position == pos {
                    '1'
                } else {
                    '.'
                };
                write!(f, " {ch} ")?;
                if c < N - 1 {
                    let sep = if open.is_open(pos, Direction::Right) { ' ' } else { '|' };
                    write!(f, "{sep}")?;
                }
            }
            writeln!(f)?;

            if r < N - 1 {
                write!(f, "   ")?;
                for c in 0..N {
                    let seg = if open.is_open(Position::new(r, c), Direction::Down) {
                        "   "
                    } else {
                        "---"
                    };
                    write!(f, "{seg}")?;
                    if c < N - 1 {
                        let joint = c < WALL_N
                            && (placed.horizontal[r][c] || placed.vertical[r][c]);
                        write!(f, "{}", if joint { '+' } else { ' ' })?;
                    }
                }
                writeln!(f)?;
            }
        }

        for (i, p) in self.pawns.iter().enumerate() {
            writeln!(
                f,
                "pawn {i} ({}): at {} goal row {} walls {}",
                if p.is_human { "human" } else { "ai" },
                p.position,
                p.goal_row,
                p.walls_left
            )?;
        }
        match self.winner {
            Some(w) => write!(f, "winner: pawn {w}"),
            None => write!(f, "turn {}: pawn {} to move", self.turn, self.current()),
        }
    }
}

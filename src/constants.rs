//! Constants for board geometry, search parameters, and heuristic thresholds.
//!
//! This module contains all the tuning defaults for the engine. None of the
//! heuristic values are rules of the game; they seed [`crate::ai::SearchConfig`]
//! and can be overridden from the command line.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN cells).
pub const N: usize = 9;

/// Number of wall anchors per axis (walls sit between cells).
pub const WALL_N: usize = N - 1;

/// Walls each pawn holds at the start of a game.
pub const WALLS_PER_PAWN: u8 = 10;

/// Starting column of both pawns.
pub const START_COL: usize = N / 2;

/// Row the near pawn starts on (and the far pawn's goal row).
pub const NEAR_ROW: usize = N - 1;

/// Row the far pawn starts on (and the near pawn's goal row).
pub const FAR_ROW: usize = 0;

/// Maximum number of plies the game loop plays before declaring a draw.
pub const MAX_PLIES: usize = 50;

/// Maximum number of plies a single playout may take before adjudication.
pub const MAX_PLAYOUT_LEN: usize = N * N * 8;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of playouts per AI move.
pub const N_SIMS: usize = 3000;

/// Default UCT exploration constant.
pub const UCT_CONST: f64 = 0.4;

// =============================================================================
// Playout Heuristic Probabilities
// =============================================================================

/// Probability of advancing along a shortest path during a playout ply.
pub const PLAYOUT_ADVANCE_PROB: f64 = 0.7;

/// Probability of playing a scripted opening wall when the position matches.
pub const OPENING_PROB: f64 = 0.5;

// =============================================================================
// Turn Thresholds
// =============================================================================

/// Turns during which each pawn's first move is forced forward.
pub const FIRST_PLY_TURNS: usize = 2;

/// From this turn on, walls beside the opponent join the probable pool.
pub const DISTURB_WALL_TURN: usize = 3;

/// Turns during which scripted opening walls may be played.
pub const OPENING_TURNS: usize = 5;

/// From this turn on, edge walls and walls beside the mover join the pool.
pub const LATE_WALL_TURN: usize = 6;

/// Turns during which the AI is steered back onto a shortest path.
pub const ASSIST_TURNS: usize = 6;

/// Estimated win rate below which the AI is steered back onto a shortest path.
pub const ASSIST_WINRATE: f64 = 0.1;

//! Quoridor-MCTS: a Quoridor rules engine with a Monte Carlo Tree Search AI.
//!
//! Two pawns race across a 9x9 board toward opposite rows while placing
//! walls to lengthen each other's path. No wall may cut a pawn off from its
//! goal entirely.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`board`] - Cells, directions, wall slots and open-way bookkeeping
//! - [`paths`] - BFS shortest paths, path trees and random routes
//! - [`game`] - Game state, legality (jumps, wall blocking) and moves
//! - [`heuristics`] - Shortest-path steps and candidate-wall filters
//! - [`playout`] - Heuristic random game simulation
//! - [`mcts`] - Monte Carlo Tree Search with UCT
//! - [`ai`] - Move selection on top of the search
//! - [`protocol`] - Line-oriented text protocol
//!
//! ## Example
//!
//! ```
//! use quoridor_mcts::ai::choose_ai_move;
//! use quoridor_mcts::game::{apply_move, legal_moves, new_game};
//!
//! // The human plays the near pawn and moves first
//! let game = new_game(true);
//! assert_eq!(legal_moves(&game).horizontal_walls.len(), 64);
//!
//! // Let the AI answer a move
//! let first = legal_moves(&game).into_moves()[0];
//! let game = apply_move(&game, first).unwrap();
//! let reply = choose_ai_move(&game, 100, 0.4).unwrap();
//! println!("AI plays {reply}");
//! ```

pub mod ai;
pub mod board;
pub mod constants;
pub mod game;
pub mod heuristics;
pub mod mcts;
pub mod paths;
pub mod playout;
pub mod protocol;

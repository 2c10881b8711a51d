//! AI move selection: MCTS plus a thin layer of opening and safety policy.
//!
//! [`choose_ai_move`] is the single entry point the game loop calls. It
//! builds a fresh [`SearchTree`] each call; no tree is kept across turns.
//!
//! On top of the raw search:
//! - each pawn's first move goes straight forward when that is a shortest step
//! - a few known openings are answered with a scripted wall half of the time
//! - early in the game, or when the estimated win rate is poor, a pawn move
//!   that leaves the shortest path is replaced by one that stays on it

use std::time::Instant;

use thiserror::Error;

use crate::board::Position;
use crate::constants::{
    ASSIST_TURNS, ASSIST_WINRATE, FIRST_PLY_TURNS, N_SIMS, OPENING_PROB, OPENING_TURNS,
    PLAYOUT_ADVANCE_PROB, START_COL, UCT_CONST,
};
use crate::game::{GameState, Move};
use crate::heuristics::{shortest_path_moves, shortest_path_step};
use crate::mcts::{SearchTree, tree_search};

/// Tuning knobs for one AI decision.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Playouts per decision
    pub simulations: usize,
    /// UCT exploration constant
    pub exploration: f64,
    /// Probability that a playout ply advances along a shortest path
    pub advance_prob: f64,
    /// Answer known openings with scripted walls
    pub use_opening_book: bool,
    /// Steer early or losing pawn moves back onto a shortest path
    pub use_assist: bool,
    /// Seed for the random generator; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulations: N_SIMS,
            exploration: UCT_CONST,
            advance_prob: PLAYOUT_ADVANCE_PROB,
            use_opening_book: true,
            use_assist: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// A generator honouring [`Self::seed`].
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("the game is already over")]
    GameOver,
    #[error("no legal move available")]
    NoLegalMove,
}

/// Outcome of a decision, with the search's own estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub mv: Move,
    /// Win rate of the chosen root child, `None` when no search ran
    pub winrate: Option<f64>,
    /// Whether the move came from policy rather than the search result
    pub overridden: bool,
}

/// Scripted replies when the opponent has advanced straight to the given
/// cell in the opening.
const OPENING_BOOK: [(Position, [Move; 4]); 2] = [
    (
        Position::new(6, START_COL),
        [
            Move::HorizontalWall(5, 3),
            Move::HorizontalWall(5, 4),
            Move::VerticalWall(4, 3),
            Move::VerticalWall(4, 4),
        ],
    ),
    (
        Position::new(2, START_COL),
        [
            Move::HorizontalWall(2, 3),
            Move::HorizontalWall(2, 4),
            Move::VerticalWall(3, 3),
            Move::VerticalWall(3, 4),
        ],
    ),
];

/// Pick a move for the side to move with default tuning, seeding the
/// generator from the OS.
pub fn choose_ai_move(
    state: &GameState,
    simulations: usize,
    exploration: f64,
) -> Result<Move, SearchError> {
    choose_with(state, simulations, exploration, None)
}

/// Like [`choose_ai_move`], but reproducible: equal inputs and seed give
/// the same move.
pub fn choose_ai_move_seeded(
    state: &GameState,
    simulations: usize,
    exploration: f64,
    seed: u64,
) -> Result<Move, SearchError> {
    choose_with(state, simulations, exploration, Some(seed))
}

fn choose_with(
    state: &GameState,
    simulations: usize,
    exploration: f64,
    seed: Option<u64>,
) -> Result<Move, SearchError> {
    let config = SearchConfig {
        simulations,
        exploration,
        seed,
        ..SearchConfig::default()
    };
    let mut rng = config.rng();
    decide(state, &config, &mut rng).map(|d| d.mv)
}

/// Pick a move for the side to move.
pub fn decide(
    state: &GameState,
    config: &SearchConfig,
    rng: &mut fastrand::Rng,
) -> Result<Decision, SearchError> {
    if state.is_terminal() {
        return Err(SearchError::GameOver);
    }
    let started = Instant::now();

    if state.turn < FIRST_PLY_TURNS {
        if let Some(step) = shortest_path_step(state, rng) {
            if step.col == state.pawn_to_move().position.col {
                log::info!("first move straight ahead to {step}");
                return Ok(Decision {
                    mv: Move::Pawn(step),
                    winrate: None,
                    overridden: true,
                });
            }
        }
    }

    if config.use_opening_book {
        if let Some(mv) = opening_reply(state, rng) {
            log::info!("opening book reply {mv}");
            return Ok(Decision {
                mv,
                winrate: None,
                overridden: true,
            });
        }
    }

    let mut tree = SearchTree::new(state, config.exploration, config.advance_prob);
    let Some(searched) = tree_search(&mut tree, config.simulations, rng) else {
        return Err(SearchError::NoLegalMove);
    };
    let winrate = tree.best_move().map_or(0.0, |(_, wr)| wr);

    let mut decision = Decision {
        mv: searched,
        winrate: Some(winrate),
        overridden: false,
    };
    if config.use_assist {
        if let Some(mv) = assist(state, searched, winrate, rng) {
            log::debug!("replacing {searched} with shortest-path move {mv}");
            decision.mv = mv;
            decision.overridden = true;
        }
    }

    debug_assert!(state.is_legal(decision.mv), "AI chose illegal move {}", decision.mv);
    log::info!(
        "{} playouts, c={} in {:.2?}: {} (estimated win rate {:.3})",
        config.simulations,
        config.exploration,
        started.elapsed(),
        decision.mv,
        winrate
    );
    Ok(decision)
}

/// A scripted wall for a recognised opening, played with [`OPENING_PROB`].
fn opening_reply(state: &GameState, rng: &mut fastrand::Rng) -> Option<Move> {
    if state.turn >= OPENING_TURNS {
        return None;
    }
    let opponent = state.waiting_pawn().position;
    let (_, replies) = OPENING_BOOK.iter().find(|(at, _)| *at == opponent)?;
    if rng.f64() >= OPENING_PROB {
        return None;
    }
    let mv = replies[rng.usize(..replies.len())];
    if state.is_legal(mv) {
        Some(mv)
    } else {
        log::warn!("opening book move {mv} is not legal here, searching instead");
        None
    }
}

/// A shortest-path replacement for a searched pawn move, if one is due.
fn assist(state: &GameState, searched: Move, winrate: f64, rng: &mut fastrand::Rng) -> Option<Move> {
    let Move::Pawn(dest) = searched else {
        return None;
    };
    let early = state.turn < ASSIST_TURNS && state.pawn_to_move().position.col == START_COL;
    if !early && winrate >= ASSIST_WINRATE {
        return None;
    }
    let options = shortest_path_moves(state);
    if options.is_empty() || options.contains(&dest) {
        return None;
    }
    Some(Move::Pawn(options[rng.usize(..options.len())]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(seed: u64) -> SearchConfig {
        SearchConfig {
            simulations: 100,
            seed: Some(seed),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_first_move_goes_forward() {
        let g = GameState::new(false);
        let config = quick_config(1);
        let mut rng = config.rng();
        let d = decide(&g, &config, &mut rng).unwrap();
        assert_eq!(d.mv, Move::Pawn(Position::new(7, 4)));
        assert!(d.overridden);
        assert_eq!(d.winrate, None);
    }

    #[test]
    fn test_game_over_is_rejected() {
        let mut g = GameState::new(false);
        g.winner = Some(0);
        let config = quick_config(1);
        let mut rng = config.rng();
        assert_eq!(decide(&g, &config, &mut rng), Err(SearchError::GameOver));
    }

    #[test]
    fn test_opening_book_reply_is_legal() {
        let mut g = GameState::new(false);
        g.turn = 3;
        g.pawns[0].position = Position::new(6, 4);
        // Pawn 1 to move, pawn 0 has advanced two rows.
        let mut rng = fastrand::Rng::with_seed(0);
        let mut seen = 0;
        for _ in 0..50 {
            if let Some(mv) = opening_reply(&g, &mut rng) {
                assert!(!mv.is_pawn_move());
                assert!(g.is_legal(mv));
                seen += 1;
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn test_assist_replaces_detour() {
        let g = GameState::new(false);
        let mut rng = fastrand::Rng::with_seed(0);
        let sideways = Move::Pawn(Position::new(8, 3));
        assert_eq!(
            assist(&g, sideways, 0.5, &mut rng),
            Some(Move::Pawn(Position::new(7, 4)))
        );
        assert_eq!(assist(&g, Move::Pawn(Position::new(7, 4)), 0.5, &mut rng), None);
        assert_eq!(assist(&g, Move::HorizontalWall(0, 0), 0.0, &mut rng), None);
    }

    #[test]
    fn test_search_move_is_legal() {
        let mut g = GameState::new(false);
        g.apply(Move::Pawn(Position::new(7, 4)), true).unwrap();
        g.apply(Move::Pawn(Position::new(1, 4)), true).unwrap();
        g.apply(Move::Pawn(Position::new(7, 3)), true).unwrap();
        let config = SearchConfig {
            use_opening_book: false,
            ..quick_config(4)
        };
        let mut rng = config.rng();
        let d = decide(&g, &config, &mut rng).unwrap();
        assert!(g.is_legal(d.mv));
        assert!(d.winrate.is_some());
    }

    #[test]
    fn test_seeded_choice_repeats() {
        let mut g = GameState::new(true);
        for mv in [
            Move::Pawn(Position::new(7, 4)),
            Move::Pawn(Position::new(1, 4)),
            Move::HorizontalWall(2, 3),
            Move::VerticalWall(5, 5),
            Move::Pawn(Position::new(6, 4)),
        ] {
            g.apply(mv, true).unwrap();
        }
        let first = choose_ai_move_seeded(&g, 150, 0.4, 42).unwrap();
        for _ in 0..3 {
            assert_eq!(choose_ai_move_seeded(&g, 150, 0.4, 42).unwrap(), first);
        }
        assert!(g.is_legal(first));
    }
}

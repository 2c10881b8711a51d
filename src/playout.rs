//! Monte Carlo playouts (heuristic random game simulation).
//!
//! A playout plays the game out from a position until one pawn reaches its
//! goal row. Each ply the side to move:
//! - with probability `advance_prob`, steps along a cached shortest route
//!   (jumping when the opponent stands in the way);
//! - otherwise, if it still holds walls, places a wall drawn from the
//!   probable pool;
//! - otherwise steps back along its route, or to a random legal cell.
//!
//! Routes are cached per pawn and dropped whenever a wall lands or a pawn
//! leaves its route.

use crate::board::Position;
use crate::constants::MAX_PLAYOUT_LEN;
use crate::game::{GameState, Move, PawnIndex};
use crate::heuristics::{choose_probable_wall, shortest_path_moves};
use crate::paths::{self, Route};

/// Play random moves until the game ends and return the winner.
///
/// `state` is consumed as scratch space; pass a clone of anything you want
/// to keep.
pub fn playout(state: &mut GameState, advance_prob: f64, rng: &mut fastrand::Rng) -> PawnIndex {
    let start = state.turn;
    let mut routes: [Option<Route>; 2] = [None, None];
    let mut wall_failed = false;

    while state.winner.is_none() {
        if state.turn - start >= MAX_PLAYOUT_LEN {
            log::warn!("playout exceeded {MAX_PLAYOUT_LEN} plies, adjudicating");
            return adjudicate(state);
        }

        for (i, slot) in routes.iter_mut().enumerate() {
            if slot.is_none() {
                let pawn = &state.pawns[i];
                *slot = paths::random_route(&state.board.open, pawn.position, pawn.goal_row, rng);
            }
        }

        let me = state.current();
        let dest = if rng.f64() < advance_prob {
            wall_failed = false;
            advance(state, &mut routes[me], rng)
        } else if !wall_failed && state.pawn_to_move().walls_left > 0 {
            match choose_probable_wall(state, rng) {
                Some(mv) => {
                    if !apply_or_report(state, mv) {
                        return adjudicate(state);
                    }
                    routes = [None, None];
                }
                None => wall_failed = true,
            }
            continue;
        } else {
            wall_failed = false;
            retreat(state, &mut routes[me], rng)
        };

        let Some(dest) = dest else {
            return adjudicate(state);
        };
        if !apply_or_report(state, Move::Pawn(dest)) {
            return adjudicate(state);
        }
    }

    state.winner.unwrap_or_else(|| adjudicate(state))
}

/// Step toward the goal along the cached route.
fn advance(
    state: &GameState,
    route: &mut Option<Route>,
    rng: &mut fastrand::Rng,
) -> Option<Position> {
    let here = state.pawn_to_move().position;
    let next = route.as_ref().and_then(|r| r.next(here));

    let Some(next) = next else {
        *route = None;
        return random_choice(&shortest_path_moves(state), rng);
    };

    if !state.pawns_adjacent() {
        return Some(next);
    }

    // Next to the opponent: take the jump if the route allows it.
    let destinations = state.valid_pawn_destinations();
    if let Some(jump) = route.as_ref().and_then(|r| r.next(next)) {
        if destinations.contains(&jump) {
            return Some(jump);
        }
    }

    let chosen = random_choice(&shortest_path_moves(state), rng)?;
    if chosen != next {
        *route = None;
    }
    Some(chosen)
}

/// Step back along the route, or anywhere legal if that is impossible.
fn retreat(
    state: &GameState,
    route: &mut Option<Route>,
    rng: &mut fastrand::Rng,
) -> Option<Position> {
    let here = state.pawn_to_move().position;
    let destinations = state.valid_pawn_destinations();

    match route.as_ref().and_then(|r| r.prev(here)) {
        Some(back) if destinations.contains(&back) => Some(back),
        _ => {
            *route = None;
            random_choice(&destinations, rng)
        }
    }
}

fn random_choice<T: Copy>(items: &[T], rng: &mut fastrand::Rng) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.usize(..items.len())])
    }
}

fn apply_or_report(state: &mut GameState, mv: Move) -> bool {
    match state.apply(mv, false) {
        Ok(()) => true,
        Err(err) => {
            debug_assert!(false, "playout generated illegal move {mv}: {err}");
            log::error!("playout generated illegal move {mv}: {err}");
            false
        }
    }
}

/// Decide an unfinished playout: the pawn closer to its goal wins, the side
/// to move taking ties.
fn adjudicate(state: &GameState) -> PawnIndex {
    if let Some(w) = state.winner {
        return w;
    }
    let me = state.current();
    let other = state.opponent();
    let mine = state.shortest_distance(me).unwrap_or(u32::MAX);
    let theirs = state.shortest_distance(other).unwrap_or(u32::MAX);
    if mine <= theirs { me } else { other }
}

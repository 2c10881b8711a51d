//! Move-pruning heuristics shared by tree expansion and playouts.
//!
//! Quoridor has up to ~130 legal moves per ply, almost all of them walls.
//! These helpers narrow that down:
//!
//! ## Pawn moves
//! [`shortest_path_moves`] keeps only destinations that minimise the mover's
//! remaining distance.
//!
//! ## Walls
//! [`walls_disturbing`] marks walls that cut some shortest path of a pawn,
//! plus the slots right beside it. [`probable_walls`] is the cheaper pool
//! used during playouts: slots near pawns, near placed walls, and on the
//! board edges once the game has developed.

use crate::board::{Direction, Orientation, Position, WallMask};
use crate::constants::{DISTURB_WALL_TURN, LATE_WALL_TURN, N, WALL_N};
use crate::game::{GameState, Move, PawnIndex};
use crate::paths;

/// Legal destinations of the pawn to move that minimise its distance to goal.
///
/// Falls back to every destination if none leaves a path (which cannot
/// happen while the path invariant holds).
pub fn shortest_path_moves(state: &GameState) -> Vec<Position> {
    let mover = state.pawn_to_move();
    let scored: Vec<(Position, u32)> = state
        .valid_pawn_destinations()
        .into_iter()
        .map(|dest| {
            let d = paths::shortest_distance(&state.board.open, dest, mover.goal_row);
            (dest, d.unwrap_or(u32::MAX))
        })
        .collect();

    let Some(best) = scored.iter().map(|&(_, d)| d).min() else {
        return Vec::new();
    };
    scored
        .into_iter()
        .filter(|&(_, d)| d == best)
        .map(|(p, _)| p)
        .collect()
}

/// One step along a shortest path for the pawn to move, chosen at random
/// among equally short options.
///
/// When the pawns are apart the route lookup is enough; next to the
/// opponent, jumps change the options so every destination is scored.
pub fn shortest_path_step(state: &GameState, rng: &mut fastrand::Rng) -> Option<Position> {
    if state.pawns_adjacent() {
        let options = shortest_path_moves(state);
        if options.is_empty() {
            return None;
        }
        return Some(options[rng.usize(..options.len())]);
    }
    let pawn = state.pawn_to_move();
    paths::random_route(&state.board.open, pawn.position, pawn.goal_row, rng)
        .and_then(|route| route.next(pawn.position))
}

/// Mark the sixteen slots hugging the cell a pawn stands on.
pub fn mark_walls_beside(mask: &mut WallMask, pos: Position) {
    use Orientation::{Horizontal, Vertical};
    let Position { row, col } = pos;

    // Slots above the pawn (row - 1) and below it (row).
    let rows = [row.checked_sub(1), (row < WALL_N).then_some(row)];
    for r in rows.into_iter().flatten() {
        if col >= 1 {
            mask.set(Horizontal, r, col - 1, true);
            mask.set(Vertical, r, col - 1, true);
            if col >= 2 {
                mask.set(Horizontal, r, col - 2, true);
            }
        }
        if col < WALL_N {
            mask.set(Horizontal, r, col, true);
            mask.set(Vertical, r, col, true);
            mask.set(Horizontal, r, col + 1, true);
        }
    }

    // Vertical slots one further out along the column.
    let far_rows = [row.checked_sub(2), (row + 1 < WALL_N).then_some(row + 1)];
    for r in far_rows.into_iter().flatten() {
        if col >= 1 {
            mask.set(Vertical, r, col - 1, true);
        }
        mask.set(Vertical, r, col, true);
    }
}

/// Mark the (up to two) slots whose wall would cut the edge leaving `from`
/// in direction `dir`.
fn mark_walls_cutting(mask: &mut WallMask, from: Position, dir: Direction) {
    let Position { row, col } = from;
    match dir {
        Direction::Up | Direction::Down => {
            let Some(r) = (if dir == Direction::Up { row.checked_sub(1) } else { Some(row) }) else {
                return;
            };
            mask.set(Orientation::Horizontal, r, col, true);
            if col > 0 {
                mask.set(Orientation::Horizontal, r, col - 1, true);
            }
        }
        Direction::Left | Direction::Right => {
            let Some(c) = (if dir == Direction::Left { col.checked_sub(1) } else { Some(col) }) else {
                return;
            };
            mask.set(Orientation::Vertical, row, c, true);
            if row > 0 {
                mask.set(Orientation::Vertical, row - 1, c, true);
            }
        }
    }
}

/// Structurally valid slots that cut an edge of any shortest path of `pawn`,
/// together with the slots beside it. No path-blocking check.
pub fn walls_disturbing(state: &GameState, pawn: PawnIndex) -> WallMask {
    let target = &state.pawns[pawn];
    let tree = state.shortest_path_tree(pawn);
    let mut mask = WallMask::empty();

    let mut visited = [[false; N]; N];
    let mut stack = tree.closest_in_row(target.goal_row);
    while let Some(pos) = stack.pop() {
        for prev in tree.predecessors(pos) {
            if let Some(dir) = prev.direction_to(pos) {
                mark_walls_cutting(&mut mask, prev, dir);
            }
            if !visited[prev.row][prev.col] {
                visited[prev.row][prev.col] = true;
                stack.push(prev);
            }
        }
    }

    mark_walls_beside(&mut mask, target.position);
    mask.and(&state.board.valid_slots)
}

/// [`walls_disturbing`] filtered down to placements that keep every path.
pub fn placeable_walls_disturbing(state: &GameState, pawn: PawnIndex) -> Vec<Move> {
    let mask = walls_disturbing(state, pawn);
    let mut out = Vec::new();
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        for (r, c) in mask.anchors(orientation) {
            if state.wall_keeps_paths(orientation, r, c) {
                out.push(Move::wall(orientation, r, c));
            }
        }
    }
    out
}

/// Slots worth trying during a playout. Structural filter only.
pub fn probable_walls(state: &GameState) -> WallMask {
    let placed = &state.board.placed;
    let mut mask = WallMask::empty();

    // Near already placed walls.
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        for (r, c) in placed.anchors(orientation) {
            for nr in r.saturating_sub(1)..=(r + 1).min(WALL_N - 1) {
                for nc in c.saturating_sub(1)..=(c + 1).min(WALL_N - 1) {
                    mask.set(Orientation::Horizontal, nr, nc, true);
                    mask.set(Orientation::Vertical, nr, nc, true);
                }
            }
        }
    }

    if state.turn >= LATE_WALL_TURN {
        for r in 0..WALL_N {
            mask.horizontal[r][0] = true;
            mask.horizontal[r][WALL_N - 1] = true;
        }
    }

    if state.turn >= DISTURB_WALL_TURN {
        mark_walls_beside(&mut mask, state.waiting_pawn().position);
    }

    if state.turn >= LATE_WALL_TURN || state.board.wall_count() > 0 {
        mark_walls_beside(&mut mask, state.pawn_to_move().position);
    }

    mask.and(&state.board.valid_slots)
}

/// Draw a random wall from [`probable_walls`] that can legally be placed.
pub fn choose_probable_wall(state: &GameState, rng: &mut fastrand::Rng) -> Option<Move> {
    let mask = probable_walls(state);
    let mut candidates: Vec<Move> = mask
        .anchors(Orientation::Horizontal)
        .into_iter()
        .map(|(r, c)| Move::HorizontalWall(r, c))
        .chain(
            mask.anchors(Orientation::Vertical)
                .into_iter()
                .map(|(r, c)| Move::VerticalWall(r, c)),
        )
        .collect();

    while !candidates.is_empty() {
        let mv = candidates.swap_remove(rng.usize(..candidates.len()));
        let (orientation, r, c) = match mv {
            Move::HorizontalWall(r, c) => (Orientation::Horizontal, r, c),
            Move::VerticalWall(r, c) => (Orientation::Vertical, r, c),
            Move::Pawn(_) => continue,
        };
        if state.wall_keeps_paths(orientation, r, c) {
            return Some(mv);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_path_moves_open_board() {
        let g = GameState::new(true);
        assert_eq!(shortest_path_moves(&g), vec![Position::new(7, 4)]);
    }

    #[test]
    fn test_shortest_path_moves_prefers_jump() {
        let mut g = GameState::new(true);
        g.pawns[0].position = Position::new(5, 4);
        g.pawns[1].position = Position::new(4, 4);
        assert_eq!(shortest_path_moves(&g), vec![Position::new(3, 4)]);
    }

    #[test]
    fn test_shortest_path_step_open_board() {
        let mut rng = fastrand::Rng::with_seed(3);
        let g = GameState::new(true);
        assert_eq!(shortest_path_step(&g, &mut rng), Some(Position::new(7, 4)));
    }

    #[test]
    fn test_walls_beside_center() {
        let mut mask = WallMask::empty();
        mark_walls_beside(&mut mask, Position::new(4, 4));
        assert_eq!(mask.count(), 16);
        assert!(mask.horizontal[3][3]);
        assert!(mask.horizontal[4][5]);
        assert!(mask.vertical[2][4]);
        assert!(mask.vertical[5][3]);
    }

    #[test]
    fn test_walls_beside_corner() {
        let mut mask = WallMask::empty();
        mark_walls_beside(&mut mask, Position::new(8, 8));
        // Only the slots above-left of the corner exist.
        assert!(mask.horizontal[7][7]);
        assert!(mask.horizontal[7][6]);
        assert!(mask.vertical[7][7]);
        assert!(mask.vertical[6][7]);
        assert_eq!(mask.count(), 4);
    }

    #[test]
    fn test_walls_disturbing_straight_path() {
        let g = GameState::new(true);
        let mask = walls_disturbing(&g, 0);
        // Every horizontal wall touching column 4 cuts the straight run.
        for r in 0..WALL_N {
            assert!(mask.horizontal[r][3], "row {r} col 3");
            assert!(mask.horizontal[r][4], "row {r} col 4");
        }
        assert!(!mask.horizontal[3][0]);
    }

    #[test]
    fn test_placeable_disturbing_are_legal() {
        let g = GameState::new(false);
        for mv in placeable_walls_disturbing(&g, 1) {
            assert!(g.is_legal(mv), "{mv} should be legal");
        }
    }

    #[test]
    fn test_probable_walls_opening_is_empty() {
        let g = GameState::new(true);
        assert_eq!(probable_walls(&g).count(), 0);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(choose_probable_wall(&g, &mut rng), None);
    }

    #[test]
    fn test_probable_walls_late_game() {
        let mut g = GameState::new(true);
        g.turn = LATE_WALL_TURN;
        let mask = probable_walls(&g);
        assert!(mask.horizontal[2][0]);
        assert!(mask.horizontal[2][7]);
        let mut rng = fastrand::Rng::with_seed(1);
        let mv = choose_probable_wall(&g, &mut rng).expect("a wall is available");
        assert!(g.is_legal(mv));
    }

    #[test]
    fn test_probable_walls_near_placed() {
        let mut g = GameState::new(true);
        g.place_vertical_wall(4, 1, true).unwrap();
        let mask = probable_walls(&g);
        assert!(mask.horizontal[3][0]);
        assert!(mask.vertical[4][2]);
        assert!(!mask.vertical[4][1]);
    }
}

//! Breadth-first path queries over the open-way graph.
//!
//! The graph is the 9x9 grid, 4-connected, with edges gated by
//! [`OpenWays`]. Pawns are not obstacles here; only walls and the board edge
//! are. Every query visits at most 81 cells.

use std::collections::VecDeque;

use crate::board::{Direction, DirectionSet, OpenWays, Position};
use crate::constants::N;

/// Distances and all shortest-path predecessors from one source cell.
#[derive(Clone, Debug)]
pub struct PathTree {
    dist: [[Option<u32>; N]; N],
    /// Directions from which each cell is entered on some shortest path.
    from: [[DirectionSet; N]; N],
}

impl PathTree {
    /// Distance from the source, `None` if unreachable.
    pub fn distance(&self, pos: Position) -> Option<u32> {
        self.dist[pos.row][pos.col]
    }

    /// Every neighbour that precedes `pos` on some shortest path.
    pub fn predecessors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        self.from[pos.row][pos.col]
            .iter()
            .filter_map(move |d| pos.step(d.opposite()))
    }

    /// Smallest distance to any cell of `goal_row`.
    pub fn distance_to_row(&self, goal_row: usize) -> Option<u32> {
        self.dist[goal_row].iter().flatten().copied().min()
    }

    /// Cells of `goal_row` reached at the minimal distance.
    pub fn closest_in_row(&self, goal_row: usize) -> Vec<Position> {
        let Some(best) = self.distance_to_row(goal_row) else {
            return Vec::new();
        };
        (0..N)
            .filter(|&c| self.dist[goal_row][c] == Some(best))
            .map(|c| Position::new(goal_row, c))
            .collect()
    }
}

/// Compute the full shortest-path tree from `source`.
///
/// When several neighbours reach a cell at the same minimal distance, all of
/// them are recorded as predecessors.
pub fn shortest_path_tree(open: &OpenWays, source: Position) -> PathTree {
    let mut tree = PathTree {
        dist: [[None; N]; N],
        from: [[DirectionSet::default(); N]; N],
    };
    let mut queue = VecDeque::with_capacity(N * N);

    tree.dist[source.row][source.col] = Some(0);
    queue.push_back(source);

    while let Some(pos) = queue.pop_front() {
        let d = tree.dist[pos.row][pos.col].unwrap_or(0) + 1;
        for dir in Direction::ALL {
            let Some(next) = open.neighbor(pos, dir) else {
                continue;
            };
            match tree.dist[next.row][next.col] {
                None => {
                    tree.dist[next.row][next.col] = Some(d);
                    tree.from[next.row][next.col].insert(dir);
                    queue.push_back(next);
                }
                Some(existing) if existing == d => {
                    tree.from[next.row][next.col].insert(dir);
                }
                Some(_) => {}
            }
        }
    }

    tree
}

/// Length of the shortest path from `source` to any cell of `goal_row`,
/// or `None` if the row is unreachable.
pub fn shortest_distance(open: &OpenWays, source: Position, goal_row: usize) -> Option<u32> {
    let mut dist = [[None::<u32>; N]; N];
    let mut queue = VecDeque::with_capacity(N * N);

    dist[source.row][source.col] = Some(0);
    queue.push_back(source);

    while let Some(pos) = queue.pop_front() {
        let d = dist[pos.row][pos.col]?;
        if pos.row == goal_row {
            return Some(d);
        }
        for dir in Direction::ALL {
            if let Some(next) = open.neighbor(pos, dir) {
                if dist[next.row][next.col].is_none() {
                    dist[next.row][next.col] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
    }

    None
}

/// Whether `goal_row` is reachable from `source` at all.
#[inline]
pub fn exists_path_to_goal(open: &OpenWays, source: Position, goal_row: usize) -> bool {
    shortest_distance(open, source, goal_row).is_some()
}

/// One shortest route to the goal row, chosen at random among equals.
///
/// `prev` is the BFS tree over every cell visited before the goal was found;
/// `next` only links the cells of the chosen route, from source to goal.
#[derive(Clone, Debug)]
pub struct Route {
    prev: [[Option<Position>; N]; N],
    next: [[Option<Position>; N]; N],
}

impl Route {
    /// Cell one step closer to the goal along the route.
    pub fn next(&self, pos: Position) -> Option<Position> {
        self.next[pos.row][pos.col]
    }

    /// Cell one step back toward the source.
    pub fn prev(&self, pos: Position) -> Option<Position> {
        self.prev[pos.row][pos.col]
    }
}

/// Search a shortest route to `goal_row`, exploring directions in a random
/// order so that ties are broken differently from call to call.
pub fn random_route(
    open: &OpenWays,
    source: Position,
    goal_row: usize,
    rng: &mut fastrand::Rng,
) -> Option<Route> {
    let mut dirs = Direction::ALL;
    rng.shuffle(&mut dirs);

    let mut dist = [[None::<u32>; N]; N];
    let mut prev = [[None::<Position>; N]; N];
    let mut queue = VecDeque::with_capacity(N * N);

    dist[source.row][source.col] = Some(0);
    queue.push_back(source);

    while let Some(pos) = queue.pop_front() {
        let d = dist[pos.row][pos.col]?;
        if pos.row == goal_row {
            let mut next = [[None::<Position>; N]; N];
            let mut cur = pos;
            while let Some(p) = prev[cur.row][cur.col] {
                next[p.row][p.col] = Some(cur);
                cur = p;
            }
            return Some(Route { prev, next });
        }
        for &dir in &dirs {
            if let Some(n) = open.neighbor(pos, dir) {
                if dist[n.row][n.col].is_none() {
                    dist[n.row][n.col] = Some(d + 1);
                    prev[n.row][n.col] = Some(pos);
                    queue.push_back(n);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Orientation};

    #[test]
    fn test_open_board_distance() {
        let open = OpenWays::new();
        assert_eq!(shortest_distance(&open, Position::new(8, 4), 0), Some(8));
        assert_eq!(shortest_distance(&open, Position::new(0, 4), 0), Some(0));
    }

    #[test]
    fn test_wall_detour() {
        let mut board = Board::new();
        board.place_wall(Orientation::Horizontal, 7, 3);
        // (8,4) must sidestep to column 5 or 2 before going up.
        assert_eq!(shortest_distance(&board.open, Position::new(8, 4), 0), Some(9));
    }

    #[test]
    fn test_multiple_predecessors() {
        let open = OpenWays::new();
        let tree = shortest_path_tree(&open, Position::new(4, 4));
        let mut preds: Vec<_> = tree.predecessors(Position::new(3, 3)).collect();
        preds.sort();
        assert_eq!(preds, vec![Position::new(3, 4), Position::new(4, 3)]);
        assert_eq!(tree.distance(Position::new(3, 3)), Some(2));
        assert_eq!(tree.predecessors(Position::new(4, 4)).count(), 0);
    }

    #[test]
    fn test_closest_in_row() {
        let open = OpenWays::new();
        let tree = shortest_path_tree(&open, Position::new(8, 4));
        assert_eq!(tree.distance_to_row(0), Some(8));
        assert_eq!(tree.closest_in_row(0), vec![Position::new(0, 4)]);
    }

    #[test]
    fn test_unreachable_cells() {
        let mut board = Board::new();
        // Box in the corner cell (0,0).
        board.place_wall(Orientation::Horizontal, 0, 0);
        board.place_wall(Orientation::Vertical, 0, 0);
        let tree = shortest_path_tree(&board.open, Position::new(8, 8));
        assert_eq!(tree.distance(Position::new(0, 0)), None);
        assert!(!exists_path_to_goal(&board.open, Position::new(0, 0), 8));
    }

    #[test]
    fn test_random_route_follows_next() {
        let mut rng = fastrand::Rng::with_seed(7);
        let open = OpenWays::new();
        let start = Position::new(8, 4);
        let route = random_route(&open, start, 0, &mut rng).expect("route exists");

        let mut pos = start;
        let mut steps = 0;
        while let Some(n) = route.next(pos) {
            assert!(pos.is_adjacent(n));
            assert_eq!(route.prev(n), Some(pos));
            pos = n;
            steps += 1;
        }
        assert_eq!(pos.row, 0);
        assert_eq!(steps, 8);
    }
}

//! Monte Carlo Tree Search (MCTS) with UCT selection.
//!
//! This module implements MCTS with:
//! - UCT for node selection, unvisited children first, random tie-breaks
//! - Heuristically pruned expansion (see [`crate::heuristics`])
//! - Heuristic random playouts for value estimation
//!
//! Nodes live in an arena (`Vec<TreeNode>`) and refer to each other by index.
//! They store only the move that led to them; the position at a node is
//! rebuilt by replaying moves from the root state, so the real game state is
//! never touched.

use crate::board::Orientation;
use crate::game::{GameState, Move, PawnIndex};
use crate::heuristics::{placeable_walls_disturbing, shortest_path_moves};
use crate::playout::playout;

/// Index of a node in the [`SearchTree`] arena.
pub type NodeId = usize;

/// A node in the MCTS search tree.
#[derive(Clone, Debug)]
pub struct TreeNode {
    /// Move that led here (`None` for the root)
    pub mv: Option<Move>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Number of visits
    pub v: u32,
    /// Wins for the pawn that played `mv` (winrate = w/v)
    pub w: u32,
    /// Whether the game is over at this node
    pub terminal: bool,
}

impl TreeNode {
    fn new(mv: Option<Move>, parent: Option<NodeId>) -> Self {
        Self {
            mv,
            parent,
            children: Vec::new(),
            v: 0,
            w: 0,
            terminal: false,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Calculate the winrate for this node (0 when unvisited).
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.v > 0 {
            self.w as f64 / self.v as f64
        } else {
            0.0
        }
    }
}

/// Search tree rooted at a snapshot of the game.
pub struct SearchTree {
    root_state: GameState,
    nodes: Vec<TreeNode>,
    exploration: f64,
    advance_prob: f64,
    playouts: usize,
}

impl SearchTree {
    pub const ROOT: NodeId = 0;

    /// Create a tree for `state`. The state is copied; the caller's is never
    /// modified.
    pub fn new(state: &GameState, exploration: f64, advance_prob: f64) -> Self {
        Self {
            root_state: *state,
            nodes: vec![TreeNode::new(None, None)],
            exploration,
            advance_prob,
            playouts: 0,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total playouts run so far.
    pub fn playouts(&self) -> usize {
        self.playouts
    }

    /// UCT score of a non-root node. Unvisited nodes score `+inf`.
    pub fn uct(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        if node.v == 0 {
            return f64::INFINITY;
        }
        let parent_v = node
            .parent
            .map(|p| self.nodes[p].v)
            .unwrap_or(node.v)
            .max(1);
        let exploit = node.w as f64 / node.v as f64;
        let explore = (self.exploration * (parent_v as f64).ln() / node.v as f64).sqrt();
        exploit + explore
    }

    /// Child with the highest UCT score, ties broken uniformly at random.
    pub fn max_uct_child(&self, id: NodeId, rng: &mut fastrand::Rng) -> Option<NodeId> {
        let mut best = f64::NEG_INFINITY;
        let mut ties: Vec<NodeId> = Vec::new();
        for &child in &self.nodes[id].children {
            let score = self.uct(child);
            if score > best {
                best = score;
                ties.clear();
                ties.push(child);
            } else if score == best {
                ties.push(child);
            }
        }
        match ties.len() {
            0 => None,
            1 => Some(ties[0]),
            n => Some(ties[rng.usize(..n)]),
        }
    }

    /// Rebuild the game state at a node by replaying moves from the root.
    pub fn state_at(&self, id: NodeId) -> GameState {
        let mut moves = Vec::new();
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            if let Some(mv) = self.nodes[cur].mv {
                moves.push(mv);
            }
            cur = parent;
        }

        let mut state = self.root_state;
        for mv in moves.into_iter().rev() {
            let applied = state.apply(mv, false);
            debug_assert!(applied.is_ok(), "tree holds illegal move {mv}: {applied:?}");
        }
        state
    }

    /// Generate the children of a leaf. Returns how many were added.
    ///
    /// While the opponent still holds walls every pawn destination and every
    /// non-blocking wall is a candidate. Once the opponent is out of walls
    /// the game is a race: only shortest-path pawn moves and walls that
    /// disturb the opponent's shortest paths are kept.
    pub fn expand(&mut self, id: NodeId) -> usize {
        if !self.nodes[id].children.is_empty() {
            return self.nodes[id].children.len();
        }
        let state = self.state_at(id);
        if state.is_terminal() {
            return 0;
        }

        let mover_has_walls = state.pawn_to_move().walls_left > 0;
        let mut moves: Vec<Move> = Vec::new();

        if state.waiting_pawn().walls_left > 0 {
            moves.extend(state.valid_pawn_destinations().into_iter().map(Move::Pawn));
            if mover_has_walls {
                for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                    moves.extend(
                        state
                            .placeable_walls(orientation)
                            .into_iter()
                            .map(|(r, c)| Move::wall(orientation, r, c)),
                    );
                }
            }
        } else {
            moves.extend(shortest_path_moves(&state).into_iter().map(Move::Pawn));
            if mover_has_walls {
                moves.extend(placeable_walls_disturbing(&state, state.opponent()));
            }
        }

        for mv in moves {
            let child = self.nodes.len();
            self.nodes.push(TreeNode::new(Some(mv), Some(id)));
            self.nodes[id].children.push(child);
        }
        self.nodes[id].children.len()
    }

    /// Run one playout from a node and propagate the result to the root.
    pub fn simulate(&mut self, id: NodeId, rng: &mut fastrand::Rng) -> PawnIndex {
        self.playouts += 1;
        let mut state = self.state_at(id);

        // The node belongs to the pawn whose move led to it.
        let node_pawn = state.opponent();
        if state.is_terminal() {
            self.nodes[id].terminal = true;
        }

        let winner = playout(&mut state, self.advance_prob, rng);
        self.backpropagate(id, node_pawn, winner);
        winner
    }

    /// Update visit and win counts from `id` up to the root. Movers alternate
    /// with depth, so the credited pawn flips at every level.
    fn backpropagate(&mut self, id: NodeId, node_pawn: PawnIndex, winner: PawnIndex) {
        let mut cur = Some(id);
        let mut pawn = node_pawn;
        while let Some(n) = cur {
            let node = &mut self.nodes[n];
            node.v += 1;
            if winner == pawn {
                node.w += 1;
            }
            cur = node.parent;
            pawn ^= 1;
        }
    }

    /// Run `sims` more playouts.
    pub fn search(&mut self, sims: usize, rng: &mut fastrand::Rng) {
        let limit = self.playouts + sims;
        let mut current = Self::ROOT;

        while self.playouts < limit {
            let node = &self.nodes[current];
            if node.terminal || (node.is_leaf() && node.v == 0) {
                self.simulate(current, rng);
                current = Self::ROOT;
            } else if node.is_leaf() {
                let added = self.expand(current);
                let target = if added == 0 {
                    current
                } else {
                    self.nodes[current].children[rng.usize(..added)]
                };
                self.simulate(target, rng);
                current = Self::ROOT;
            } else {
                current = self.max_uct_child(current, rng).unwrap_or(Self::ROOT);
            }
        }
    }

    /// The most visited root child (first one on ties).
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in &self.root().children {
            if best.is_none_or(|b| self.nodes[child].v > self.nodes[b].v) {
                best = Some(child);
            }
        }
        best
    }

    /// The recommended move and its estimated win rate.
    pub fn best_move(&self) -> Option<(Move, f64)> {
        let id = self.best_child()?;
        let node = &self.nodes[id];
        node.mv.map(|mv| (mv, node.winrate()))
    }

    /// Follow the most visited child from the root down to a leaf.
    pub fn principal_variation(&self) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut cur = Self::ROOT;
        while let Some(&next) = self.nodes[cur]
            .children
            .iter()
            .max_by_key(|&&c| self.nodes[c].v)
        {
            line.push(next);
            cur = next;
        }
        line
    }

    /// Depth of the deepest node below `id`.
    pub fn max_depth(&self, id: NodeId) -> usize {
        self.nodes[id]
            .children
            .iter()
            .map(|&c| self.max_depth(c) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Log statistics about the root's children.
    pub fn dump_children(&self) {
        for &child in &self.root().children {
            let node = &self.nodes[child];
            if let Some(mv) = node.mv {
                log::trace!(
                    "move {mv} v={} w={} wr={:.3} uct={:.3}",
                    node.v,
                    node.w,
                    node.winrate(),
                    self.uct(child)
                );
            }
        }
    }
}

/// Run MCTS from the tree's root and return the most visited move.
pub fn tree_search(tree: &mut SearchTree, sims: usize, rng: &mut fastrand::Rng) -> Option<Move> {
    tree.search(sims, rng);

    if log::log_enabled!(log::Level::Debug) {
        let line: Vec<String> = tree
            .principal_variation()
            .iter()
            .filter_map(|&id| tree.node(id).mv.map(|mv| mv.to_string()))
            .collect();
        log::debug!(
            "{} playouts, {} nodes, depth {}, line: {}",
            tree.playouts(),
            tree.node_count(),
            tree.max_depth(SearchTree::ROOT),
            line.join(" / ")
        );
        tree.dump_children();
    }

    tree.best_move().map(|(mv, _)| mv)
}

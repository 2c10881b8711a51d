//! Integration tests for quoridor-mcts
//!
//! These drive the public API the way a front end would: start a game,
//! query legal moves, apply moves, and ask the AI for replies.

use quoridor_mcts::ai::{
    SearchConfig, SearchError, choose_ai_move, choose_ai_move_seeded, decide,
};
use quoridor_mcts::board::{Orientation, Position};
use quoridor_mcts::game::{GameState, Move, MoveError, apply_move, legal_moves, new_game};
use quoridor_mcts::mcts::{SearchTree, tree_search};
use quoridor_mcts::protocol::Engine;

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

/// Apply a sequence of moves with full checking.
fn setup_game(moves: &[Move]) -> GameState {
    let mut game = new_game(true);
    for &mv in moves {
        game = apply_move(&game, mv).unwrap_or_else(|e| panic!("{mv}: {e}"));
    }
    game
}

fn quick_config(seed: u64) -> SearchConfig {
    SearchConfig {
        simulations: 60,
        seed: Some(seed),
        ..SearchConfig::default()
    }
}

fn sorted(mut v: Vec<Position>) -> Vec<Position> {
    v.sort_by_key(|p| (p.row, p.col));
    v
}

// =============================================================================
// Fresh game
// =============================================================================

#[test]
fn test_fresh_game_legal_moves() {
    let game = new_game(true);
    let moves = legal_moves(&game);

    assert_eq!(
        sorted(moves.pawn_destinations.clone()),
        vec![Position::new(7, 4), Position::new(8, 3), Position::new(8, 5)]
    );
    assert_eq!(moves.horizontal_walls.len(), 64);
    assert_eq!(moves.vertical_walls.len(), 64);
    assert_eq!(moves.len(), 131);
}

#[test]
fn test_first_pawn_move() {
    let game = new_game(true);
    let next = apply_move(&game, Move::Pawn(Position::new(7, 4))).unwrap();

    assert_eq!(next.turn, 1);
    assert_eq!(next.current(), 1);
    assert_eq!(next.pawns[0].position, Position::new(7, 4));
    assert_eq!(next.pawns[1], game.pawns[1]);
    assert_eq!(next.board, game.board);
    assert_eq!(next.winner, None);
    // The input state is untouched.
    assert_eq!(game.turn, 0);
}

#[test]
fn test_rejected_move_leaves_state_alone() {
    let game = new_game(true);
    let err = apply_move(&game, Move::Pawn(Position::new(6, 4))).unwrap_err();
    assert_eq!(err, MoveError::IllegalPawnMove(Position::new(6, 4)));
}

// =============================================================================
// Jump rules
// =============================================================================

#[test]
fn test_face_to_face_jump() {
    // Both pawns walk up column 4 until they meet at rows 5 and 4.
    let game = setup_game(&[
        Move::Pawn(Position::new(7, 4)),
        Move::Pawn(Position::new(1, 4)),
        Move::Pawn(Position::new(6, 4)),
        Move::Pawn(Position::new(2, 4)),
        Move::Pawn(Position::new(5, 4)),
        Move::Pawn(Position::new(3, 4)),
        Move::HorizontalWall(0, 0),
        Move::Pawn(Position::new(4, 4)),
    ]);
    assert_eq!(game.current(), 0);
    let dests = game.valid_pawn_destinations();
    assert!(dests.contains(&Position::new(3, 4)));
    assert!(!dests.contains(&Position::new(4, 4)));

    // A wall behind the opponent turns the jump diagonal.
    let blocked = apply_move(&game, Move::HorizontalWall(3, 4)).unwrap();
    let blocked = apply_move(&blocked, Move::HorizontalWall(7, 0)).unwrap();
    assert_eq!(blocked.current(), 0);
    assert_eq!(
        sorted(blocked.valid_pawn_destinations()),
        vec![
            Position::new(4, 3),
            Position::new(4, 5),
            Position::new(5, 3),
            Position::new(5, 5),
            Position::new(6, 4),
        ]
    );
}

// =============================================================================
// Wall placement and path blocking
// =============================================================================

#[test]
fn test_boxing_in_a_pawn_is_rejected() {
    // Three walls fence pawn 0 into row 8, columns 3..=6, from above and left.
    let game = setup_game(&[
        Move::HorizontalWall(7, 3),
        Move::HorizontalWall(7, 5),
        Move::VerticalWall(7, 2),
    ]);
    assert!(game.exist_paths_to_goals());

    // Closing the right side seals the box.
    assert!(!game.can_place_wall(Orientation::Vertical, 7, 6));
    assert!(!legal_moves(&game).vertical_walls.contains(&(7, 6)));
    assert_eq!(
        apply_move(&game, Move::VerticalWall(7, 6)),
        Err(MoveError::WallBlocksPath)
    );

    // One row higher the wall leaves a gap along row 8.
    assert!(game.can_place_wall(Orientation::Vertical, 6, 6));
    let next = apply_move(&game, Move::VerticalWall(6, 6)).unwrap();
    assert!(next.exist_paths_to_goals());
    // Out along row 8 to column 7, then straight up.
    assert_eq!(next.shortest_distance(0), Some(11));
}

#[test]
fn test_structural_slots_ignore_path_blocking() {
    let game = setup_game(&[
        Move::HorizontalWall(7, 3),
        Move::HorizontalWall(7, 5),
        Move::VerticalWall(7, 2),
    ]);
    let (horizontal, vertical) = game.valid_wall_slots();

    // The sealing wall is structurally free but not placeable.
    assert!(vertical.contains(&(7, 6)));
    assert!(!legal_moves(&game).vertical_walls.contains(&(7, 6)));
    assert!(horizontal.len() >= legal_moves(&game).horizontal_walls.len());
}

#[test]
fn test_structural_slots_shrink_per_wall() {
    let game = new_game(true);
    let (h0, v0) = game.valid_wall_slots();
    assert_eq!((h0.len(), v0.len()), (64, 64));

    // A horizontal wall takes its own slot, both collinear neighbours and
    // the crossing vertical slot.
    let game = apply_move(&game, Move::HorizontalWall(4, 4)).unwrap();
    let (h1, v1) = game.valid_wall_slots();
    assert_eq!((h1.len(), v1.len()), (61, 63));
    for slot in [(4, 3), (4, 4), (4, 5)] {
        assert!(!h1.contains(&slot));
    }
    assert!(!v1.contains(&(4, 4)));

    // A vertical wall takes the rows above and below instead.
    let game = apply_move(&game, Move::VerticalWall(1, 1)).unwrap();
    let (h2, v2) = game.valid_wall_slots();
    assert_eq!((h2.len(), v2.len()), (60, 60));
    for slot in [(0, 1), (1, 1), (2, 1)] {
        assert!(!v2.contains(&slot));
    }
    assert!(!h2.contains(&(1, 1)));

    // Slots already taken are not counted twice.
    let game = apply_move(&game, Move::HorizontalWall(4, 6)).unwrap();
    let (h3, v3) = game.valid_wall_slots();
    assert_eq!((h3.len(), v3.len()), (58, 59));
}

#[test]
fn test_crossing_wall_rejected() {
    let game = setup_game(&[Move::HorizontalWall(4, 4)]);
    assert_eq!(
        apply_move(&game, Move::VerticalWall(4, 4)),
        Err(MoveError::WallSlotUnavailable {
            orientation: Orientation::Vertical,
            row: 4,
            col: 4
        })
    );
    assert!(apply_move(&game, Move::HorizontalWall(4, 5)).is_err());
    assert!(apply_move(&game, Move::HorizontalWall(4, 6)).is_ok());
}

#[test]
fn test_paths_survive_random_games() {
    let mut rng = fastrand::Rng::with_seed(17);
    for _ in 0..10 {
        let mut game = new_game(rng.bool());
        for _ in 0..120 {
            if game.is_terminal() {
                break;
            }
            let moves = legal_moves(&game).into_moves();
            assert!(!moves.is_empty());
            let mv = moves[rng.usize(..moves.len())];
            game = apply_move(&game, mv).unwrap();
            assert!(game.exist_paths_to_goals());
            let used: u8 = game.pawns.iter().map(|p| 10 - p.walls_left).sum();
            assert_eq!(used as usize, game.board.wall_count());
        }
    }
}

#[test]
fn test_no_wall_slots_without_walls() {
    let mut game = new_game(true);
    game.pawns[0].walls_left = 0;
    let moves = legal_moves(&game);
    assert!(moves.horizontal_walls.is_empty());
    assert!(moves.vertical_walls.is_empty());
    assert_eq!(
        apply_move(&game, Move::HorizontalWall(0, 0)),
        Err(MoveError::NoWallsLeft)
    );
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_leaves_game_untouched() {
    let game = setup_game(&[Move::Pawn(Position::new(7, 4))]);
    let before = game;
    let mut rng = fastrand::Rng::with_seed(8);
    let mut tree = SearchTree::new(&game, 0.4, 0.7);
    let mv = tree_search(&mut tree, 100, &mut rng).unwrap();

    assert_eq!(game, before);
    assert!(game.is_legal(mv));
    assert_eq!(tree.root().v, 100);
}

#[test]
fn test_seeded_decisions_repeat() {
    let game = setup_game(&[
        Move::Pawn(Position::new(7, 4)),
        Move::Pawn(Position::new(1, 4)),
        Move::Pawn(Position::new(6, 4)),
    ]);
    let config = quick_config(21);

    let first = decide(&game, &config, &mut config.rng()).unwrap();
    let second = decide(&game, &config, &mut config.rng()).unwrap();
    assert_eq!(first, second);
    assert!(game.is_legal(first.mv));
}

#[test]
fn test_seeded_choose_ai_move_repeats() {
    let game = setup_game(&[
        Move::Pawn(Position::new(7, 4)),
        Move::Pawn(Position::new(1, 4)),
        Move::HorizontalWall(3, 2),
        Move::VerticalWall(4, 6),
        Move::Pawn(Position::new(6, 4)),
        Move::Pawn(Position::new(2, 4)),
    ]);
    let first = choose_ai_move_seeded(&game, 200, 0.4, 7).unwrap();
    let second = choose_ai_move_seeded(&game, 200, 0.4, 7).unwrap();
    assert_eq!(first, second);
    assert!(game.is_legal(first));
}

#[test]
fn test_choose_ai_move_is_legal() {
    let game = setup_game(&[Move::Pawn(Position::new(7, 4))]);
    let mv = choose_ai_move(&game, 50, 0.4).unwrap();
    assert!(game.is_legal(mv));
}

#[test]
fn test_choose_ai_move_after_game_over() {
    let mut game = new_game(true);
    game.winner = Some(1);
    assert_eq!(choose_ai_move(&game, 50, 0.4), Err(SearchError::GameOver));
}

#[test]
fn test_ai_takes_the_win() {
    // A pure race with pawn 0 one step from its goal.
    let mut game = new_game(true);
    game.pawns[0].position = Position::new(1, 2);
    game.pawns[1].position = Position::new(3, 7);
    game.pawns[0].walls_left = 0;
    game.pawns[1].walls_left = 0;
    game.turn = 10;
    let config = quick_config(5);
    let decision = decide(&game, &config, &mut config.rng()).unwrap();
    assert_eq!(decision.mv, Move::Pawn(Position::new(0, 2)));
}

#[test]
fn test_selfplay_stays_legal() {
    let config = SearchConfig {
        simulations: 20,
        seed: Some(99),
        ..SearchConfig::default()
    };
    let mut rng = config.rng();
    let mut game = new_game(false);
    while !game.is_terminal() && game.turn < 30 {
        let decision = decide(&game, &config, &mut rng).unwrap();
        game = apply_move(&game, decision.mv).unwrap();
        assert!(game.exist_paths_to_goals());
    }
}

// =============================================================================
// Text protocol
// =============================================================================

#[test]
fn test_protocol_session() {
    let mut engine = Engine::new(quick_config(1));
    let input = b"clear_board human\nplay u\n2 genmove\nplay h 0 0\nshowboard\nquit\n";
    let mut out = Vec::new();
    engine.run(&input[..], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    // genmove on the far pawn's first turn walks straight ahead.
    assert!(text.contains("=2 pawn 1 4"));
    assert!(!text.contains('?'));
    assert_eq!(engine.state().turn, 3);
    assert_eq!(engine.state().pawns[0].walls_left, 9);
}

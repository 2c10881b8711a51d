//! Quoridor-MCTS: a Quoridor engine with a Monte Carlo Tree Search AI.
//!
//! ## Usage
//!
//! - `quoridor-mcts` - Show a demo
//! - `quoridor-mcts serve` - Speak the text protocol on stdin/stdout
//! - `quoridor-mcts selfplay` - Let the AI play both sides
//! - `quoridor-mcts demo` - Run a single search and print the tree summary
//!
//! Logging goes to stderr; set `RUST_LOG` or pass `-v` to see it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use quoridor_mcts::ai::{SearchConfig, decide};
use quoridor_mcts::constants::{MAX_PLIES, N_SIMS, PLAYOUT_ADVANCE_PROB, UCT_CONST};
use quoridor_mcts::game::GameState;
use quoridor_mcts::mcts::SearchTree;
use quoridor_mcts::protocol::Engine;

/// Quoridor-MCTS: a Quoridor engine with a Monte Carlo Tree Search AI
#[derive(Parser)]
#[command(name = "quoridor-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Playouts per AI move
    #[arg(long, global = true, default_value_t = N_SIMS)]
    sims: usize,

    /// UCT exploration constant
    #[arg(long, global = true, default_value_t = UCT_CONST)]
    uct: f64,

    /// Seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak the line-oriented text protocol on stdin/stdout
    Serve,
    /// Let the AI play against itself, printing the board after each move
    Selfplay {
        /// Stop after this many plies
        #[arg(long, default_value_t = MAX_PLIES)]
        max_plies: usize,
        /// Mark the first mover as human (cosmetic in self-play)
        #[arg(long)]
        human_first: bool,
    },
    /// Run a single search from the opening and summarise the tree
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SearchConfig {
        simulations: cli.sims,
        exploration: cli.uct,
        seed: cli.seed,
        ..SearchConfig::default()
    };

    match cli.command {
        Some(Commands::Serve) => Engine::new(config).run_stdio(),
        Some(Commands::Selfplay {
            max_plies,
            human_first,
        }) => run_selfplay(&config, max_plies, human_first),
        Some(Commands::Demo) | None => run_demo(&config),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run_selfplay(config: &SearchConfig, max_plies: usize, human_first: bool) -> Result<()> {
    let mut rng = config.rng();
    let mut state = GameState::new(human_first);
    println!("{state}\n");

    while !state.is_terminal() && state.turn < max_plies {
        let decision = decide(&state, config, &mut rng)?;
        let mover = state.current();
        state
            .apply(decision.mv, true)
            .with_context(|| format!("AI chose illegal move {}", decision.mv))?;

        match decision.winrate {
            Some(wr) => println!("pawn {mover} plays {} (win rate {:.1}%)", decision.mv, wr * 100.0),
            None => println!("pawn {mover} plays {}", decision.mv),
        }
        println!("{state}\n");
    }

    match state.winner {
        Some(w) => println!("pawn {w} wins after {} plies", state.turn),
        None => println!("no winner after {} plies", state.turn),
    }
    Ok(())
}

fn run_demo(config: &SearchConfig) -> Result<()> {
    println!("Quoridor-MCTS: Quoridor with Monte Carlo Tree Search\n");

    let state = GameState::new(true);
    println!("{state}\n");

    let mut rng = config.rng();
    let mut tree = SearchTree::new(&state, config.exploration, PLAYOUT_ADVANCE_PROB);
    println!("Running {} MCTS simulations...", config.simulations);
    tree.search(config.simulations, &mut rng);

    let (best, winrate) = tree
        .best_move()
        .context("search produced no move from the opening")?;
    println!("Best move: {best}");
    println!("Win rate: {:.1}%", winrate * 100.0);
    println!("Tree: {} nodes, depth {}", tree.node_count(), tree.max_depth(SearchTree::ROOT));

    let line: Vec<String> = tree
        .principal_variation()
        .into_iter()
        .filter_map(|id| tree.node(id).mv)
        .map(|mv| mv.to_string())
        .collect();
    println!("Principal variation: {}", line.join(", "));
    Ok(())
}

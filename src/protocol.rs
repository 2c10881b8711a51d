//! Line-oriented text protocol for driving the engine from a terminal or a
//! front end.
//!
//! The framing follows GTP: an optional numeric id, a command, arguments;
//! responses start with `=` on success or `?` on failure and end with a
//! blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `clear_board [human|ai]` - New game; the argument says who moves first
//! - `play <move>` - Apply a move for the side to move
//! - `genmove` - Let the AI choose and play a move
//! - `legal_moves` - List the legal moves of the side to move
//! - `showboard` - Render the board
//! - `winner` - Report the winning pawn, if any
//!
//! ## Move Syntax
//!
//! - `u`, `d`, `l`, `r` - Step the pawn one cell (up/down/left/right)
//! - `pawn <row> <col>` - Move the pawn to a cell (steps and jumps)
//! - `h <row> <col>`, `v <row> <col>` - Place a wall at an anchor

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};

use crate::ai::{SearchConfig, decide};
use crate::board::{Direction, Position};
use crate::game::{GameState, Move};

/// The list of known protocol commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
    "winner",
];

/// Parse a move for `state`'s side to move.
pub fn parse_move(args: &[&str], state: &GameState) -> Result<Move> {
    let Some((&head, rest)) = args.split_first() else {
        bail!("missing move");
    };

    let direction = match head.to_ascii_lowercase().as_str() {
        "u" | "up" => Some(Direction::Up),
        "d" | "down" => Some(Direction::Down),
        "l" | "left" => Some(Direction::Left),
        "r" | "right" => Some(Direction::Right),
        _ => None,
    };
    if let Some(dir) = direction {
        let from = state.pawn_to_move().position;
        let to = from
            .step(dir)
            .ok_or_else(|| anyhow!("cannot step {dir:?} off the board"))?;
        return Ok(Move::Pawn(to));
    }

    let [row, col] = rest else {
        bail!("expected `{head} <row> <col>`");
    };
    let row: usize = row.parse().with_context(|| format!("invalid row {row:?}"))?;
    let col: usize = col.parse().with_context(|| format!("invalid column {col:?}"))?;

    match head.to_ascii_lowercase().as_str() {
        "pawn" | "p" => Ok(Move::Pawn(Position::new(row, col))),
        "h" | "hwall" => Ok(Move::HorizontalWall(row, col)),
        "v" | "vwall" => Ok(Move::VerticalWall(row, col)),
        other => bail!("unknown move kind {other:?}"),
    }
}

/// Protocol engine state.
pub struct Engine {
    /// Current game
    state: GameState,
    /// Search settings for `genmove`
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Engine {
    /// Create an engine; the human moves first by default.
    pub fn new(config: SearchConfig) -> Self {
        let rng = config.rng();
        Self {
            state: GameState::new(true),
            config,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((&command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = match self.execute(&command, args) {
                Ok(message) => (true, message),
                Err(err) => (false, format!("{err:#}")),
            };
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Run the command loop on stdin/stdout.
    pub fn run_stdio(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return its response text.
    pub fn execute(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("1".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let cmd = args.first().context("missing argument")?;
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "clear_board" => {
                let human_first = match args.first().map(|s| s.to_lowercase()) {
                    None => true,
                    Some(who) if who == "human" => true,
                    Some(who) if who == "ai" => false,
                    Some(who) => bail!("expected `human` or `ai`, got {who:?}"),
                };
                self.state = GameState::new(human_first);
                Ok(String::new())
            }

            "play" => {
                let mv = parse_move(args, &self.state)?;
                self.state.apply(mv, true)?;
                Ok(self.outcome())
            }

            "genmove" => {
                let decision = decide(&self.state, &self.config, &mut self.rng)?;
                self.state
                    .apply(decision.mv, true)
                    .with_context(|| format!("engine produced illegal move {}", decision.mv))?;
                let mut response = decision.mv.to_string();
                let outcome = self.outcome();
                if !outcome.is_empty() {
                    response.push('\n');
                    response.push_str(&outcome);
                }
                Ok(response)
            }

            "legal_moves" => {
                let moves = self.state.legal_moves().into_moves();
                Ok(moves
                    .iter()
                    .map(Move::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }

            "showboard" => Ok(format!("\n{}", self.state)),

            "winner" => Ok(match self.state.winner {
                Some(w) => w.to_string(),
                None => "none".to_string(),
            }),

            _ => bail!("unknown command: {command}"),
        }
    }

    fn outcome(&self) -> String {
        match self.state.winner {
            Some(w) => format!("winner {w}"),
            None => String::new(),
        }
    }
}

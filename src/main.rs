use clap::Parser;
use ferz::{
    config::{self, get_config},
    perft::divide,
    to_960_uci_from_fen, Position,
};
use log::info;
use thiserror::Error;

#[derive(Error, Debug)]
enum FerzError {
    #[error("Error reading the configuration file: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("{0}")]
    LibraryError(#[from] ferz::Error),
}

mod arguments {
    use std::path::PathBuf;

    use clap::{Args, Parser, Subcommand};
    use ferz::Notation;

    /// Position management for chess variants
    #[derive(Parser)]
    #[command(name = "ferz", version, about = "Position management for chess variants")]
    pub struct FerzArgs {
        /// Configuration file, ignored when it does not exist
        #[arg(short, long, default_value = "ferz.toml", global = true)]
        pub config: PathBuf,

        #[command(subcommand)]
        pub command: Commands,
    }

    /// The game a command works on.
    #[derive(Debug, Clone, Args)]
    pub struct Game {
        /// Variant of the game, the configured default when omitted
        #[arg(short, long)]
        pub variant: Option<String>,

        /// Starting position, the variant's initial position when omitted
        #[arg(short, long)]
        pub fen: Option<String>,

        /// Write castling moves in the king-captures-rook form
        #[arg(long)]
        pub chess960: bool,

        /// Moves played from the starting position, in coordinate notation
        pub moves: Vec<String>,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Commands {
        /// List the available variants
        Variants,

        /// Print the FEN of the position reached after the moves
        Fen {
            #[command(flatten)]
            game: Game,

            /// Print an SFEN instead of a FEN
            #[arg(long)]
            sfen: bool,

            /// Mark promoted pieces with a tilde
            #[arg(long)]
            show_promoted: bool,
        },

        /// List the legal moves of the position reached after the moves
        Moves {
            #[command(flatten)]
            game: Game,
        },

        /// Write the moves in a human notation
        San {
            #[command(flatten)]
            game: Game,

            /// The notation to use
            #[arg(short, long, default_value = "default")]
            notation: Notation,
        },

        /// Rewrite the castling moves in the king-captures-rook form
        To960 {
            #[command(flatten)]
            game: Game,
        },

        /// Count the leaf nodes of the move tree of the position reached after the moves
        Perft {
            #[command(flatten)]
            game: Game,

            /// The depth of the move tree
            #[arg(short, long)]
            depth: u16,

            /// The number of threads to use
            #[arg(short, long, default_value_t = 1)]
            threads: usize,
        },
    }
}

use arguments::{Commands, Game};

/// Returns the variant, FEN and castling mode of a game, falling back to the configuration.
fn resolve(game: &Game) -> Result<(String, String, bool), FerzError> {
    let config = get_config();
    let variant = game.variant.clone().unwrap_or_else(|| config.default_variant.clone());
    let fen = match &game.fen {
        Some(fen) => fen.clone(),
        None => ferz::initial_fen(&variant)?,
    };
    Ok((variant, fen, game.chess960 || config.chess960))
}

/// Returns the position reached after the moves of a game.
fn play(game: &Game) -> Result<Position, FerzError> {
    let (variant, fen, chess960) = resolve(game)?;
    Ok(Position::from_fen(&variant, &fen, chess960)?.make_moves(&game.moves)?)
}

fn run() -> Result<(), FerzError> {
    // Parse command line arguments
    let args = arguments::FerzArgs::parse();

    // Initialize the configuration, the logger and the library
    config::initialize(args.config)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&get_config().log_level)).init();
    ferz::initialize();
    info!("ferz {}", ferz::version());

    // Run the command
    match args.command {
        Commands::Variants => {
            for variant in ferz::available_variants() {
                println!("{}", variant);
            }
        }
        Commands::Fen { game, sfen, show_promoted } => {
            println!("{}", play(&game)?.get_fen(sfen, show_promoted, 0));
        }
        Commands::Moves { game } => {
            println!("{}", play(&game)?.get_legal_moves().join(" "));
        }
        Commands::San { game, notation } => {
            let (variant, fen, chess960) = resolve(&game)?;
            let position = Position::from_fen(&variant, &fen, chess960)?;
            println!("{}", position.get_san_moves(&game.moves, notation)?.join(" "));
        }
        Commands::To960 { game } => {
            let (variant, fen, _) = resolve(&game)?;
            println!("{}", to_960_uci_from_fen(&variant, &fen, &game.moves)?.join(" "));
        }
        Commands::Perft { game, depth, threads } => {
            let position = play(&game)?;
            let divided = divide(position.engine(), depth, threads);
            for (mv, nodes) in &divided {
                println!("{}\t{}", mv, nodes);
            }
            println!("\nNodes: {}", divided.iter().map(|(_, nodes)| nodes).sum::<u64>());
        }
    }

    Ok(())
}

/// Main entry point for the ferz command line tool.
fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

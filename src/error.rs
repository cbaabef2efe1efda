use thiserror::Error;

use crate::{engine::FenError, notation::Notation};

/// Errors surfaced by the public API.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown variant: {0}")]
    InvalidVariant(String),

    #[error("Invalid FEN ({fen}): {source}")]
    InvalidFen {
        fen: String,
        #[source]
        source: FenError,
    },

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Precondition violated: {0}")]
    PreconditionViolated(&'static str),

    #[error("The {notation:?} notation is not supported by the {variant} variant")]
    UnsupportedNotation { notation: Notation, variant: String },

    #[error("Unrecognized option: {0}")]
    UnrecognizedOption(String),

    #[error("Invalid value {value:?} for option {name}")]
    InvalidOptionValue { name: String, value: String },
}

/// Result type of the public API.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use crate::types::Player;

/// Errors raised by the game session and move parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move at {0}")]
    IllegalMove(String),

    #[error("row/col out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    #[error("invalid move notation: {0:?}")]
    InvalidNotation(String),

    #[error("it is not the {0} player's turn")]
    NotYourTurn(Player),

    #[error("game is already over")]
    GameOver,

    /// The computer's opening can only be dictated before any move was played.
    #[error("opening move was already played")]
    OpeningAlreadyPlayed,

    /// A deferred computer decision no longer matches the session position.
    #[error("computer decision does not match the current position")]
    StaleDecision,
}

/// Errors raised while validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("search depth must be at least 1")]
    ZeroDepth,
}

/// Errors raised when parsing a textual board.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),

    #[error("row {row} has {len} squares, expected 8")]
    RowLength { row: usize, len: usize },

    #[error("unknown square {ch:?} in row {row}")]
    UnknownSquare { row: usize, ch: char },
}

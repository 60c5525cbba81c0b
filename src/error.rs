// src/error.rs
use std::io;
use thiserror::Error;

use crate::types::{Color, PieceKind, Square};

/// Faults raised by the engine. Rejected-but-well-formed moves are not faults;
/// they come back as `MoveResult::InvalidMove`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no {color} {kind} at {square}")]
    InvalidPiece { square: Square, kind: PieceKind, color: Color },
    #[error("coordinates ({row}, {col}) are outside the board")]
    OutOfBounds { row: i64, col: i64 },
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("no move available for {0}")]
    NoMoveAvailable(Color),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error with config file '{0}': {1}")]
    Io(String, #[source] io::Error),
    #[error("config file '{0}' is not valid JSON: {1}")]
    Parse(String, #[source] serde_json::Error),
    #[error("unknown option '{0}'. Use --help for the list of options.")]
    UnknownOption(String),
    #[error("invalid value '{value}' for option '{key}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, #[source] io::Error),
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
    #[error("bad HTTP request: {0}")]
    BadRequest(String),
    #[error("request body of {0} bytes exceeds the {1} byte limit")]
    PayloadTooLarge(usize, usize),
}

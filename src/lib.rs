// src/lib.rs
//! Rule engine and game-state authority for a chess variant with cannons and
//! optional special-capture rules, served over a small HTTP/JSON API.

pub mod ai;
pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod executor;
pub mod logger;
pub mod movegen;
pub mod rules;
pub mod server;
pub mod session;
pub mod types;

pub use board::Board;
pub use error::{ConfigError, EngineError, ServerError};
pub use executor::{GameState, GameStatus};
pub use session::{GameSession, SharedSession};
pub use types::{Color, Move, MoveResult, Piece, PieceKind, RuleKind, Square};

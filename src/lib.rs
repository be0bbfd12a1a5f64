use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod types;
pub mod wasm;

pub use ai::{HeuristicEvaluator, SearchReport, Searcher};
pub use board::Board;
pub use config::{GameConfig, SearchConfig};
pub use error::{ConfigError, GameError, ParseBoardError};
pub use game::{
    ComputerDecision, ComputerTurn, FirstLegalMoveSelector, GameSession, MoveSelector, TurnOutcome,
};
pub use types::{Cell, GameResult, GameView, Move, MoveRecord, Player, Position, SessionState};
pub use wasm::ReversiGame;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

use thiserror::Error;

use crate::game::{Direction, GameState, SquareIndex};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("no questions available for category: {0}")]
    NotFound(String),
    #[error("expected {expected} distinct categories, got {got:?}")]
    InvalidSelection { expected: usize, got: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cannot {operation} now: expected {expected:?} but the game is in {actual:?}")]
    WrongState {
        operation: &'static str,
        expected: GameState,
        actual: GameState,
    },
    #[error("invalid players: {0}")]
    InvalidPlayers(String),
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("choose a direction from {available:?}")]
    DirectionRequired { available: Vec<Direction> },
    #[error("cannot move {direction:?} from square {location}")]
    DirectionUnavailable {
        direction: Direction,
        location: SquareIndex,
    },
    #[error("square {0} has no question category")]
    NoCategory(SquareIndex),
    #[error("the game is over: {winner} won")]
    GameOver { winner: String },
    #[error(transparent)]
    Question(#[from] QuestionError),
}

impl GameError {
    /// True for commands that were simply sent at the wrong time
    pub fn is_state_violation(&self) -> bool {
        matches!(self, GameError::WrongState { .. })
    }
}

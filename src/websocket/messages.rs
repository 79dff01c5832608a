use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{game::Direction, models::GameSnapshot, questions::Question};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame {
        players: Vec<String>,
        categories: Vec<String>,
    },
    ResumeGame {
        game_id: Uuid,
    },
    SetPlayerOrder {
        players: Vec<String>,
    },
    Roll,
    GetDirections,
    Move {
        #[serde(default)]
        direction: Option<Direction>,
    },
    GetQuestion {
        #[serde(default)]
        category: Option<String>,
    },
    VerifyQuestion {
        correct: bool,
    },
    GetScore {
        player: String,
    },
    GetCategories,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameStarted {
        game_id: Uuid,
        categories: Vec<String>,
        game: GameSnapshot,
    },
    GameState {
        game: GameSnapshot,
    },
    Rolled {
        value: u8,
        game: GameSnapshot,
    },
    Directions {
        /// `None` when the next move is predetermined
        directions: Option<Vec<Direction>>,
    },
    Question {
        question: Question,
    },
    Score {
        player: String,
        categories: Vec<String>,
    },
    Categories {
        categories: Vec<String>,
    },
    GameOver {
        winner: String,
        game: GameSnapshot,
    },
    /// The command does not apply to the current state and was ignored
    NotAllowed {
        message: String,
    },
    Error {
        message: String,
    },
}

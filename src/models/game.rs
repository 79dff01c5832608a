use serde::{Deserialize, Serialize};

use crate::game::{CategoryTag, Direction, Game, GameState, Player, Square, SquareIndex};

/// Client-facing view of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerInfo>,
    pub turn: usize,
    pub active_player: String,
    pub state: GameState,
    /// Steps left in the current roll
    pub roll: u8,
    pub active_square: Square,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub location: SquareIndex,
    pub direction: Direction,
    pub score: Vec<CategoryTag>,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            location: player.location,
            direction: player.direction,
            score: player.score.iter().copied().collect(),
        }
    }
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        Self {
            players: game.players().iter().map(PlayerInfo::from).collect(),
            turn: game.turn(),
            active_player: game.active_player().name.clone(),
            state: game.state(),
            roll: game.roll(),
            active_square: *game.active_square(),
        }
    }
}

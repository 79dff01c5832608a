use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    board::{Board, Kind, Square, Step},
    dice::Dice,
    player::Player,
    Direction,
};
use crate::error::GameError;

/// Most players a single game seats
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Roll,
    Move,
    Question,
    /// Reserved. No transition enters this state.
    Verify,
}

/// One match: the board, the seated players and whose turn it is.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    players: Vec<Player>,
    turn: usize,
    state: GameState,
    /// Steps left in the current roll
    roll: u8,
    dice: Dice,
}

impl Game {
    pub fn new(names: Vec<String>, dice: Dice) -> Result<Self, GameError> {
        let names = validate_names(&names)?;
        tracing::info!("Setting up game for players: {:?}", names);

        Ok(Self {
            board: Board::new(),
            players: names.into_iter().map(Player::new).collect(),
            turn: 0,
            state: GameState::Roll,
            roll: 0,
            dice,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn roll(&self) -> u8 {
        self.roll
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.turn]
    }

    pub(crate) fn active_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.turn]
    }

    pub fn active_square(&self) -> &Square {
        let location = self.active_player().location;
        self.board
            .square(location)
            .expect("player locations come from the board layout")
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    /// Check the game is in the state an operation needs
    pub fn ensure_state(
        &self,
        operation: &'static str,
        expected: GameState,
    ) -> Result<(), GameError> {
        if self.state != expected {
            tracing::warn!(
                "Incorrect state for {}. Expected {:?} but got {:?}",
                operation,
                expected,
                self.state
            );
            return Err(GameError::WrongState {
                operation,
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Reorder the seated players, e.g. after a tie-break roll. The turn
    /// restarts with the first name.
    pub fn set_player_order(&mut self, names: &[String]) -> Result<(), GameError> {
        if names.len() != self.players.len() {
            return Err(GameError::InvalidPlayers(format!(
                "expected {} names, got {}",
                self.players.len(),
                names.len()
            )));
        }
        let names = validate_names(names)?;

        let mut reordered = Vec::with_capacity(names.len());
        for name in &names {
            let player = self
                .player(name)
                .cloned()
                .ok_or_else(|| GameError::UnknownPlayer(name.clone()))?;
            reordered.push(player);
        }

        self.players = reordered;
        self.turn = 0;
        tracing::info!("Player order set to {:?}", names);
        Ok(())
    }

    pub fn roll_dice(&mut self) -> Result<u8, GameError> {
        self.ensure_state("roll", GameState::Roll)?;

        self.roll = self.dice.roll();
        self.state = GameState::Move;
        tracing::info!("{} rolled a {}", self.active_player().name, self.roll);
        Ok(self.roll)
    }

    /// Spend the remaining roll moving the active player. Optionally turns the
    /// player to `direction` first.
    pub fn advance(&mut self, direction: Option<Direction>) -> Result<&Self, GameError> {
        self.ensure_state("move", GameState::Move)?;

        let location = self.active_player().location;
        let heading = direction.unwrap_or(self.active_player().direction);
        if !self.board.accepts(location, heading) {
            return Err(GameError::DirectionUnavailable {
                direction: heading,
                location,
            });
        }
        self.active_player_mut().direction = heading;

        while self.roll > 0 {
            let step = self.board.move_player(&mut self.players[self.turn]);
            self.roll -= 1;
            if step == Step::Stop {
                if self.roll == 0 {
                    self.state = GameState::Question;
                }
                return Ok(self);
            }
        }

        self.board
            .force_center_direction(&mut self.players[self.turn]);

        self.state = if self.active_square().kind == Kind::RollAgain {
            GameState::Roll
        } else {
            GameState::Question
        };

        tracing::info!(
            "{} moved to {} going {:?}",
            self.active_player().name,
            self.active_player().location,
            self.active_player().direction
        );
        Ok(self)
    }

    /// Apply the outcome of the question just asked. A correct answer on a
    /// hub earns that hub's token and keeps the turn; a wrong answer passes
    /// the turn on.
    pub fn verify_question(&mut self, correct: bool) -> Result<&Self, GameError> {
        self.ensure_state("verify question", GameState::Question)?;
        tracing::debug!("Verifying question. Correct: {}", correct);

        if correct {
            let square = *self.active_square();
            if let (true, Some(tag)) = (square.is_hub, square.kind.category()) {
                let turn = self.turn;
                self.players[turn].award(tag);
                self.board.force_center_direction(&mut self.players[turn]);
                tracing::info!("{} got a {:?} token", self.players[turn].name, tag);
            }
        } else {
            self.turn = (self.turn + 1) % self.players.len();
        }

        self.state = GameState::Roll;
        Ok(self)
    }
}

/// Trim the names and check there are 1 to 4 distinct, non-blank ones
fn validate_names(names: &[String]) -> Result<Vec<String>, GameError> {
    let names: Vec<String> = names.iter().map(|name| name.trim().to_string()).collect();
    if names.is_empty() || names.len() > MAX_PLAYERS {
        return Err(GameError::InvalidPlayers(format!(
            "a game needs 1 to {} players, got {}",
            MAX_PLAYERS,
            names.len()
        )));
    }
    if names.iter().any(|name| name.is_empty()) {
        return Err(GameError::InvalidPlayers(
            "player names cannot be blank".to_string(),
        ));
    }
    let unique: HashSet<&String> = names.iter().collect();
    if unique.len() != names.len() {
        return Err(GameError::InvalidPlayers(
            "player names must be distinct".to_string(),
        ));
    }
    Ok(names)
}

use crate::{
    error::GameError,
    game::{Board, Dice, Direction, Game, GameState, CENTER},
    questions::{validate_selection, Question, QuestionProvider, CATEGORIES_PER_GAME},
};

/// A single game session: the game itself plus the question source it draws
/// from. Every mutating command is checked against the game state first.
#[derive(Debug)]
pub struct GameServer<P> {
    game: Game,
    provider: P,
    categories: [String; CATEGORIES_PER_GAME],
    winner: Option<String>,
}

impl<P: QuestionProvider> GameServer<P> {
    pub fn start(
        mut provider: P,
        players: Vec<String>,
        categories: Vec<String>,
        dice: Dice,
    ) -> Result<Self, GameError> {
        let categories = validate_selection(&categories)?;
        let game = Game::new(players, dice)?;
        provider.load_categories(&categories)?;

        tracing::info!("Server starting game with categories: {:?}", categories);

        Ok(Self {
            game,
            provider,
            categories,
            winner: None,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn selected_categories(&self) -> &[String; CATEGORIES_PER_GAME] {
        &self.categories
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        match &self.winner {
            Some(winner) => Err(GameError::GameOver {
                winner: winner.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Reseat the players, typically after a tie-break roll before play starts
    pub fn set_player_order(&mut self, names: &[String]) -> Result<&Game, GameError> {
        self.ensure_running()?;
        self.game.ensure_state("set player order", GameState::Roll)?;
        self.game.set_player_order(names)?;
        Ok(&self.game)
    }

    pub fn roll(&mut self) -> Result<u8, GameError> {
        self.ensure_running()?;
        self.game.roll_dice()
    }

    /// Directions the active player may choose from, or `None` when the next
    /// move is predetermined.
    pub fn available_directions(&self) -> Option<Vec<Direction>> {
        let square = self.game.active_square();
        let player = self.game.active_player();

        if Board::is_spoke_interior(square.index) {
            None
        } else if square.is_hub && player.has_all_tokens() {
            None
        } else if square.is_hub {
            Some(Direction::RING.to_vec())
        } else if square.index == CENTER {
            Some(Direction::SPOKE.to_vec())
        } else {
            Some(Direction::RING.to_vec())
        }
    }

    /// Move the active player. The direction has to be one of
    /// [`Self::available_directions`]; without one the player keeps heading
    /// the way they face, which must itself be available.
    pub fn advance(&mut self, direction: Option<Direction>) -> Result<&Game, GameError> {
        self.ensure_running()?;
        self.game.ensure_state("move", GameState::Move)?;

        let player = self.game.active_player();
        match (self.available_directions(), direction) {
            (None, Some(direction)) => {
                return Err(GameError::DirectionUnavailable {
                    direction,
                    location: player.location,
                });
            }
            (Some(available), Some(direction)) if !available.contains(&direction) => {
                return Err(GameError::DirectionUnavailable {
                    direction,
                    location: player.location,
                });
            }
            (Some(available), None) if !available.contains(&player.direction) => {
                return Err(GameError::DirectionRequired { available });
            }
            _ => {}
        }

        self.game.advance(direction)
    }

    /// Draw a question. With an explicit category name (the final question,
    /// picked by the other players) the state check is skipped; otherwise the
    /// category comes from the square the active player stands on.
    pub fn question(&mut self, category: Option<&str>) -> Result<Question, GameError> {
        if let Some(name) = category {
            return Ok(self.provider.question_named(name)?);
        }

        self.game.ensure_state("get question", GameState::Question)?;
        let square = self.game.active_square();
        let tag = square
            .kind
            .category()
            .ok_or(GameError::NoCategory(square.index))?;
        Ok(self.provider.question_for(tag)?)
    }

    /// Record the answer. A correct answer on the center square by a player
    /// holding every token wins the game.
    pub fn verify_question(&mut self, correct: bool) -> Result<&Game, GameError> {
        self.ensure_running()?;
        self.game.ensure_state("verify question", GameState::Question)?;

        let player = self.game.active_player();
        let won = correct && player.location == CENTER && player.has_all_tokens();
        let name = player.name.clone();

        self.game.verify_question(correct)?;

        if won {
            tracing::info!("{} is the champion", name);
            self.winner = Some(name);
        }
        Ok(&self.game)
    }

    /// Names of the categories a player holds tokens for
    pub fn score(&self, player: &str) -> Result<Vec<String>, GameError> {
        let player = self
            .game
            .player(player.trim())
            .ok_or_else(|| GameError::UnknownPlayer(player.to_string()))?;
        Ok(player
            .score
            .iter()
            .map(|tag| self.categories[tag.ordinal()].clone())
            .collect())
    }

    pub fn categories(&self) -> Vec<String> {
        self.provider.categories_available()
    }
}

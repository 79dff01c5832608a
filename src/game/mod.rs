// Game engine modules

pub mod board;
pub mod dice;
pub mod player;
pub mod state;

pub use board::{Board, CategoryTag, Direction, Square, SquareIndex, CENTER};
pub use dice::Dice;
pub use player::Player;
pub use state::{Game, GameState};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{CategoryTag, Direction, SquareIndex, CENTER, TO_WIN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Category tokens collected so far
    pub score: BTreeSet<CategoryTag>,
    pub direction: Direction,
    pub location: SquareIndex,
}

impl Player {
    /// New players start parked on the center square facing clockwise
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: BTreeSet::new(),
            direction: Direction::Clockwise,
            location: CENTER,
        }
    }

    pub fn tokens(&self) -> usize {
        self.score.len()
    }

    pub fn has_all_tokens(&self) -> bool {
        self.tokens() >= TO_WIN
    }

    /// Add a token; returns false if the player already held it
    pub fn award(&mut self, tag: CategoryTag) -> bool {
        self.score.insert(tag)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: square {}, {:?}",
            self.name, self.location, self.direction
        )
    }
}

pub mod bank;
pub mod catalog;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::QuestionError;
use crate::game::CategoryTag;

pub use bank::QuestionBank;
pub use catalog::QuestionCatalog;

/// Number of categories a game is played with
pub const CATEGORIES_PER_GAME: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: String,
    pub question: String,
    pub answer: String,
    /// Optional image or audio reference shown alongside the question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// Supplies trivia for a game.
pub trait QuestionProvider {
    /// Every category the provider knows about, in first-seen order
    fn categories_available(&self) -> Vec<String>;

    /// Pick the categories in play. The order maps onto `Category1..=Category4`.
    fn load_categories(&mut self, selected: &[String; CATEGORIES_PER_GAME])
        -> Result<(), QuestionError>;

    /// A random question for a board category
    fn question_for(&mut self, tag: CategoryTag) -> Result<Question, QuestionError>;

    /// A random question for a loaded category, looked up by name
    fn question_named(&mut self, name: &str) -> Result<Question, QuestionError>;
}

/// Check a category selection has exactly four distinct names. The names
/// come back trimmed, matching how the catalog stores them.
pub fn validate_selection(
    categories: &[String],
) -> Result<[String; CATEGORIES_PER_GAME], QuestionError> {
    let invalid = || QuestionError::InvalidSelection {
        expected: CATEGORIES_PER_GAME,
        got: categories.to_vec(),
    };

    let trimmed: Vec<String> = categories.iter().map(|c| c.trim().to_string()).collect();
    let unique: HashSet<&str> = trimmed.iter().map(String::as_str).collect();
    if unique.len() != trimmed.len() || unique.contains("") {
        return Err(invalid());
    }

    trimmed.try_into().map_err(|_| invalid())
}

use std::collections::HashMap;
use std::sync::Arc;

use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use super::{validate_selection, Question, QuestionCatalog, QuestionProvider, CATEGORIES_PER_GAME};
use crate::error::QuestionError;
use crate::game::CategoryTag;

/// Per-game question source drawing from a shared catalog.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    catalog: Arc<QuestionCatalog>,
    categories: Option<[String; CATEGORIES_PER_GAME]>,
    bank: HashMap<String, Vec<Question>>,
    rng: StdRng,
}

impl QuestionBank {
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self::with_rng(catalog, StdRng::from_os_rng())
    }

    pub fn with_rng(catalog: Arc<QuestionCatalog>, rng: StdRng) -> Self {
        Self {
            catalog,
            categories: None,
            bank: HashMap::new(),
            rng,
        }
    }

    fn pick(&mut self, category: &str) -> Result<Question, QuestionError> {
        self.bank
            .get(category)
            .and_then(|questions| questions.choose(&mut self.rng))
            .cloned()
            .ok_or_else(|| QuestionError::NotFound(category.to_string()))
    }
}

impl QuestionProvider for QuestionBank {
    fn categories_available(&self) -> Vec<String> {
        self.catalog.categories()
    }

    fn load_categories(
        &mut self,
        selected: &[String; CATEGORIES_PER_GAME],
    ) -> Result<(), QuestionError> {
        let selected = validate_selection(selected)?;

        self.bank = selected
            .iter()
            .map(|category| {
                let questions: Vec<Question> =
                    self.catalog.in_category(category).cloned().collect();
                tracing::info!(
                    "Loaded {} questions for category: {}",
                    questions.len(),
                    category
                );
                (category.clone(), questions)
            })
            .collect();
        self.categories = Some(selected);
        Ok(())
    }

    fn question_for(&mut self, tag: CategoryTag) -> Result<Question, QuestionError> {
        let category = self
            .categories
            .as_ref()
            .map(|categories| categories[tag.ordinal()].clone())
            .ok_or_else(|| QuestionError::NotFound(format!("{:?}", tag)))?;
        self.pick(&category)
    }

    fn question_named(&mut self, name: &str) -> Result<Question, QuestionError> {
        self.pick(name.trim())
    }
}

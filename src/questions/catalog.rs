use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

use super::Question;

/// Every question known to the server, as loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Load a catalog from a JSON array of questions
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read question catalog {}", path.display()))?;
        let catalog = Self::from_json(&content)
            .with_context(|| format!("failed to parse question catalog {}", path.display()))?;

        tracing::info!(
            "Loaded {} questions in {} categories",
            catalog.len(),
            catalog.categories().len()
        );

        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(content)?;
        Ok(Self::new(questions))
    }

    pub fn new(questions: Vec<Question>) -> Self {
        let questions = questions
            .into_iter()
            .map(|mut q| {
                q.category = q.category.trim().to_string();
                q
            })
            .filter(|q| !q.category.is_empty() && !q.question.trim().is_empty())
            .collect();
        Self { questions }
    }

    /// Create an empty catalog (for testing)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Distinct category names in the order they first appear
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .filter(|q| seen.insert(q.category.as_str()))
            .map(|q| q.category.clone())
            .collect()
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Question> {
        self.questions.iter().filter(move |q| q.category == category)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

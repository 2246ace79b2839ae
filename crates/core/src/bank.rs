//! Question bank - categorized, read-only question store
//!
//! Questions are stored behind `Arc` so rounds can hold the questions they
//! were dealt without copying them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::types::{Question, DEFAULT_CATEGORY};

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid question bank json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question {index} in category '{category}' has answer {answer} out of range")]
    AnswerOutOfRange {
        category: String,
        index: usize,
        answer: usize,
    },
    #[error("question bank has no questions")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    categories: BTreeMap<String, Vec<Arc<Question>>>,
}

impl QuestionBank {
    /// Build a bank from a category map, validating every question.
    pub fn new(categories: BTreeMap<String, Vec<Question>>) -> Result<Self, BankError> {
        let mut out = BTreeMap::new();
        for (category, questions) in categories {
            for (index, q) in questions.iter().enumerate() {
                if q.answer >= q.option_count() {
                    return Err(BankError::AnswerOutOfRange {
                        category,
                        index,
                        answer: q.answer,
                    });
                }
            }
            if !questions.is_empty() {
                out.insert(
                    category.to_lowercase(),
                    questions.into_iter().map(Arc::new).collect(),
                );
            }
        }
        if out.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self { categories: out })
    }

    /// Parse a bank from JSON: `{ "category": [ {question, options, answer, explanation} ] }`.
    ///
    /// When the file does not define the fallback category, the built-in one is kept
    /// so unknown categories still resolve.
    pub fn from_json_str(json: &str) -> Result<Self, BankError> {
        let raw: BTreeMap<String, Vec<Question>> = serde_json::from_str(json)?;
        let mut bank = Self::new(raw)?;
        if !bank.categories.contains_key(DEFAULT_CATEGORY) {
            let builtin = Self::builtin();
            if let Some(general) = builtin.categories.get(DEFAULT_CATEGORY) {
                bank.categories
                    .insert(DEFAULT_CATEGORY.to_string(), general.clone());
            }
        }
        Ok(bank)
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            categories = bank.categories.len(),
            "loaded question bank"
        );
        Ok(bank)
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(&category.to_lowercase())
    }

    /// Name of the category that `requested` resolves to.
    ///
    /// Unknown names fall back to `general`.
    pub fn resolve<'a>(&'a self, requested: &'a str) -> &'a str {
        let lower = requested.to_lowercase();
        match self.categories.get_key_value(&lower) {
            Some((name, _)) => name.as_str(),
            None => DEFAULT_CATEGORY,
        }
    }

    /// Questions of a category, falling back to `general` for unknown names.
    pub fn questions(&self, category: &str) -> &[Arc<Question>] {
        self.categories
            .get(&category.to_lowercase())
            .or_else(|| self.categories.get(DEFAULT_CATEGORY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_questions(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// The static bank shipped with the game.
    pub fn builtin() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            "general".to_string(),
            vec![
                Question::new(
                    "What is the capital of France?",
                    ["London", "Berlin", "Paris", "Madrid"],
                    2,
                    "Paris is the capital and most populous city of France.",
                ),
                Question::new(
                    "Which planet is known as the Red Planet?",
                    ["Venus", "Mars", "Jupiter", "Saturn"],
                    1,
                    "Mars is often called the Red Planet due to its reddish appearance.",
                ),
            ],
        );
        categories.insert(
            "science".to_string(),
            vec![
                Question::new(
                    "What is the chemical symbol for water?",
                    ["H2O", "CO2", "O2", "NaCl"],
                    0,
                    "H2O is the chemical formula for water, indicating two hydrogen atoms and one oxygen atom.",
                ),
                Question::new(
                    "What force keeps us on the ground?",
                    ["Magnetism", "Gravity", "Friction", "Inertia"],
                    1,
                    "Gravity is the force that attracts objects with mass toward each other.",
                ),
            ],
        );
        categories.insert(
            "history".to_string(),
            vec![Question::new(
                "Who was the first president of the United States?",
                ["Thomas Jefferson", "Abraham Lincoln", "George Washington", "John Adams"],
                2,
                "George Washington served as the first president from 1789 to 1797.",
            )],
        );
        categories.insert(
            "tech".to_string(),
            vec![Question::new(
                "What does HTML stand for?",
                [
                    "Hyper Text Markup Language",
                    "High Tech Modern Language",
                    "Hyper Transfer Markup Language",
                    "Home Tool Markup Language",
                ],
                0,
                "HTML stands for Hyper Text Markup Language, the standard markup language for web pages.",
            )],
        );
        categories.insert(
            "movies".to_string(),
            vec![Question::new(
                "Which movie features the quote 'You talking to me?'",
                ["Scarface", "Taxi Driver", "Goodfellas", "The Godfather"],
                1,
                "This iconic line is spoken by Robert De Niro's character Travis Bickle in Taxi Driver.",
            )],
        );
        categories.insert(
            "sports".to_string(),
            vec![Question::new(
                "How many players are on a soccer team during a match?",
                ["9", "10", "11", "12"],
                2,
                "A soccer team consists of 11 players on the field, including the goalkeeper.",
            )],
        );

        Self {
            categories: categories
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().map(Arc::new).collect()))
                .collect(),
        }
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_categories() {
        let bank = QuestionBank::builtin();
        let names: Vec<&str> = bank.categories().collect();
        assert_eq!(
            names,
            vec!["general", "history", "movies", "science", "sports", "tech"]
        );
        assert_eq!(bank.questions("science").len(), 2);
        assert_eq!(bank.total_questions(), 8);
    }

    #[test]
    fn test_unknown_category_falls_back_to_general() {
        let bank = QuestionBank::builtin();
        assert_eq!(bank.resolve("geography"), "general");
        assert_eq!(bank.questions("geography"), bank.questions("general"));
        assert_eq!(bank.resolve("Science"), "science");
    }

    #[test]
    fn test_builtin_answers_in_range() {
        let bank = QuestionBank::builtin();
        for category in bank.categories() {
            for q in bank.questions(category) {
                assert!(q.answer < q.option_count());
            }
        }
    }

    #[test]
    fn test_from_json_uses_question_field_names() {
        let json = r#"{"Geo":[{"question":"Largest ocean?","options":["Atlantic","Pacific","Indian","Arctic"],"answer":1,"explanation":"The Pacific."}]}"#;
        let bank = QuestionBank::from_json_str(json).unwrap();
        assert!(bank.contains("geo"));
        assert_eq!(bank.questions("geo")[0].text, "Largest ocean?");
        // Fallback category is kept from the built-in bank.
        assert_eq!(bank.questions("nope").len(), 2);
    }

    #[test]
    fn test_from_json_rejects_bad_answer() {
        let json = r#"{"geo":[{"question":"?","options":["a","b","c","d"],"answer":4}]}"#;
        let err = QuestionBank::from_json_str(json).unwrap_err();
        assert!(matches!(err, BankError::AnswerOutOfRange { answer: 4, .. }));
    }

    #[test]
    fn test_from_json_rejects_empty_bank() {
        assert!(matches!(
            QuestionBank::from_json_str("{}").unwrap_err(),
            BankError::Empty
        ));
        assert!(matches!(
            QuestionBank::from_json_str("[").unwrap_err(),
            BankError::Parse(_)
        ));
    }
}

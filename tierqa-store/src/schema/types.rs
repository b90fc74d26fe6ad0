//! Type definitions for stored answers

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lowest score a record may carry
pub const MIN_SCORE: u8 = 1;

/// Highest score a record may carry
pub const MAX_SCORE: u8 = 10;

/// Violations of the record invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Score outside `MIN_SCORE..=MAX_SCORE`
    #[error("score {0} is outside the range {MIN_SCORE}..={MAX_SCORE}")]
    ScoreOutOfRange(i64),

    /// Title is empty after trimming
    #[error("title must not be empty")]
    EmptyTitle,
}

/// The canonical answer unit: a question, its score, optional body and answer text.
///
/// A `Record` is immutable once constructed. Every construction path, including
/// deserialization from a cache payload, goes through [`Record::new`] so the
/// score range and non-empty title always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct Record {
    score: u8,
    title: String,
    body: Option<String>,
    answer: String,
}

/// Unvalidated wire shape of a [`Record`]
#[derive(Deserialize)]
struct RecordFields {
    score: i64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    answer: String,
}

impl TryFrom<RecordFields> for Record {
    type Error = RecordError;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        Record::new(fields.score, fields.title, fields.body, fields.answer)
    }
}

impl Record {
    /// Create a record, validating the score range and the title.
    ///
    /// An empty `answer` is accepted; see [`Record::is_degenerate`].
    pub fn new(
        score: i64,
        title: impl Into<String>,
        body: Option<String>,
        answer: impl Into<String>,
    ) -> Result<Self, RecordError> {
        if score < i64::from(MIN_SCORE) || score > i64::from(MAX_SCORE) {
            return Err(RecordError::ScoreOutOfRange(score));
        }

        let title = title.into();
        if title.trim().is_empty() {
            return Err(RecordError::EmptyTitle);
        }

        Ok(Self {
            score: score as u8,
            title,
            body,
            answer: answer.into(),
        })
    }

    /// Score between 1 and 10 inclusive
    pub fn score(&self) -> u8 {
        self.score
    }

    /// The question text, also the natural key of the record
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Optional free text, only ever populated by pre-existing store rows
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// A record whose answer text is empty. Valid, but carries no answer.
    pub fn is_degenerate(&self) -> bool {
        self.answer.trim().is_empty()
    }

    /// Human-readable rendering: question, score, answer
    pub fn to_message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Question: {}\nScore: {}\nAnswer: {}",
            self.title, self.score, self.answer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = Record::new(7, "What is Rust?", None, "A language").unwrap();

        assert_eq!(record.score(), 7);
        assert_eq!(record.title(), "What is Rust?");
        assert_eq!(record.body(), None);
        assert_eq!(record.answer(), "A language");
        assert!(!record.is_degenerate());
    }

    #[test]
    fn test_record_rejects_out_of_range_score() {
        assert_eq!(
            Record::new(0, "q", None, "a").unwrap_err(),
            RecordError::ScoreOutOfRange(0)
        );
        assert_eq!(
            Record::new(11, "q", None, "a").unwrap_err(),
            RecordError::ScoreOutOfRange(11)
        );
        assert!(Record::new(1, "q", None, "a").is_ok());
        assert!(Record::new(10, "q", None, "a").is_ok());
    }

    #[test]
    fn test_record_rejects_blank_title() {
        assert_eq!(
            Record::new(5, "   ", None, "a").unwrap_err(),
            RecordError::EmptyTitle
        );
    }

    #[test]
    fn test_empty_answer_is_degenerate_but_valid() {
        let record = Record::new(3, "q", None, "").unwrap();
        assert!(record.is_degenerate());
    }

    #[test]
    fn test_message_format() {
        let record = Record::new(8, "Why?", Some("context".to_string()), "Because").unwrap();
        assert_eq!(record.to_message(), "Question: Why?\nScore: 8\nAnswer: Because");
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: Record =
            serde_json::from_str(r#"{"score":4,"title":"q","body":null,"answer":"a"}"#).unwrap();
        assert_eq!(ok.score(), 4);

        let missing_body: Record =
            serde_json::from_str(r#"{"score":4,"title":"q","answer":"a"}"#).unwrap();
        assert_eq!(missing_body.body(), None);

        let bad = serde_json::from_str::<Record>(r#"{"score":42,"title":"q","answer":"a"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialization_shape() {
        let record = Record::new(2, "q", None, "a").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"score": 2, "title": "q", "body": null, "answer": "a"})
        );
    }
}

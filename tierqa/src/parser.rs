//! Turns a language model reply into a validated [`Record`]
//!
//! The model is asked for exactly `[score, "<question>", null, "<answer>"]`,
//! but its output is untrusted. Decoding is tried twice: once on the whole
//! reply, then on the span between the first `[` and the last `]`. Nothing
//! beyond that bracket scan is attempted.

use serde_json::Value;
use thiserror::Error;
use tierqa_store::schema::{MAX_SCORE, MIN_SCORE};
use tierqa_store::{Record, RecordError};

/// Score used when element 0 cannot be read as a number
pub const DEFAULT_SCORE: i64 = 1;

const EXPECTED_ARITY: usize = 4;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed model output ({reason}): {raw}")]
    Malformed { raw: String, reason: String },

    #[error("parsed values do not form a record: {0}")]
    InvalidRecord(#[from] RecordError),
}

impl ParseError {
    fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        ParseError::Malformed {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse `raw` model output into a record titled with `question`
///
/// The echoed question (element 1) and element 2 are ignored; the body is
/// always empty.
///
/// # Example
/// ```
/// use tierqa::parser::parse_generated;
///
/// let record = parse_generated(r#"Sure! [15, "echo", null, " Yes "]"#, "Is it?").unwrap();
/// assert_eq!(record.score(), 10);
/// assert_eq!(record.title(), "Is it?");
/// assert_eq!(record.answer(), "Yes");
/// ```
pub fn parse_generated(raw: &str, question: &str) -> Result<Record, ParseError> {
    let value = decode(raw).ok_or_else(|| ParseError::malformed(raw, "not JSON"))?;

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(ParseError::malformed(raw, "expected a JSON array")),
    };
    if items.len() != EXPECTED_ARITY {
        return Err(ParseError::malformed(
            raw,
            format!("expected {} elements, got {}", EXPECTED_ARITY, items.len()),
        ));
    }

    let score = coerce_score(&items[0]);
    let answer = answer_text(&items[3]);

    Ok(Record::new(score, question, None, answer.trim())?)
}

fn decode(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }

    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

/// Round half-to-even, clamp to the valid range; unreadable values score the minimum
fn coerce_score(value: &Value) -> i64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match number.filter(|n| n.is_finite()) {
        Some(n) => n
            .round_ties_even()
            .clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as i64,
        None => DEFAULT_SCORE,
    }
}

/// Answer element as text
///
/// `null` becomes the empty string, not the text `None` that the earlier
/// `str()` rendering stored for it.
fn answer_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

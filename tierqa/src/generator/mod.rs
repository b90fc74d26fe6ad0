//! Language model tier
//!
//! An [`AnswerGenerator`] turns a question into raw model text. It does not
//! parse; see [`crate::parser`].

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiGenerator, DEFAULT_GEMINI_MODEL};

/// Instruction prepended to every question
pub const PROMPT_TEMPLATE: &str = concat!(
    "Answer the user's question and compute ONE final score from 1 to 10.\n",
    "Return EXCLUSIVELY valid JSON in this FORMAT and ORDER:\n",
    "[\n",
    "  final_integer_score_1_to_10,\n",
    "  \"<repeat the question EXACTLY as you received it>\",\n",
    "  null,\n",
    "  \"<answer as text>\"\n",
    "]\n\n",
    "Question:\n",
);

/// Full prompt sent to the model for `question`
pub fn build_prompt(question: &str) -> String {
    format!("{}{}", PROMPT_TEMPLATE, question)
}

/// Ways a generation call can fail, each handled differently upstream
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Provider quota or rate limit exhausted
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Provider overloaded or failing internally; retrying later may work
    #[error("transient provider failure: {0}")]
    TransientUnavailable(String),

    /// Provider could not be reached, or did not answer in time
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Ask the model `question`, returning its raw reply text
    async fn generate(&self, question: &str) -> Result<String, GeneratorError>;

    /// Short identifier used in logs and health reports
    fn name(&self) -> &str;
}

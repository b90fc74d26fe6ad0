pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod parser;

pub use api::{ApiServer, ApiServerConfig};
pub use config::{AppConfig, CacheKind, StoreKind};
pub use error::{AskError, StatusClass};
pub use generator::{AnswerGenerator, GeminiConfig, GeminiGenerator, GeneratorError};
pub use orchestrator::{AskResponse, HealthReport, Orchestrator, OrchestratorConfig, Source};
pub use parser::{parse_generated, ParseError};

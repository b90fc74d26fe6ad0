//! Request-path errors and their client-facing classification

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::generator::GeneratorError;
use crate::parser::ParseError;

/// Detail returned for storage outages; never includes connection details
pub const STORAGE_UNAVAILABLE_DETAIL: &str = "persistence tier is unavailable";

/// Everything that can fail a single ask
#[derive(Debug, Error)]
pub enum AskError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("language model rate limit exceeded: {0}")]
    UpstreamRateLimited(String),

    #[error("language model temporarily unavailable: {0}")]
    UpstreamTransientUnavailable(String),

    #[error("language model unreachable: {0}")]
    UpstreamConnectivityFailure(String),

    #[error("language model returned malformed output: {raw}")]
    UpstreamMalformedOutput { raw: String },

    #[error("{}", STORAGE_UNAVAILABLE_DETAIL)]
    StorageUnavailable,

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Coarse class of an [`AskError`], as seen by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusClass {
    ClientError,
    UpstreamMalformed,
    UpstreamUnavailable,
    UpstreamRateLimited,
    InternalError,
}

impl StatusClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::ClientError => "client-error",
            StatusClass::UpstreamMalformed => "upstream-malformed",
            StatusClass::UpstreamUnavailable => "upstream-unavailable",
            StatusClass::UpstreamRateLimited => "upstream-rate-limited",
            StatusClass::InternalError => "internal-error",
        }
    }

    /// HTTP status code for this class
    pub fn http_status(&self) -> u16 {
        match self {
            StatusClass::ClientError => 400,
            StatusClass::UpstreamMalformed => 502,
            StatusClass::UpstreamUnavailable => 503,
            StatusClass::UpstreamRateLimited => 429,
            StatusClass::InternalError => 500,
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AskError {
    pub fn class(&self) -> StatusClass {
        match self {
            AskError::InputInvalid(_) => StatusClass::ClientError,
            AskError::UpstreamRateLimited(_) => StatusClass::UpstreamRateLimited,
            AskError::UpstreamTransientUnavailable(_)
            | AskError::UpstreamConnectivityFailure(_)
            | AskError::StorageUnavailable => StatusClass::UpstreamUnavailable,
            AskError::UpstreamMalformedOutput { .. } => StatusClass::UpstreamMalformed,
            AskError::InternalError(_) => StatusClass::InternalError,
        }
    }

    /// Human-readable detail for the error body
    pub fn detail(&self) -> String {
        self.to_string()
    }
}

impl From<GeneratorError> for AskError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::RateLimited(msg) => AskError::UpstreamRateLimited(msg),
            GeneratorError::TransientUnavailable(msg) => {
                AskError::UpstreamTransientUnavailable(msg)
            }
            GeneratorError::Connectivity(msg) => AskError::UpstreamConnectivityFailure(msg),
            GeneratorError::Other(msg) => AskError::InternalError(msg),
        }
    }
}

impl From<ParseError> for AskError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Malformed { raw, .. } => AskError::UpstreamMalformedOutput { raw },
            ParseError::InvalidRecord(e) => AskError::InternalError(e.to_string()),
        }
    }
}

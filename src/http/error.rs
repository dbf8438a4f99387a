//! Errors raised when a header collection, header entry or head line is
//! mutated with structurally invalid input.
//!
//! Parsing in lenient mode never produces these. Strict parsing reports
//! through [`ParseError`](crate::http::parser::ParseError) instead.

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    InvalidFormat(#[from] FormatError),

    /// Loosely typed input (configuration values) has the wrong shape.
    #[error("invalid type for {context}: expected {expected}, found {found}")]
    InvalidType {
        context: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// The structural check that failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error(
        "header name must start with a letter, and consist of only letters, numbers, and dashes; {0:?} provided"
    )]
    HeaderName(String),

    #[error("invalid protocol version: {0:?}")]
    ProtocolVersion(String),

    #[error("invalid status code provided: {0:?}")]
    StatusCode(String),

    #[error("request method must be a valid HTTP token; {0:?} provided")]
    Method(String),
}

impl Error {
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Error::InvalidFormat(_))
    }

    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Error::InvalidType { .. })
    }
}

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub mod error;
pub mod header;
pub mod headers;
pub mod parameters;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod transport;
pub mod validator;

use error::{Error, Result};
use validator::Validator;

/// HTTP protocol version as carried on a request or status line, `\d+\.\d+`.
///
/// Kept as the literal text so that rendering reproduces exactly what was
/// parsed or set (`"12.3"` stays `"12.3"`).
#[derive(PartialEq, Eq, Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct ProtocolVersion(String);

impl ProtocolVersion {
    pub fn new(version: &str) -> Result<Self> {
        Validator::validate_protocol_version(version)?;
        Ok(Self(version.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self("1.1".to_string())
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProtocolVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Validator::validate_protocol_version(&value)?;
        Ok(Self(value))
    }
}

/// Request method, always upper case.
///
/// Any valid HTTP token is accepted; the well known methods get their own
/// variant so handlers can match on them.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Extension(String),
}

impl HttpMethod {
    /// Validates `token` against the HTTP token grammar and normalizes it to
    /// upper case.
    pub fn from_token(token: &str) -> Result<Self> {
        Validator::validate_method(token)?;

        let method = token.to_ascii_uppercase();
        Ok(match method.as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "CONNECT" => HttpMethod::Connect,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            "PATCH" => HttpMethod::Patch,
            _ => HttpMethod::Extension(method),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Extension(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_version_defaults_to_1_1() {
        assert_eq!(ProtocolVersion::default().as_str(), "1.1");
    }

    #[test]
    fn protocol_version_keeps_literal_text() {
        assert_eq!(ProtocolVersion::new("12.3").unwrap().to_string(), "12.3");
        assert!(ProtocolVersion::new("1").unwrap_err().is_invalid_format());
        assert!("true".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn method_is_upper_cased() {
        assert_eq!(HttpMethod::from_token("delete").unwrap(), HttpMethod::Delete);
        assert_eq!(
            HttpMethod::from_token("purge").unwrap(),
            HttpMethod::Extension("PURGE".to_string())
        );
        assert_eq!(HttpMethod::from_token("m-search").unwrap().as_str(), "M-SEARCH");
    }

    #[test]
    fn method_rejects_non_tokens() {
        assert!(HttpMethod::from_token("Foo bar").unwrap_err().is_invalid_format());
        assert!(HttpMethod::from_token("").is_err());
    }
}

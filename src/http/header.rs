//! A single header line: name, value and the replace flag.

use std::fmt;
use std::io;

use crate::http::error::{Error, Result};
use crate::http::transport::Transport;
use crate::http::validator::Validator;

pub const DEFAULT_VALUE_SEPARATOR: &str = "; ";

/// Input accepted for a header value: a scalar, or a list joined with a
/// separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// Joins a list with `separator`. CR and LF are stripped, and empty or
    /// whitespace only results collapse to the empty string.
    pub fn join(self, separator: &str) -> String {
        let mut value = match self {
            HeaderValue::Scalar(value) => value,
            HeaderValue::List(values) => values.join(separator),
        };
        value.retain(|c| c != '\r' && c != '\n');
        if value.trim().is_empty() {
            return String::new();
        }
        value
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Scalar(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Scalar(value)
    }
}

impl From<&String> for HeaderValue {
    fn from(value: &String) -> Self {
        HeaderValue::Scalar(value.clone())
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::List(values)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        HeaderValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for HeaderValue {
    fn from(values: &[&str]) -> Self {
        HeaderValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValue {
    fn from(values: [&str; N]) -> Self {
        HeaderValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    name: String,
    value: String,
    replace: bool,
}

impl HttpHeader {
    /// Builds a header, rejecting names outside `[A-Za-z][A-Za-z0-9-]*`.
    pub fn new(name: &str, value: impl Into<HeaderValue>, replace: bool) -> Result<Self> {
        Validator::validate_header_name(name)?;
        Ok(Self {
            name: name.to_string(),
            value: value.into().join(DEFAULT_VALUE_SEPARATOR),
            replace,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether sending this header overwrites a previously sent header of
    /// the same name.
    pub fn replace(&self) -> bool {
        self.replace
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Renames the header. On error the header is left untouched.
    pub fn set_name(&mut self, name: &str) -> Result<&mut Self> {
        Validator::validate_header_name(name)?;
        self.name = name.to_string();
        Ok(self)
    }

    pub fn set_value(&mut self, value: impl Into<HeaderValue>) -> &mut Self {
        self.set_value_with_separator(value, DEFAULT_VALUE_SEPARATOR)
    }

    pub fn set_value_with_separator(
        &mut self,
        value: impl Into<HeaderValue>,
        separator: &str,
    ) -> &mut Self {
        self.value = value.into().join(separator);
        self
    }

    pub fn set_replace(&mut self, replace: bool) -> &mut Self {
        self.replace = replace;
        self
    }

    /// Hands `Name: value` (without CRLF) and the replace flag to `transport`.
    pub fn send(&self, transport: &mut dyn Transport) -> io::Result<()> {
        transport.emit_header(&format!("{}: {}", self.name, self.value), self.replace)
    }

    pub(crate) fn append_folded(&mut self, continuation: &str) {
        if self.value.is_empty() {
            self.value = continuation.to_string();
        } else {
            self.value.push(' ');
            self.value.push_str(continuation);
        }
    }
}

/// `Name: value\r\n`
impl fmt::Display for HttpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}\r\n", self.name, self.value)
    }
}

/// Structured description of a header, validated when turned into an
/// [`HttpHeader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    pub name: String,
    pub value: HeaderValue,
    pub replace: bool,
}

impl HeaderSpec {
    pub fn new(name: &str, value: impl Into<HeaderValue>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            replace: false,
        }
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn into_header(self) -> Result<HttpHeader> {
        HttpHeader::new(&self.name, self.value, self.replace)
    }
}

impl From<HttpHeader> for HeaderSpec {
    fn from(header: HttpHeader) -> Self {
        Self {
            name: header.name,
            value: HeaderValue::Scalar(header.value),
            replace: header.replace,
        }
    }
}

impl<V: Into<HeaderValue>> From<(&str, V)> for HeaderSpec {
    fn from((name, value): (&str, V)) -> Self {
        HeaderSpec::new(name, value)
    }
}

impl<V: Into<HeaderValue>> From<(String, V)> for HeaderSpec {
    fn from((name, value): (String, V)) -> Self {
        HeaderSpec::new(&name, value)
    }
}

impl<V: Into<HeaderValue>> From<(&str, V, bool)> for HeaderSpec {
    fn from((name, value, replace): (&str, V, bool)) -> Self {
        HeaderSpec::new(name, value).replace(replace)
    }
}

/// Reads a header from configuration: a string, an array of strings, or a
/// table `{ value = ..., replace = ... }`.
impl TryFrom<(&str, &toml::Value)> for HeaderSpec {
    type Error = Error;

    fn try_from((name, value): (&str, &toml::Value)) -> Result<Self> {
        match value {
            toml::Value::Table(table) => {
                let value = table
                    .get("value")
                    .ok_or_else(|| invalid_type(name, "header value", "table without value"))?;
                let replace = match table.get("replace") {
                    None => false,
                    Some(toml::Value::Boolean(replace)) => *replace,
                    Some(other) => return Err(invalid_type(name, "boolean", other.type_str())),
                };
                Ok(HeaderSpec::new(name, toml_value(name, value)?).replace(replace))
            }
            other => Ok(HeaderSpec::new(name, toml_value(name, other)?)),
        }
    }
}

fn toml_value(name: &str, value: &toml::Value) -> Result<HeaderValue> {
    match value {
        toml::Value::String(value) => Ok(HeaderValue::from(value)),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::String(item) => Ok(item.clone()),
                other => Err(invalid_type(name, "string", other.type_str())),
            })
            .collect::<Result<Vec<_>>>()
            .map(HeaderValue::List),
        other => Err(invalid_type(name, "string or array of strings", other.type_str())),
    }
}

fn invalid_type(name: &str, expected: &'static str, found: &'static str) -> Error {
    Error::InvalidType {
        context: format!("header {name:?}"),
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::WireTransport;

    fn header() -> HttpHeader {
        HttpHeader::new("X-Foo-Bar", "baz", false).unwrap()
    }

    #[test]
    fn fields_reflect_constructor_arguments() {
        let header = header();
        assert_eq!(header.name(), "X-Foo-Bar");
        assert_eq!(header.value(), "baz");
        assert!(!header.replace());

        let header = HttpHeader::new("X-Foo-Bar", "baz", true).unwrap();
        assert!(header.replace());
    }

    #[test]
    fn fields_are_mutable() {
        let mut header = header();
        header.set_name("X-Bar").unwrap().set_value("bat").set_replace(true);
        assert_eq!(header.name(), "X-Bar");
        assert_eq!(header.value(), "bat");
        assert!(header.replace());
    }

    #[test]
    fn name_may_not_be_empty_or_malformed() {
        for name in ["", "0", " ", "1", "X_Foo", "foo bar"] {
            let err = HttpHeader::new(name, "baz", false).unwrap_err();
            assert!(err.is_invalid_format(), "{name:?}");
        }

        let mut header = header();
        assert!(header.set_name("1").is_err());
        assert_eq!(header.name(), "X-Foo-Bar");
    }

    #[test]
    fn list_value_joins_with_semicolon_and_space_by_default() {
        let mut header = header();
        header.set_value(["foo", "enctype=\"utf-8\"", "lang=\"en\""]);
        assert_eq!(header.value(), "foo; enctype=\"utf-8\"; lang=\"en\"");
    }

    #[test]
    fn list_value_joins_with_given_separator() {
        let mut header = header();
        header.set_value_with_separator(["foo", "enctype=\"utf-8\"", "lang=\"en\""], "/");
        assert_eq!(header.value(), "foo/enctype=\"utf-8\"/lang=\"en\"");
    }

    #[test]
    fn empty_values_collapse() {
        let empty: Vec<&str> = Vec::new();
        let mut header = header();
        header.set_value(empty);
        assert_eq!(header.value(), "");

        for value in ["", " ", "\t\r\n "] {
            header.set_value("baz").set_value(value);
            assert_eq!(header.value(), "", "{value:?}");
        }

        header.set_value(" baz ");
        assert_eq!(header.value(), " baz ");
    }

    #[test]
    fn line_breaks_are_stripped_from_values() {
        let header = HttpHeader::new("X-Foo", "a\r\nX-Evil: 1", false).unwrap();
        assert_eq!(header.value(), "aX-Evil: 1");
        assert_eq!(header.to_string(), "X-Foo: aX-Evil: 1\r\n");

        let mut header = header;
        header.set_value(["one\n", "\rtwo"]);
        assert_eq!(header.value(), "one; two");
    }

    #[test]
    fn sends_what_it_renders() {
        for value in ["  baz ", "", "bar"] {
            let header = HttpHeader::new("X-Pad", value, false).unwrap();
            let mut wire = WireTransport::new(Vec::new());
            header.send(&mut wire).unwrap();
            assert_eq!(wire.into_inner(), header.to_string().into_bytes(), "{value:?}");
        }
    }

    #[test]
    fn renders_itself() {
        assert_eq!(header().to_string(), "X-Foo-Bar: baz\r\n");
    }

    #[test]
    fn spec_from_toml() {
        let table: toml::Table = toml::from_str(
            r#"
            a = "one"
            b = ["x", "y"]
            c = { value = "z", replace = true }
            d = 4
            e = ["x", 1]
            f = { value = "z", replace = "yes" }
            "#,
        )
        .unwrap();
        let spec = |name: &str| HeaderSpec::try_from((name, table.get(name).unwrap()));

        assert_eq!(spec("a").unwrap().into_header().unwrap().value(), "one");
        assert_eq!(spec("b").unwrap().into_header().unwrap().value(), "x; y");
        let c = spec("c").unwrap().into_header().unwrap();
        assert_eq!(c.value(), "z");
        assert!(c.replace());

        assert!(spec("d").unwrap_err().is_invalid_type());
        assert!(spec("e").unwrap_err().is_invalid_type());
        assert!(spec("f").unwrap_err().is_invalid_type());
    }
}

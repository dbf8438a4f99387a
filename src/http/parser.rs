//! Line grammar of an HTTP/1 head.
//!
//! ```text
//! request-line = TOKEN SP request-target SP "HTTP/" 1*DIGIT "." 1*DIGIT
//! status-line  = "HTTP/" 1*DIGIT "." 1*DIGIT SP 3DIGIT SP reason-phrase
//! header-line  = NAME ":" OWS VALUE OWS
//! ```
//!
//! Lines are separated by CRLF; a bare LF is tolerated. A head ends at the
//! first empty line, anything after it is the body.
//!
//! The functions here only recognise lines. What happens to a line that
//! does not match is decided by [`ParseMode`].

use log::{debug, trace};
use serde::Deserialize;

use crate::http::header::HttpHeader;
use crate::http::status::StatusCode;
use crate::http::validator::Validator;

/// How to react to malformed input while parsing a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Skip malformed header lines; a malformed start line turns the whole
    /// parse into a no-op. Never fails.
    #[default]
    Lenient,
    /// Stop at the first malformed line and report it.
    Strict,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line: {0:?}")]
    RequestLine(String),

    #[error("malformed status line: {0:?}")]
    StatusLine(String),

    #[error("malformed header line: {0:?}")]
    HeaderLine(String),

    #[error("continuation line without a preceding header: {0:?}")]
    OrphanContinuation(String),
}

impl ParseError {
    // Keeps parser outcomes separate from status codes; servers map them here.
    pub fn into_status(self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub version: &'a str,
    pub code: StatusCode,
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    Field { name: &'a str, value: &'a str },
    /// Obsolete line folding: the line started with SP or HTAB.
    Continuation(&'a str),
}

/// Splits a whole message at the first empty line.
///
/// Returns the head without its terminating empty line, and the body if an
/// empty line was found.
pub fn split_message(text: &str) -> (&str, Option<&str>) {
    let crlf = text.find("\r\n\r\n").map(|at| (at, 4));
    let lf = text.find("\n\n").map(|at| (at, 2));

    let end = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match end {
        // keep the CRLF of the last header line in the head
        Some((at, len)) => (&text[..at + len / 2], Some(&text[at + len..])),
        None => (text, None),
    }
}

/// Splits off the first line, returning it without its line ending.
pub fn split_first_line(text: &str) -> (&str, Option<&str>) {
    match text.split_once('\n') {
        Some((line, rest)) => (line.strip_suffix('\r').unwrap_or(line), Some(rest)),
        None => (text, None),
    }
}

pub fn parse_request_line(line: &str) -> Option<RequestLine<'_>> {
    let mut parts = line.split(' ');
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?.strip_prefix("HTTP/")?;

    if parts.next().is_some()
        || !Validator::is_token(method)
        || target.is_empty()
        || !Validator::is_protocol_version(version)
    {
        return None;
    }

    Some(RequestLine {
        method,
        target,
        version,
    })
}

pub fn parse_status_line(line: &str) -> Option<StatusLine<'_>> {
    let (version, rest) = line.strip_prefix("HTTP/")?.split_once(' ')?;
    if !Validator::is_protocol_version(version) {
        return None;
    }

    let (code, text) = match rest.split_once(' ') {
        Some((code, text)) => (code, text),
        None => (rest, ""),
    };
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code = code.parse::<StatusCode>().ok()?;

    Some(StatusLine {
        version,
        code,
        text,
    })
}

pub fn parse_header_line(line: &str) -> Option<HeaderLine<'_>> {
    if line.contains('\r') {
        return None;
    }

    if line.starts_with([' ', '\t']) {
        return Some(HeaderLine::Continuation(line.trim()));
    }

    let (name, value) = line.split_once(':')?;
    if !Validator::is_header_name(name) {
        return None;
    }

    Some(HeaderLine::Field {
        name,
        value: value.trim(),
    })
}

/// Parses header lines in document order until the first empty line.
///
/// Continuation lines are folded into the preceding header's value.
pub fn parse_header_block(text: &str, mode: ParseMode) -> Result<Vec<HttpHeader>, ParseError> {
    let mut headers: Vec<HttpHeader> = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }

        match parse_header_line(line) {
            Some(HeaderLine::Field { name, value }) => {
                // name already checked against the header name grammar
                match HttpHeader::new(name, value, false) {
                    Ok(header) => headers.push(header),
                    Err(_) => reject(mode, ParseError::HeaderLine(line.to_string()))?,
                }
            }
            Some(HeaderLine::Continuation(value)) => match headers.last_mut() {
                Some(previous) => {
                    trace!("folding continuation line into {}", previous.name());
                    previous.append_folded(value);
                }
                None => reject(mode, ParseError::OrphanContinuation(line.to_string()))?,
            },
            None => reject(mode, ParseError::HeaderLine(line.to_string()))?,
        }
    }

    Ok(headers)
}

fn reject(mode: ParseMode, err: ParseError) -> Result<(), ParseError> {
    match mode {
        ParseMode::Strict => Err(err),
        ParseMode::Lenient => {
            debug!("skipping line: {err}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_line() {
        assert_eq!(
            parse_request_line("PUT /baz HTTP/1.0"),
            Some(RequestLine {
                method: "PUT",
                target: "/baz",
                version: "1.0"
            })
        );

        for bad in [
            "PUT /baz",
            "PUT /baz 1.0",
            "PUT /baz HTTP/1",
            "PUT  /baz HTTP/1.0",
            "PUT /baz HTTP/1.0 ",
            "P(T /baz HTTP/1.0",
            "",
        ] {
            assert_eq!(parse_request_line(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn status_line() {
        let line = parse_status_line("HTTP/1.1 302 Temporarily Moved").unwrap();
        assert_eq!(line.version, "1.1");
        assert_eq!(line.code, StatusCode::FOUND);
        assert_eq!(line.text, "Temporarily Moved");

        assert_eq!(parse_status_line("HTTP/1.1 404 ").unwrap().text, "");
        assert_eq!(parse_status_line("HTTP/1.1 404").unwrap().text, "");

        for bad in ["HTTP/1.1 999 Nope", "HTTP/1 200 OK", "HTTP/1.1 0200 OK", "200 OK"] {
            assert_eq!(parse_status_line(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn header_line() {
        assert_eq!(
            parse_header_line("Host:   foo.bar  "),
            Some(HeaderLine::Field {
                name: "Host",
                value: "foo.bar"
            })
        );
        assert_eq!(
            parse_header_line("X-Empty:"),
            Some(HeaderLine::Field {
                name: "X-Empty",
                value: ""
            })
        );
        assert_eq!(
            parse_header_line("\t baz; bat;"),
            Some(HeaderLine::Continuation("baz; bat;"))
        );

        for bad in ["This is not a header", "Host : foo", ": foo", "X_Foo: bar", "1: a"] {
            assert_eq!(parse_header_line(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn lenient_block_skips_bad_lines() {
        let text = "Host: foo.bar\r\nThis is not a header\r\nX-Foo: bar;\r\n baz; bat;\r\n";
        let headers = parse_header_block(text, ParseMode::Lenient).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].value(), "foo.bar");
        assert_eq!(headers[1].value(), "bar; baz; bat;");
    }

    #[test]
    fn strict_block_reports_first_bad_line() {
        let text = "Host: foo.bar\r\nThis is not a header\r\n";
        assert_eq!(
            parse_header_block(text, ParseMode::Strict),
            Err(ParseError::HeaderLine("This is not a header".to_string()))
        );
        assert!(matches!(
            parse_header_block(" orphan\r\n", ParseMode::Strict),
            Err(ParseError::OrphanContinuation(_))
        ));
    }

    #[test]
    fn block_stops_at_empty_line() {
        let headers =
            parse_header_block("A: 1\nB: 2\n\nC: 3\n", ParseMode::Strict).unwrap();
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn message_split() {
        let (head, body) = split_message("GET / HTTP/1.1\r\nHost: a\r\n\r\nbody\r\n\r\nmore");
        assert_eq!(head, "GET / HTTP/1.1\r\nHost: a\r\n");
        assert_eq!(body, Some("body\r\n\r\nmore"));

        let (head, body) = split_message("GET / HTTP/1.1\nHost: a\n\nbody");
        assert_eq!(head, "GET / HTTP/1.1\nHost: a\n");
        assert_eq!(body, Some("body"));

        assert_eq!(split_message("GET / HTTP/1.1\r\n"), ("GET / HTTP/1.1\r\n", None));
    }

    #[test]
    fn first_line_split() {
        assert_eq!(split_first_line("a\r\nb\r\n"), ("a", Some("b\r\n")));
        assert_eq!(split_first_line("a"), ("a", None));
    }
}

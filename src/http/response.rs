use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};

use log::debug;

use crate::http::error::Result;
use crate::http::header::HeaderSpec;
use crate::http::headers::HttpHeaders;
use crate::http::parser::{self, ParseError, ParseMode};
use crate::http::status::StatusCode;
use crate::http::transport::Transport;

const EMPTY_CODES: [u16; 3] = [201, 204, 304];

/// Status line (version, code, text) on top of an [`HttpHeaders`].
///
/// Dereferences to the underlying collection for header access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeaders {
    status: StatusCode,
    status_text: String,
    headers: HttpHeaders,
    sent: bool,
}

impl Default for ResponseHeaders {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            status_text: "OK".to_string(),
            headers: HttpHeaders::new(),
            sent: false,
        }
    }
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Sets the status code and text.
    ///
    /// Fails unless `code` is whitelisted. A missing text becomes the empty
    /// string; CR and LF are stripped from a given one.
    pub fn set_status_code(&mut self, code: u16, text: Option<&str>) -> Result<&mut Self> {
        let status = StatusCode::new(code)?;
        Ok(self.set_status(status, text))
    }

    pub fn set_status(&mut self, status: StatusCode, text: Option<&str>) -> &mut Self {
        self.status = status;
        self.status_text = text
            .map(|text| text.replace(['\r', '\n'], ""))
            .unwrap_or_default();
        self
    }

    /// Adds a replacing `Location` header, dropping any previous one.
    ///
    /// The status code is only changed when `code` is given and non-zero; it
    /// is validated before anything is touched.
    pub fn set_redirect(&mut self, url: &str, code: Option<u16>) -> Result<&mut Self> {
        let code = code.filter(|&code| code != 0);
        if let Some(code) = code {
            StatusCode::new(code)?;
        }

        self.headers.remove("Location");
        self.headers.add_raw("Location", url, true)?;

        if let Some(code) = code {
            self.set_status_code(code, None)?;
        }
        Ok(self)
    }

    /// 3xx, or any status with a `Location` header.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.code()) || self.headers.has("Location")
    }

    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.code())
    }

    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.code())
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code())
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.code())
    }

    pub fn is_ok(&self) -> bool {
        self.code() == 200
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == 404
    }

    pub fn is_forbidden(&self) -> bool {
        self.code() == 403
    }

    pub fn is_empty_response(&self) -> bool {
        EMPTY_CODES.contains(&self.code())
    }

    pub fn has_vary(&self) -> bool {
        self.headers.has("Vary")
    }

    /// Always false: codes outside the whitelist are rejected on the way in.
    pub fn is_invalid(&self) -> bool {
        false
    }

    /// `HTTP/version code text\r\n`
    pub fn render_status_line(&self) -> String {
        format!(
            "HTTP/{} {} {}\r\n",
            self.headers.protocol_version(),
            self.status,
            self.status_text
        )
    }

    /// Replaces the content with the status line and headers in `text`.
    ///
    /// Headers are always discarded first. If the first line is not a valid
    /// status line nothing else happens.
    pub fn parse(&mut self, text: &str) -> &mut Self {
        // lenient mode never fails
        let _ = self.parse_with(text, ParseMode::Lenient);
        self
    }

    pub fn parse_strict(&mut self, text: &str) -> std::result::Result<&mut Self, ParseError> {
        self.parse_with(text, ParseMode::Strict)?;
        Ok(self)
    }

    pub fn parse_with(&mut self, text: &str, mode: ParseMode) -> std::result::Result<(), ParseError> {
        self.headers.clear();

        let (line, rest) = parser::split_first_line(text);
        let status_line = match parser::parse_status_line(line) {
            Some(status_line) => status_line,
            None if mode == ParseMode::Strict => {
                return Err(ParseError::StatusLine(line.to_string()));
            }
            None => {
                debug!("ignoring head with malformed status line {line:?}");
                return Ok(());
            }
        };

        self.headers
            .set_protocol_version(status_line.version)
            .map_err(|_| ParseError::StatusLine(line.to_string()))?;
        self.status = status_line.code;
        self.status_text = status_line.text.to_string();

        if let Some(rest) = rest {
            self.headers.parse_with(rest, mode)?;
        }
        Ok(())
    }

    /// Emits the status line, then every header, and marks the head as sent.
    pub fn send(&mut self, transport: &mut dyn Transport) -> io::Result<()> {
        transport.emit_header(self.render_status_line().trim_end_matches("\r\n"), true)?;
        self.headers.send(transport)?;
        self.sent = true;
        Ok(())
    }

    pub fn sent(&self) -> bool {
        self.sent
    }

    fn code(&self) -> u16 {
        self.status.as_u16()
    }
}

impl Deref for ResponseHeaders {
    type Target = HttpHeaders;

    fn deref(&self) -> &HttpHeaders {
        &self.headers
    }
}

impl DerefMut for ResponseHeaders {
    fn deref_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }
}

impl fmt::Display for ResponseHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.render_status_line(), self.headers)
    }
}

/// A response: status line and headers, plus content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    headers: ResponseHeaders,
    content: String,
}

impl HttpResponse {
    /// Builds a response around `headers` (or a fresh collection), setting
    /// `status` with its canonical reason phrase.
    pub fn new(
        content: impl Into<String>,
        status: u16,
        headers: Option<ResponseHeaders>,
    ) -> Result<Self> {
        let status = StatusCode::new(status)?;
        let mut response = Self::with_status(content, status);
        if let Some(mut headers) = headers {
            headers.set_status(status, Some(status.canonical_reason()));
            response.headers = headers;
        }
        Ok(response)
    }

    /// Like [`new`](Self::new), but takes the headers as `(name, value)`
    /// pairs or [`HeaderSpec`]s. Nothing is built if a header is invalid.
    pub fn with_headers<I, S>(content: impl Into<String>, status: u16, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<HeaderSpec>,
    {
        let mut response = Self::with_status(content, StatusCode::new(status)?);
        response.headers.add_headers(headers)?;
        Ok(response)
    }

    pub fn with_status(content: impl Into<String>, status: StatusCode) -> Self {
        let mut headers = ResponseHeaders::new();
        headers.set_status(status, Some(status.canonical_reason()));
        Self {
            headers,
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = content.into();
        self
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut ResponseHeaders {
        &mut self.headers
    }

    pub fn set_headers(&mut self, headers: ResponseHeaders) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Populates the response from a whole message: head, empty line, content.
    pub fn parse(&mut self, text: &str) -> &mut Self {
        // lenient mode never fails
        let _ = self.parse_with(text, ParseMode::Lenient);
        self
    }

    pub fn parse_strict(&mut self, text: &str) -> std::result::Result<&mut Self, ParseError> {
        self.parse_with(text, ParseMode::Strict)?;
        Ok(self)
    }

    pub fn parse_with(&mut self, text: &str, mode: ParseMode) -> std::result::Result<(), ParseError> {
        self.content.clear();

        let (head, body) = parser::split_message(text);
        self.headers.parse_with(head, mode)?;
        self.content = body.unwrap_or_default().to_string();
        Ok(())
    }

    pub fn send_headers(&mut self, transport: &mut dyn Transport) -> io::Result<()> {
        self.headers.send(transport)
    }

    pub fn send_content(&self, transport: &mut dyn Transport) -> io::Result<()> {
        transport.emit_body(self.content.as_bytes())
    }

    /// Status line, headers, then content.
    pub fn send(&mut self, transport: &mut dyn Transport) -> io::Result<()> {
        self.send_headers(transport)?;
        self.send_content(transport)
    }
}

/// `status-line headers CRLF content`
impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}", self.headers, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::header::HttpHeader;

    fn headers_with(code: u16) -> ResponseHeaders {
        let mut headers = ResponseHeaders::new();
        headers.set_status_code(code, None).unwrap();
        headers
    }

    #[test]
    fn defaults() {
        let headers = ResponseHeaders::new();
        assert_eq!(headers.protocol_version().as_str(), "1.1");
        assert_eq!(headers.status_code(), StatusCode::OK);
        assert_eq!(headers.status_text(), "OK");
        assert!(headers.is_empty());
        assert!(!headers.sent());
    }

    #[test]
    fn invalid_status_codes_are_rejected() {
        let mut headers = ResponseHeaders::new();
        for code in [1, 999, 1001] {
            assert!(headers.set_status_code(code, None).unwrap_err().is_invalid_format());
        }
        assert_eq!(headers.status_code(), StatusCode::OK);
        assert_eq!(headers.status_text(), "OK");
    }

    #[test]
    fn status_text() {
        let mut headers = ResponseHeaders::new();
        headers.set_status_code(201, None).unwrap();
        assert_eq!(headers.status_code().as_u16(), 201);
        assert_eq!(headers.status_text(), "");

        headers.set_status_code(200, Some("this is a message")).unwrap();
        assert_eq!(headers.status_text(), "this is a message");

        headers.set_status_code(200, Some("This\ris\r\na\nmessage")).unwrap();
        assert_eq!(headers.status_text(), "Thisisamessage");
    }

    #[test]
    fn ok_predicates() {
        let headers = headers_with(200);
        assert!(headers.is_ok());
        assert!(headers.is_successful());
        assert!(!headers.is_client_error());
        assert!(!headers.is_invalid());
    }

    #[test]
    fn not_found_and_forbidden() {
        assert!(headers_with(404).is_not_found());
        assert!(!ResponseHeaders::new().is_not_found());
        assert!(headers_with(403).is_forbidden());
        for code in [100, 200, 300, 400, 500] {
            assert!(!headers_with(code).is_forbidden(), "{code}");
        }
    }

    #[test]
    fn client_and_server_errors() {
        assert!(!ResponseHeaders::new().is_client_error());
        assert!(headers_with(401).is_client_error());
        for code in [100, 200, 301, 500] {
            assert!(!headers_with(code).is_client_error(), "{code}");
        }
        assert!(headers_with(503).is_server_error());
        assert!(!headers_with(417).is_server_error());
    }

    #[test]
    fn informational() {
        assert!(!ResponseHeaders::new().is_informational());
        for code in [100, 101] {
            assert!(headers_with(code).is_informational());
        }
        for code in [200, 301, 401, 500] {
            assert!(!headers_with(code).is_informational());
        }
    }

    #[test]
    fn empty_codes() {
        assert!(!ResponseHeaders::new().is_empty_response());
        for code in [201, 204, 304] {
            assert!(headers_with(code).is_empty_response(), "{code}");
        }
        for code in [100, 200, 300, 400, 500] {
            assert!(!headers_with(code).is_empty_response(), "{code}");
        }
    }

    #[test]
    fn redirects() {
        assert!(!ResponseHeaders::new().is_redirect());
        assert!(headers_with(301).is_redirect());

        let mut headers = headers_with(201);
        headers.add_header(HttpHeader::new("Location", "/foo", false).unwrap());
        assert!(headers.is_redirect());
    }

    #[test]
    fn set_redirect_acts_as_header_factory() {
        let mut headers = ResponseHeaders::new();
        headers.set_redirect("/foo", Some(302)).unwrap();
        assert_eq!(headers.status_code(), StatusCode::FOUND);

        let location = headers.get("Location").unwrap();
        assert_eq!(location.len(), 1);
        assert!(location.first().unwrap().replace());

        headers.set_redirect("/bar", Some(301)).unwrap();
        let values: Vec<_> = headers.get("location").unwrap().values().collect();
        assert_eq!(values, ["/bar"]);
    }

    #[test]
    fn set_redirect_without_code_keeps_status() {
        for code in [None, Some(0)] {
            let mut headers = ResponseHeaders::new();
            headers.set_redirect("/foo", code).unwrap();
            assert_eq!(headers.status_code(), StatusCode::OK);
            assert_eq!(headers.status_text(), "OK");
            assert!(headers.has("Location"));
        }

        let mut headers = ResponseHeaders::new();
        headers.set_redirect("/foo", Some(201)).unwrap();
        assert_eq!(headers.status_code(), StatusCode::CREATED);
    }

    #[test]
    fn set_redirect_with_bad_code_changes_nothing() {
        let mut headers = ResponseHeaders::new();
        assert!(headers.set_redirect("/foo", Some(999)).is_err());
        assert!(!headers.has("Location"));
    }

    #[test]
    fn vary() {
        let mut headers = ResponseHeaders::new();
        assert!(!headers.has_vary());
        headers.add_raw("Vary", "text/plain", false).unwrap();
        assert!(headers.has_vary());
    }

    #[test]
    fn renders_status_line_first() {
        let mut headers = ResponseHeaders::new();
        headers.add_raw("X-Foo-Bar", "baz", false).unwrap();
        assert_eq!(headers.to_string(), "HTTP/1.1 200 OK\r\nX-Foo-Bar: baz\r\n");
    }

    #[test]
    fn parses_status_line() {
        let mut headers = ResponseHeaders::new();
        headers.add_raw("X-Old", "1", false).unwrap();
        headers.parse("HTTP/1.0 302 Temporarily Moved\r\nLocation: /foo\r\n");

        assert_eq!(headers.protocol_version().as_str(), "1.0");
        assert_eq!(headers.status_code(), StatusCode::FOUND);
        assert_eq!(headers.status_text(), "Temporarily Moved");
        assert!(headers.has("Location"));
        assert!(!headers.has("X-Old"));
    }

    #[test]
    fn malformed_status_line_is_a_no_op() {
        let mut headers = ResponseHeaders::new();
        headers.add_raw("X-Old", "1", false).unwrap();
        headers.parse("HTTP/1.1 999 Nope\r\nLocation: /foo\r\n");

        assert_eq!(headers.status_code(), StatusCode::OK);
        assert!(headers.is_empty());
        assert!(matches!(
            headers.parse_strict("HTP/1.1 200 OK\r\n"),
            Err(ParseError::StatusLine(_))
        ));
    }

    #[test]
    fn response_constructor() {
        let mut headers = ResponseHeaders::new();
        headers.add_raw("X-Foo", "bar", false).unwrap();
        let response = HttpResponse::new("foo", 401, Some(headers)).unwrap();

        assert_eq!(response.content(), "foo");
        assert_eq!(response.headers().status_code().as_u16(), 401);
        assert_eq!(response.headers().status_text(), "Unauthorized");
        assert!(response.headers().has("X-Foo"));

        assert!(HttpResponse::new("", 1001, None).unwrap_err().is_invalid_format());
    }

    #[test]
    fn response_from_header_pairs() {
        let response =
            HttpResponse::with_headers("moved", 301, [("Location", "/new"), ("X-Foo", "bar")])
                .unwrap();
        assert_eq!(response.headers().status_code(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.to_string(),
            "HTTP/1.1 301 Moved Permanently\r\nLocation: /new\r\nX-Foo: bar\r\n\r\nmoved"
        );

        let err = HttpResponse::with_headers("", 200, [("X_Bad", "a")]).unwrap_err();
        assert!(err.is_invalid_format());
        assert!(HttpResponse::with_headers("", 1001, [("X-Foo", "a")]).is_err());
    }

    #[test]
    fn response_defaults() {
        let response = HttpResponse::default();
        assert_eq!(response.content(), "");
        assert_eq!(response.headers().status_code(), StatusCode::OK);
        assert!(response.headers().is_empty());
    }
}

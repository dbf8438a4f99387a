use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};

use log::debug;

use crate::http::HttpMethod;
use crate::http::error::Result;
use crate::http::headers::HttpHeaders;
use crate::http::parameters::Parameters;
use crate::http::parser::{self, ParseError, ParseMode};
use crate::http::transport::Transport;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Request line (method, target, version) on top of an [`HttpHeaders`].
///
/// Dereferences to the underlying collection for header access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    method: HttpMethod,
    uri: String,
    headers: HttpHeaders,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// Fails unless `method` is an HTTP token. Stored upper case.
    pub fn set_method(&mut self, method: &str) -> Result<&mut Self> {
        self.method = HttpMethod::from_token(method)?;
        Ok(self)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The request target is stored as given.
    pub fn set_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.uri = uri.into();
        self
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// `METHOD target HTTP/version\r\n`
    pub fn render_request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}\r\n",
            self.method,
            self.uri,
            self.headers.protocol_version()
        )
    }

    /// Replaces the content with the request line and headers in `text`.
    ///
    /// Headers are always discarded first. If the first line is not a valid
    /// request line nothing else happens: method, target and version keep
    /// their values and the collection stays empty.
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
        let request_line = match parser::parse_request_line(line) {
            Some(request_line) => request_line,
            None if mode == ParseMode::Strict => {
                return Err(ParseError::RequestLine(line.to_string()));
            }
            None => {
                debug!("ignoring head with malformed request line {line:?}");
                return Ok(());
            }
        };

        self.apply_request_line(request_line)
            .map_err(|_| ParseError::RequestLine(line.to_string()))?;

        if let Some(rest) = rest {
            self.headers.parse_with(rest, mode)?;
        }
        Ok(())
    }

    /// Emits the request line, then every header.
    pub fn send(&self, transport: &mut dyn Transport) -> io::Result<()> {
        transport.emit_header(self.render_request_line().trim_end_matches("\r\n"), true)?;
        self.headers.send(transport)
    }

    fn apply_request_line(&mut self, line: parser::RequestLine<'_>) -> Result<()> {
        let method = HttpMethod::from_token(line.method)?;
        self.headers.set_protocol_version(line.version)?;
        self.method = method;
        self.uri = line.target.to_string();
        Ok(())
    }
}

impl Deref for RequestHeaders {
    type Target = HttpHeaders;

    fn deref(&self) -> &HttpHeaders {
        &self.headers
    }
}

impl DerefMut for RequestHeaders {
    fn deref_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }
}

impl fmt::Display for RequestHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.render_request_line(), self.headers)
    }
}

/// A request: head, optional raw body and the parameters derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    headers: RequestHeaders,
    body: Option<String>,
    query: Parameters,
    post: Parameters,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut RequestHeaders {
        &mut self.headers
    }

    pub fn set_headers(&mut self, headers: RequestHeaders) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &HttpMethod {
        self.headers.method()
    }

    pub fn set_method(&mut self, method: &str) -> Result<&mut Self> {
        self.headers.set_method(method)?;
        Ok(self)
    }

    pub fn request_uri(&self) -> &str {
        self.headers.uri()
    }

    /// Request target without its query string.
    pub fn path(&self) -> &str {
        let uri = self.headers.uri();
        uri.split_once('?').map_or(uri, |(path, _)| path)
    }

    pub fn query(&self) -> &Parameters {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Parameters {
        &mut self.query
    }

    /// Form fields of an `application/x-www-form-urlencoded` body.
    pub fn post(&self) -> &Parameters {
        &self.post
    }

    pub fn post_mut(&mut self) -> &mut Parameters {
        &mut self.post
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn set_raw_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        *self.method() == HttpMethod::Get
    }

    pub fn is_head(&self) -> bool {
        *self.method() == HttpMethod::Head
    }

    pub fn is_post(&self) -> bool {
        *self.method() == HttpMethod::Post
    }

    pub fn is_put(&self) -> bool {
        *self.method() == HttpMethod::Put
    }

    pub fn is_delete(&self) -> bool {
        *self.method() == HttpMethod::Delete
    }

    pub fn is_options(&self) -> bool {
        *self.method() == HttpMethod::Options
    }

    pub fn is_patch(&self) -> bool {
        *self.method() == HttpMethod::Patch
    }

    pub fn is_trace(&self) -> bool {
        *self.method() == HttpMethod::Trace
    }

    pub fn is_connect(&self) -> bool {
        *self.method() == HttpMethod::Connect
    }

    /// Populates the request from a whole message: head, empty line, body.
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
        self.body = None;
        self.query = Parameters::new();
        self.post = Parameters::new();

        let (head, body) = parser::split_message(text);
        self.headers.parse_with(head, mode)?;
        // an empty body renders the same as none at all
        self.body = body.filter(|body| !body.is_empty()).map(str::to_string);

        if let Some((_, query)) = self.headers.uri().split_once('?') {
            self.query = Parameters::from_query(query);
        }
        if self.is_form() {
            self.post = Parameters::from_query(self.body.as_deref().unwrap_or_default());
        }
        Ok(())
    }

    /// Emits the head, then the body (possibly empty).
    pub fn send(&self, transport: &mut dyn Transport) -> io::Result<()> {
        self.headers.send(transport)?;
        transport.emit_body(self.body.as_deref().unwrap_or_default().as_bytes())
    }

    fn is_form(&self) -> bool {
        self.headers.get("Content-Type").is_some_and(|group| {
            group.values().any(|value| {
                value
                    .split(';')
                    .next()
                    .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_URLENCODED))
            })
        })
    }
}

/// `request-line headers CRLF body`
impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\r\n{}",
            self.headers,
            self.body.as_deref().unwrap_or_default()
        )
    }
}

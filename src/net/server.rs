//! Echo server runtime.
//!
//! This module only deals with networking concerns:
//! - accepting TCP connections,
//! - reading the raw head and body from the stream,
//! - writing the serialized response back.
//!
//! Parsing the request and deciding on the response are delegated to the
//! [`http`](crate::http) and [`handler`](crate::handler) modules.
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection
//! 2. Read until the empty line ending the head, then `Content-Length`
//!    bytes of body
//! 3. Parse the text into an [`HttpRequest`] with the configured
//!    [`ParseMode`](crate::http::parser::ParseMode)
//! 4. Build an [`HttpResponse`] (delegated to [`handler::handle_request`])
//! 5. Add the default, `Server` and `Date` headers and send the response
//!    through a [`WireTransport`]
//!
//! One connection serves one request.

use std::time::SystemTime;

use async_std::io::timeout;
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;
use log::{debug, error, info};

use crate::config::config;
use crate::handler;
use crate::http::error::Result;
use crate::http::header::HttpHeader;
use crate::http::parser::ParseError;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::StatusCode;
use crate::http::transport::WireTransport;

pub struct Server {
    default_headers: Vec<HttpHeader>,
}

/// Reasons for not getting a request out of the stream.
#[derive(Debug)]
enum ReadError {
    Io(std::io::Error),
    ConnectionClosed,
    HeadTooLarge,
    BodyTooLarge,
    Parse(ParseError),
}

impl ReadError {
    fn into_status(self) -> Option<StatusCode> {
        match self {
            ReadError::Io(_) | ReadError::ConnectionClosed => None,
            ReadError::HeadTooLarge => Some(StatusCode::BAD_REQUEST),
            ReadError::BodyTooLarge => Some(StatusCode::PAYLOAD_TOO_LARGE),
            ReadError::Parse(err) => Some(err.into_status()),
        }
    }
}

impl Server {
    /// Validates the configured default headers.
    pub fn init() -> Result<Self> {
        Ok(Self {
            default_headers: config().default_headers()?,
        })
    }

    /// Binds to the configured address and port and serves forever, one
    /// task per client.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind((config().address, config().port)).await?;
        info!("listening on {}", listener.local_addr()?);

        let server = std::sync::Arc::new(self);
        let mut incoming = listener.incoming();
        while let Some(stream) = incoming.next().await {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    error!("failed to accept connection: {err}");
                    continue;
                }
            };
            debug!("accepted connection from {:?}", stream.peer_addr().ok());

            let server = server.clone();
            task::spawn(async move {
                if let Err(err) = server.handle_client(stream).await {
                    error!("I/O error while writing response: {err}");
                }
            });
        }

        Ok(())
    }

    /// Reads the head, then `Content-Length` bytes of body, and parses the
    /// whole message.
    async fn read_request(stream: &mut TcpStream) -> std::result::Result<HttpRequest, ReadError> {
        let cfg = config();
        let mut raw: Vec<u8> = Vec::new();
        let mut buffer = vec![0; cfg.buffer_size];

        let head_end = loop {
            if let Some(end) = find_head_end(&raw) {
                break end;
            }
            if raw.len() > cfg.max_header_size {
                return Err(ReadError::HeadTooLarge);
            }
            let n = Self::read_some(stream, &mut buffer).await?;
            raw.extend_from_slice(&buffer[..n]);
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
        let content_length = content_length(&head);
        if content_length > cfg.max_body_size {
            return Err(ReadError::BodyTooLarge);
        }

        while raw.len() < head_end + content_length {
            let n = Self::read_some(stream, &mut buffer).await?;
            raw.extend_from_slice(&buffer[..n]);
        }
        raw.truncate(head_end + content_length);

        let text = String::from_utf8_lossy(&raw);
        let mut req = HttpRequest::new();
        req.parse_with(&text, cfg.parse_mode)
            .map_err(ReadError::Parse)?;

        // a lenient parse of a bad request line leaves the target empty
        if req.request_uri().is_empty() {
            let line = text.lines().next().unwrap_or_default().to_string();
            return Err(ReadError::Parse(ParseError::RequestLine(line)));
        }

        Ok(req)
    }

    async fn read_some(
        stream: &mut TcpStream,
        buffer: &mut [u8],
    ) -> std::result::Result<usize, ReadError> {
        match timeout(config().read_timeout, stream.read(buffer)).await {
            Ok(0) => Err(ReadError::ConnectionClosed),
            Ok(n) => Ok(n),
            Err(err) => Err(ReadError::Io(err)),
        }
    }

    /// Serializes `response` through a [`WireTransport`] and writes it out.
    async fn write_response(
        stream: &mut TcpStream,
        response: &mut HttpResponse,
    ) -> std::io::Result<()> {
        let mut wire = WireTransport::new(Vec::new());
        response.send(&mut wire)?;
        stream.write_all(&wire.into_inner()).await?;
        stream.flush().await
    }

    fn finalize(&self, response: &mut HttpResponse) {
        handler::apply_defaults(response, &self.default_headers);

        let cfg = config();
        if let Err(err) = response
            .headers_mut()
            .set_protocol_version(cfg.protocol_version.as_str())
        {
            error!("{err}");
        }

        let date = httpdate::fmt_http_date(SystemTime::now());
        for (name, value) in [
            ("Server", cfg.server_name.as_str()),
            ("Date", date.as_str()),
            ("Connection", "close"),
        ] {
            handler::responses::set_header(response, name, value);
        }
    }

    /// Handles a single client connection.
    async fn handle_client(&self, mut stream: TcpStream) -> std::io::Result<()> {
        let mut response = match Self::read_request(&mut stream).await {
            Ok(req) => {
                debug!("{} {}", req.method(), req.request_uri());
                handler::handle_request(&req)
            }
            Err(ReadError::Io(err)) => {
                error!("I/O error while reading request: {err}");
                return Ok(());
            }
            Err(err) => match err.into_status() {
                Some(status) => {
                    debug!("rejecting request with {status}");
                    handler::handle_error(status)
                }
                None => return Ok(()),
            },
        };

        self.finalize(&mut response);
        Self::write_response(&mut stream, &mut response).await
    }
}

/// Offset just past the empty line ending the head.
fn find_head_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|at| at + 4)
}

fn content_length(head: &str) -> usize {
    let mut req = HttpRequest::new();
    req.parse(head);
    req.headers()
        .get("Content-Length")
        .and_then(|group| group.last())
        .and_then(|header| header.value().parse::<usize>().ok())
        .unwrap_or(0)
}

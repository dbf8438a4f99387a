//! The capability a head uses to transmit itself.
//!
//! Heads and messages only decide what is handed over and in which order:
//! the start line, then each header in sequence order, then the body.
//! Where the bytes end up is up to the [`Transport`] implementation.

use std::io::{self, Write};

pub trait Transport {
    /// Emits one header line, without trailing CRLF. The start line goes
    /// through here too, with `replace` set.
    fn emit_header(&mut self, line: &str, replace: bool) -> io::Result<()>;

    fn emit_body(&mut self, body: &[u8]) -> io::Result<()>;
}

/// Writes the head and body in HTTP/1 wire format to any [`Write`].
///
/// The blank line separating head from body is written before the first
/// body emission. Replace flags have no meaning on the wire.
pub struct WireTransport<W: Write> {
    writer: W,
    head_done: bool,
}

impl<W: Write> WireTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            head_done: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for WireTransport<W> {
    fn emit_header(&mut self, line: &str, _replace: bool) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\r\n")
    }

    fn emit_body(&mut self, body: &[u8]) -> io::Result<()> {
        if !self.head_done {
            self.writer.write_all(b"\r\n")?;
            self.head_done = true;
        }
        self.writer.write_all(body)
    }
}

/// Keeps emitted header lines and body in memory.
///
/// A header emitted with `replace` drops previously recorded lines of the
/// same name.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    headers: Vec<String>,
    body: Vec<u8>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Transport for RecordingTransport {
    fn emit_header(&mut self, line: &str, replace: bool) -> io::Result<()> {
        if replace {
            if let Some((name, _)) = line.split_once(':') {
                self.headers.retain(|recorded| {
                    !matches!(
                        recorded.split_once(':'),
                        Some((recorded_name, _)) if recorded_name.eq_ignore_ascii_case(name)
                    )
                });
            }
        }
        self.headers.push(line.to_string());
        Ok(())
    }

    fn emit_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}

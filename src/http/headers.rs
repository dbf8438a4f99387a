//! HTTP header collection shared by [`RequestHeaders`](crate::http::request::RequestHeaders)
//! and [`ResponseHeaders`](crate::http::response::ResponseHeaders).
//!
//! Headers are kept in a single ordered sequence, which is the order they
//! are rendered and sent in. Next to it an index maps every lower-cased name
//! to the positions of the headers carrying that name, in sequence order.
//! The index never holds headers itself and can always be rebuilt by
//! replaying the sequence.
//!
//! A name may occur several times; each occurrence is its own header. Values
//! are never folded together with commas.
//!
//! Start lines (request line, status line) are not part of this type. The
//! request and response flavours wrap it and add their own.

use std::fmt;
use std::io;

use indexmap::IndexMap;
use log::debug;

use crate::http::ProtocolVersion;
use crate::http::error::Result;
use crate::http::header::{HeaderSpec, HeaderValue, HttpHeader};
use crate::http::parser::{self, ParseError, ParseMode};
use crate::http::transport::Transport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    headers: Vec<HttpHeader>,
    index: IndexMap<String, Vec<usize>>,
    protocol_version: ProtocolVersion,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol_version(&self) -> &ProtocolVersion {
        &self.protocol_version
    }

    /// Fails unless `version` matches `\d+\.\d+`.
    pub fn set_protocol_version(&mut self, version: &str) -> Result<&mut Self> {
        self.protocol_version = ProtocolVersion::new(version)?;
        Ok(self)
    }

    /// Appends `header` to the end of the sequence and of its name group.
    pub fn add_header(&mut self, header: HttpHeader) -> &mut Self {
        let position = self.headers.len();
        self.index
            .entry(header.name().to_ascii_lowercase())
            .or_default()
            .push(position);
        self.headers.push(header);
        self
    }

    /// Builds a header from its parts and appends it.
    pub fn add_raw(
        &mut self,
        name: &str,
        value: impl Into<HeaderValue>,
        replace: bool,
    ) -> Result<&mut Self> {
        let header = HttpHeader::new(name, value, replace)?;
        Ok(self.add_header(header))
    }

    pub fn add_spec(&mut self, spec: impl Into<HeaderSpec>) -> Result<&mut Self> {
        let header = spec.into().into_header()?;
        Ok(self.add_header(header))
    }

    /// Appends every spec in iteration order.
    ///
    /// All specs are validated before any is added, so on error the
    /// collection is unchanged.
    pub fn add_headers<I, S>(&mut self, specs: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<HeaderSpec>,
    {
        let headers = specs
            .into_iter()
            .map(|spec| spec.into().into_header())
            .collect::<Result<Vec<_>>>()?;

        for header in headers {
            self.add_header(header);
        }
        Ok(self)
    }

    /// Inserts `header` in front of the sequence and of its name group.
    pub fn prepend(&mut self, header: HttpHeader) -> &mut Self {
        for positions in self.index.values_mut() {
            for position in positions.iter_mut() {
                *position += 1;
            }
        }
        self.index
            .entry(header.name().to_ascii_lowercase())
            .or_default()
            .insert(0, 0);
        self.headers.insert(0, header);
        self
    }

    /// All headers named `name` (case-insensitive), in sequence order.
    pub fn get(&self, name: &str) -> Option<HeaderGroup<'_>> {
        let positions = self.index.get(&name.to_ascii_lowercase())?;
        Some(HeaderGroup {
            headers: &self.headers,
            positions,
        })
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|group| !group.is_empty())
    }

    /// Removes every header named `name`, returning them in sequence order.
    pub fn remove(&mut self, name: &str) -> Vec<HttpHeader> {
        if !self.has(name) {
            return Vec::new();
        }

        let (removed, kept) = std::mem::take(&mut self.headers)
            .into_iter()
            .partition(|header| header.is_named(name));
        self.headers = kept;
        self.reindex();
        removed
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Headers in sequence order.
    pub fn iter(&self) -> std::slice::Iter<'_, HttpHeader> {
        self.headers.iter()
    }

    /// Drops every header. The protocol version is kept.
    pub fn clear(&mut self) {
        self.headers.clear();
        self.index.clear();
    }

    /// Replaces the content of the collection with the headers in `text`.
    ///
    /// Malformed lines are skipped.
    pub fn parse(&mut self, text: &str) -> &mut Self {
        // lenient mode never fails
        let _ = self.parse_with(text, ParseMode::Lenient);
        self
    }

    /// Like [`parse`](Self::parse), but stops at the first malformed line.
    /// On error the collection is left empty.
    pub fn parse_strict(&mut self, text: &str) -> std::result::Result<&mut Self, ParseError> {
        self.parse_with(text, ParseMode::Strict)?;
        Ok(self)
    }

    pub fn parse_with(&mut self, text: &str, mode: ParseMode) -> std::result::Result<(), ParseError> {
        self.clear();
        let headers = parser::parse_header_block(text, mode)?;
        debug!("parsed {} header lines", headers.len());

        for header in headers {
            self.add_header(header);
        }
        Ok(())
    }

    /// Hands every header to `transport` in sequence order.
    pub fn send(&self, transport: &mut dyn Transport) -> io::Result<()> {
        for header in &self.headers {
            header.send(transport)?;
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, header) in self.headers.iter().enumerate() {
            self.index
                .entry(header.name().to_ascii_lowercase())
                .or_default()
                .push(position);
        }
    }
}

/// Every header rendered as `Name: value\r\n`, in sequence order.
impl fmt::Display for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for header in &self.headers {
            write!(f, "{header}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a HttpHeaders {
    type Item = &'a HttpHeader;
    type IntoIter = std::slice::Iter<'a, HttpHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

/// Headers sharing one name, borrowed from an [`HttpHeaders`].
#[derive(Debug, Clone, Copy)]
pub struct HeaderGroup<'a> {
    headers: &'a [HttpHeader],
    positions: &'a [usize],
}

impl<'a> HeaderGroup<'a> {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a HttpHeader> + use<'a> {
        let headers = self.headers;
        self.positions.iter().map(move |&position| &headers[position])
    }

    /// The earliest header of the group.
    pub fn first(&self) -> Option<&'a HttpHeader> {
        self.positions.first().map(|&position| &self.headers[position])
    }

    pub fn last(&self) -> Option<&'a HttpHeader> {
        self.positions.last().map(|&position| &self.headers[position])
    }

    pub fn values(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.iter().map(HttpHeader::value)
    }
}

impl<'a> IntoIterator for HeaderGroup<'a> {
    type Item = &'a HttpHeader;
    type IntoIter = Box<dyn Iterator<Item = &'a HttpHeader> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

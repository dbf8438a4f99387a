//! HTTP/1 heads as ordered, queryable header collections.
//!
//! [`HttpHeaders`] keeps headers in wire order while grouping them by
//! case-insensitive name. [`RequestHeaders`] and [`ResponseHeaders`] add the
//! request line and the status line on top of it, and [`HttpRequest`] /
//! [`HttpResponse`] pair a head with its body. Every head can be rendered to
//! its exact wire text and parsed back from it.
//!
//! ```
//! use rustyhead::RequestHeaders;
//!
//! let mut head = RequestHeaders::new();
//! head.parse("PUT /baz HTTP/1.0\r\nX-Baz-Bat: foobar\r\nX-Baz-Bat: bazbat\r\n");
//!
//! assert_eq!(head.method().as_str(), "PUT");
//! let values: Vec<_> = head.get("x-baz-bat").unwrap().values().collect();
//! assert_eq!(values, ["foobar", "bazbat"]);
//! ```

pub mod config;
pub mod handler;
pub mod http;
pub mod net;

pub use http::error::{Error, FormatError, Result};
pub use http::header::{HeaderSpec, HeaderValue, HttpHeader};
pub use http::headers::{HeaderGroup, HttpHeaders};
pub use http::parser::{ParseError, ParseMode};
pub use http::request::{HttpRequest, RequestHeaders};
pub use http::response::{HttpResponse, ResponseHeaders};
pub use http::status::StatusCode;
pub use http::transport::{RecordingTransport, Transport, WireTransport};
pub use http::{HttpMethod, ProtocolVersion};

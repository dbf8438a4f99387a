use crate::http::error::{FormatError, Result};

/// Status codes accepted by [`StatusCode`](crate::http::status::StatusCode).
pub const ALLOWED_STATUS_CODES: [u16; 41] = [
    100, 101, // 1xx
    200, 201, 202, 203, 204, 205, 206, // 2xx
    300, 301, 302, 303, 304, 305, 306, 307, // 3xx
    400, 401, 402, 403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416,
    417, // 4xx
    500, 501, 502, 503, 504, 505, // 5xx
];

pub struct Validator;

impl Validator {
    /// `[A-Za-z][A-Za-z0-9-]*`
    pub fn is_header_name(name: &str) -> bool {
        let mut bytes = name.bytes();
        match bytes.next() {
            Some(b) if b.is_ascii_alphabetic() => {}
            _ => return false,
        }
        bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-')
    }

    /// One or more `tchar`: no whitespace, no separators.
    pub fn is_token(token: &str) -> bool {
        !token.is_empty() && token.bytes().all(is_tchar)
    }

    /// `\d+\.\d+`
    pub fn is_protocol_version(version: &str) -> bool {
        match version.split_once('.') {
            Some((major, minor)) => is_digits(major) && is_digits(minor),
            None => false,
        }
    }

    pub fn is_allowed_status(code: u16) -> bool {
        ALLOWED_STATUS_CODES.contains(&code)
    }

    pub fn validate_header_name(name: &str) -> Result<()> {
        if !Self::is_header_name(name) {
            return Err(FormatError::HeaderName(name.to_string()).into());
        }
        Ok(())
    }

    pub fn validate_method(method: &str) -> Result<()> {
        if !Self::is_token(method) {
            return Err(FormatError::Method(method.to_string()).into());
        }
        Ok(())
    }

    pub fn validate_protocol_version(version: &str) -> Result<()> {
        if !Self::is_protocol_version(version) {
            return Err(FormatError::ProtocolVersion(version.to_string()).into());
        }
        Ok(())
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

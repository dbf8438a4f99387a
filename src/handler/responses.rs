use log::error;

use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::StatusCode;

/// Methods answered by [`echo`].
pub const ECHO_METHODS: &str = "GET, HEAD, POST, PUT, DELETE, TRACE";

/// Answers with the request as it was understood, re-rendered.
pub fn echo(req: &HttpRequest) -> HttpResponse {
    let rendered = req.to_string();
    let length = rendered.len();

    // HEAD gets the length GET would have had, without the content
    let content = if req.is_head() { String::new() } else { rendered };
    let mut res = HttpResponse::with_status(content, StatusCode::OK);
    set_content_headers(&mut res, "message/http", length);
    res
}

pub fn method_not_allowed() -> HttpResponse {
    let mut res = any_error(StatusCode::METHOD_NOT_ALLOWED);
    set_header(&mut res, "Allow", ECHO_METHODS);
    res
}

pub fn any_error(status: StatusCode) -> HttpResponse {
    let content = format!("<h1>{} {}</h1>", status, status.canonical_reason());
    let length = content.len();
    let mut res = HttpResponse::with_status(content, status);
    set_content_headers(&mut res, "text/html", length);
    res
}

fn set_content_headers(res: &mut HttpResponse, content_type: &str, length: usize) {
    set_header(res, "Content-Type", content_type);
    set_header(res, "Content-Length", &length.to_string());
}

/// Replaces every header named `name` with a single one.
pub fn set_header(res: &mut HttpResponse, name: &str, value: &str) {
    let headers = res.headers_mut();
    headers.remove(name);
    if let Err(err) = headers.add_raw(name, value, true) {
        error!("failed to set header {name}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_renders_request() {
        let mut req = HttpRequest::new();
        req.parse("GET /foo HTTP/1.1\r\nHost: foo.bar\r\n\r\n");

        let res = echo(&req);
        assert!(res.headers().is_ok());
        assert_eq!(res.content(), "GET /foo HTTP/1.1\r\nHost: foo.bar\r\n\r\n");
        let length = res.headers().get("content-length").unwrap().first().unwrap().value();
        assert_eq!(length, res.content().len().to_string());
    }

    #[test]
    fn echo_head_has_no_content() {
        let mut req = HttpRequest::new();
        req.parse("HEAD /foo HTTP/1.1\r\nHost: foo.bar\r\n\r\n");

        let res = echo(&req);
        assert_eq!(res.content(), "");
        assert_ne!(
            res.headers().get("Content-Length").unwrap().first().unwrap().value(),
            "0"
        );
    }

    #[test]
    fn method_not_allowed_lists_methods() {
        let res = method_not_allowed();
        assert_eq!(res.headers().status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            res.headers().get("Allow").unwrap().first().unwrap().value(),
            ECHO_METHODS
        );
    }

    #[test]
    fn set_header_replaces() {
        let mut res = any_error(StatusCode::BAD_REQUEST);
        set_header(&mut res, "Content-Type", "text/plain");
        assert_eq!(res.headers().get("Content-Type").unwrap().len(), 1);
    }
}

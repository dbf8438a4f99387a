pub mod responses;

use crate::http::HttpMethod;
use crate::http::header::HttpHeader;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::StatusCode;

pub fn handle_request(req: &HttpRequest) -> HttpResponse {
    match req.method() {
        HttpMethod::Get
        | HttpMethod::Head
        | HttpMethod::Post
        | HttpMethod::Put
        | HttpMethod::Delete
        | HttpMethod::Trace => responses::echo(req),
        _ => responses::method_not_allowed(),
    }
}

pub fn handle_error(err: StatusCode) -> HttpResponse {
    responses::any_error(err)
}

/// Adds the server wide headers in front of the handler's own.
pub fn apply_defaults(res: &mut HttpResponse, defaults: &[HttpHeader]) {
    for header in defaults.iter().rev() {
        res.headers_mut().prepend(header.clone());
    }
}

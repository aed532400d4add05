//! HTTP response building module
//!
//! Every response leaves through one of these builders so the common headers
//! (`Server`, security headers, CORS) are applied uniformly.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, SERVER,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::cache::CachePolicy;
use crate::config::HttpConfig;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Headers shared by every response, derived from `[http]` config
#[derive(Debug, Clone)]
pub struct CommonHeaders {
    pub server_name: String,
    pub security_headers: bool,
    pub enable_cors: bool,
}

impl From<&HttpConfig> for CommonHeaders {
    fn from(http: &HttpConfig) -> Self {
        Self {
            server_name: http.server_name.clone(),
            security_headers: http.security_headers,
            enable_cors: http.enable_cors,
        }
    }
}

impl CommonHeaders {
    fn builder(&self, status: StatusCode) -> Builder {
        let mut builder = Response::builder()
            .status(status)
            .header(SERVER, self.server_name.as_str());

        if self.security_headers {
            builder = builder
                .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
                .header(X_FRAME_OPTIONS, "DENY")
                .header(X_XSS_PROTECTION, "1; mode=block");
        }
        if self.enable_cors {
            builder = builder.header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        }
        builder
    }
}

/// A file body ready to be sent
pub struct FileBody<'a> {
    pub content: Bytes,
    pub content_type: &'a str,
    pub etag: &'a str,
}

/// Build 200 response for a file, with `ETag` and cache policy
///
/// `HEAD` requests get the real `Content-Length` and an empty body.
pub fn build_file_response(
    headers: &CommonHeaders,
    file: FileBody<'_>,
    policy: CachePolicy,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = file.content.len();
    let body = if is_head { Bytes::new() } else { file.content };

    headers
        .builder(StatusCode::OK)
        .header(CONTENT_TYPE, file.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ETAG, file.etag)
        .header(CACHE_CONTROL, policy.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(
    headers: &CommonHeaders,
    etag: &str,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    headers
        .builder(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, policy.to_header_value())
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build a plain-text status response
pub fn build_text_response(
    headers: &CommonHeaders,
    status: StatusCode,
    message: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(message.as_bytes())
    };
    headers
        .builder(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Build 403 Forbidden response
pub fn build_403_response(headers: &CommonHeaders, is_head: bool) -> Response<Full<Bytes>> {
    build_text_response(headers, StatusCode::FORBIDDEN, "Forbidden", is_head)
}

/// Build 404 Not Found response
pub fn build_404_response(headers: &CommonHeaders, is_head: bool) -> Response<Full<Bytes>> {
    build_text_response(headers, StatusCode::NOT_FOUND, "Not Found", is_head)
}

/// Build 500 response; never carries error detail
pub fn build_500_response(headers: &CommonHeaders, is_head: bool) -> Response<Full<Bytes>> {
    build_text_response(
        headers,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(headers: &CommonHeaders) -> Response<Full<Bytes>> {
    let mut resp = build_text_response(
        headers,
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        false,
    );
    resp.headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(headers: &CommonHeaders) -> Response<Full<Bytes>> {
    let mut builder = headers
        .builder(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if headers.enable_cors {
        builder = builder
            .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, If-None-Match")
            .header(ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build pretty-printed JSON response
pub fn build_json_response<T: Serialize>(
    headers: &CommonHeaders,
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec_pretty(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_500_response(headers, is_head);
        }
    };
    let content_length = json.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(json) };

    headers
        .builder(status)
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, content_length)
        .header(CACHE_CONTROL, CachePolicy::NoCache.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("JSON", &e))
}

/// Log response build error and substitute a bare response
fn fallback(status: &str, error: &hyper::http::Error) -> Response<Full<Bytes>> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}

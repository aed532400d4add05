//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, diagnostic
//! endpoints, file serving, then access logging and history.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::diagnostics;
use super::static_files::{self, FileRequest};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry, RequestRecord};

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let uri = &parts.uri;
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let user_agent = header_str(&parts, USER_AGENT);

    if state.config.diagnostics.enabled {
        state.history.record(RequestRecord::now(
            method.as_str(),
            target,
            peer.ip(),
            user_agent,
        ));
    }
    logger::log_debug(&format!("{peer} {method} {target}"));

    let response = route_request(&parts, &state, peer, target).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer, method.as_str(), uri.path());
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.referer = header_str(&parts, REFERER).map(ToString::to_string);
        entry.user_agent = user_agent.map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request(
    req: &Parts,
    state: &AppState,
    peer: SocketAddr,
    target: &str,
) -> Response<Full<Bytes>> {
    let is_head = match req.method {
        Method::GET => false,
        Method::HEAD => true,
        Method::OPTIONS => return http::build_options_response(&state.headers),
        _ => {
            logger::log_warning(&format!("Method not allowed: {} from {peer}", req.method));
            return http::build_405_response(&state.headers);
        }
    };

    if let Some(resp) = diagnostics::handle(
        state,
        req.uri.path(),
        peer,
        header_str(req, USER_AGENT),
        is_head,
    ) {
        return resp;
    }

    let file_req = FileRequest {
        target,
        is_head,
        if_none_match: header_str(req, IF_NONE_MATCH),
        peer,
    };
    static_files::serve(state, &file_req).await
}

fn header_str(req: &Parts, name: hyper::header::HeaderName) -> Option<&str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

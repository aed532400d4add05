//! Diagnostic endpoints
//!
//! `/test` answers with client and server details so a connection from
//! another machine on the network can be verified; `/logs` shows the recent
//! request history. Both are off unless `diagnostics.enabled` is set.

use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::net::SocketAddr;

use super::assets::CacheStats;
use crate::config::AppState;
use crate::http;
use crate::logger::history::HistorySnapshot;

pub const TEST_PATH: &str = "/test";
pub const LOGS_PATH: &str = "/logs";

/// Number of requests listed by `/logs`
const LOGS_SHOWN: usize = 10;

#[derive(Debug, Serialize)]
struct TestReport<'a> {
    success: bool,
    message: &'static str,
    client_info: ClientInfo<'a>,
    server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
struct ClientInfo<'a> {
    ip: String,
    user_agent: Option<&'a str>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ServerInfo {
    version: &'static str,
    uptime_secs: f64,
    cache: CacheStats,
}

/// Serve a diagnostic endpoint, or `None` if `path` is not one
pub fn handle(
    state: &AppState,
    path: &str,
    peer: SocketAddr,
    user_agent: Option<&str>,
    is_head: bool,
) -> Option<Response<Full<Bytes>>> {
    if !state.config.diagnostics.enabled {
        return None;
    }
    match path {
        TEST_PATH => Some(test_response(state, peer, user_agent, is_head)),
        LOGS_PATH => Some(logs_response(state, is_head)),
        _ => None,
    }
}

fn test_response(
    state: &AppState,
    peer: SocketAddr,
    user_agent: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let report = TestReport {
        success: true,
        message: "ParkMaster connection test successful!",
        client_info: ClientInfo {
            ip: peer.ip().to_string(),
            user_agent,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        server_info: ServerInfo {
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: state.started_at.elapsed().as_secs_f64(),
            cache: state.cache.stats(),
        },
    };
    http::build_json_response(&state.headers, StatusCode::OK, &report, is_head)
}

fn logs_response(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    let snapshot: HistorySnapshot = state.history.snapshot(LOGS_SHOWN);
    http::build_json_response(&state.headers, StatusCode::OK, &snapshot, is_head)
}

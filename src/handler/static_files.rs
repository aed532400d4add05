//! Static file serving module
//!
//! Resolves the request, loads the file and applies the SPA fallback: a miss
//! outside the assets prefix is a client-side route and gets the index
//! document, a miss inside it is a genuinely broken reference.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::net::SocketAddr;
use std::sync::Arc;

use super::assets::{self, Asset};
use super::resolve::{resolve, ResolvedPath};
use crate::config::AppState;
use crate::error::AssetError;
use crate::http::{self, cache, mime, CachePolicy, FileBody};
use crate::logger;

/// Request details needed to serve a file
pub struct FileRequest<'a> {
    /// Path and query as received
    pub target: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub peer: SocketAddr,
}

/// Serve a request from the root directory
pub async fn serve(state: &AppState, req: &FileRequest<'_>) -> Response<Full<Bytes>> {
    let resolved = match resolve(req.target, &state.root, &state.config.site.index_file) {
        Ok(resolved) => resolved,
        Err(_) => {
            logger::log_traversal_blocked(req.target, &req.peer);
            return http::build_403_response(&state.headers, req.is_head);
        }
    };

    match assets::load(&state.cache, &state.root, &resolved.file_path).await {
        Ok(asset) => {
            let policy = if resolved.is_index {
                CachePolicy::NoCache
            } else {
                CachePolicy::immutable_asset()
            };
            respond(state, req, &asset, asset.content_type, policy)
        }
        Err(AssetError::NotFound) => serve_fallback(state, req, &resolved).await,
        Err(AssetError::Forbidden) => {
            logger::log_traversal_blocked(req.target, &req.peer);
            http::build_403_response(&state.headers, req.is_head)
        }
        Err(AssetError::Io(e)) => {
            logger::log_error(&format!(
                "Failed to read '{}': {e}",
                resolved.file_path.display()
            ));
            http::build_500_response(&state.headers, req.is_head)
        }
    }
}

/// Decide between the index document and a 404 for a missing file
async fn serve_fallback(
    state: &AppState,
    req: &FileRequest<'_>,
    resolved: &ResolvedPath,
) -> Response<Full<Bytes>> {
    if state.is_reserved_asset_path(&resolved.request_path) {
        logger::log_debug(&format!("Asset not found: {}", resolved.request_path));
        return http::build_404_response(&state.headers, req.is_head);
    }

    match load_index(state).await {
        Ok(index) => {
            logger::log_spa_fallback(&resolved.request_path);
            respond(state, req, &index, mime::HTML, CachePolicy::NoCache)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Index document '{}' unavailable for {}: {e}",
                state.index_path.display(),
                resolved.request_path
            ));
            http::build_404_response(&state.headers, req.is_head)
        }
    }
}

pub async fn load_index(state: &AppState) -> Result<Arc<Asset>, AssetError> {
    assets::load(&state.cache, &state.root, &state.index_path).await
}

fn respond(
    state: &AppState,
    req: &FileRequest<'_>,
    asset: &Asset,
    content_type: &str,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    if cache::check_etag_match(req.if_none_match, &asset.etag) {
        return http::build_304_response(&state.headers, &asset.etag, policy);
    }
    http::build_file_response(
        &state.headers,
        FileBody {
            content: asset.content.clone(),
            content_type,
            etag: &asset.etag,
        },
        policy,
        req.is_head,
    )
}

// Application state module
// Everything a request handler needs, built once at startup and shared via Arc

use std::path::PathBuf;
use std::time::Instant;

use super::types::Config;
use crate::handler::assets::AssetCache;
use crate::http::CommonHeaders;
use crate::logger::RequestHistory;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical root directory
    pub root: PathBuf,
    pub index_path: PathBuf,
    /// Assets prefix with leading and trailing slash
    pub assets_prefix: String,
    pub headers: CommonHeaders,
    pub cache: AssetCache,
    pub history: RequestHistory,
    pub started_at: Instant,
}

impl AppState {
    /// Build state for an already canonicalized `root`
    pub fn new(config: Config, root: PathBuf) -> Self {
        let index_path = root.join(&config.site.index_file);
        let assets_prefix = normalize_prefix(&config.site.assets_prefix);
        let headers = CommonHeaders::from(&config.http);
        let cache = AssetCache::new(config.http.enable_cache);
        let history = RequestHistory::new(config.diagnostics.history_size);

        Self {
            config,
            root,
            index_path,
            assets_prefix,
            headers,
            cache,
            history,
            started_at: Instant::now(),
        }
    }

    /// Whether a decoded request path lies under the reserved assets prefix
    pub fn is_reserved_asset_path(&self, request_path: &str) -> bool {
        request_path.starts_with(&self.assets_prefix)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_prefix(prefix: &str) -> AppState {
        let mut config = Config::defaults().unwrap();
        config.site.assets_prefix = prefix.to_string();
        AppState::new(config, PathBuf::from("/srv/dist"))
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix("/assets/"), "/assets/");
        assert_eq!(normalize_prefix("assets"), "/assets/");
        assert_eq!(normalize_prefix("/static/js"), "/static/js/");
    }

    #[test]
    fn test_reserved_asset_paths() {
        let state = state_with_prefix("/assets/");
        assert!(state.is_reserved_asset_path("/assets/missing.js"));
        assert!(!state.is_reserved_asset_path("/assets"));
        assert!(!state.is_reserved_asset_path("/assetsx/app.js"));
        assert!(!state.is_reserved_asset_path("/dashboard/settings"));
    }

    #[test]
    fn test_index_path_follows_config() {
        let state = state_with_prefix("assets");
        assert_eq!(state.index_path, PathBuf::from("/srv/dist/index.html"));
    }
}

//! Asset loading and the in-memory asset cache
//!
//! Files are read whole, typed by extension and kept for the lifetime of
//! the process. Build output is immutable while the server runs, so entries
//! are never invalidated.

use hyper::body::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::fs;

use crate::error::AssetError;
use crate::http::{cache, mime};

/// A loaded file
#[derive(Debug)]
pub struct Asset {
    pub content: Bytes,
    pub content_type: &'static str,
    pub etag: String,
}

impl Asset {
    pub fn new(content: Vec<u8>, content_type: &'static str) -> Self {
        let etag = cache::generate_etag(&content);
        Self {
            content: Bytes::from(content),
            content_type,
            etag,
        }
    }
}

/// Cache counters reported by `/test`
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Path-keyed asset cache
///
/// Concurrent misses on the same path may both read the file; the later
/// insert wins and the content is identical either way.
pub struct AssetCache {
    enabled: bool,
    entries: RwLock<HashMap<PathBuf, Arc<Asset>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AssetCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Asset>> {
        if !self.enabled {
            return None;
        }
        let found = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(path).cloned());
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store an asset (no-op when disabled) and hand back the shared copy
    pub fn insert(&self, path: PathBuf, asset: Asset) -> Arc<Asset> {
        let asset = Arc::new(asset);
        if self.enabled {
            if let Ok(mut entries) = self.entries.write() {
                entries.insert(path, Arc::clone(&asset));
            }
        }
        asset
    }

    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Load the file at `path`, from cache when possible
///
/// `root` must be canonical; the real (symlink-resolved) location of the
/// file has to stay below it.
pub async fn load(cache: &AssetCache, root: &Path, path: &Path) -> Result<Arc<Asset>, AssetError> {
    if let Some(asset) = cache.get(path) {
        return Ok(asset);
    }
    let asset = read_asset(root, path).await?;
    Ok(cache.insert(path.to_path_buf(), asset))
}

/// Read a file from disk without touching the cache
async fn read_asset(root: &Path, path: &Path) -> Result<Asset, AssetError> {
    let real = fs::canonicalize(path).await.map_err(AssetError::from_io)?;
    if !real.starts_with(root) {
        return Err(AssetError::Forbidden);
    }

    let metadata = fs::metadata(&real).await.map_err(AssetError::from_io)?;
    if !metadata.is_file() {
        return Err(AssetError::NotFound);
    }

    let content = fs::read(&real).await.map_err(AssetError::from_io)?;
    Ok(Asset::new(content, mime::content_type_for(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("index.html"), "<html>A</html>").unwrap();
        std::fs::write(root.join("assets/app.abc123.js"), "console.log(1)").unwrap();
        std::fs::write(root.join("assets/LOGO.PNG"), [0x89, b'P', b'N', b'G']).unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn test_load_infers_content_type() {
        let (_dir, root) = site();
        let cache = AssetCache::new(true);

        let js = load(&cache, &root, &root.join("assets/app.abc123.js"))
            .await
            .unwrap();
        assert_eq!(js.content, "console.log(1)");
        assert_eq!(js.content_type, "application/javascript");

        let png = load(&cache, &root, &root.join("assets/LOGO.PNG")).await.unwrap();
        assert_eq!(png.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_cache_hit_is_idempotent() {
        let (_dir, root) = site();
        let cache = AssetCache::new(true);
        let path = root.join("index.html");

        let first = load(&cache, &root, &path).await.unwrap();
        // Cached entries survive changes on disk for the process lifetime
        std::fs::write(&path, "<html>B</html>").unwrap();
        let second = load(&cache, &root, &path).await.unwrap();

        assert_eq!(first.content, second.content);
        assert_eq!(first.content_type, second.content_type);
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test]
    async fn test_disabled_cache_rereads_disk() {
        let (_dir, root) = site();
        let cache = AssetCache::new(false);
        let path = root.join("index.html");

        load(&cache, &root, &path).await.unwrap();
        std::fs::write(&path, "<html>B</html>").unwrap();
        let second = load(&cache, &root, &path).await.unwrap();

        assert_eq!(second.content, "<html>B</html>");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found_and_not_cached() {
        let (_dir, root) = site();
        let cache = AssetCache::new(true);

        let err = load(&cache, &root, &root.join("assets/missing.js")).await;
        assert!(matches!(err, Err(AssetError::NotFound)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let (_dir, root) = site();
        let cache = AssetCache::new(true);

        let err = load(&cache, &root, &root.join("assets")).await;
        assert!(matches!(err, Err(AssetError::NotFound)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_root_is_forbidden() {
        let (_dir, root) = site();
        let outside = tempfile::tempdir().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, "top secret").unwrap();
        std::os::unix::fs::symlink(&secret, root.join("leak.txt")).unwrap();

        let cache = AssetCache::new(true);
        let err = load(&cache, &root, &root.join("leak.txt")).await;
        assert!(matches!(err, Err(AssetError::Forbidden)));
    }
}

//! Request path resolution
//!
//! Maps a raw request target onto a file below the root directory. The
//! mapping is purely lexical; symlink containment is checked again when the
//! file is opened (see `handler::assets`).

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

use crate::error::AssetError;

/// A request target mapped onto the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Decoded, dot-segment-free request path without query string, always
    /// starting with `/`
    pub request_path: String,
    /// Absolute path below the root
    pub file_path: PathBuf,
    /// Whether `file_path` is the index document
    pub is_index: bool,
}

/// Resolve a raw request target against `root`
///
/// `root` must be absolute (the canonical root held by `AppState`). Fails
/// with `Forbidden` when the target would leave `root`, however encoded.
/// The returned `request_path` is decoded and normalized, so prefix checks
/// on it see the same path the file lookup used.
pub fn resolve(target: &str, root: &Path, index_file: &str) -> Result<ResolvedPath, AssetError> {
    let raw_path = target.split(['?', '#']).next().unwrap_or_default();

    let decoded = percent_decode_str(raw_path)
        .decode_utf8()
        .map_err(|_| AssetError::Forbidden)?;
    if decoded.contains('\0') {
        return Err(AssetError::Forbidden);
    }

    let segments = normalize(&decoded)?;
    let request_path = join_request_path(&segments, decoded.ends_with('/'));

    // `/`, and anything that collapses to it, names the index document
    let segments = if segments.is_empty() {
        normalize(index_file)?
    } else {
        segments
    };
    let file_path = segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment));

    if !file_path.starts_with(root) {
        return Err(AssetError::Forbidden);
    }

    let is_index = file_path == root.join(index_file);
    Ok(ResolvedPath {
        request_path,
        file_path,
        is_index,
    })
}

/// Rebuild the request path from normalized segments
fn join_request_path(segments: &[&str], trailing_slash: bool) -> String {
    let mut path = format!("/{}", segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        path.push('/');
    }
    path
}

/// Characters that separate path segments on this platform
#[cfg(windows)]
const SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/'];

/// Collapse `.` and `..` segments; climbing above the start is an error
fn normalize(path: &str) -> Result<Vec<&str>, AssetError> {
    let mut segments = Vec::new();
    for segment in path.split(SEPARATORS) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(AssetError::Forbidden);
                }
            }
            name => {
                // Drive prefixes and the like never name a file below root
                let mut components = Path::new(name).components();
                if !matches!(
                    (components.next(), components.next()),
                    (Some(Component::Normal(_)), None)
                ) {
                    return Err(AssetError::Forbidden);
                }
                segments.push(name);
            }
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/dist")
    }

    fn resolve_ok(target: &str) -> ResolvedPath {
        resolve(target, &root(), "index.html").unwrap()
    }

    fn is_forbidden(target: &str) -> bool {
        matches!(
            resolve(target, &root(), "index.html"),
            Err(AssetError::Forbidden)
        )
    }

    #[test]
    fn test_root_maps_to_index() {
        let resolved = resolve_ok("/");
        assert_eq!(resolved.file_path, PathBuf::from("/srv/dist/index.html"));
        assert_eq!(resolved.request_path, "/");
        assert!(resolved.is_index);
    }

    #[test]
    fn test_query_string_is_stripped() {
        let resolved = resolve_ok("/assets/app.abc123.js?v=3#top");
        assert_eq!(
            resolved.file_path,
            PathBuf::from("/srv/dist/assets/app.abc123.js")
        );
        assert_eq!(resolved.request_path, "/assets/app.abc123.js");
        assert!(!resolved.is_index);

        assert!(resolve_ok("/?utm_source=mail").is_index);
    }

    #[test]
    fn test_percent_decoding() {
        let resolved = resolve_ok("/images/park%20map.png");
        assert_eq!(
            resolved.file_path,
            PathBuf::from("/srv/dist/images/park map.png")
        );
        assert_eq!(resolved.request_path, "/images/park map.png");
    }

    #[test]
    fn test_inner_parent_segments_stay_inside() {
        let resolved = resolve_ok("/assets/../index.html");
        assert_eq!(resolved.file_path, PathBuf::from("/srv/dist/index.html"));
        assert!(resolved.is_index);

        let resolved = resolve_ok("/./dashboard//settings");
        assert_eq!(
            resolved.file_path,
            PathBuf::from("/srv/dist/dashboard/settings")
        );
    }

    #[test]
    fn test_traversal_is_forbidden() {
        assert!(is_forbidden("/../../etc/passwd"));
        assert!(is_forbidden("/assets/../../etc/passwd"));
        assert!(is_forbidden("/.."));
    }

    #[test]
    fn test_encoded_traversal_is_forbidden() {
        assert!(is_forbidden("/%2e%2e/%2e%2e/etc/passwd"));
        assert!(is_forbidden("/%2E%2E%2F%2E%2E%2Fetc%2Fpasswd"));
        assert!(is_forbidden("/..%2f..%2fetc%2fpasswd"));
    }

    #[cfg(windows)]
    #[test]
    fn test_backslash_separates_on_windows() {
        assert!(is_forbidden("/..%5c..%5cetc%5cpasswd"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_backslash_is_part_of_the_name() {
        let resolved = resolve_ok("/a%5Cb.js");
        assert_eq!(resolved.file_path, PathBuf::from("/srv/dist/a\\b.js"));

        let resolved = resolve_ok("/..%5c..%5cetc%5cpasswd");
        assert_eq!(
            resolved.file_path,
            PathBuf::from("/srv/dist/..\\..\\etc\\passwd")
        );
    }

    #[test]
    fn test_request_path_is_normalized() {
        for target in [
            "/./assets/missing.js",
            "/x/../assets/missing.js",
            "//assets/missing.js",
            "/assets/./missing.js",
            "/%2e/assets/missing.js",
        ] {
            assert_eq!(resolve_ok(target).request_path, "/assets/missing.js", "{target}");
        }
        assert_eq!(resolve_ok("/profile//").request_path, "/profile/");
        assert_eq!(resolve_ok("/assets").request_path, "/assets");
    }

    #[test]
    fn test_paths_collapsing_to_root_map_to_index() {
        for target in ["/./", "/x/..", "//"] {
            let resolved = resolve_ok(target);
            assert_eq!(resolved.request_path, "/", "{target}");
            assert!(resolved.is_index, "{target}");
        }
    }

    #[test]
    fn test_double_encoding_is_a_literal_name() {
        let resolved = resolve_ok("/%252e%252e/etc/passwd");
        assert!(resolved.file_path.starts_with(root()));
        assert_eq!(
            resolved.file_path,
            PathBuf::from("/srv/dist/%2e%2e/etc/passwd")
        );
    }

    #[test]
    fn test_malformed_input_is_forbidden() {
        assert!(is_forbidden("/%00/index.html"));
        assert!(is_forbidden("/%ff%fe"));
    }

    #[test]
    fn test_custom_index_name() {
        let resolved = resolve("/", &root(), "app.html").unwrap();
        assert_eq!(resolved.file_path, PathBuf::from("/srv/dist/app.html"));
        assert!(resolved.is_index);
    }
}

//! MIME type detection module
//!
//! Returns the Content-Type for a file path based purely on its extension.

use std::path::Path;

/// Content type of HTML documents, also used for the SPA fallback
pub const HTML: &str = "text/html; charset=utf-8";

/// Content type for unknown extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Get MIME Content-Type based on a lower-cased file extension
///
/// # Examples
/// ```
/// use parkmaster_server::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("js")), "application/javascript");
/// assert_eq!(get_content_type(Some("woff2")), "application/font-woff2");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Documents and styles
        Some("html" | "htm") => HTML,
        Some("css") => "text/css",
        Some("txt") => "text/plain; charset=utf-8",

        // Scripts and data
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "application/font-woff",
        Some("woff2") => "application/font-woff2",
        Some("ttf") => "font/ttf",

        _ => OCTET_STREAM,
    }
}

/// Content type for a path; the extension is matched case-insensitively
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    get_content_type(extension.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_types() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("js")), "application/javascript");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("png")), "image/png");
        assert_eq!(get_content_type(Some("jpeg")), "image/jpeg");
        assert_eq!(get_content_type(Some("svg")), "image/svg+xml");
        assert_eq!(get_content_type(Some("ico")), "image/x-icon");
        assert_eq!(get_content_type(Some("woff")), "application/font-woff");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), OCTET_STREAM);
        assert_eq!(get_content_type(None), OCTET_STREAM);
    }

    #[test]
    fn test_extension_case_is_ignored() {
        assert_eq!(content_type_for(Path::new("dist/LOGO.PNG")), "image/png");
        assert_eq!(
            content_type_for(Path::new("assets/app.abc123.Js")),
            "application/javascript"
        );
        assert_eq!(content_type_for(Path::new("dist/LICENSE")), OCTET_STREAM);
    }
}

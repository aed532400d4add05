//! Request handler module
//!
//! Responsible for request routing dispatch: diagnostic endpoints, static
//! files from the root directory and the SPA fallback to the index document.

pub mod assets;
pub mod diagnostics;
pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;

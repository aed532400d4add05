//! ParkMaster static asset server
//!
//! Serves a pre-built single-page application bundle from a root directory,
//! falling back to the index document for client-side routes.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

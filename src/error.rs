//! Error types
//!
//! `AssetError` is the per-request outcome of resolving and loading a file;
//! `StartupError` covers everything that stops the process before it serves.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce an asset for a request
#[derive(Debug, Error)]
pub enum AssetError {
    /// Nothing servable at the resolved path
    #[error("not found")]
    NotFound,
    /// Resolved path escapes the root directory
    #[error("forbidden")]
    Forbidden,
    /// Any other filesystem failure; build through `from_io`
    #[error("i/o error: {0}")]
    Io(#[source] io::Error),
}

impl AssetError {
    /// Classify a filesystem error, separating "missing" from real failures
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            // `/index.html/x` walks through a file: still just missing
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}

/// Fatal errors raised before the server accepts connections
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address {0}")]
    InvalidAddress(String),

    #[error("root directory {} does not exist; build the frontend first", .0.display())]
    RootMissing(PathBuf),

    #[error("root path {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("failed to bind {addr}: {source}\n{hint}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
        hint: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StartupError {
    /// Process exit status for this failure
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidAddress(_) => 2,
            _ => 1,
        }
    }
}

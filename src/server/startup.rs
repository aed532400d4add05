// Startup sequence
// Validates the root, binds the listener, prints the banner and runs until a signal

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use super::banner::banner_lines;
use super::listener::create_listener;
use super::network::local_ipv4_addresses;
use super::server_loop;
use super::signal::shutdown_signal;
use crate::config::{AppState, Config};
use crate::error::StartupError;
use crate::handler::static_files;
use crate::logger;

/// Check the configured root directory and return its canonical path
pub fn prepare_root(config: &Config) -> Result<PathBuf, StartupError> {
    let root = config.root_dir()?;
    let metadata = match std::fs::metadata(&root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StartupError::RootMissing(root));
        }
        Err(e) => return Err(StartupError::Io(e)),
    };
    if !metadata.is_dir() {
        return Err(StartupError::RootNotDirectory(root));
    }
    Ok(root.canonicalize()?)
}

/// Run the server until SIGINT/SIGTERM
pub async fn run(config: Config) -> Result<(), StartupError> {
    run_until(config, shutdown_signal()).await
}

/// Run the server until `shutdown` completes.
///
/// Nothing is bound unless the root directory checks out.
pub async fn run_until<F>(config: Config, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let root = prepare_root(&config)?;
    let addr = config.get_socket_addr()?;
    let state = Arc::new(AppState::new(config, root));

    // Warm the cache with the index document; a missing one is only a warning
    // because every other file can still be served
    if let Err(e) = static_files::load_index(&state).await {
        logger::log_warning(&format!(
            "Index document {} not loadable ({e}); client-side routes will return 404",
            state.index_path.display()
        ));
    }

    let listener = create_listener(addr)?;
    let bound = listener.local_addr()?;

    logger::log_banner(&banner_lines(
        &state.config,
        &state.root,
        bound,
        &local_ipv4_addresses(),
    ));

    server_loop::serve(listener, state, shutdown).await;
    Ok(())
}

// Signal handling module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)
// Other platforms only get Ctrl+C.

use crate::logger;

/// Resolve once the process is asked to stop.
///
/// If no handler can be installed the future never resolves, so the server
/// keeps running and can still be killed the hard way.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                return std::future::pending().await;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => logger::log_info("SIGTERM received, shutting down"),
        _ = sigint.recv() => logger::log_info("SIGINT received, shutting down"),
    }
}

#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_info("Ctrl+C received, shutting down"),
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}

// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight work

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase polls the connection counter
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop on `listener` until `shutdown` completes.
///
/// After `shutdown` fires the listener is closed and open connections get
/// up to `performance.shutdown_grace` seconds to finish. Anything still open
/// after that goes down with the runtime.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    drain(&active_connections, grace).await;

    logger::log_shutdown_complete();
}

async fn drain(active_connections: &AtomicUsize, grace: Duration) {
    let active = active_connections.load(Ordering::SeqCst);
    logger::log_shutdown_started(active);
    if active == 0 {
        return;
    }

    let deadline = tokio::time::Instant::now() + grace;
    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Grace period over, dropping {} connection(s)",
                active_connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_at_once_when_idle() {
        let counter = AtomicUsize::new(0);
        let started = std::time::Instant::now();
        drain(&counter, Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let counter = AtomicUsize::new(1);
        let started = std::time::Instant::now();
        drain(&counter, Duration::from_millis(120)).await;
        assert!(started.elapsed() >= Duration::from_millis(120));
    }
}

// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::shutdown_signal;
use crate::config::AppState;
use crate::logger;

/// Longest wait for open connections after shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until SIGINT/SIGTERM, then give open connections a
/// short grace period to finish.
pub async fn run_server_loop(listener: TcpListener, state: Arc<AppState>) {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }

    // Stop accepting before draining
    drop(listener);
    logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    while state.active_connections.load(Ordering::SeqCst) > 0
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(DRAIN_POLL).await;
    }
    logger::log_info("Server stopped");
}

// Server loop module
// Accepts connections until shutdown is requested, then lets in-flight
// requests finish

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish after shutdown is requested
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Run the accept loop until `shutdown` is notified.
///
/// Each connection is spawned onto the runtime, so requests are spread over
/// all worker threads.
pub async fn run(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &graceful,
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    tokio::select! {
        () = graceful.shutdown() => {}
        () = tokio::time::sleep(SHUTDOWN_GRACE) => {
            logger::log_warning(&format!(
                "{} connections still open after {}s, closing them",
                active_connections.load(Ordering::SeqCst),
                SHUTDOWN_GRACE.as_secs()
            ));
        }
    }

    logger::log_shutdown_complete();
}

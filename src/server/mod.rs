// Server module entry point
// Listener setup, connection serving and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_listener;

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;
use connection::accept_connection;

/// Accept connections until `shutdown` resolves
///
/// Connections already being served keep running on their own tasks.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
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
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }
}

/// Future that resolves on SIGINT/SIGTERM, logging which one arrived
///
/// If signal handlers cannot be installed the future never resolves and the
/// process must be stopped externally.
pub async fn shutdown_signal() {
    match signal::wait_for_shutdown().await {
        Ok(name) => logger::log_shutdown(name),
        Err(e) => {
            logger::log_error(&format!("Failed to install signal handlers: {e}"));
            std::future::pending::<()>().await;
        }
    }
}

// Connection handling module
// Admits a TCP connection and serves it on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Holds one slot of the active connection count until dropped
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    /// Take a slot, or `None` if `max` slots are already taken
    fn acquire(counter: &Arc<AtomicUsize>, max: Option<u64>) -> Option<Self> {
        // Increment first, then check, so concurrent accepts cannot overshoot
        let prev = counter.fetch_add(1, Ordering::SeqCst);
        let slot = Self(Arc::clone(counter));
        match max {
            Some(max) if prev >= usize::try_from(max).unwrap_or(usize::MAX) => None,
            _ => Some(slot),
        }
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept and process a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `active` - Active connection counter
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    active: &Arc<AtomicUsize>,
) {
    let max = state.config.performance.max_connections;
    let Some(slot) = ConnectionSlot::acquire(active, max) else {
        logger::log_warning(&format!(
            "Max connections reached: {}/{}. Connection from {peer_addr} rejected.",
            active.load(Ordering::SeqCst).saturating_sub(1),
            max.unwrap_or_default()
        ));
        return;
    };

    logger::log_connection_accepted(&peer_addr);
    tokio::spawn(serve_connection(stream, peer_addr, Arc::clone(state), slot));
}

/// Serve HTTP/1.1 on one connection
///
/// Only header reads carry a deadline; upload bodies are bounded per chunk
/// by the upload handler, so long transfers are not cut off.
async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    _slot: ConnectionSlot,
) {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(state.config.header_read_timeout())
        .keep_alive(state.config.performance.keep_alive);

    let service = service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr));

    if let Err(err) = builder.serve_connection(io, service).await {
        logger::log_connection_error(&err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_limit_and_release() {
        let counter = Arc::new(AtomicUsize::new(0));

        let first = ConnectionSlot::acquire(&counter, Some(1));
        assert!(first.is_some());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(ConnectionSlot::acquire(&counter, Some(1)).is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        drop(first);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(ConnectionSlot::acquire(&counter, Some(1)).is_some());
    }

    #[test]
    fn test_unlimited_slots() {
        let counter = Arc::new(AtomicUsize::new(0));
        let slots: Vec<_> = (0..10)
            .map(|_| ConnectionSlot::acquire(&counter, None).unwrap())
            .collect();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        drop(slots);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}

// Server module entry point
// Listener creation and the accept loop

pub mod connection;
pub mod listener;

pub use listener::create_listener;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::logger;

/// Accept connections until the process exits.
///
/// Accept errors are logged and the loop continues; only the initial bind
/// can take the server down.
pub async fn run(listener: TcpListener, config: Arc<Config>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::accept_connection(stream, peer_addr, &config, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiError;
use crate::config::AppState;
use crate::handler;
use crate::http;
use crate::logger;

/// Accept a connection, enforcing `max_connections`.
///
/// The connection is registered with `graceful` so shutdown can wait for it.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    graceful: &GracefulShutdown,
) {
    // Increment counter first, then check limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    let keep_alive_timeout = state.config.performance.keep_alive_timeout;
    let request_timeout = Duration::from_secs(state.config.performance.request_timeout);
    let state = Arc::clone(state);

    let mut builder = http1::Builder::new();
    builder.timer(TokioTimer::new());
    if keep_alive_timeout > 0 {
        builder
            .keep_alive(true)
            .header_read_timeout(Duration::from_secs(keep_alive_timeout));
    } else {
        builder.keep_alive(false);
    }

    let service = service_fn(move |req| {
        let state = Arc::clone(&state);
        async move {
            let handled = handler::handle_request(req, Arc::clone(&state), peer_addr);
            match tokio::time::timeout(request_timeout, handled).await {
                Ok(result) => result,
                Err(_) => {
                    let secs = request_timeout.as_secs();
                    logger::log_warning(&format!("Request from {peer_addr} timed out after {secs}s"));
                    let mut response = ApiError::Timeout { secs }.into_response(state.config.server.debug);
                    http::apply_common_headers(&mut response, &state.config.http);
                    Ok(response)
                }
            }
        }
    });

    let conn = graceful.watch(builder.serve_connection(TokioIo::new(stream), service));
    let conn_counter = Arc::clone(conn_counter);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

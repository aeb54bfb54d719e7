// Server loop module
// Accepts connections until the shutdown future resolves, then drains them

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop.
///
/// Once `shutdown` resolves the listener is closed and open connections get
/// `performance.request_timeout` seconds to finish their in-flight requests.
pub async fn run_server<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);

    let grace = Duration::from_secs(state.config.performance.request_timeout);
    match tokio::time::timeout(grace, graceful.shutdown()).await {
        Ok(()) => logger::log_shutdown_complete(0),
        Err(_) => logger::log_shutdown_complete(active_connections.load(Ordering::SeqCst)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::client::conn::http1;
    use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HOST, SERVER};
    use hyper::{Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    fn start(config: Config) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(config));
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(run_server(listener, state, async {
            let _ = rx.await;
        }));
        (addr, tx, server)
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.server.debug = false;
        config.logging.access_log = false;
        config
    }

    fn get(addr: SocketAddr, path: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .uri(path)
            .header(HOST, addr.to_string())
            .body(Empty::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_serves_over_tcp_then_shuts_down() {
        let (addr, shutdown, server) = start(quiet_config());

        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        let client = tokio::spawn(conn);

        let resp = sender.send_request(get(addr, "/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[SERVER], "AgriSense/1.0");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");

        // Keep-alive: the same connection serves a second request
        let resp = sender.send_request(get(addr, "/nowhere")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        drop(sender);
        let _ = client.await;

        shutdown.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_connection_limit_rejects() {
        let mut config = quiet_config();
        config.performance.max_connections = Some(0);
        let (addr, shutdown, server) = start(config);

        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(conn);
        assert!(sender.send_request(get(addr, "/health")).await.is_err());

        shutdown.send(()).unwrap();
        server.await.unwrap();
    }
}

// Server loop module
// Accepts connections until a shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Accept connections on `listener` until `state.shutdown_signal` fires.
///
/// Must run inside a `LocalSet`; connections are served with `spawn_local`.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(listener: TcpListener, state: Arc<config::AppState>) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = Arc::clone(&state.shutdown_signal);

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

            _ = shutdown.notified() => {
                break;
            }
        }
    }

    drop(listener);
    logger::log_server_stopped();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};
    use crate::server::create_reusable_listener;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::client::conn::http1::SendRequest;
    use hyper::{Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    type Client = SendRequest<Empty<Bytes>>;

    /// Bind an ephemeral port and run the loop on the current `LocalSet`
    fn spawn_server(config: &Config) -> (SocketAddr, Arc<AppState>, tokio::task::JoinHandle<()>) {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(config).unwrap());
        let server = tokio::task::spawn_local(start_server_loop(listener, Arc::clone(&state)));
        (addr, state, server)
    }

    async fn connect(addr: SocketAddr) -> Client {
        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::task::spawn_local(async move {
            let _ = conn.await;
        });
        sender
    }

    async fn send_get(
        sender: &mut Client,
        addr: SocketAddr,
        path_and_query: &str,
    ) -> (StatusCode, serde_json::Value) {
        let req = Request::get(path_and_query)
            .header("Host", addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = sender.send_request(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    async fn http_get(addr: SocketAddr, path_and_query: &str) -> (StatusCode, serde_json::Value) {
        let mut sender = connect(addr).await;
        send_get(&mut sender, addr, path_and_query).await
    }

    /// Ok(0) or a reset both mean the server closed the socket
    async fn closed_by_server(stream: &mut tokio::net::TcpStream, within: Duration) -> bool {
        let mut buf = [0u8; 64];
        matches!(
            tokio::time::timeout(within, stream.read(&mut buf)).await,
            Ok(Ok(0) | Err(_))
        )
    }

    #[tokio::test]
    async fn test_serves_webapi_over_tcp_until_shutdown() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (addr, state, server) = spawn_server(&Config::for_tests());

                let (status, body) = http_get(addr, "/webapi/auth.cgi?method=login").await;
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body["data"]["sid"], 1);

                let (_, body) = http_get(
                    addr,
                    "//webapi/DownloadStation/task.cgi?method=create&uri=ubuntu.iso",
                )
                .await;
                assert_eq!(body["success"], true);

                let (_, body) =
                    http_get(addr, "/webapi/DownloadStation/task.cgi?method=list").await;
                assert_eq!(body["data"]["tasks"][0]["title"], "ubuntu.iso");

                let (status, _) = http_get(addr, "/webapi/DownloadStation/task.cgi").await;
                assert_eq!(status, StatusCode::BAD_REQUEST);

                state.shutdown_signal.notify_one();
                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .expect("server loop did not stop")
                    .unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_connection_over_limit_is_dropped() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::for_tests();
                config.performance.max_connections = Some(1);
                let (addr, state, _server) = spawn_server(&config);

                // First connection is counted once it has been served
                let mut first = connect(addr).await;
                let (status, _) = send_get(&mut first, addr, "/webapi/auth.cgi?method=login").await;
                assert_eq!(status, StatusCode::OK);

                let mut second = tokio::net::TcpStream::connect(addr).await.unwrap();
                assert!(closed_by_server(&mut second, Duration::from_secs(5)).await);

                // The kept-alive first connection still works
                let (status, body) =
                    send_get(&mut first, addr, "/webapi/auth.cgi?method=login").await;
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body["data"]["sid"], 1);

                state.shutdown_signal.notify_one();
            })
            .await;
    }

    #[tokio::test]
    async fn test_idle_connection_closed_after_keep_alive_timeout() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::for_tests();
                config.performance.keep_alive_timeout = 1;
                let (addr, state, _server) = spawn_server(&config);

                let mut idle = tokio::net::TcpStream::connect(addr).await.unwrap();
                // Well under read_timeout (30s), so only the keep-alive bound applies
                assert!(closed_by_server(&mut idle, Duration::from_secs(10)).await);

                state.shutdown_signal.notify_one();
            })
            .await;
    }
}

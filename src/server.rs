//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Stops `listener.accept()` immediately; no new connections are made.
//! 2. Tells every open connection to shut down gracefully: idle keep-alive
//!    connections close, busy ones finish the request in flight.
//! 3. Aborts whatever is still open once the drain timeout expires.
//! 4. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// How long [`Server::serve`] waits for in-flight connections after the
/// shutdown signal before aborting them.
const DRAIN_TIMEOUT_DEFAULT: Duration = Duration::from_secs(30);

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    drain_timeout: Duration,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use postboard::Server;
    /// let server = Server::bind("0.0.0.0:8000").unwrap();
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| Error::Addr { addr: addr.to_owned(), source })?;
        Ok(Self { addr, drain_timeout: DRAIN_TIMEOUT_DEFAULT })
    }

    /// Upper bound on the shutdown drain. Connections still open when it
    /// expires are aborted.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a graceful shutdown (SIGTERM or Ctrl-C, followed by
    /// in-flight requests completing or the drain timeout expiring).
    pub async fn serve<S>(self, router: Router<S>) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "postboard listening");
        run(listener, router, shutdown_signal(), self.drain_timeout).await
    }
}

/// Accept loop. Every connection is registered with a [`GracefulShutdown`]
/// watcher so that, once `signal` resolves, idle keep-alive connections are
/// closed and busy ones finish their current request.
async fn run<S, F>(
    listener: TcpListener,
    router: Router<S>,
    signal: F,
    drain_timeout: Duration,
) -> Result<(), Error>
where
    S: Clone + Send + Sync + 'static,
    F: Future<Output = ()>,
{
    let router = Arc::new(router);
    let builder = ConnBuilder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut tasks = JoinSet::new();

    tokio::pin!(signal);

    loop {
        tokio::select! {
            // Check shutdown first so a SIGTERM stops accepting at once,
            // even if more connections are queued.
            biased;

            () = &mut signal => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                // Called once per request on the connection.
                let svc = service_fn(move |req| {
                    let router = Arc::clone(&router);
                    async move { dispatch(router, req, remote_addr).await }
                });

                let conn = builder.serve_connection(TokioIo::new(stream), svc).into_owned();
                let conn = graceful.watch(conn);

                tasks.spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet stays bounded.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);

    if tokio::time::timeout(drain_timeout, graceful.shutdown()).await.is_err() {
        warn!(remaining = tasks.len(), ?drain_timeout, "drain timed out, aborting connections");
        tasks.shutdown().await;
    }
    while tasks.join_next().await.is_some() {}

    info!("postboard stopped");
    Ok(())
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers the body and hands the request to the router. All failures become
/// responses, so hyper never sees an error.
async fn dispatch<S>(
    router: Arc<Router<S>>,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    S: Clone + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();

    let Ok(method) = Method::try_from(&parts.method) else {
        debug!(peer = %remote_addr, method = %parts.method, "unsupported method");
        return Ok(Response::status(Status::MethodNotAllowed).into_inner());
    };

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(peer = %remote_addr, "failed to read request body: {e}");
            return Ok(Response::status(Status::BadRequest).into_inner());
        }
    };

    let response = router.handle(method, parts.uri.path(), body).await;
    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;
    use crate::request::Request;

    async fn read_until_body(client: &mut TcpStream, body: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        while !buf.ends_with(body) {
            let mut chunk = [0u8; 512];
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the response completed");
            buf.extend_from_slice(&chunk[..n]);
        }
        buf
    }

    #[tokio::test]
    async fn shutdown_closes_idle_keep_alive_connections() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new(())
            .on(Method::Get, "/healthz", |_: (), _: Request| async { Response::text("ok") });

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let signal = async move {
            let _ = stopped.await;
        };
        let server = tokio::spawn(run(listener, router, signal, Duration::from_secs(60)));

        // HTTP/1.1 keeps the connection open after the response.
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"GET /healthz HTTP/1.1\r\nhost: localhost\r\n\r\n").await.unwrap();
        let response = read_until_body(&mut client, b"ok").await;
        assert!(response.starts_with(b"HTTP/1.1 200"));

        stop.send(()).unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))), "server did not drain the idle connection");

        let mut rest = Vec::new();
        let n = client.read_to_end(&mut rest).await.unwrap_or(0);
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn drain_timeout_aborts_stuck_requests() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new(()).on(Method::Get, "/slow", |_: (), _: Request| async {
            std::future::pending::<()>().await;
            Response::text("never")
        });

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let signal = async move {
            let _ = stopped.await;
        };
        let server = tokio::spawn(run(listener, router, signal, Duration::from_millis(100)));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"GET /slow HTTP/1.1\r\nhost: localhost\r\n\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        stop.send(()).unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))));
    }
}

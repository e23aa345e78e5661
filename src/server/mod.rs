//! The worker pool and its maintenance loop.
//!
//! A [`Server`] owns N worker tasks, each running an independent
//! accept→decode→dispatch→respond loop against one shared [`Listener`]. The
//! accept call is the only cross-worker serialization point; there is no
//! other shared mutable state, and each request is exclusively owned by the
//! worker that built it.
//!
//! Alongside the workers runs a single maintenance loop that invokes every
//! registered callback at a fixed 100 ms cadence: periodic housekeeping
//! such as health probes or metrics flushes runs there without being starved
//! by long-lived worker loops. The loop exits through a join barrier: an
//! atomic flag stored only after every worker task has been joined.
//!
//! There is no explicit stop API. Termination is driven entirely by the
//! listener's accept primitive returning `None` (e.g. the listener was
//! closed externally); a worker that observes it stops, and [`Server::run`]
//! returns once all of them have.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::time;
use tracing::{error, info};

use crate::connection::FcgiConnection;
use crate::handler::Router;
use crate::transport::Listener;

/// Fixed cadence of the maintenance loop.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type PollCallback = Box<dyn Fn() + Send + Sync>;

pub struct ServerBuilder {
    workers: usize,
    router: Option<Arc<dyn Router>>,
    poll_callbacks: Vec<PollCallback>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { workers: 1, router: None, poll_callbacks: Vec::new() }
    }

    /// Number of worker tasks competing on the shared listener (default 1).
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    /// The routing tree that receives every decoded request.
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    /// Registers a maintenance callback.
    ///
    /// Callbacks take no arguments, return nothing, and are invoked by the
    /// maintenance loop only, never concurrently with each other.
    pub fn poll_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.poll_callbacks.push(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        Ok(Server { workers: self.workers, router, poll_callbacks: self.poll_callbacks })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
}

pub struct Server {
    workers: usize,
    router: Arc<dyn Router>,
    poll_callbacks: Vec<PollCallback>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Spins up the worker pool and runs the maintenance loop until the
    /// listener signals shutdown and every worker has been joined.
    pub async fn run<L: Listener>(self, listener: L) {
        let listener = Arc::new(listener);

        info!(workers = self.workers, "starting worker pool");
        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let listener = Arc::clone(&listener);
            let router = Arc::clone(&self.router);
            handles.push(tokio::spawn(worker_loop(id, listener, router)));
        }

        // Join barrier: the flag is stored only after every worker task has
        // been joined, and the maintenance loop may only exit once it reads
        // the flag.
        let stopped = Arc::new(AtomicBool::new(false));
        let joiner = tokio::spawn({
            let stopped = Arc::clone(&stopped);
            async move {
                for result in join_all(handles).await {
                    if let Err(e) = result {
                        error!(cause = %e, "worker task failed");
                    }
                }
                stopped.store(true, Ordering::Release);
            }
        });

        // Maintenance loop: invoke every callback, wait one interval,
        // re-check. The callbacks run at least once even when the pool
        // stops immediately.
        loop {
            for callback in &self.poll_callbacks {
                callback();
            }
            time::sleep(POLL_INTERVAL).await;
            if stopped.load(Ordering::Acquire) {
                break;
            }
        }

        if let Err(e) = joiner.await {
            error!(cause = %e, "join task failed");
        }
        info!("all workers stopped");
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("workers", &self.workers)
            .field("poll_callbacks", &self.poll_callbacks.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("workers", &self.workers)
            .field("poll_callbacks", &self.poll_callbacks.len())
            .finish_non_exhaustive()
    }
}

/// One worker: accept, process, repeat. Strictly sequential, one response
/// fully written before the next accept.
async fn worker_loop<L: Listener>(id: usize, listener: Arc<L>, router: Arc<dyn Router>) {
    while let Some(session) = listener.accept().await {
        let connection = FcgiConnection::new(session);
        if let Err(e) = connection.process(router.as_ref()).await {
            error!(worker = id, cause = %e, "failed to write response");
        }
    }
    info!(worker = id, "listener signalled shutdown, worker stopping");
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::task::{Context, Poll};
    use std::time::Instant;

    use async_trait::async_trait;
    use http::StatusCode;
    use tokio::io::AsyncWrite;

    use super::*;
    use crate::protocol::Request;
    use crate::transport::{Params, Session};

    /// Write-only sink the test can inspect after the session was consumed.
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl AsyncWrite for SharedSink {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    struct MockSession {
        params: Params,
        body: Cursor<Vec<u8>>,
        out: SharedSink,
        err: SharedSink,
    }

    impl Session for MockSession {
        type Body = Cursor<Vec<u8>>;
        type Sink = SharedSink;

        fn into_parts(self) -> (Params, Self::Body, Self::Sink, Self::Sink) {
            (self.params, self.body, self.out, self.err)
        }
    }

    /// Hands out queued sessions; an empty queue is the shutdown signal.
    #[derive(Default)]
    struct MockListener {
        sessions: Mutex<VecDeque<MockSession>>,
    }

    #[async_trait]
    impl Listener for MockListener {
        type Session = MockSession;

        async fn accept(&self) -> Option<MockSession> {
            self.sessions.lock().unwrap().pop_front()
        }
    }

    /// Stays idle for a while before signalling shutdown, so the maintenance
    /// loop gets a few turns.
    struct IdleListener;

    #[async_trait]
    impl Listener for IdleListener {
        type Session = MockSession;

        async fn accept(&self) -> Option<MockSession> {
            time::sleep(Duration::from_millis(250)).await;
            None
        }
    }

    /// Echoes the route back, reporting `/missing/...` as unhandled.
    struct EchoRouter;

    #[async_trait]
    impl Router for EchoRouter {
        async fn handle_request(&self, request: &mut Request<'_>, depth: usize) -> bool {
            assert_eq!(depth, 0);
            if request.route().first().map(String::as_str) == Some("missing") {
                return false;
            }
            let body = format!("echo:{}", request.route().join("/"));
            request.send_header(StatusCode::OK, "text/plain").await.unwrap();
            request.write_body(body.as_bytes()).await.unwrap();
            true
        }
    }

    fn get_session(uri: &str) -> (MockSession, SharedSink) {
        let out = SharedSink::default();
        let session = MockSession {
            params: Params::from_iter([("REQUEST_METHOD", "GET"), ("REQUEST_URI", uri)]),
            body: Cursor::new(Vec::new()),
            out: out.clone(),
            err: SharedSink::default(),
        };
        (session, out)
    }

    fn server(workers: usize) -> Server {
        Server::builder().workers(workers).router(Arc::new(EchoRouter)).build().unwrap()
    }

    #[test]
    fn build_requires_a_router() {
        assert!(matches!(Server::builder().build(), Err(ServerBuildError::MissingRouter)));
    }

    #[tokio::test]
    async fn handled_request_gets_router_response() {
        let (session, out) = get_session("/hello/world");
        let listener = MockListener { sessions: Mutex::new(VecDeque::from([session])) };

        server(1).run(listener).await;

        assert_eq!(
            out.contents(),
            b"Status: 200 OK\r\nContent-Type: text/plain\r\n\r\necho:hello/world" as &[u8]
        );
    }

    #[tokio::test]
    async fn unhandled_route_gets_404_fallback() {
        let (session, out) = get_session("/missing/page");
        let listener = MockListener { sessions: Mutex::new(VecDeque::from([session])) };

        server(1).run(listener).await;

        assert_eq!(
            out.contents(),
            b"Status: 404 Not Found\r\nContent-Type: text/html\r\n\r\nPage Not Found 404" as &[u8]
        );
    }

    #[tokio::test]
    async fn decode_failure_writes_fixed_error_response() {
        let out = SharedSink::default();
        let session = MockSession {
            params: Params::from_iter([("REQUEST_METHOD", "POST"), ("CONTENT_LENGTH", "10")]),
            body: Cursor::new(b"short".to_vec()),
            out: out.clone(),
            err: SharedSink::default(),
        };
        let listener = MockListener { sessions: Mutex::new(VecDeque::from([session])) };

        server(1).run(listener).await;

        assert_eq!(
            out.contents(),
            b"Status: 400 Bad Request\r\nContent-Type: text/html\r\n\r\nFailed to read content." as &[u8]
        );
    }

    #[tokio::test]
    async fn more_requests_than_workers_all_get_responses() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut sessions = VecDeque::new();
        let mut outs = Vec::new();
        for i in 0..8 {
            let (session, out) = get_session(&format!("/r/{i}"));
            sessions.push_back(session);
            outs.push(out);
        }
        let listener = MockListener { sessions: Mutex::new(sessions) };

        server(2).run(listener).await;

        for (i, out) in outs.iter().enumerate() {
            let expected = format!("Status: 200 OK\r\nContent-Type: text/plain\r\n\r\necho:r/{i}");
            assert_eq!(out.contents(), expected.as_bytes(), "response {i}");
        }
    }

    #[tokio::test]
    async fn worker_keeps_responses_contiguous_on_a_shared_sink() {
        // All sessions write into the same sink, as they would when one
        // worker reuses its output stream across accepts. A worker that
        // started the next session before finishing the previous response
        // would tear the concatenation apart.
        let shared = SharedSink::default();
        let mut sessions = VecDeque::new();
        for i in 0..8 {
            let uri = format!("/r/{i}");
            sessions.push_back(MockSession {
                params: Params::from_iter([("REQUEST_METHOD", "GET"), ("REQUEST_URI", uri.as_str())]),
                body: Cursor::new(Vec::new()),
                out: shared.clone(),
                err: SharedSink::default(),
            });
        }
        let listener = MockListener { sessions: Mutex::new(sessions) };

        server(1).run(listener).await;

        let mut expected = String::new();
        for i in 0..8 {
            expected.push_str(&format!("Status: 200 OK\r\nContent-Type: text/plain\r\n\r\necho:r/{i}"));
        }
        assert_eq!(String::from_utf8(shared.contents()).unwrap(), expected);
    }

    #[tokio::test]
    async fn maintenance_callback_keeps_cadence_until_workers_stop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let server = Server::builder()
            .workers(1)
            .router(Arc::new(EchoRouter))
            .poll_callback(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        let started = Instant::now();
        server.run(IdleListener).await;

        // The worker lives ~250 ms; at a 100 ms cadence the callback fires
        // at 0 ms, ~100 ms and ~200 ms.
        assert!(calls.load(Ordering::SeqCst) >= 2, "calls: {}", calls.load(Ordering::SeqCst));
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn maintenance_callback_runs_at_least_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let server = Server::builder()
            .router(Arc::new(EchoRouter))
            .poll_callback(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        // An already-exhausted listener stops the pool immediately; the
        // callback must still have been given its first turn.
        server.run(MockListener::default()).await;

        assert!(calls.load(Ordering::SeqCst) >= 1);
    }
}

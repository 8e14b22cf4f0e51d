use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context};
use tiny_http::Response;
use tracing::{debug, error, info, warn};

use super::request::from_tiny_http;
use super::response::TinyHttpSink;
use crate::dispatcher::Dispatcher;

pub const DEFAULT_WORKERS: usize = 4;

/// Blocking HTTP front end for a [`Dispatcher`].
///
/// A `tiny_http` listener is shared by a fixed set of worker threads, each
/// pulling one request at a time and running it through
/// [`Dispatcher::process`].
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
    workers: usize,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it
/// gracefully, or joining the worker threads.
pub struct ServerHandle {
    addr: SocketAddr,
    server: Arc<tiny_http::Server>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to (the real port when started on `:0`).
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the listener does not accept a connection
    /// within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting requests and wait for the workers to exit.
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for _ in &self.workers {
            self.server.unblock();
        }
        for worker in self.workers {
            if worker.join().is_err() {
                error!("Worker thread panicked during shutdown");
            }
        }
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until every worker thread exits.
    ///
    /// # Errors
    ///
    /// Returns the panic payload of the first worker that panicked.
    pub fn join(self) -> thread::Result<()> {
        for worker in self.workers {
            worker.join()?;
        }
        Ok(())
    }
}

impl HttpServer {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Number of worker threads; at least one is always started.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Bind `addr` and start the worker threads.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the port cannot be bound
    /// or a worker thread cannot be spawned.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> anyhow::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("invalid address"))?;
        let server = tiny_http::Server::http(addr)
            .map_err(|e| anyhow!("failed to bind {addr}: {e}"))?;
        let addr = server.server_addr().to_ip().unwrap_or(addr);
        let server = Arc::new(server);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(self.workers);
        for idx in 0..self.workers {
            let server = Arc::clone(&server);
            let shutdown = Arc::clone(&shutdown);
            let dispatcher = Arc::clone(&self.dispatcher);
            let worker = thread::Builder::new()
                .name(format!("apigate-worker-{idx}"))
                .spawn(move || worker_loop(&server, &shutdown, &dispatcher))
                .context("failed to spawn worker thread")?;
            workers.push(worker);
        }

        info!(addr = %addr, workers = self.workers, "Server listening");
        Ok(ServerHandle {
            addr,
            server,
            shutdown,
            workers,
        })
    }
}

fn worker_loop(server: &tiny_http::Server, shutdown: &AtomicBool, dispatcher: &Dispatcher) {
    loop {
        let request = match server.recv() {
            Ok(request) => request,
            Err(e) => {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                warn!(error = %e, "Failed to receive request");
                continue;
            }
        };
        handle_request(dispatcher, request);
    }
    debug!("Worker exiting");
}

fn handle_request(dispatcher: &Dispatcher, mut request: tiny_http::Request) {
    let incoming = match from_tiny_http(&mut request) {
        Ok(incoming) => incoming,
        Err(e) => {
            warn!(error = %e, "Rejecting unparseable request");
            if let Err(e) = request.respond(Response::empty(400)) {
                error!(error = %e, "Failed to write response");
            }
            return;
        }
    };

    let api_req = incoming.request;
    let mut sink = TinyHttpSink::new(request);
    let outcome = match &incoming.rejection {
        Some(err) => dispatcher.reject(&api_req, err, &mut sink),
        None => dispatcher.process(&api_req, &mut sink),
    };
    if let Err(e) = outcome {
        error!(
            request_id = %api_req.id(),
            error = %e,
            "Unhandled error while processing request"
        );
    }
    sink.finish();
}

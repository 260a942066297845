use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{mpsc, Arc},
    thread,
};

use http_body_util::Full;
use hyper::{
    body::{self, Bytes},
    server::conn::http1,
    service::service_fn,
    Request, Response, Uri,
};
use hyper_util::rt::TokioIo;
use tokio::{net::TcpListener, runtime, select, sync::watch};
use tracing::{debug, error, info, warn};

use crate::{handler::internal_server_error, Config, Error, FixtureRequest, Router};

/// Serves a [Router] on a dedicated thread, with blocking start and stop
/// handshakes so a test fixture knows exactly when the port is open and when
/// it has been released.
///
/// See the crate documentation for an example.
#[derive(Debug)]
pub struct FixtureServer {
    config: Config,
    router: Arc<Router>,
    running: Option<Running>,
}

#[derive(Debug)]
struct Running {
    addr: SocketAddr,
    close_tx: watch::Sender<bool>,
    thread: thread::JoinHandle<()>,
}

impl FixtureServer {
    /// Creates a stopped server that will answer the fixture routes.
    pub fn new(config: Config) -> Self {
        let router = Router::fixture(&config);
        Self::with_router(config, router)
    }

    /// Creates a stopped server that will answer the given routes. Only the
    /// address and transport settings of `config` are used.
    pub fn with_router(config: Config, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
            running: None,
        }
    }

    /// Binds the configured address and starts serving on a new thread.
    ///
    /// Blocks until the listener is bound and accepting connections, so
    /// requests issued after this returns never see a refused connection.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.running.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<SocketAddr, Error>>(1);
        let (close_tx, close_rx) = watch::channel(false);
        let config = self.config.clone();
        let router = self.router.clone();

        let thread = thread::Builder::new()
            .name("fixture-server".to_string())
            .spawn(move || {
                let runtime = match runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = ready_tx.send(Err(Error::BuildRuntime(err)));
                        return;
                    }
                };

                runtime.block_on(serve(config, router, ready_tx, close_rx));

                // Dropping the runtime aborts any connection still open.
                drop(runtime);
                debug!("fixture server destroyed");
            })
            .map_err(Error::SpawnServerThread)?;

        let addr = match ready_rx.recv() {
            Ok(Ok(addr)) => addr,
            Ok(Err(err)) => {
                let _ = thread.join();
                return Err(err);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(Error::ServerThreadExited);
            }
        };

        info!(%addr, "fixture server listening");
        self.running = Some(Running {
            addr,
            close_tx,
            thread,
        });
        Ok(())
    }

    /// Stops serving and blocks until the serving thread has exited, by which
    /// point the listener and every connection have been closed.
    pub fn stop(&mut self) -> Result<(), Error> {
        let running = self.running.take().ok_or(Error::NotRunning)?;

        debug!(addr = %running.addr, "stopping fixture server");
        running.close_tx.send_replace(true);
        running
            .thread
            .join()
            .map_err(|_| Error::ServerThreadPanicked)?;

        info!(addr = %running.addr, "fixture server stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Returns the socket address the server is listening on, if it is
    /// running.
    pub fn addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.addr)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `http://<host>:<port>`, using the bound address while running
    /// and the configured one otherwise.
    pub fn base_url(&self) -> String {
        match self.addr() {
            Some(addr) => format!("http://{addr}"),
            None => self.config.base_url(),
        }
    }

    /// Returns a valid request URL for the given path and query string.
    pub fn url(&self, path_and_query: &str) -> Uri {
        let authority = match self.addr() {
            Some(addr) => addr,
            None => self.config.socket_addr(),
        };
        Uri::builder()
            .scheme("http")
            .authority(authority.to_string().as_str())
            .path_and_query(path_and_query)
            .build()
            .expect("should be a valid URL")
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if self.running.is_some() {
            if let Err(err) = self.stop() {
                warn!("error while stopping fixture server: {}", err);
            }
        }
    }
}

/// The serving loop. Reports the bound address (or the bind failure) through
/// `ready_tx`, then accepts connections until `close_rx` changes.
async fn serve(
    config: Config,
    router: Arc<Router>,
    ready_tx: mpsc::SyncSender<Result<SocketAddr, Error>>,
    mut close_rx: watch::Receiver<bool>,
) {
    let (tcp_listener, addr) = match bind(config.socket_addr()).await {
        Ok(bound) => bound,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };
    if ready_tx.send(Ok(addr)).is_err() {
        return;
    }

    loop {
        let (tcp_stream, peer) = select! {
            _ = close_rx.changed() => {
                return;
            }
            res = tcp_listener.accept() => {
                match res {
                    Ok(res) => res,
                    Err(err) => {
                        error!("error while accepting TCP connection: {}", err);
                        continue;
                    }
                }
            }
        };
        debug!(%peer, "accepted connection");

        let router = router.clone();
        let mut close_rx = close_rx.clone();
        let keep_alive = config.keep_alive;
        tokio::spawn(async move {
            let router = &router;

            let service = service_fn(|req: Request<body::Incoming>| async move {
                Ok::<_, Infallible>(respond(router, req).await)
            });

            let res = select! {
                _ = close_rx.changed() => {
                    return;
                }
                res = http1::Builder::new()
                    .keep_alive(keep_alive)
                    .serve_connection(TokioIo::new(tcp_stream), service) => res,
            };

            if let Err(http_err) = res {
                error!(%peer, "error while serving HTTP connection: {}", http_err);
            }
        });
    }
}

async fn bind(addr: SocketAddr) -> Result<(TcpListener, SocketAddr), Error> {
    let tcp_listener = TcpListener::bind(addr)
        .await
        .map_err(Error::BindTCPListener)?;
    let addr = tcp_listener
        .local_addr()
        .map_err(Error::GetTCPListenerAddress)?;
    Ok((tcp_listener, addr))
}

async fn respond(router: &Router, req: Request<body::Incoming>) -> Response<Full<Bytes>> {
    match FixtureRequest::collect(req).await {
        Ok(req) => router.dispatch(&req),
        Err(err) => {
            error!("error while reading request body: {}", err);
            internal_server_error()
        }
    }
}

//! Module to handle the HTTP server instances.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use derive_more::Constructor;
use thiserror::Error;
use tokio::sync::oneshot::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::v1::routes::router;
use super::HTTP_TRACKER_LOG_TARGET;
use crate::bootstrap::jobs::Started;
use crate::core::Tracker;
use crate::servers::signals::{graceful_shutdown, Halted};

/// Time given to open connections to finish once the server is halted.
const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Error that can occur when starting or stopping the HTTP server.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to bind to {addr}: {source}")]
    UnableToBindToSocket { addr: SocketAddr, source: std::io::Error },

    #[error("unable to get the local address: {source}")]
    UnableToGetLocalAddress { source: std::io::Error },

    #[error("the server task did not report it was started")]
    NotStarted,

    #[error("the halt channel was closed")]
    HaltChannelClosed,

    #[error("unable to join the server task: {source}")]
    UnableToJoin { source: tokio::task::JoinError },
}

/// It binds the listener and runs the axum server until halted.
#[derive(Constructor, Copy, Clone, Debug)]
pub struct Launcher {
    pub bind_to: SocketAddr,
}

impl Launcher {
    /// It binds the socket and spawns the server task.
    ///
    /// The bound address is sent through `tx_start` once the socket is
    /// listening, so a port `0` in `bind_to` can be resolved by the caller.
    ///
    /// # Errors
    ///
    /// Will return an error if the socket can't be bound.
    pub fn start(
        &self,
        tracker: Arc<Tracker>,
        tx_start: Sender<Started>,
        rx_halt: Receiver<Halted>,
    ) -> Result<JoinHandle<Launcher>, Error> {
        let launcher = *self;

        let listener = std::net::TcpListener::bind(self.bind_to).map_err(|source| Error::UnableToBindToSocket {
            addr: self.bind_to,
            source,
        })?;

        let address = listener
            .local_addr()
            .map_err(|source| Error::UnableToGetLocalAddress { source })?;

        let handle = Handle::new();

        tokio::task::spawn(graceful_shutdown(
            handle.clone(),
            rx_halt,
            format!("Shutting down HTTP server on socket address: {address}"),
            GRACE_PERIOD,
        ));

        let app = router(tracker, &address);

        Ok(tokio::spawn(async move {
            info!(target: HTTP_TRACKER_LOG_TARGET, "Starting on: http://{address}");

            let running = axum_server::from_tcp(listener)
                .handle(handle)
                .serve(app.into_make_service_with_connect_info::<SocketAddr>());

            if tx_start.send(Started { address }).is_err() {
                error!(target: HTTP_TRACKER_LOG_TARGET, "the HTTP tracker launcher was dropped before it started");
            }

            if let Err(err) = running.await {
                error!(target: HTTP_TRACKER_LOG_TARGET, %err, "HTTP server stopped with an error");
            }

            info!(target: HTTP_TRACKER_LOG_TARGET, "Stopped server running on: http://{address}");

            launcher
        }))
    }
}

/// A HTTP server instance controller with no HTTP instance running.
#[allow(clippy::module_name_repetitions)]
pub type StoppedHttpServer = HttpServer<Stopped>;

/// A HTTP server instance controller with a running HTTP instance.
#[allow(clippy::module_name_repetitions)]
pub type RunningHttpServer = HttpServer<Running>;

/// A HTTP server controller.
///
/// It's a state machine: a stopped server can be started and a running one
/// stopped. The bind address given to the launcher is kept between runs.
#[allow(clippy::module_name_repetitions)]
pub struct HttpServer<S> {
    /// The state of the server: `running` or `stopped`.
    pub state: S,
}

/// A stopped HTTP server state.
pub struct Stopped {
    launcher: Launcher,
}

/// A running HTTP server state.
pub struct Running {
    /// The address where the server is bound.
    pub binding: SocketAddr,
    pub halt_task: Sender<Halted>,
    pub task: JoinHandle<Launcher>,
}

impl HttpServer<Stopped> {
    /// It creates a new `HttpServer` controller in `stopped` state.
    #[must_use]
    pub fn new(launcher: Launcher) -> Self {
        Self {
            state: Stopped { launcher },
        }
    }

    /// It starts the server and returns a `HttpServer` controller in `running`
    /// state.
    ///
    /// # Errors
    ///
    /// It would return an error if the socket can't be bound or the server
    /// task does not report its bound address.
    pub async fn start(self, tracker: Arc<Tracker>) -> Result<HttpServer<Running>, Error> {
        let (tx_start, rx_start) = tokio::sync::oneshot::channel::<Started>();
        let (tx_halt, rx_halt) = tokio::sync::oneshot::channel::<Halted>();

        let task = self.state.launcher.start(tracker, tx_start, rx_halt)?;

        let binding = rx_start.await.map_err(|_| Error::NotStarted)?.address;

        Ok(HttpServer {
            state: Running {
                binding,
                halt_task: tx_halt,
                task,
            },
        })
    }
}

impl HttpServer<Running> {
    /// It stops the server and returns a `HttpServer` controller in `stopped`
    /// state.
    ///
    /// # Errors
    ///
    /// It would return an error if the halt channel was already closed or the
    /// server task can't be joined.
    pub async fn stop(self) -> Result<HttpServer<Stopped>, Error> {
        self.state
            .halt_task
            .send(Halted::Normal)
            .map_err(|_| Error::HaltChannelClosed)?;

        let launcher = self.state.task.await.map_err(|source| Error::UnableToJoin { source })?;

        Ok(HttpServer {
            state: Stopped { launcher },
        })
    }
}

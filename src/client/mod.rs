//! Swarm client with baseline provider support.
//!
//! A [`Client`] listens for peers on one address and runs a session per
//! content added with [`Client::add_torrent`]. Each session:
//!
//! - announces to its trackers ([`announcer`]),
//! - learns the peers and the baseline provider from the responses,
//! - dials the peers the [`admission`] policy allows,
//! - and moves through the [`promotion`] roles as the content completes.
//!
//! ```text
//!   Client ── listener ──> inbound connections ──> Session (by info-hash)
//!     │
//!     └── Session ── dialer ──────> outbound connections
//!            ├──── announcer (one per tracker)
//!            └──── piece store
//! ```
//!
//! A session whose announce with nothing left to download is accepted by a
//! tracker is `Declared`. A declared session never dials out but accepts
//! every peer that dials it. If its listen address is in the trust registry
//! of the tracker, the tracker hands it out as the baseline provider.
pub mod admission;
pub mod announcer;
pub mod promotion;
pub mod session;
pub mod swarm;

use std::net::SocketAddr;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use reliable_swarm_configuration::{Client as ClientConfig, Configuration};
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use self::announcer::{HttpTrackerClient, TrackerClient};
use self::session::{Session, Sessions, TorrentHandle};
use self::swarm::connection;
use self::swarm::metainfo::Metainfo;
use self::swarm::storage::{Storage, StoreError};

/// Prefix of the peer IDs of this client.
pub const PEER_ID_PREFIX: &[u8; 8] = b"-RS0001-";

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to bind the client to {addr}: {source}, {location}")]
    UnableToBind {
        addr: SocketAddr,
        source: std::io::Error,
        location: &'static Location<'static>,
    },

    #[error("unable to get the local address of the client: {source}, {location}")]
    UnableToGetLocalAddress {
        source: std::io::Error,
        location: &'static Location<'static>,
    },

    #[error("the torrent {info_hash} was already added")]
    AlreadyAdded { info_hash: InfoHash },

    #[error("the torrent {info_hash} was not found")]
    NotFound { info_hash: InfoHash },

    #[error("invalid storage: {source}")]
    Storage { source: StoreError },
}

/// It generates a random peer ID with the client prefix.
#[must_use]
pub fn generate_peer_id() -> peer::Id {
    let mut id = [0u8; 20];

    id[..PEER_ID_PREFIX.len()].copy_from_slice(PEER_ID_PREFIX);

    for (byte, random) in id[PEER_ID_PREFIX.len()..]
        .iter_mut()
        .zip(thread_rng().sample_iter(&Alphanumeric))
    {
        *byte = random;
    }

    peer::Id(id)
}

/// A client instance.
pub struct Client {
    config: ClientConfig,
    peer_id: peer::Id,
    listen_address: SocketAddr,
    sessions: Sessions,
    tracker_client: Arc<dyn TrackerClient>,
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl Client {
    /// It binds the listener of the client. Trackers are reached over HTTP.
    ///
    /// # Errors
    ///
    /// Will return an error if the listen address can't be bound.
    pub async fn new(config: &Configuration) -> Result<Self, Error> {
        let tracker_client = Arc::new(HttpTrackerClient::new(config.client.announce_timeout()));

        Self::with_tracker_client(config, tracker_client).await
    }

    /// Like [`Client::new`] with a custom way of reaching trackers.
    ///
    /// # Errors
    ///
    /// Will return an error if the listen address can't be bound.
    pub async fn with_tracker_client(config: &Configuration, tracker_client: Arc<dyn TrackerClient>) -> Result<Self, Error> {
        let addr = config.client.listen_address;

        let listener = TcpListener::bind(addr).await.map_err(|source| Error::UnableToBind {
            addr,
            source,
            location: Location::caller(),
        })?;

        let listen_address = listener.local_addr().map_err(|source| Error::UnableToGetLocalAddress {
            source,
            location: Location::caller(),
        })?;

        let client = Self {
            config: config.client.clone(),
            peer_id: generate_peer_id(),
            listen_address,
            sessions: Sessions::default(),
            tracker_client,
            cancel: CancellationToken::new(),
            tasks: TaskTracker::new(),
        };

        client.tasks.spawn(accept_peers(
            listener,
            client.sessions.clone(),
            client.cancel.clone(),
            client.tasks.clone(),
            client.config.dial_timeout(),
        ));

        info!(%listen_address, peer_id = %client.peer_id, "client listening");

        Ok(client)
    }

    #[must_use]
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    #[must_use]
    pub fn peer_id(&self) -> peer::Id {
        self.peer_id
    }

    /// It starts a session for the content. The session announces to the
    /// trackers in the metainfo right away.
    ///
    /// # Errors
    ///
    /// Will return an error if the content was already added or `storage`
    /// does not match the metainfo.
    pub fn add_torrent(&self, metainfo: Metainfo, storage: Storage) -> Result<TorrentHandle, Error> {
        let info_hash = metainfo.info_hash();

        if self.sessions.get(&info_hash).is_some() {
            return Err(Error::AlreadyAdded { info_hash });
        }

        let session = Session::new(
            Arc::new(metainfo),
            storage,
            self.listen_address,
            self.peer_id,
            &self.config,
            self.tracker_client.clone(),
            &self.cancel,
        )
        .map_err(|source| Error::Storage { source })?;

        if !self.sessions.insert(session.clone()) {
            return Err(Error::AlreadyAdded { info_hash });
        }

        session.start();

        info!(%info_hash, role = %session.role(), "torrent added");

        Ok(TorrentHandle::new(session))
    }

    #[must_use]
    pub fn torrent(&self, info_hash: &InfoHash) -> Option<TorrentHandle> {
        self.sessions.get(info_hash).map(TorrentHandle::new)
    }

    /// It stops the session of the content. Its trackers get a `stopped`
    /// announce.
    ///
    /// # Errors
    ///
    /// Will return an error if the content was not added.
    pub async fn remove_torrent(&self, info_hash: &InfoHash) -> Result<(), Error> {
        let session = self
            .sessions
            .remove(info_hash)
            .ok_or(Error::NotFound { info_hash: *info_hash })?;

        session.close().await;

        info!(%info_hash, "torrent removed");

        Ok(())
    }

    /// It waits until every session holds its whole content. Callers bound
    /// the wait with [`tokio::time::timeout`].
    pub async fn wait_all(&self) {
        let sessions = self.sessions.all();

        futures::future::join_all(sessions.iter().map(|session| session.wait_complete())).await;
    }

    /// It stops every session and the listener and waits for all tasks.
    pub async fn close(&self) {
        self.cancel.cancel();

        for session in self.sessions.drain() {
            session.close().await;
        }

        self.tasks.close();
        self.tasks.wait().await;

        info!(listen_address = %self.listen_address, "client closed");
    }
}

async fn accept_peers(
    listener: TcpListener,
    sessions: Sessions,
    cancel: CancellationToken,
    tasks: TaskTracker,
    handshake_timeout: Duration,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    tasks.spawn(connection::accept(sessions.clone(), stream, remote, handshake_timeout));
                }
                Err(err) => warn!(%err, "unable to accept a peer connection"),
            },
        }
    }
}

//! Torrent sessions.
//!
//! A session owns everything the client does for one content: the piece
//! store, the role in the baseline provider promotion, the announcers (one per
//! tracker), the dialer and the peer connections.
//!
//! All the tasks of a session are tracked and share one cancellation token,
//! a child of the client token. Closing the session cancels the token and
//! waits for the tasks, which lets the announcers send their final `stopped`.
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use bytes::Bytes;
use derive_more::Display;
use reliable_swarm_configuration::Client as ClientConfig;
use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;
use tokio::sync::{broadcast, watch, Notify};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use url::Url;

use super::admission::{Admission, AdmissionPolicy, DialBackoff, InboundContext, OutboundContext};
use super::announcer::{AnnounceRequest, AnnounceResponse, Announcer, TrackerClient, TrackerError};
use super::promotion::{Role, RoleEvent};
use super::swarm::connection;
use super::swarm::metainfo::Metainfo;
use super::swarm::storage::{PieceStore, Storage, StoreError};
use super::swarm::throttle::Throttle;

/// Time between two admission rounds of the dialer when nothing changes.
const DIAL_TICK: Duration = Duration::from_secs(1);

const ANNOUNCE_TRIGGERS_CAPACITY: usize = 16;
const HAVE_CAPACITY: usize = 256;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

/// Whether the remote peer is the baseline provider the session learned.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Ordinary,
    BaselineProvider,
}

/// A live peer connection of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerConnection {
    /// The listen address of the remote peer.
    pub remote: SocketAddr,
    pub direction: Direction,
    pub kind: ConnectionKind,
}

#[derive(Debug, Clone, Copy)]
struct ConnectionEntry {
    direction: Direction,
    kind: ConnectionKind,
    established: bool,
}

#[derive(Debug)]
struct SessionState {
    role: Role,
    baseline_provider: Option<SocketAddr>,
    trackers: Vec<Url>,
    tracker_failures: HashMap<Url, u32>,
    tracker_degraded: bool,
    known_peers: HashSet<SocketAddr>,
    /// Keyed by the remote listen address. Dials in progress are included.
    connections: HashMap<SocketAddr, ConnectionEntry>,
    in_flight: HashSet<u32>,
    backoff: DialBackoff,
    small_interval_allowed: bool,
}

impl SessionState {
    fn outbound_connections(&self) -> usize {
        self.connections
            .values()
            .filter(|entry| entry.direction == Direction::Outbound)
            .count()
    }

    fn kind_of(&self, remote: &SocketAddr) -> ConnectionKind {
        if self.baseline_provider.as_ref() == Some(remote) {
            ConnectionKind::BaselineProvider
        } else {
            ConnectionKind::Ordinary
        }
    }
}

pub(crate) struct Session {
    metainfo: Arc<Metainfo>,
    peer_id: peer::Id,
    listen_address: SocketAddr,
    config: ClientConfig,
    policy: AdmissionPolicy,
    tracker_client: Arc<dyn TrackerClient>,
    state: Mutex<SessionState>,
    store: RwLock<PieceStore>,
    throttle: Throttle,
    uploaded: AtomicU64,
    downloaded: AtomicU64,
    dial_attempts: AtomicU64,
    announces: broadcast::Sender<AnnounceEvent>,
    haves: broadcast::Sender<u32>,
    /// Bumped every time pieces go back to the pool.
    pieces_released: watch::Sender<u64>,
    peers_changed: Notify,
    complete: watch::Sender<bool>,
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl Session {
    /// It builds a session for `metainfo`. Nothing runs until
    /// [`Session::start`].
    ///
    /// # Errors
    ///
    /// Will return an error if `storage` does not match the metainfo length.
    pub(crate) fn new(
        metainfo: Arc<Metainfo>,
        storage: Storage,
        listen_address: SocketAddr,
        peer_id: peer::Id,
        config: &ClientConfig,
        tracker_client: Arc<dyn TrackerClient>,
        parent: &CancellationToken,
    ) -> Result<Arc<Self>, StoreError> {
        let store = PieceStore::new(metainfo.clone(), storage)?;
        let is_complete = store.is_complete();

        // Content seeded from existing data skips `Ordinary`.
        let role = if is_complete { Role::Verifying } else { Role::Ordinary };

        let (announces, _) = broadcast::channel(ANNOUNCE_TRIGGERS_CAPACITY);
        let (haves, _) = broadcast::channel(HAVE_CAPACITY);
        let (complete, _) = watch::channel(is_complete);
        let (pieces_released, _) = watch::channel(0);

        Ok(Arc::new(Self {
            metainfo,
            peer_id,
            listen_address,
            config: config.clone(),
            policy: AdmissionPolicy::from(config),
            tracker_client,
            state: Mutex::new(SessionState {
                role,
                baseline_provider: None,
                trackers: vec![],
                tracker_failures: HashMap::new(),
                tracker_degraded: false,
                known_peers: HashSet::new(),
                connections: HashMap::new(),
                in_flight: HashSet::new(),
                backoff: DialBackoff::new(config.dial_backoff()),
                small_interval_allowed: config.small_interval_allowed,
            }),
            store: RwLock::new(store),
            throttle: Throttle::new(config.upload_rate_limit),
            uploaded: AtomicU64::new(0),
            downloaded: AtomicU64::new(0),
            dial_attempts: AtomicU64::new(0),
            announces,
            haves,
            pieces_released,
            peers_changed: Notify::new(),
            complete,
            cancel: parent.child_token(),
            tasks: TaskTracker::new(),
        }))
    }

    /// It spawns the dialer and one announcer per tracker in the metainfo.
    pub(crate) fn start(self: &Arc<Self>) {
        self.tasks.spawn(self.clone().run_dialer());
        self.add_trackers(self.metainfo.trackers().to_vec());
    }

    /// It cancels every task of the session and waits for them.
    pub(crate) async fn close(&self) {
        self.cancel.cancel();
        self.tasks.close();
        self.tasks.wait().await;

        debug!(info_hash = %self.info_hash(), "session closed");
    }

    async fn run_dialer(self: Arc<Self>) {
        let mut tick = tokio::time::interval(DIAL_TICK);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = tick.tick() => {},
                () = self.peers_changed.notified() => {},
            }

            for address in self.admitted_dials() {
                self.dial_attempts.fetch_add(1, Ordering::Relaxed);
                self.tasks.spawn(connection::dial(self.clone(), address));
            }
        }
    }

    /// It runs the outbound admission policy for every peer the session
    /// knows about and registers the admitted dials.
    fn admitted_dials(&self) -> Vec<SocketAddr> {
        let mut state = self.lock_state();

        state.backoff.prune();

        let candidates: Vec<SocketAddr> = state
            .baseline_provider
            .into_iter()
            .chain(state.known_peers.iter().copied())
            .collect();

        let mut admitted = vec![];

        for remote in candidates {
            let context = OutboundContext {
                remote,
                local_listen_address: self.listen_address,
                role: state.role,
                already_connected: state.connections.contains_key(&remote),
                backing_off: state.backoff.is_backing_off(&remote),
                outbound_connections: state.outbound_connections(),
                total_connections: state.connections.len(),
            };

            if self.policy.outbound(&context) == Admission::Allow {
                let kind = state.kind_of(&remote);

                state.connections.insert(
                    remote,
                    ConnectionEntry {
                        direction: Direction::Outbound,
                        kind,
                        established: false,
                    },
                );

                admitted.push(remote);
            }
        }

        admitted
    }

    pub(crate) fn add_trackers(self: &Arc<Self>, trackers: Vec<Url>) {
        if self.cancel.is_cancelled() {
            return;
        }

        let mut added = vec![];

        {
            let mut state = self.lock_state();

            for tracker in trackers {
                if !state.trackers.contains(&tracker) {
                    state.trackers.push(tracker.clone());
                    added.push(tracker);
                }
            }
        }

        for tracker in added {
            debug!(info_hash = %self.info_hash(), %tracker, "tracker added");

            let announcer = Announcer::new(tracker, self.clone(), self.tracker_client.clone());
            self.tasks.spawn(announcer.run());
        }
    }

    pub(crate) fn add_peer_address(&self, address: SocketAddr) {
        {
            self.lock_state().known_peers.insert(address);
        }

        self.peers_changed.notify_one();
    }

    // Announces

    pub(crate) fn announce_request(&self, event: AnnounceEvent) -> AnnounceRequest {
        let left = self.read_store().left();
        let small_interval = self.lock_state().small_interval_allowed;

        AnnounceRequest {
            info_hash: self.info_hash(),
            peer_id: self.peer_id,
            port: self.listen_address.port(),
            uploaded: self.uploaded.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            left,
            event,
            small_interval,
        }
    }

    pub(crate) fn on_announce_success(&self, tracker: &Url, request: &AnnounceRequest, response: &AnnounceResponse) {
        let info_hash = self.info_hash();

        {
            let mut state = self.lock_state();

            state.tracker_failures.remove(tracker);

            if state.tracker_degraded
                && state
                    .tracker_failures
                    .values()
                    .all(|failures| *failures < self.config.max_consecutive_announce_failures)
            {
                state.tracker_degraded = false;
                info!(%info_hash, %tracker, "tracker recovered");
            }

            if request.event == AnnounceEvent::Stopped {
                return;
            }

            if state.baseline_provider != response.baseline_provider {
                info!(%info_hash, baseline_provider = ?response.baseline_provider, "baseline provider changed");
                state.baseline_provider = response.baseline_provider;
            }

            state.known_peers.extend(response.peers.iter().copied());

            if request.left == 0 {
                if let Ok(role) = state.role.transition(RoleEvent::CompletionAcknowledged) {
                    state.role = role;
                    info!(%info_hash, %tracker, "completion acknowledged, the session is declared");
                }
            }
        }

        self.peers_changed.notify_one();
    }

    pub(crate) fn on_announce_failure(&self, tracker: &Url, err: &TrackerError) {
        let info_hash = self.info_hash();
        let mut state = self.lock_state();

        let failures = state.tracker_failures.entry(tracker.clone()).or_insert(0);
        *failures += 1;
        let failures = *failures;

        warn!(%info_hash, %tracker, %err, failures, "announce failed");

        if failures >= self.config.max_consecutive_announce_failures && !state.tracker_degraded {
            state.tracker_degraded = true;
            warn!(%info_hash, %tracker, "tracker degraded");
        }
    }

    pub(crate) fn subscribe_announces(&self) -> broadcast::Receiver<AnnounceEvent> {
        self.announces.subscribe()
    }

    fn trigger_announce(&self, event: AnnounceEvent) {
        // No receivers means no trackers.
        let _ = self.announces.send(event);
    }

    // Pieces

    pub(crate) fn reserve_piece(&self, remote_has: &[bool]) -> Option<u32> {
        let mut state = self.lock_state();

        let index = self
            .read_store()
            .first_missing(remote_has, |index| state.in_flight.contains(&index))?;

        state.in_flight.insert(index);

        Some(index)
    }

    pub(crate) fn release_piece(&self, index: u32) {
        self.lock_state().in_flight.remove(&index);
        self.pieces_released.send_modify(|released| *released = released.wrapping_add(1));
    }

    /// It wakes idle connections when a piece can be requested again.
    pub(crate) fn subscribe_released(&self) -> watch::Receiver<u64> {
        self.pieces_released.subscribe()
    }

    /// It verifies and stores a piece downloaded from a peer.
    ///
    /// # Errors
    ///
    /// Will return an error if the piece does not match its hash.
    pub(crate) fn receive_piece(&self, index: u32, data: Bytes) -> Result<bool, StoreError> {
        let len = data.len() as u64;

        let stored = self.write_store().put_piece(index, data)?;

        if stored {
            self.downloaded.fetch_add(len, Ordering::Relaxed);

            // Connections resend their bitfield when they miss some.
            let _ = self.haves.send(index);

            self.on_piece_verified();
        }

        Ok(stored)
    }

    /// It promotes the session to `Verifying` once every piece is verified.
    pub(crate) fn on_piece_verified(&self) {
        if !self.read_store().is_complete() {
            return;
        }

        self.complete.send_replace(true);

        let mut state = self.lock_state();

        if let Ok(role) = state.role.transition(RoleEvent::PiecesVerified) {
            state.role = role;
            info!(info_hash = %self.info_hash(), "all pieces verified");
            self.trigger_announce(AnnounceEvent::Completed);
        }
    }

    /// It drops every piece and retracts the baseline provider status.
    pub(crate) fn mark_corrupted(&self) {
        self.write_store().invalidate_all();
        self.complete.send_replace(false);

        {
            let mut state = self.lock_state();

            state.in_flight.clear();

            match state.role.transition(RoleEvent::Corrupted) {
                Ok(role) => {
                    warn!(info_hash = %self.info_hash(), from = %state.role, "content corrupted, retracting completion");
                    state.role = role;
                    self.trigger_announce(AnnounceEvent::Stopped);
                }
                Err(err) => debug!(info_hash = %self.info_hash(), %err, "content corrupted"),
            }
        }

        self.pieces_released.send_modify(|released| *released = released.wrapping_add(1));
        self.peers_changed.notify_one();
    }

    pub(crate) fn piece(&self, index: u32) -> Option<Bytes> {
        self.read_store().piece(index)
    }

    pub(crate) fn bitfield(&self) -> Vec<bool> {
        self.read_store().bitfield()
    }

    pub(crate) fn subscribe_have(&self) -> broadcast::Receiver<u32> {
        self.haves.subscribe()
    }

    pub(crate) fn record_upload(&self, bytes: usize) {
        self.uploaded.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn content(&self) -> Option<Bytes> {
        self.read_store().content()
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.read_store().is_complete()
    }

    pub(crate) async fn wait_complete(&self) {
        let mut complete = self.complete.subscribe();

        // The sender lives as long as the session.
        let _ = complete.wait_for(|is_complete| *is_complete).await;
    }

    // Connections

    /// It returns `false` when the dial is no longer registered, which
    /// happens when an inbound connection from the same peer replaced it.
    pub(crate) fn outbound_established(&self, remote: SocketAddr) -> bool {
        let mut state = self.lock_state();

        state.backoff.clear(&remote);

        match state.connections.get_mut(&remote) {
            Some(entry) if entry.direction == Direction::Outbound && !entry.established => {
                entry.established = true;
                debug!(info_hash = %self.info_hash(), %remote, kind = %entry.kind, "outbound connection established");
                true
            }
            _ => false,
        }
    }

    /// A dial that lost to an inbound connection from the same peer leaves
    /// that connection alone and is not backed off.
    pub(crate) fn dial_failed(&self, remote: SocketAddr) {
        let mut state = self.lock_state();

        match state.connections.get(&remote) {
            Some(entry) if entry.direction == Direction::Outbound && !entry.established => {
                state.connections.remove(&remote);
                state.backoff.record_failure(remote);
            }
            Some(_) => {}
            None => state.backoff.record_failure(remote),
        }
    }

    /// It runs the inbound admission policy and registers the connection
    /// when it is admitted. An admitted peer replaces a dial in progress to
    /// the same address.
    pub(crate) fn admit_inbound(&self, remote: SocketAddr, remote_peer_id: peer::Id) -> Admission {
        let mut state = self.lock_state();

        let pending = state.connections.get(&remote).copied();
        let dialing = pending.is_some_and(|entry| !entry.established);

        let context = InboundContext {
            remote,
            already_connected: pending.is_some_and(|entry| entry.established),
            dialing,
            remote_dial_wins: remote_peer_id < self.peer_id,
            total_connections: state.connections.len() - usize::from(dialing),
        };

        let admission = self.policy.inbound(&context);

        if admission.is_allowed() {
            let kind = state.kind_of(&remote);

            state.connections.insert(
                remote,
                ConnectionEntry {
                    direction: Direction::Inbound,
                    kind,
                    established: true,
                },
            );

            debug!(info_hash = %self.info_hash(), %remote, %kind, role = %state.role, replaced_dial = dialing, "inbound connection accepted");
        }

        admission
    }

    /// Outbound connections that end are not dialed again before the
    /// backoff window.
    pub(crate) fn connection_closed(&self, remote: SocketAddr, direction: Direction) {
        let mut state = self.lock_state();

        if state.connections.get(&remote).map(|entry| entry.direction) != Some(direction) {
            return;
        }

        state.connections.remove(&remote);

        if direction == Direction::Outbound && !self.cancel.is_cancelled() {
            state.backoff.record_failure(remote);
        }
    }

    pub(crate) fn connections(&self) -> Vec<PeerConnection> {
        self.lock_state()
            .connections
            .iter()
            .filter(|(_, entry)| entry.established)
            .map(|(remote, entry)| PeerConnection {
                remote: *remote,
                direction: entry.direction,
                kind: entry.kind,
            })
            .collect()
    }

    // Accessors

    pub(crate) fn info_hash(&self) -> InfoHash {
        self.metainfo.info_hash()
    }

    pub(crate) fn peer_id(&self) -> peer::Id {
        self.peer_id
    }

    pub(crate) fn listen_port(&self) -> u16 {
        self.listen_address.port()
    }

    pub(crate) fn piece_count(&self) -> usize {
        self.metainfo.piece_count()
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn dial_timeout(&self) -> Duration {
        self.config.dial_timeout()
    }

    pub(crate) fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn role(&self) -> Role {
        self.lock_state().role
    }

    pub(crate) fn baseline_provider(&self) -> Option<SocketAddr> {
        self.lock_state().baseline_provider
    }

    pub(crate) fn known_peers(&self) -> Vec<SocketAddr> {
        self.lock_state().known_peers.iter().copied().collect()
    }

    pub(crate) fn set_small_interval_allowed(&self, allowed: bool) {
        self.lock_state().small_interval_allowed = allowed;
    }

    pub(crate) fn is_tracker_degraded(&self) -> bool {
        self.lock_state().tracker_degraded
    }

    pub(crate) fn uploaded_bytes(&self) -> u64 {
        self.uploaded.load(Ordering::Relaxed)
    }

    pub(crate) fn downloaded_bytes(&self) -> u64 {
        self.downloaded.load(Ordering::Relaxed)
    }

    pub(crate) fn dial_attempts(&self) -> u64 {
        self.dial_attempts.load(Ordering::Relaxed)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("it should get a lock")
    }

    fn read_store(&self) -> RwLockReadGuard<'_, PieceStore> {
        self.store.read().expect("it should get a read lock")
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, PieceStore> {
        self.store.write().expect("it should get a write lock")
    }
}

/// The sessions of a client, by info-hash.
#[derive(Clone, Default)]
pub(crate) struct Sessions {
    inner: Arc<RwLock<HashMap<InfoHash, Arc<Session>>>>,
}

impl Sessions {
    pub(crate) fn get(&self, info_hash: &InfoHash) -> Option<Arc<Session>> {
        self.inner.read().expect("it should get a read lock").get(info_hash).cloned()
    }

    /// It returns `false` if there is already a session for the info-hash.
    pub(crate) fn insert(&self, session: Arc<Session>) -> bool {
        let mut sessions = self.inner.write().expect("it should get a write lock");

        let info_hash = session.info_hash();

        if sessions.contains_key(&info_hash) {
            return false;
        }

        sessions.insert(info_hash, session);

        true
    }

    pub(crate) fn remove(&self, info_hash: &InfoHash) -> Option<Arc<Session>> {
        self.inner.write().expect("it should get a write lock").remove(info_hash)
    }

    pub(crate) fn all(&self) -> Vec<Arc<Session>> {
        self.inner.read().expect("it should get a read lock").values().cloned().collect()
    }

    pub(crate) fn drain(&self) -> Vec<Arc<Session>> {
        self.inner
            .write()
            .expect("it should get a write lock")
            .drain()
            .map(|(_, session)| session)
            .collect()
    }
}

/// A handle to a torrent added to a [`Client`](super::Client).
#[derive(Clone)]
pub struct TorrentHandle {
    session: Arc<Session>,
}

impl TorrentHandle {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn info_hash(&self) -> InfoHash {
        self.session.info_hash()
    }

    /// Engine event: a piece passed its hash check. The session is promoted
    /// to `Verifying` and announces `completed` when the content is
    /// complete.
    pub fn on_piece_verified(&self) {
        self.session.on_piece_verified();
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// It adds a peer as if a tracker had returned it. Admission applies as
    /// usual, so a declared provider never dials it.
    pub fn add_peer_address(&self, address: SocketAddr) {
        self.session.add_peer_address(address);
    }

    /// It starts announcing to the trackers the session doesn't know yet.
    /// The first announce to each of them is sent right away.
    pub fn add_trackers(&self, trackers: Vec<Url>) {
        self.session.add_trackers(trackers);
    }

    /// The baseline provider address returned by the last tracker response.
    #[must_use]
    pub fn baseline_provider(&self) -> Option<SocketAddr> {
        self.session.baseline_provider()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.session.role()
    }

    /// Peers learned from trackers or added by hand.
    #[must_use]
    pub fn known_peers(&self) -> Vec<SocketAddr> {
        self.session.known_peers()
    }

    pub fn set_small_interval_allowed(&self, allowed: bool) {
        self.session.set_small_interval_allowed(allowed);
    }

    /// It discards the content. A verifying or declared session goes back
    /// to `Ordinary` and sends `stopped` to its trackers.
    pub fn mark_corrupted(&self) {
        self.session.mark_corrupted();
    }

    #[must_use]
    pub fn uploaded_bytes(&self) -> u64 {
        self.session.uploaded_bytes()
    }

    #[must_use]
    pub fn downloaded_bytes(&self) -> u64 {
        self.session.downloaded_bytes()
    }

    #[must_use]
    pub fn is_tracker_degraded(&self) -> bool {
        self.session.is_tracker_degraded()
    }

    /// The whole content, once every piece is verified.
    #[must_use]
    pub fn content(&self) -> Option<Bytes> {
        self.session.content()
    }

    pub async fn wait_complete(&self) {
        self.session.wait_complete().await;
    }

    /// Number of dials the session started.
    #[must_use]
    pub fn dial_attempts(&self) -> u64 {
        self.session.dial_attempts()
    }

    #[must_use]
    pub fn connections(&self) -> Vec<PeerConnection> {
        self.session.connections()
    }
}

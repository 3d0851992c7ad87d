//! Announce scheduler.
//!
//! Every session runs one [`Announcer`] per tracker. An announcer sends:
//!
//! - `started` when it begins, and again after a `stopped` announce,
//! - the event the session triggers (`completed` on entering `Verifying`,
//!   `stopped` on corruption),
//! - a periodic announce (no event) at the interval the tracker advertises,
//! - and a final `stopped` when the session is removed or the client closed.
//!
//! Consecutive failures are counted per tracker. The session is reported as
//! having a degraded tracker when the count reaches
//! `max_consecutive_announce_failures`.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use url::Url;

use super::session::Session;
use crate::shared::bit_torrent::tracker::http::client::requests::announce::QueryBuilder;
use crate::shared::bit_torrent::tracker::http::client::responses::{decode_announce, AnnounceResponse as Decoded, BencodeParseError};
use crate::shared::bit_torrent::tracker::http::client::{self, Client};

/// What a session tells a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: AnnounceEvent,
    pub small_interval: bool,
}

/// What a tracker answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub interval: u32,
    pub min_interval: u32,
    pub peers: Vec<SocketAddr>,
    pub baseline_provider: Option<SocketAddr>,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("unable to send the announce request: {source}")]
    Request { source: client::Error },

    #[error("tracker {url} answered with status {status}")]
    Status { url: Url, status: reqwest::StatusCode },

    #[error("unable to read the announce response: {source}")]
    Body { source: reqwest::Error },

    #[error("unable to decode the announce response: {source}")]
    Decode { source: BencodeParseError },

    #[error("the tracker refused the announce: {reason}")]
    FailureReason { reason: String },

    #[error("the announce timed out")]
    Timeout,
}

/// The way sessions reach trackers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// It sends one announce to `tracker`.
    ///
    /// # Errors
    ///
    /// Will return an error if the tracker can't be reached, times out, or
    /// answers with something other than an announce response.
    async fn announce(&self, tracker: &Url, request: &AnnounceRequest) -> Result<AnnounceResponse, TrackerError>;
}

/// Announces over HTTP.
#[derive(Debug, Clone, Copy)]
pub struct HttpTrackerClient {
    timeout: Duration,
}

impl HttpTrackerClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl TrackerClient for HttpTrackerClient {
    async fn announce(&self, tracker: &Url, request: &AnnounceRequest) -> Result<AnnounceResponse, TrackerError> {
        let query = QueryBuilder::new(request.info_hash, request.peer_id, request.port)
            .with_event(request.event)
            .with_left(request.left)
            .with_transferred(request.uploaded, request.downloaded)
            .with_small_interval(request.small_interval)
            .build();

        let client = Client::new(tracker.clone(), self.timeout).map_err(|source| TrackerError::Request { source })?;

        let response = client.announce(&query).await.map_err(|source| match source {
            client::Error::RequestFailed { ref source, .. } if source.is_timeout() => TrackerError::Timeout,
            source => TrackerError::Request { source },
        })?;

        let status = response.status();

        if !status.is_success() {
            return Err(TrackerError::Status {
                url: tracker.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| TrackerError::Body { source })?;

        match decode_announce(&body).map_err(|source| TrackerError::Decode { source })? {
            Decoded::Success(announce) => Ok(AnnounceResponse {
                interval: announce.interval,
                min_interval: announce.min_interval,
                peers: announce.peer_addresses(),
                baseline_provider: announce.baseline_provider_address(),
            }),
            Decoded::Failure(failure) => Err(TrackerError::FailureReason {
                reason: failure.failure_reason,
            }),
        }
    }
}

/// The announce loop of a session with one tracker.
pub(crate) struct Announcer {
    tracker: Url,
    session: Arc<Session>,
    tracker_client: Arc<dyn TrackerClient>,
    interval: Duration,
    registered: bool,
}

impl Announcer {
    pub(crate) fn new(tracker: Url, session: Arc<Session>, tracker_client: Arc<dyn TrackerClient>) -> Self {
        let interval = Duration::from_secs(u64::from(session.config().default_announce_interval.max(1)));

        Self {
            tracker,
            session,
            tracker_client,
            interval,
            registered: false,
        }
    }

    /// It announces until the session is cancelled, then sends `stopped` if
    /// the tracker knows about the session.
    pub(crate) async fn run(mut self) {
        let mut triggers = self.session.subscribe_announces();
        let cancel = self.session.cancellation().clone();

        let mut event = AnnounceEvent::Started;

        loop {
            // Failures are logged and counted by the session.
            let _ = self.announce(event).await;

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => event = self.periodic_event(),
                trigger = triggers.recv() => match trigger {
                    Ok(triggered) => event = triggered,
                    Err(RecvError::Lagged(_)) => event = self.periodic_event(),
                    Err(RecvError::Closed) => break,
                },
            }
        }

        if self.registered {
            let _ = self.announce(AnnounceEvent::Stopped).await;
        }

        debug!(tracker = %self.tracker, info_hash = %self.session.info_hash(), "announcer stopped");
    }

    /// It sends one announce and hands the outcome to the session.
    pub(crate) async fn announce(&mut self, event: AnnounceEvent) -> Result<(), TrackerError> {
        let request = self.session.announce_request(event);

        debug!(tracker = %self.tracker, info_hash = %request.info_hash, %event, left = request.left, "announce");

        match self.tracker_client.announce(&self.tracker, &request).await {
            Ok(response) => {
                self.registered = event != AnnounceEvent::Stopped;
                self.interval = self.next_interval(&request, &response);
                self.session.on_announce_success(&self.tracker, &request, &response);
                Ok(())
            }
            Err(err) => {
                self.session.on_announce_failure(&self.tracker, &err);
                Err(err)
            }
        }
    }

    fn periodic_event(&self) -> AnnounceEvent {
        if self.registered {
            AnnounceEvent::None
        } else {
            AnnounceEvent::Started
        }
    }

    fn next_interval(&self, request: &AnnounceRequest, response: &AnnounceResponse) -> Duration {
        let interval = if request.small_interval {
            response.interval
        } else {
            response.interval.max(self.session.config().min_announce_interval)
        };

        Duration::from_secs(u64::from(interval.max(1)))
    }

    #[cfg(test)]
    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }
}

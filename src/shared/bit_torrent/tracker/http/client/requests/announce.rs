use std::fmt;

use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::info_hash::InfoHash;
use reliable_swarm_primitives::peer;

use super::Announce;
use crate::shared::bit_torrent::tracker::http::{percent_encode_byte_array, ByteArray20};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Query {
    pub info_hash: ByteArray20,
    pub peer_id: ByteArray20,
    pub port: PortNumber,
    pub downloaded: Option<BaseTenASCII>,
    pub uploaded: Option<BaseTenASCII>,
    pub left: Option<BaseTenASCII>,
    pub event: Option<AnnounceEvent>,
    pub small_interval: bool,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", QueryParams::from(self))
    }
}

pub type BaseTenASCII = u64;
pub type PortNumber = u16;

#[derive(Debug)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(info_hash: InfoHash, peer_id: peer::Id, port: u16) -> QueryBuilder {
        Self {
            query: Query {
                info_hash: info_hash.0,
                peer_id: peer_id.0,
                port,
                downloaded: None,
                uploaded: None,
                left: None,
                event: None,
                small_interval: false,
            },
        }
    }

    /// A periodic announce (`AnnounceEvent::None`) sends no `event` param.
    #[must_use]
    pub fn with_event(mut self, event: AnnounceEvent) -> Self {
        self.query.event = if event.is_periodic() { None } else { Some(event) };
        self
    }

    #[must_use]
    pub fn with_left(mut self, left: BaseTenASCII) -> Self {
        self.query.left = Some(left);
        self
    }

    #[must_use]
    pub fn with_transferred(mut self, uploaded: BaseTenASCII, downloaded: BaseTenASCII) -> Self {
        self.query.uploaded = Some(uploaded);
        self.query.downloaded = Some(downloaded);
        self
    }

    #[must_use]
    pub fn with_small_interval(mut self, small_interval: bool) -> Self {
        self.query.small_interval = small_interval;
        self
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn build(self) -> Announce {
        self.query.into()
    }
}

/// It contains all the GET parameters that can be used in a HTTP Announce request.
///
/// Sample Announce URL with all the GET parameters (mandatory and optional):
///
/// ```text
/// http://127.0.0.1:7070/announce?
///     info_hash=%9C8B%22%13%E3%0B%FF%21%2B0%C3%60%D2o%9A%02%13d%22 (mandatory)
///     peer_id=%2DRS0001%2D000000000001 (mandatory)
///     port=4000 (mandatory)
///     downloaded=0
///     uploaded=0
///     left=0
///     event=completed
///     small_interval=1
/// ```
#[derive(Debug, Default)]
pub struct QueryParams {
    pub info_hash: Option<String>,
    pub peer_id: Option<String>,
    pub port: Option<String>,
    pub downloaded: Option<String>,
    pub uploaded: Option<String>,
    pub left: Option<String>,
    pub event: Option<String>,
    pub small_interval: Option<String>,
}

/// It builds the URL query component for the announce request.
///
/// This custom URL query params encoding is needed because `reqwest` does not allow
/// bytes arrays in query parameters. More info on this issue:
///
/// <https://github.com/seanmonstar/reqwest/issues/1613>
impl std::fmt::Display for QueryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = [
            ("info_hash", &self.info_hash),
            ("peer_id", &self.peer_id),
            ("port", &self.port),
            ("downloaded", &self.downloaded),
            ("uploaded", &self.uploaded),
            ("left", &self.left),
            ("event", &self.event),
            ("small_interval", &self.small_interval),
        ];

        let query = params
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|value| format!("{name}={value}")))
            .collect::<Vec<String>>()
            .join("&");

        write!(f, "{query}")
    }
}

impl From<&Announce> for QueryParams {
    fn from(value: &Announce) -> Self {
        let query: &Query = &Announce::into(*value);
        query.into()
    }
}

impl From<&Query> for QueryParams {
    fn from(value: &Query) -> Self {
        let query = value;

        Self {
            info_hash: Some(percent_encode_byte_array(&query.info_hash)),
            peer_id: Some(percent_encode_byte_array(&query.peer_id)),
            port: Some(query.port.to_string()),
            downloaded: query.downloaded.as_ref().map(std::string::ToString::to_string),
            uploaded: query.uploaded.as_ref().map(std::string::ToString::to_string),
            left: query.left.as_ref().map(std::string::ToString::to_string),
            event: query.event.as_ref().map(std::string::ToString::to_string),
            small_interval: query.small_interval.then(|| "1".to_string()),
        }
    }
}

impl QueryParams {
    pub fn remove_optional_params(&mut self) {
        self.downloaded = None;
        self.uploaded = None;
        self.left = None;
        self.event = None;
        self.small_interval = None;
    }

    /// # Panics
    ///
    /// Will panic if invalid param name is provided.
    pub fn set(&mut self, param_name: &str, param_value: &str) {
        match param_name {
            "info_hash" => self.info_hash = Some(param_value.to_string()),
            "peer_id" => self.peer_id = Some(param_value.to_string()),
            "port" => self.port = Some(param_value.to_string()),
            "downloaded" => self.downloaded = Some(param_value.to_string()),
            "uploaded" => self.uploaded = Some(param_value.to_string()),
            "left" => self.left = Some(param_value.to_string()),
            "event" => self.event = Some(param_value.to_string()),
            "small_interval" => self.small_interval = Some(param_value.to_string()),
            &_ => panic!("Invalid param name for announce query"),
        }
    }
}

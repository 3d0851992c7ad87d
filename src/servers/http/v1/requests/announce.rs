//! `Announce` request for the HTTP tracker.
//!
//! Data structures and logic for parsing the `announce` request.
use std::panic::Location;
use std::str::FromStr;

use reliable_swarm_primitives::announce_event::AnnounceEvent;
use reliable_swarm_primitives::info_hash::{self, InfoHash};
use reliable_swarm_primitives::peer::{self, IdConversionError};
use thiserror::Error;

use crate::servers::http::percent_encoding::{percent_decode_info_hash, percent_decode_peer_id};
use crate::servers::http::v1::query::{ParseQueryError, Query};
use crate::servers::http::v1::responses;

/// The number of bytes `downloaded`, `uploaded` or `left`.
pub type NumberOfBytes = i64;

// Query param names
const INFO_HASH: &str = "info_hash";
const PEER_ID: &str = "peer_id";
const PORT: &str = "port";
const DOWNLOADED: &str = "downloaded";
const UPLOADED: &str = "uploaded";
const LEFT: &str = "left";
const EVENT: &str = "event";
const SMALL_INTERVAL: &str = "small_interval";

/// The `Announce` request. Fields use the domain types after parsing the
/// query params of the request.
///
/// ```rust
/// use reliable_swarm::servers::http::v1::requests::announce::Announce;
/// use reliable_swarm_primitives::announce_event::AnnounceEvent;
/// use reliable_swarm_primitives::info_hash::InfoHash;
/// use reliable_swarm_primitives::peer;
///
/// let request = Announce {
///     // Mandatory params
///     info_hash: "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap(),
///     peer_id: peer::Id(*b"-RS0001-000000000001"),
///     port: 4000,
///     // Optional params
///     downloaded: Some(1),
///     uploaded: Some(2),
///     left: Some(0),
///     event: AnnounceEvent::Completed,
///     small_interval: false,
/// };
/// ```
///
/// > **NOTICE**: The struct does not contain the `IP` of the peer. The
/// tracker takes it from the connection.
#[derive(Debug, PartialEq)]
pub struct Announce {
    // Mandatory params
    /// The `InfoHash` of the torrent.
    pub info_hash: InfoHash,
    /// The `peer::Id` of the peer.
    pub peer_id: peer::Id,
    /// The port the peer accepts connections on.
    pub port: u16,

    // Optional params
    /// The number of bytes downloaded by the peer.
    pub downloaded: Option<NumberOfBytes>,

    /// The number of bytes uploaded by the peer.
    pub uploaded: Option<NumberOfBytes>,

    /// The number of bytes left to download by the peer. Absent means `0`.
    pub left: Option<NumberOfBytes>,

    /// The event that the peer is reporting. `None` for periodic announces.
    pub event: AnnounceEvent,

    /// The peer asks to be told to announce again soon.
    pub small_interval: bool,
}

/// Errors that can occur when parsing the `Announce` request.
#[derive(Error, Debug)]
pub enum ParseAnnounceQueryError {
    /// A mandatory param is missing.
    #[error("missing query params for announce request in {location}")]
    MissingParams { location: &'static Location<'static> },
    #[error("missing param {param_name} in {location}")]
    MissingParam {
        location: &'static Location<'static>,
        param_name: String,
    },
    /// The param cannot be parsed into the domain type.
    #[error("invalid param value {param_value} for {param_name} in {location}")]
    InvalidParam {
        param_name: String,
        param_value: String,
        location: &'static Location<'static>,
    },
    /// The param value is out of range.
    #[error("param value overflow {param_value} for {param_name} in {location}")]
    NumberOfBytesOverflow {
        param_name: String,
        param_value: String,
        location: &'static Location<'static>,
    },
    /// The `info_hash` is invalid.
    #[error("invalid param value {param_value} for {param_name} in {source}")]
    InvalidInfoHashParam {
        param_name: String,
        param_value: String,
        source: info_hash::ConversionError,
    },
    /// The `peer_id` is invalid.
    #[error("invalid param value {param_value} for {param_name} in {source}")]
    InvalidPeerIdParam {
        param_name: String,
        param_value: String,
        source: IdConversionError,
    },
}

impl From<ParseQueryError> for responses::error::Error {
    fn from(err: ParseQueryError) -> Self {
        responses::error::Error {
            failure_reason: format!("Cannot parse query params: {err}"),
        }
    }
}

impl From<ParseAnnounceQueryError> for responses::error::Error {
    fn from(err: ParseAnnounceQueryError) -> Self {
        responses::error::Error {
            failure_reason: format!("Cannot parse query params for announce request: {err}"),
        }
    }
}

impl TryFrom<Query> for Announce {
    type Error = ParseAnnounceQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        Ok(Self {
            info_hash: extract_info_hash(&query)?,
            peer_id: extract_peer_id(&query)?,
            port: extract_port(&query)?,
            downloaded: extract_number_of_bytes_from_param(DOWNLOADED, &query)?,
            uploaded: extract_number_of_bytes_from_param(UPLOADED, &query)?,
            left: extract_number_of_bytes_from_param(LEFT, &query)?,
            event: extract_event(&query)?,
            small_interval: extract_small_interval(&query)?,
        })
    }
}

// Mandatory params

fn extract_info_hash(query: &Query) -> Result<InfoHash, ParseAnnounceQueryError> {
    let raw_param = required_param(query, INFO_HASH)?;

    percent_decode_info_hash(&raw_param).map_err(|source| ParseAnnounceQueryError::InvalidInfoHashParam {
        param_name: INFO_HASH.to_owned(),
        param_value: raw_param.clone(),
        source,
    })
}

fn extract_peer_id(query: &Query) -> Result<peer::Id, ParseAnnounceQueryError> {
    let raw_param = required_param(query, PEER_ID)?;

    percent_decode_peer_id(&raw_param).map_err(|source| ParseAnnounceQueryError::InvalidPeerIdParam {
        param_name: PEER_ID.to_owned(),
        param_value: raw_param.clone(),
        source,
    })
}

fn extract_port(query: &Query) -> Result<u16, ParseAnnounceQueryError> {
    let raw_param = required_param(query, PORT)?;

    u16::from_str(&raw_param).map_err(|_e| invalid_param(PORT, &raw_param))
}

#[track_caller]
fn required_param(query: &Query, param_name: &str) -> Result<String, ParseAnnounceQueryError> {
    query.get_param(param_name).ok_or(ParseAnnounceQueryError::MissingParam {
        location: Location::caller(),
        param_name: param_name.to_owned(),
    })
}

// Optional params

fn extract_number_of_bytes_from_param(param_name: &str, query: &Query) -> Result<Option<NumberOfBytes>, ParseAnnounceQueryError> {
    let Some(raw_param) = query.get_param(param_name) else {
        return Ok(None);
    };

    let number_of_bytes = u64::from_str(&raw_param).map_err(|_e| invalid_param(param_name, &raw_param))?;

    Ok(Some(i64::try_from(number_of_bytes).map_err(|_e| {
        ParseAnnounceQueryError::NumberOfBytesOverflow {
            param_name: param_name.to_owned(),
            param_value: raw_param.clone(),
            location: Location::caller(),
        }
    })?))
}

fn extract_event(query: &Query) -> Result<AnnounceEvent, ParseAnnounceQueryError> {
    match query.get_param(EVENT).as_deref() {
        None | Some("") => Ok(AnnounceEvent::None),
        Some("started") => Ok(AnnounceEvent::Started),
        Some("stopped") => Ok(AnnounceEvent::Stopped),
        Some("completed") => Ok(AnnounceEvent::Completed),
        Some(raw_param) => Err(invalid_param(EVENT, raw_param)),
    }
}

fn extract_small_interval(query: &Query) -> Result<bool, ParseAnnounceQueryError> {
    match query.get_param(SMALL_INTERVAL).as_deref() {
        None | Some("0") => Ok(false),
        Some("" | "1") => Ok(true),
        Some(raw_param) => Err(invalid_param(SMALL_INTERVAL, raw_param)),
    }
}

#[track_caller]
fn invalid_param(param_name: &str, param_value: &str) -> ParseAnnounceQueryError {
    ParseAnnounceQueryError::InvalidParam {
        param_name: param_name.to_owned(),
        param_value: param_value.to_owned(),
        location: Location::caller(),
    }
}

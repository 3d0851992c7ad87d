use std::sync::Arc;

use thiserror::Error;

pub mod announce;
pub mod error;

/// A decoded body of an `announce` response.
#[derive(Debug, PartialEq)]
pub enum AnnounceResponse {
    Success(announce::Announce),
    Failure(error::Error),
}

#[derive(Debug, Error, Clone)]
pub enum BencodeParseError {
    #[error("Failed to deserialize the serde bencoded response data with the error: \"{err:?}\"")]
    ParseSerdeBencodeError { data: Vec<u8>, err: Arc<serde_bencode::Error> },
}

/// It decodes the body of an `announce` response.
///
/// Trackers answer errors with status `200` and a `failure reason`
/// dictionary, so the body has to be inspected to tell them apart.
///
/// # Errors
///
/// Will return an error if the body is neither an announce response nor a
/// failure.
pub fn decode_announce(bytes: &[u8]) -> Result<AnnounceResponse, BencodeParseError> {
    if let Ok(failure) = serde_bencode::from_bytes::<error::Error>(bytes) {
        return Ok(AnnounceResponse::Failure(failure));
    }

    serde_bencode::from_bytes::<announce::Announce>(bytes)
        .map(AnnounceResponse::Success)
        .map_err(|err| BencodeParseError::ParseSerdeBencodeError {
            data: bytes.to_vec(),
            err: err.into(),
        })
}

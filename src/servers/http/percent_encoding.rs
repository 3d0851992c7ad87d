//! Percent decoding of the binary query params: `info_hash` and `peer_id`.
//!
//! Both are 20-byte arrays that are not necessarily valid UTF-8, so they are
//! decoded to raw bytes first and then converted to the domain type.
use reliable_swarm_primitives::info_hash::{self, InfoHash};
use reliable_swarm_primitives::peer;

/// Percent decodes a percent encoded infohash.
///
/// ```rust
/// use std::str::FromStr;
/// use reliable_swarm::servers::http::percent_encoding::percent_decode_info_hash;
/// use reliable_swarm_primitives::info_hash::InfoHash;
///
/// let encoded_infohash = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";
///
/// let info_hash = percent_decode_info_hash(encoded_infohash).unwrap();
///
/// assert_eq!(
///     info_hash,
///     InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap()
/// );
/// ```
///
/// # Errors
///
/// Will return `Err` if the decoded bytes are not exactly 20.
pub fn percent_decode_info_hash(raw_info_hash: &str) -> Result<InfoHash, info_hash::ConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_info_hash).collect::<Vec<u8>>();
    InfoHash::try_from(bytes)
}

/// Percent decodes a percent encoded peer id.
///
/// # Errors
///
/// Will return `Err` if the decoded bytes are not exactly 20.
pub fn percent_decode_peer_id(raw_peer_id: &str) -> Result<peer::Id, peer::IdConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_peer_id).collect::<Vec<u8>>();
    peer::Id::try_from(bytes)
}

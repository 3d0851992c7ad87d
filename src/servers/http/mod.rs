//! HTTP tracker.
//!
//! The tracker only exposes the `announce` request and a health check.
//!
//! # Announce
//!
//! ```text
//! GET /announce?info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0
//!     &peer_id=-RS0001-000000000001
//!     &port=4000
//!     &uploaded=0
//!     &downloaded=0
//!     &left=0
//!     &event=completed
//!     &small_interval=1
//! ```
//!
//! Parameter        | Type    | Mandatory | Description
//! -----------------|---------|-----------|-----------------------------------------------
//! `info_hash`      | 20 bytes| Yes       | Percent encoded content identifier
//! `peer_id`        | 20 bytes| Yes       | Percent encoded peer id
//! `port`           | u16     | Yes       | Port the peer accepts connections on
//! `uploaded`       | u64     | No        | Bytes uploaded so far
//! `downloaded`     | u64     | No        | Bytes downloaded so far
//! `left`           | u64     | No        | Bytes still missing. `0` means complete
//! `event`          | string  | No        | `started`, `stopped` or `completed`
//! `small_interval` | `0`/`1` | No        | Ask for the short announce interval
//!
//! The IP of the peer is always the IP of the HTTP connection. A peer
//! cannot announce on behalf of another address.
//!
//! The response is a bencoded dictionary:
//!
//! ```text
//! d17:baseline providerd2:ip9:126.0.0.14:porti4000ee
//!   8:completei1e10:incompletei1e8:intervali120e12:min intervali120e
//!   5:peersld2:ip9:126.0.0.27:peer id20:-RS0001-0000000000024:porti6000eeee
//! ```
//!
//! The `baseline provider` key is only present when the content has a
//! provider and the requester is not that provider.
//!
//! Errors are bencoded too, with a `200 OK` status code:
//!
//! ```text
//! d14:failure reason...e
//! ```
//!
//! # Health check
//!
//! `GET /health_check` returns `{"status":"Ok"}`.
pub mod percent_encoding;
pub mod server;
pub mod v1;

pub const HTTP_TRACKER_LOG_TARGET: &str = "HTTP TRACKER";

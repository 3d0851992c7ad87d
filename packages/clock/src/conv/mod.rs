//! Conversions between timestamps and calendar dates, used when logging.
use chrono::{DateTime, Utc};
use reliable_swarm_primitives::DurationSinceUnixEpoch;

/// It converts a timestamp to a `DateTime::<Utc>`.
///
/// Timestamps out of the `chrono` range are clamped to the Unix Epoch.
#[must_use]
pub fn convert_from_timestamp_to_datetime_utc(duration: DurationSinceUnixEpoch) -> DateTime<Utc> {
    i64::try_from(duration.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, duration.subsec_nanos()))
        .unwrap_or_default()
}

/// It renders a timestamp as an RFC 3339 string, e.g. `1970-01-01T00:00:00+00:00`.
#[must_use]
pub fn format_timestamp(duration: DurationSinceUnixEpoch) -> String {
    convert_from_timestamp_to_datetime_utc(duration).to_rfc3339()
}

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Announce events. Described on the
/// [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
///
/// `None` is the regular, periodic announce.
#[derive(Hash, Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AnnounceEvent {
    /// The peer has started downloading the content.
    #[display("started")]
    Started,
    /// The peer has ceased downloading or seeding the content.
    #[display("stopped")]
    Stopped,
    /// The peer has completed downloading the content.
    #[display("completed")]
    Completed,
    /// This is one of the announcements done at regular intervals.
    #[default]
    #[display("")]
    None,
}

impl AnnounceEvent {
    /// Whether the event should be sent on the wire.
    #[must_use]
    pub fn is_periodic(&self) -> bool {
        *self == AnnounceEvent::None
    }
}

#[cfg(test)]
mod tests {
    use super::AnnounceEvent;

    #[test]
    fn it_should_be_displayed_as_the_query_param_value() {
        assert_eq!(AnnounceEvent::Started.to_string(), "started");
        assert_eq!(AnnounceEvent::Stopped.to_string(), "stopped");
        assert_eq!(AnnounceEvent::Completed.to_string(), "completed");
        assert_eq!(AnnounceEvent::None.to_string(), "");
    }

    #[test]
    fn the_periodic_announce_should_have_no_event() {
        assert!(AnnounceEvent::default().is_periodic());
        assert!(!AnnounceEvent::Completed.is_periodic());
    }
}

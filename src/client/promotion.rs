//! Baseline provider promotion of a torrent session.
//!
//! ```text
//!              pieces verified            completion acknowledged
//!   Ordinary ------------------> Verifying ------------------------> Declared
//!      ^                             |                                  |
//!      |         corrupted           |             corrupted            |
//!      +-----------------------------+----------------------------------+
//! ```
//!
//! Local completion alone is not enough to become a provider. A session in
//! `Verifying` holds the whole content but only becomes `Declared` once a
//! tracker has accepted an announce reporting nothing left to download.
//! Whether the tracker hands the address out as the baseline provider is up
//! to its trust registry.
use derive_more::Display;
use thiserror::Error;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Some pieces are missing or have not been verified yet.
    #[default]
    Ordinary,
    /// Every piece is verified. The tracker has not acknowledged it yet.
    Verifying,
    /// The tracker accepted a complete announce from this session.
    Declared,
}

/// Events that move a session between roles.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RoleEvent {
    /// The piece store reached 100% verified pieces.
    PiecesVerified,
    /// A tracker accepted an announce with nothing left to download.
    CompletionAcknowledged,
    /// Data was found corrupted or removed.
    Corrupted,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a session in the {from} role cannot handle the {event} event")]
    InvalidTransition { from: Role, event: RoleEvent },
}

impl Role {
    /// It returns the role reached after `event`.
    ///
    /// # Errors
    ///
    /// Will return an error if `event` is not valid in the current role. The
    /// caller keeps its role in that case.
    pub fn transition(self, event: RoleEvent) -> Result<Role, TransitionError> {
        match (self, event) {
            (Role::Ordinary, RoleEvent::PiecesVerified) => Ok(Role::Verifying),
            (Role::Verifying, RoleEvent::CompletionAcknowledged) => Ok(Role::Declared),
            (Role::Verifying | Role::Declared, RoleEvent::Corrupted) => Ok(Role::Ordinary),
            (from, event) => Err(TransitionError::InvalidTransition { from, event }),
        }
    }

    #[must_use]
    pub fn is_declared(&self) -> bool {
        *self == Role::Declared
    }

    /// Whether the session holds the whole content.
    #[must_use]
    pub fn holds_complete_content(&self) -> bool {
        matches!(self, Role::Verifying | Role::Declared)
    }
}

#[cfg(test)]
mod tests {
    mod the_promotion_state_machine {
        use crate::client::promotion::{Role, RoleEvent, TransitionError};

        #[test]
        fn a_new_session_should_start_as_ordinary() {
            assert_eq!(Role::default(), Role::Ordinary);
        }

        #[test]
        fn an_ordinary_session_should_start_verifying_when_all_pieces_are_verified() {
            assert_eq!(Role::Ordinary.transition(RoleEvent::PiecesVerified), Ok(Role::Verifying));
        }

        #[test]
        fn a_verifying_session_should_be_declared_once_the_tracker_acknowledges_the_completion() {
            assert_eq!(
                Role::Verifying.transition(RoleEvent::CompletionAcknowledged),
                Ok(Role::Declared)
            );
        }

        #[test]
        fn local_completion_alone_should_not_declare_an_ordinary_session() {
            assert_eq!(
                Role::Ordinary.transition(RoleEvent::CompletionAcknowledged),
                Err(TransitionError::InvalidTransition {
                    from: Role::Ordinary,
                    event: RoleEvent::CompletionAcknowledged
                })
            );
        }

        #[test]
        fn corruption_should_demote_a_verifying_or_declared_session_to_ordinary() {
            assert_eq!(Role::Verifying.transition(RoleEvent::Corrupted), Ok(Role::Ordinary));
            assert_eq!(Role::Declared.transition(RoleEvent::Corrupted), Ok(Role::Ordinary));
        }

        #[test]
        fn corruption_should_be_rejected_for_an_ordinary_session() {
            assert!(Role::Ordinary.transition(RoleEvent::Corrupted).is_err());
        }

        #[test]
        fn a_declared_session_should_reject_being_verified_or_acknowledged_again() {
            assert!(Role::Declared.transition(RoleEvent::PiecesVerified).is_err());
            assert!(Role::Declared.transition(RoleEvent::CompletionAcknowledged).is_err());
        }

        #[test]
        fn only_verifying_and_declared_sessions_should_hold_the_complete_content() {
            assert!(!Role::Ordinary.holds_complete_content());
            assert!(Role::Verifying.holds_complete_content());
            assert!(Role::Declared.holds_complete_content());
        }
    }
}

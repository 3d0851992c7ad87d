use std::time::Duration;

use reliable_swarm_primitives::DurationSinceUnixEpoch;

use self::stopped::StoppedClock;
use self::working::WorkingClock;

pub mod stopped;
pub mod working;

/// A clock, either the working one (production) or the stopped one (tests).
#[derive(Debug)]
pub struct Clock<T> {
    clock: std::marker::PhantomData<T>,
}

/// The working clock. It returns the current time.
pub type Working = Clock<WorkingClock>;
/// The stopped clock. It returns always the same fixed time.
pub type Stopped = Clock<StoppedClock>;

/// Trait for types that can be used as a timestamp clock.
pub trait Time: Sized {
    fn now() -> DurationSinceUnixEpoch;

    #[must_use]
    fn now_add(add_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_add(*add_time)
    }

    #[must_use]
    fn now_sub(sub_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_sub(*sub_time)
    }

    /// The oldest timestamp still considered fresh for the given maximum age.
    ///
    /// Saturates at the Unix Epoch.
    #[must_use]
    fn cutoff(max_age: &Duration) -> DurationSinceUnixEpoch {
        Self::now_sub(max_age).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use std::time::Duration;

    use crate::clock::stopped::Stopped as _;
    use crate::clock::{Stopped, Time, Working};
    use crate::CurrentClock;

    #[test]
    fn it_should_be_the_stopped_clock_as_default_when_testing() {
        assert_eq!(TypeId::of::<Stopped>(), TypeId::of::<CurrentClock>());
        assert_eq!(Stopped::now(), CurrentClock::now());
    }

    #[test]
    fn it_should_have_different_times() {
        assert_ne!(TypeId::of::<Stopped>(), TypeId::of::<Working>());
        assert_ne!(Stopped::now(), Working::now());
    }

    #[test]
    fn the_cutoff_should_saturate_at_the_unix_epoch() {
        Stopped::local_set(&Duration::from_secs(10));

        assert_eq!(Stopped::cutoff(&Duration::from_secs(900)), Duration::ZERO);
        assert_eq!(Stopped::cutoff(&Duration::from_secs(4)), Duration::from_secs(6));

        Stopped::local_reset();
    }
}

use std::num::IntErrorKind;
use std::time::Duration;

use super::{DurationSinceUnixEpoch, Time};
use crate::clock;

#[allow(clippy::module_name_repetitions)]
pub struct StoppedClock {}

/// A clock stopped at a given time. The time is kept per thread.
#[allow(clippy::module_name_repetitions)]
pub trait Stopped: clock::Time {
    /// It sets the clock to a given time.
    fn local_set(unix_time: &DurationSinceUnixEpoch);

    /// It moves the clock forward.
    ///
    /// # Errors
    ///
    /// Will return `IntErrorKind` if `duration` would overflow the internal `Duration`.
    fn local_add(duration: &Duration) -> Result<(), IntErrorKind>;

    /// It moves the clock backwards.
    ///
    /// # Errors
    ///
    /// Will return `IntErrorKind` if `duration` would underflow the internal `Duration`.
    fn local_sub(duration: &Duration) -> Result<(), IntErrorKind>;

    /// It resets the clock to the default fixed time: the Unix Epoch when testing, the app start time otherwise.
    fn local_reset();
}

impl Time for clock::Stopped {
    fn now() -> DurationSinceUnixEpoch {
        detail::FIXED_TIME.with(|time| *time.borrow())
    }
}

impl Stopped for clock::Stopped {
    fn local_set(unix_time: &DurationSinceUnixEpoch) {
        detail::FIXED_TIME.with(|time| {
            *time.borrow_mut() = *unix_time;
        });
    }

    fn local_add(duration: &Duration) -> Result<(), IntErrorKind> {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            *time.borrow_mut() = current.checked_add(*duration).ok_or(IntErrorKind::PosOverflow)?;
            Ok(())
        })
    }

    fn local_sub(duration: &Duration) -> Result<(), IntErrorKind> {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            *time.borrow_mut() = current.checked_sub(*duration).ok_or(IntErrorKind::NegOverflow)?;
            Ok(())
        })
    }

    fn local_reset() {
        Self::local_set(&detail::get_default_fixed_time());
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use reliable_swarm_primitives::DurationSinceUnixEpoch;

    use crate::clock::stopped::Stopped as _;
    use crate::clock::{Stopped, Time, Working};

    #[test]
    fn it_should_default_to_zero_when_testing() {
        assert_eq!(Stopped::now(), DurationSinceUnixEpoch::ZERO);
    }

    #[test]
    fn it_should_be_possible_to_move_the_time_forward_and_back() {
        Stopped::local_set(&Duration::from_secs(100));

        Stopped::local_add(&Duration::from_secs(900)).unwrap();
        assert_eq!(Stopped::now(), Duration::from_secs(1000));

        Stopped::local_sub(&Duration::from_secs(1)).unwrap();
        assert_eq!(Stopped::now(), Duration::from_secs(999));

        Stopped::local_reset();
        assert_eq!(Stopped::now(), Duration::ZERO);
    }

    #[test]
    fn it_should_not_underflow_the_unix_epoch() {
        assert!(Stopped::local_sub(&Duration::from_secs(1)).is_err());
    }

    #[test]
    fn it_should_keep_a_separate_time_per_thread() {
        let after5 = Working::now_add(&Duration::from_secs(5)).unwrap();
        Stopped::local_set(&after5);

        let t = thread::spawn(move || {
            assert_eq!(Stopped::now(), Duration::ZERO);
        });

        t.join().unwrap();

        assert_eq!(Stopped::now(), after5);

        Stopped::local_reset();
    }
}

mod detail {
    use std::cell::RefCell;

    use reliable_swarm_primitives::DurationSinceUnixEpoch;

    thread_local!(pub static FIXED_TIME: RefCell<DurationSinceUnixEpoch> = RefCell::new(get_default_fixed_time()));

    /// Outside tests the stopped clock starts at the time the app started.
    #[cfg(not(test))]
    pub fn get_default_fixed_time() -> DurationSinceUnixEpoch {
        (*crate::static_time::TIME_AT_APP_START)
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn get_default_fixed_time() -> DurationSinceUnixEpoch {
        DurationSinceUnixEpoch::ZERO
    }
}

use std::time::Duration;

use reliable_swarm_clock::clock::stopped::Stopped as _;
use reliable_swarm_clock::clock::Time;

use crate::CurrentClock;

#[test]
fn the_stopped_clock_should_not_advance_on_its_own() {
    let before = CurrentClock::now();
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(CurrentClock::now(), before);
}

#[test]
fn the_staleness_cutoff_should_follow_the_stopped_clock() {
    CurrentClock::local_set(&Duration::from_secs(1_000));
    assert_eq!(CurrentClock::cutoff(&Duration::from_secs(900)), Duration::from_secs(100));

    CurrentClock::local_add(&Duration::from_secs(901)).unwrap();
    assert_eq!(CurrentClock::cutoff(&Duration::from_secs(900)), Duration::from_secs(1_001));

    CurrentClock::local_reset();
}

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng, RngCore};

/// Returns a random alphanumeric string of a certain size.
#[must_use]
pub fn string(size: usize) -> String {
    thread_rng().sample_iter(&Alphanumeric).take(size).map(char::from).collect()
}

/// Returns `size` random bytes, used as content to distribute in tests.
#[must_use]
pub fn bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    thread_rng().fill_bytes(&mut data);
    data
}

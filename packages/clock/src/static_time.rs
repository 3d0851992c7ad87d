//! The time at which the application started.
use std::time::SystemTime;

lazy_static! {
    /// Initialised the first time it is read, which the clocks do on startup.
    pub static ref TIME_AT_APP_START: SystemTime = SystemTime::now();
}

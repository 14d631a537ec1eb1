use jiff::Timestamp;
use std::sync::{Arc, Mutex};

/// Time source for batch stamping and expiration checks.
///
/// Injectable so the minting engine can be tested against a fixed
/// point in time.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;
}

/// Wall clock; the production implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock pinned to an explicit timestamp, advanced manually.
///
/// Only useful in tests, but lives here (not behind `cfg(test)`) so
/// downstream crates can inject it into their own test fixtures.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`. Clones observe the change.
    pub fn set(&self, now: Timestamp) {
        *self
            .now
            .lock()
            .expect("fixed clock lock should not be poisoned") = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self
            .now
            .lock()
            .expect("fixed clock lock should not be poisoned")
    }
}

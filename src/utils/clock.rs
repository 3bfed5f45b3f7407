//! Time source abstraction for testability
//!
//! Due-date decisions, archive names and the recency window all read the
//! current time through [`Clock`] so tests can pin "now".

use chrono::{DateTime, Local};

/// Abstraction over the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Default implementation reading the system clock
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A fixed clock for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Clock returning a settable instant
    #[derive(Clone, Debug)]
    pub struct FixedClock {
        now: Arc<Mutex<DateTime<Local>>>,
    }

    impl FixedClock {
        pub fn new(now: DateTime<Local>) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        /// Move the clock to a new instant
        pub fn set(&self, now: DateTime<Local>) {
            *self.now.lock().unwrap() = now;
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }
    }
}

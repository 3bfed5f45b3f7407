pub mod archiver;
pub mod clock;
pub mod error;
pub mod locator;
pub mod locker;
pub mod naming;
pub mod retention;
pub mod scanner;
pub mod schedule;

// Re-export commonly used types and traits (used by test crate)
#[allow(unused_imports)]
pub use clock::{Clock, SystemClock};
#[allow(unused_imports)]
pub use error::{ArchiveError, LockError, ScanError};
#[allow(unused_imports)]
pub use schedule::Frequency;

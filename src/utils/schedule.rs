//! Due-date decision
//!
//! A task is due when it has no previous archive, or when at least one full
//! frequency period has elapsed since the previous archive's modify time.

use crate::config::FrequencyUnit;
use chrono::{DateTime, Duration, Local};
use std::fmt;

/// How often a task should produce an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub value: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub fn new(value: u32, unit: FrequencyUnit) -> Self {
        Self { value, unit }
    }

    /// Length of one period
    pub fn as_duration(&self) -> Duration {
        let value = i64::from(self.value);
        match self.unit {
            FrequencyUnit::Minute => Duration::minutes(value),
            FrequencyUnit::Hour => Duration::hours(value),
            FrequencyUnit::Day => Duration::days(value),
            FrequencyUnit::Week => Duration::weeks(value),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == 1 {
            write!(f, "1 {}", self.unit)
        } else {
            write!(f, "{} {}s", self.value, self.unit)
        }
    }
}

/// Whether a new archive should be created at `now`
pub fn is_due(last_backup: Option<DateTime<Local>>, frequency: &Frequency, now: DateTime<Local>) -> bool {
    match last_backup {
        None => true,
        Some(last) => now.signed_duration_since(last) >= frequency.as_duration(),
    }
}

/// Earliest instant at which the task becomes due again
pub fn next_due(last_backup: Option<DateTime<Local>>, frequency: &Frequency) -> Option<DateTime<Local>> {
    last_backup.map(|last| last + frequency.as_duration())
}

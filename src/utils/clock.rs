use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Source of "now". Every date and lateness decision goes through this so
/// that the server's local offset is applied in exactly one place.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

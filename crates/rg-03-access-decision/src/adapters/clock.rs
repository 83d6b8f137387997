//! Clocks.

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;

use crate::ports::Clock;

/// Today's date in the host's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that reports a settable date.
#[derive(Debug)]
pub struct FixedClock {
    date: RwLock<NaiveDate>,
}

impl FixedClock {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: RwLock::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.write() = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let clock = FixedClock::new(d);
        assert_eq!(clock.today(), d);

        let next = d.succ_opt().unwrap();
        clock.set(next);
        assert_eq!(clock.today(), next);
    }

    #[test]
    fn test_local_clock_is_local_date() {
        assert_eq!(LocalClock.today(), Local::now().date_naive());
    }
}

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use trio_domain::RecordId;

/// Layout of the `timestamp` field stored on entries and goal transactions.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current local date. Defaults to `now()` in the local zone.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant; `today` is the UTC date of that instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let instant = date
            .and_hms_opt(12, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or_else(Utc::now);
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn today(&self) -> NaiveDate {
        self.instant.date_naive()
    }
}

/// Formats `instant` in local time for the stored `timestamp` field.
pub fn display_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(DISPLAY_TIMESTAMP_FORMAT)
        .to_string()
}

/// Hands out record ids: millisecond timestamps, strictly increasing.
///
/// Two records created within the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Mutex<RecordId>,
}

impl IdGenerator {
    pub fn seeded(last: RecordId) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }

    pub fn next(&self, now: DateTime<Utc>) -> RecordId {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = now.timestamp_millis().max(*last + 1);
        *last = id;
        id
    }

    /// Makes sure later ids stay above `id`.
    pub fn observe(&self, id: RecordId) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if id > *last {
            *last = id;
        }
    }

    pub fn last(&self) -> RecordId {
        match self.last.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase_within_one_millisecond() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let ids = IdGenerator::default();
        let first = ids.next(clock.now());
        let second = ids.next(clock.now());
        assert_eq!(first, clock.now().timestamp_millis());
        assert_eq!(second, first + 1);
    }

    #[test]
    fn seeded_generator_stays_above_stored_ids() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let future = clock.now().timestamp_millis() + 10_000;
        let ids = IdGenerator::seeded(future);
        assert_eq!(ids.next(clock.now()), future + 1);
        ids.observe(future + 50);
        assert_eq!(ids.next(clock.now()), future + 51);
    }

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(FixedClock::on(date).today(), date);
    }
}

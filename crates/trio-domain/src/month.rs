//! Calendar month identifiers used to key monthly ledgers.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Identifies one calendar month as `YYYY-MM`.
///
/// Ordering follows the string form, which is chronological for four digit years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: u16,
    month: u8,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(0..=9999).contains(&year) {
            return Err(MonthKeyError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError::MonthOutOfRange(month));
        }
        Ok(Self {
            year: year as u16,
            month: month as u8,
        })
    }

    /// Parses the canonical `YYYY-MM` form.
    pub fn parse(value: &str) -> Result<Self, MonthKeyError> {
        let value = value.trim();
        let bytes = value.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(MonthKeyError::Malformed(value.to_string()));
        }
        let (year, month) = (&value[..4], &value[5..]);
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(MonthKeyError::Malformed(value.to_string()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| MonthKeyError::Malformed(value.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthKeyError::Malformed(value.to_string()))?;
        Self::new(year, month)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(0, 9999) as u16,
            month: date.month() as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year as i32
    }

    pub fn month(&self) -> u32 {
        self.month as u32
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
    }

    const fn at(year: u16, month: u8) -> Self {
        Self { year, month }
    }

    /// The following month; `9999-12` stays put.
    pub fn next(&self) -> Self {
        match (self.year, self.month) {
            (9999, 12) => *self,
            (year, 12) => Self::at(year + 1, 1),
            (year, month) => Self::at(year, month + 1),
        }
    }

    /// The preceding month; `0000-01` stays put.
    pub fn previous(&self) -> Self {
        match (self.year, self.month) {
            (0, 1) => *self,
            (year, 1) => Self::at(year - 1, 12),
            (year, month) => Self::at(year, month - 1),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MonthKey::parse(&raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors that can occur when constructing [`MonthKey`] values.
pub enum MonthKeyError {
    Malformed(String),
    YearOutOfRange(i32),
    MonthOutOfRange(u32),
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKeyError::Malformed(value) => {
                write!(f, "`{value}` is not a month in YYYY-MM form")
            }
            MonthKeyError::YearOutOfRange(year) => write!(f, "year {year} is out of range"),
            MonthKeyError::MonthOutOfRange(month) => write!(f, "month {month} is out of range"),
        }
    }
}

impl std::error::Error for MonthKeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_canonical_form() {
        let key = MonthKey::parse("2024-01").unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 1);
        assert_eq!(key.to_string(), "2024-01");
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(MonthKey::parse("2024-1").is_err());
        assert!(MonthKey::parse("2024/01").is_err());
        assert!(MonthKey::parse("2024-13").is_err());
        assert!(MonthKey::parse("2024-00").is_err());
        assert!(MonthKey::parse("20a4-01").is_err());
    }

    #[test]
    fn ordering_is_chronological() {
        let dec = MonthKey::parse("2023-12").unwrap();
        let jan = MonthKey::parse("2024-01").unwrap();
        assert!(dec < jan);
        assert_eq!(dec.next(), jan);
        assert_eq!(jan.previous(), dec);
        assert_eq!(dec.to_string() < jan.to_string(), dec < jan);
    }

    #[test]
    fn stepping_saturates_at_the_calendar_bounds() {
        let last = MonthKey::parse("9999-12").unwrap();
        let first = MonthKey::parse("0000-01").unwrap();
        assert_eq!(last.next(), last);
        assert_eq!(first.previous(), first);
        assert_eq!(MonthKey::parse("9999-11").unwrap().next(), last);
    }

    #[test]
    fn from_date_uses_calendar_month() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        assert_eq!(MonthKey::from_date(date).to_string(), "2025-07");
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = MonthKey::parse("2024-03").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-03\"");
        let back: MonthKey = serde_json::from_str("\"2024-03\"").unwrap();
        assert_eq!(back, key);
    }
}

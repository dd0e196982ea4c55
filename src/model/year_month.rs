use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month written as a 6-digit `YYYYMM` tag, e.g. `202401`. This is the grouping key for
/// monthly aggregation. Ordering is chronological.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `year` fits in four digits and `month` is 1 through 12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month that `timestamp` falls in.
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::of_date(&timestamp.date())
    }

    pub fn of_date(date: &NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct YearMonthError(String);

impl Display for YearMonthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a YYYYMM year-month tag", self.0)
    }
}

impl StdError for YearMonthError {}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    /// Parses `YYYYMM`. Spreadsheets sometimes hand the tag over as a number, so an all-zero
    /// fractional part such as `.0` or `.00` is dropped and fewer than six digits are zero-padded
    /// on the left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || YearMonthError(s.to_string());
        let trimmed = s.trim();
        let digits = match trimmed.split_once('.') {
            Some((whole, frac)) if !frac.is_empty() && frac.chars().all(|c| c == '0') => whole,
            Some(_) => return Err(err()),
            None => trimmed,
        };
        if digits.is_empty() || digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let padded = format!("{digits:0>6}");
        let year: i32 = padded[..4].parse().map_err(|_| err())?;
        let month: u32 = padded[4..].parse().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        YearMonth::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let ym: YearMonth = "202401".parse().unwrap();
        assert_eq!(ym.year(), 2024);
        assert_eq!(ym.month(), 1);
        assert_eq!(ym.to_string(), "202401");
    }

    #[test]
    fn test_parse_numeric_rendering() {
        let ym: YearMonth = " 202312.0 ".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2023, 12).unwrap());
        let ym: YearMonth = "202312.000".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2023, 12).unwrap());
        assert!("202312.5".parse::<YearMonth>().is_err());
        assert!("202312.".parse::<YearMonth>().is_err());
        assert!("202312.0.0".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_parse_zero_pads() {
        let ym: YearMonth = "99912".parse().unwrap();
        assert_eq!(ym.year(), 999);
        assert_eq!(ym.to_string(), "099912");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<YearMonth>().is_err());
        assert!("202413".parse::<YearMonth>().is_err());
        assert!("202400".parse::<YearMonth>().is_err());
        assert!("2024-01".parse::<YearMonth>().is_err());
        assert!("2024011".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_of_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(YearMonth::of(&ts).to_string(), "202402");
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a: YearMonth = "202312".parse().unwrap();
        let b: YearMonth = "202401".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(YearMonth::new(2024, 1).unwrap(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"202401":1}"#);
    }
}

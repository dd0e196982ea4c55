use crate::model::{Records, YearMonth};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// Headline numbers for a record collection: how many records, how much in total, and the period
/// they cover.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Overview {
    pub count: usize,
    pub total: Decimal,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub first_year_month: Option<YearMonth>,
    pub last_year_month: Option<YearMonth>,
    /// The number of distinct year-month tags.
    pub months: usize,
}

pub fn overview(records: &Records) -> Overview {
    let year_months: BTreeSet<YearMonth> = records.iter().map(|r| r.year_month()).collect();
    Overview {
        count: records.len(),
        total: records.total(),
        first_timestamp: records.iter().map(|r| r.timestamp()).min(),
        last_timestamp: records.iter().map(|r| r.timestamp()).max(),
        first_year_month: year_months.first().copied(),
        last_year_month: year_months.last().copied(),
        months: year_months.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{dec, sample_records, ts};

    #[test]
    fn test_overview() {
        let o = overview(&sample_records());
        assert_eq!(o.count, 11);
        assert_eq!(o.total, dec("69070.5"));
        assert_eq!(o.first_timestamp, Some(ts("2024-01-05 08:10:00")));
        assert_eq!(o.last_timestamp, Some(ts("2024-03-09 07:45:00")));
        assert_eq!(o.first_year_month.unwrap().to_string(), "202401");
        assert_eq!(o.last_year_month.unwrap().to_string(), "202403");
        assert_eq!(o.months, 3);
    }

    #[test]
    fn test_overview_empty() {
        let o = overview(&Records::default());
        assert_eq!(o, Overview::default());
        assert_eq!(o.first_timestamp, None);
        assert_eq!(o.months, 0);
    }
}

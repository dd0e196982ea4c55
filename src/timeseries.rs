//! Calendar buckets: totals per day and per weekday.
//!
//! Weekdays are emitted as ordinals, 0 = Monday through 6 = Sunday. Days and weekdays without
//! records are absent; callers that need a dense calendar fill the gaps themselves.

use crate::aggregate::{group_by, Aggregate};
use crate::model::{Record, Records};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// The weekday of `timestamp`, 0 = Monday through 6 = Sunday.
pub fn weekday_ordinal(timestamp: &NaiveDateTime) -> u8 {
    // num_days_from_monday is always 0..=6
    timestamp.weekday().num_days_from_monday() as u8
}

/// Totals per calendar day, in date order.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DailySummary(BTreeMap<NaiveDate, Aggregate>);

impl DailySummary {
    pub fn get(&self, date: &NaiveDate) -> Option<&Aggregate> {
        self.0.get(date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Aggregate)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.0
            .values()
            .map(Aggregate::total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn count(&self) -> usize {
        self.0.values().map(Aggregate::count).sum()
    }
}

/// Totals per weekday ordinal, Monday first.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeekdaySummary(BTreeMap<u8, Aggregate>);

impl WeekdaySummary {
    pub fn get(&self, ordinal: u8) -> Option<&Aggregate> {
        self.0.get(&ordinal)
    }

    /// The mean amount of the records on `ordinal`, for comparing weekdays that have different
    /// numbers of records.
    pub fn mean(&self, ordinal: u8) -> Option<Decimal> {
        self.get(ordinal).map(Aggregate::mean)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u8, &Aggregate)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.0
            .values()
            .map(Aggregate::total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn count(&self) -> usize {
        self.0.values().map(Aggregate::count).sum()
    }
}

pub fn by_day(records: &Records) -> DailySummary {
    DailySummary(
        group_by(records, Record::date)
            .into_iter()
            .map(|(k, acc)| (k, acc.aggregate()))
            .collect(),
    )
}

pub fn by_weekday(records: &Records) -> WeekdaySummary {
    WeekdaySummary(
        group_by(records, |r| weekday_ordinal(&r.timestamp()))
            .into_iter()
            .map(|(k, acc)| (k, acc.aggregate()))
            .collect(),
    )
}

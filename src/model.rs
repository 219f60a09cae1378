use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub symbol: String,
    pub trades: BTreeMap<NaiveDate, DaySeriesData>,
}

pub type Price = f64;

#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySeriesData {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub adj_close: Price,
    pub volume: usize,
}

/// Fractional change of a single day against its reference price.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DayPerformance {
    pub date: NaiveDate,
    pub change_percentage: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum SelectionMode {
    #[display(fmt = "best")]
    Best,
    #[display(fmt = "worst")]
    Worst,
}

/// Dates on which the position is not held.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deref)]
pub struct MissedDates(BTreeSet<NaiveDate>);

impl FromIterator<NaiveDate> for MissedDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a DayPerformance> for MissedDates {
    fn from_iter<I: IntoIterator<Item = &'a DayPerformance>>(iter: I) -> Self {
        iter.into_iter().map(|perf| perf.date).collect()
    }
}

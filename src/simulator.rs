use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::AnalysisError,
    model::{DaySeriesData, MissedDates, Price},
};

/// Replays a series holding one share, except on missed dates.
///
/// The share is sold at the close before a run of missed dates and bought back
/// at the open of the first day after the run. The first day is always held.
pub struct MissedDaysSimulator {
    pub missed_dates: MissedDates,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Return of holding through the whole period.
    pub held_return: f64,
    /// Return when the missed dates are spent out of the position.
    pub adjusted_return: f64,
    /// Cash ledger after the final sale, excluding the first purchase.
    pub balance: f64,
    /// Number of buys and sells after the first purchase.
    pub trading: usize,
}

impl MissedDaysSimulator {
    pub fn new(missed_dates: MissedDates) -> Self {
        Self { missed_dates }
    }

    pub fn simulate(
        &self,
        trades: &BTreeMap<NaiveDate, DaySeriesData>,
    ) -> Result<SimulationResult, AnalysisError> {
        let mut iter = trades.iter();

        let Some((first_date, first_day)) = iter.next() else {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                available: 0,
            });
        };

        let open_price = first_day.open;
        if open_price == 0.0 {
            return Err(AnalysisError::ZeroReferencePrice { date: *first_date });
        }

        let mut last_close_price: Price = first_day.close;
        let mut balance = 0f64;
        let mut holding = true;
        let mut trading = 0;

        for (date, data) in iter {
            let missed = self.missed_dates.contains(date);

            if !holding && !missed {
                balance -= data.open;
                holding = true;
                trading += 1;

                debug!(%date, price = data.open, balance, "buy");
            }

            if missed && holding {
                balance += last_close_price;
                holding = false;
                trading += 1;

                debug!(%date, price = last_close_price, balance, "sell");
            }

            last_close_price = data.close;
        }

        if holding {
            balance += last_close_price;
        }

        Ok(SimulationResult {
            held_return: (last_close_price - open_price) / open_price,
            adjusted_return: (balance - open_price) / open_price,
            balance,
            trading,
        })
    }
}

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BinaryHeap},
};

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::{
    error::AnalysisError,
    model::{DayPerformance, DaySeriesData, Price, SelectionMode},
};

/// Finds the `capacity` days with the largest (best) or smallest (worst)
/// day-over-day change in a single forward pass.
///
/// The reference price of the first day is its own open. The second day is
/// measured against the first day's open as well, every later day against the
/// previous close.
#[derive(Debug, Copy, Clone)]
pub struct TopKDaySelector {
    pub capacity: usize,
    pub mode: SelectionMode,
}

impl TopKDaySelector {
    pub fn best(capacity: usize) -> Self {
        Self {
            capacity,
            mode: SelectionMode::Best,
        }
    }

    pub fn worst(capacity: usize) -> Self {
        Self {
            capacity,
            mode: SelectionMode::Worst,
        }
    }

    /// Returns exactly `capacity` days, highest ranked first. Days with equal
    /// change keep the order they were seen in, and a later day never displaces
    /// an earlier one with the same change.
    pub fn select(
        &self,
        trades: &BTreeMap<NaiveDate, DaySeriesData>,
    ) -> Result<Vec<DayPerformance>, AnalysisError> {
        if self.capacity == 0 {
            return Ok(Vec::new());
        }

        if trades.len() < self.capacity {
            return Err(AnalysisError::InsufficientData {
                required: self.capacity,
                available: trades.len(),
            });
        }

        // Max-heap on rank: the top is always the entry evicted next.
        let mut chosen = BinaryHeap::with_capacity(self.capacity);
        let mut last_close: Option<Price> = None;

        for (seq, (date, data)) in trades.iter().enumerate() {
            let reference = last_close.unwrap_or(data.open);
            if reference == 0.0 {
                return Err(AnalysisError::ZeroReferencePrice { date: *date });
            }

            let change_percentage = (data.close - reference) / reference;
            last_close = Some(if seq == 0 { data.open } else { data.close });

            let candidate = Ranked {
                perf: DayPerformance {
                    date: *date,
                    change_percentage,
                },
                seq,
                mode: self.mode,
            };

            if chosen.len() < self.capacity {
                chosen.push(candidate);
                continue;
            }

            if let Some(mut worst) = chosen.peek_mut() {
                if candidate < *worst {
                    trace!(
                        evicted = %worst.perf.date,
                        inserted = %date,
                        change_percentage,
                        "selection updated"
                    );
                    *worst = candidate;
                }
            }
        }

        let chosen = chosen
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| ranked.perf)
            .collect::<Vec<_>>();

        debug!(
            mode = %self.mode,
            capacity = self.capacity,
            scanned = trades.len(),
            "selected days"
        );

        Ok(chosen)
    }
}

/// Orders entries so that the worse-ranked one compares greater.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    perf: DayPerformance,
    seq: usize,
    mode: SelectionMode,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_change = self
            .perf
            .change_percentage
            .total_cmp(&other.perf.change_percentage);

        let by_change = match self.mode {
            SelectionMode::Best => by_change.reverse(),
            SelectionMode::Worst => by_change,
        };

        by_change.then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

use serde::Serialize;
use tracing::info;

use crate::{
    error::AnalysisError,
    model::{DayPerformance, MissedDates, Security},
    selector::TopKDaySelector,
    simulator::{MissedDaysSimulator, SimulationResult},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    num_best_days_to_miss: usize,
    num_worst_days_to_miss: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_best_days_to_miss: 10,
            num_worst_days_to_miss: 0,
        }
    }
}

impl AnalysisConfig {
    pub fn with_num_best_days_to_miss(mut self, value: usize) -> Self {
        self.num_best_days_to_miss = value;
        self
    }

    pub fn with_num_worst_days_to_miss(mut self, value: usize) -> Self {
        self.num_worst_days_to_miss = value;
        self
    }

    pub fn num_best_days_to_miss(&self) -> usize {
        self.num_best_days_to_miss
    }

    pub fn num_worst_days_to_miss(&self) -> usize {
        self.num_worst_days_to_miss
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub best_days: Vec<DayPerformance>,
    pub worst_days: Vec<DayPerformance>,
    #[serde(flatten)]
    pub result: SimulationResult,
}

/// Runs the best-day pass, the worst-day pass and the simulation over one
/// in-memory series.
pub struct MissedDaysAnalyzer {
    pub config: AnalysisConfig,
}

impl MissedDaysAnalyzer {
    pub fn evaluate(&self, security: &Security) -> Result<AnalysisReport, AnalysisError> {
        let best_days =
            TopKDaySelector::best(self.config.num_best_days_to_miss).select(&security.trades)?;
        let worst_days =
            TopKDaySelector::worst(self.config.num_worst_days_to_miss).select(&security.trades)?;

        for perf in best_days.iter().chain(worst_days.iter()) {
            info!(
                symbol = %security.symbol,
                date = %perf.date,
                change = format_args!("{:.2}%", perf.change_percentage * 100.0),
                "missing day"
            );
        }

        let missed_dates: MissedDates = best_days.iter().chain(worst_days.iter()).collect();
        let result = MissedDaysSimulator::new(missed_dates).simulate(&security.trades)?;

        Ok(AnalysisReport {
            symbol: security.symbol.clone(),
            best_days,
            worst_days,
            result,
        })
    }
}

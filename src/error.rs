use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(
        "expecting column '{expected}' at position {position}, got '{found}', \
         please make sure the historical price file was downloaded from Yahoo Finance"
    )]
    SchemaValidation {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("need at least {required} trading days, only {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("reference price on {date} is zero")]
    ZeroReferencePrice { date: NaiveDate },

    #[error("open and close on {date} must be positive and finite")]
    InvalidPrice { date: NaiveDate },

    #[error("duplicate trading day {date}")]
    DuplicateDate { date: NaiveDate },
}

use std::{
    collections::BTreeMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use eyre::WrapErr;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::AnalysisError,
    model::{DaySeriesData, Price, Security},
};

/// Header of historical price data downloaded from Yahoo Finance.
pub const CSV_FIELD_NAMES: [&str; 7] = ["date", "open", "high", "low", "close", "adj close", "volume"];

pub trait SecurityLoader {
    fn load(&self) -> eyre::Result<Security>;
}

pub struct YahooCsvLoader {
    pub path: PathBuf,
}

impl YahooCsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecurityLoader for YahooCsvLoader {
    fn load(&self) -> eyre::Result<Security> {
        let file = File::open(&self.path)
            .wrap_err_with(|| format!("cannot open price history {}", self.path.display()))?;

        let trades = load_trades(file)
            .wrap_err_with(|| format!("cannot load price history {}", self.path.display()))?;

        let symbol = symbol_of(&self.path);
        info!(%symbol, days = trades.len(), "loaded price history");

        Ok(Security { symbol, trades })
    }
}

fn symbol_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Checks that the header row names the Yahoo Finance columns in order.
/// Names are compared case-insensitively.
pub fn validate_header(header: &StringRecord) -> Result<(), AnalysisError> {
    for (position, &expected) in CSV_FIELD_NAMES.iter().enumerate() {
        let found = header.get(position).unwrap_or_default().to_lowercase();

        if found != expected {
            return Err(AnalysisError::SchemaValidation {
                position,
                expected,
                found,
            });
        }
    }

    if let Some(extra) = header.get(CSV_FIELD_NAMES.len()) {
        return Err(AnalysisError::SchemaValidation {
            position: CSV_FIELD_NAMES.len(),
            expected: "end of header",
            found: extra.to_owned(),
        });
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct YahooRow {
    date: String,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    adj_close: Price,
    volume: f64,
}

fn is_valid_price(price: Price) -> bool {
    price.is_finite() && price > 0.0
}

/// Reads a Yahoo Finance CSV into trades ordered by date.
pub fn load_trades(reader: impl Read) -> eyre::Result<BTreeMap<NaiveDate, DaySeriesData>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = reader.records();

    let header = records.next().transpose()?.unwrap_or_default();
    validate_header(&header)?;
    debug!(header = %header.iter().join(","), "header validated");

    let mut trades = BTreeMap::new();

    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let row: YahooRow = record
            .deserialize(None)
            .wrap_err_with(|| format!("invalid price record on line {line}"))?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .wrap_err_with(|| format!("invalid date '{}' on line {line}", row.date))?;

        if !is_valid_price(row.open) || !is_valid_price(row.close) {
            return Err(AnalysisError::InvalidPrice { date })
                .wrap_err_with(|| format!("invalid price on line {line}"));
        }

        let data = DaySeriesData {
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adj_close: row.adj_close,
            volume: row.volume as usize,
        };

        if trades.insert(date, data).is_some() {
            return Err(AnalysisError::DuplicateDate { date }.into());
        }
    }

    Ok(trades)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use csv::StringRecord;

    use super::{load_trades, validate_header, SecurityLoader, YahooCsvLoader};
    use crate::error::AnalysisError;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2020-03-12,255.94,270.00,248.00,248.11,246.10,100000
2020-03-13,264.89,279.92,252.95,277.97,275.72,120000
2020-03-16,241.18,259.08,240.00,242.21,240.25,90000
";

    #[test]
    fn unittest_header_case_insensitive() {
        let header = StringRecord::from(vec!["DATE", "open", "High", "LOW", "Close", "adj Close", "Volume"]);
        assert!(validate_header(&header).is_ok());
    }

    #[test]
    fn unittest_header_reordered() {
        let header = StringRecord::from(vec!["Date", "Close", "High", "Low", "Open", "Adj Close", "Volume"]);

        assert_eq!(
            validate_header(&header).unwrap_err(),
            AnalysisError::SchemaValidation {
                position: 1,
                expected: "open",
                found: "close".to_owned(),
            }
        );
    }

    #[test]
    fn unittest_header_missing_column() {
        let header = StringRecord::from(vec!["Date", "Open", "High", "Low", "Close", "Volume"]);
        assert!(matches!(
            validate_header(&header),
            Err(AnalysisError::SchemaValidation { position: 5, .. })
        ));

        let header = StringRecord::from(vec!["Date", "Open", "High", "Low", "Close", "Adj Close"]);
        assert!(matches!(
            validate_header(&header),
            Err(AnalysisError::SchemaValidation { position: 6, .. })
        ));
    }

    #[test]
    fn unittest_load_trades() -> eyre::Result<()> {
        let trades = load_trades(SAMPLE.as_bytes())?;

        assert_eq!(trades.len(), 3);
        let (date, first) = trades.first_key_value().unwrap();
        assert_eq!(*date, NaiveDate::from_ymd_opt(2020, 3, 12).unwrap());
        assert_eq!(first.open, 255.94);
        assert_eq!(first.close, 248.11);
        assert_eq!(first.adj_close, 246.10);
        assert_eq!(first.volume, 100000);

        Ok(())
    }

    #[test]
    fn unittest_bad_header_fails_before_rows() {
        let csv = "Date,Open,High,Low,Close,Volume,Adj Close\nnot,a,valid,row,at,all,!\n";

        let err = load_trades(csv.as_bytes()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::SchemaValidation { position: 5, .. })
        ));
    }

    #[test]
    fn unittest_duplicate_date() {
        let csv = format!("{SAMPLE}2020-03-16,1,1,1,1,1,1\n");

        let err = load_trades(csv.as_bytes()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<AnalysisError>(),
            Some(&AnalysisError::DuplicateDate {
                date: NaiveDate::from_ymd_opt(2020, 3, 16).unwrap()
            })
        );
    }

    #[test]
    fn unittest_invalid_price_names_line() {
        let csv = format!("{SAMPLE}2020-03-17,null,null,null,null,null,null\n");

        let err = load_trades(csv.as_bytes()).unwrap_err();

        assert_eq!(err.to_string(), "invalid price record on line 5");
    }

    #[test]
    fn unittest_rejects_non_positive_or_non_finite_prices() {
        for (row, line) in [
            ("2020-03-17,250.0,251.0,249.0,NaN,250.0,1000", 5),
            ("2020-03-17,0,251.0,249.0,250.0,250.0,1000", 5),
            ("2020-03-17,-5,251.0,249.0,-120,250.0,1000", 5),
            ("2020-03-17,250.0,251.0,249.0,inf,250.0,1000", 5),
        ] {
            let csv = format!("{SAMPLE}{row}\n");

            let err = load_trades(csv.as_bytes()).unwrap_err();

            assert_eq!(err.to_string(), format!("invalid price on line {line}"));
            assert_eq!(
                err.downcast_ref::<AnalysisError>(),
                Some(&AnalysisError::InvalidPrice {
                    date: NaiveDate::from_ymd_opt(2020, 3, 17).unwrap()
                })
            );
        }
    }

    #[test]
    fn unittest_reversed_rows_are_ordered_by_date() -> eyre::Result<()> {
        let mut lines = SAMPLE.lines();
        let header = lines.next().unwrap();
        let csv = std::iter::once(header)
            .chain(lines.rev())
            .map(|line| format!("{line}\n"))
            .collect::<String>();

        let trades = load_trades(csv.as_bytes())?;

        assert_eq!(
            trades.keys().copied().collect::<Vec<_>>(),
            vec![
                NaiveDate::from_ymd_opt(2020, 3, 12).unwrap(),
                NaiveDate::from_ymd_opt(2020, 3, 13).unwrap(),
                NaiveDate::from_ymd_opt(2020, 3, 16).unwrap(),
            ]
        );
        assert_eq!(trades.values().next().unwrap().close, 248.11);

        Ok(())
    }

    #[test]
    fn unittest_yahoo_csv_loader() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("SPY.csv");
        std::fs::File::create(&path)?.write_all(SAMPLE.as_bytes())?;

        let security = YahooCsvLoader::new(&path).load()?;

        assert_eq!(security.symbol, "SPY");
        assert_eq!(security.trades.len(), 3);

        Ok(())
    }

    #[test]
    fn unittest_missing_file() {
        let err = YahooCsvLoader::new("./does/not/exist.csv").load().unwrap_err();
        assert!(err.to_string().starts_with("cannot open price history"));
    }
}

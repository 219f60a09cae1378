use std::path::PathBuf;

use clap::Parser;
use missed_days::{
    analysis::{AnalysisConfig, MissedDaysAnalyzer},
    loader::{SecurityLoader, YahooCsvLoader},
    logging::{LogFormat, LoggingConfig},
};

/// Compute what happens if you time the stock market.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Historical trading data of a security downloaded from Yahoo Finance
    #[arg(long)]
    file: PathBuf,

    /// Number of best trading days to miss
    #[arg(long = "num_best_days_to_miss", default_value_t = 10)]
    num_best_days_to_miss: usize,

    /// Number of worst trading days to miss
    #[arg(long = "num_worst_days_to_miss", default_value_t = 0)]
    num_worst_days_to_miss: usize,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl From<&Args> for AnalysisConfig {
    fn from(args: &Args) -> Self {
        AnalysisConfig::default()
            .with_num_best_days_to_miss(args.num_best_days_to_miss)
            .with_num_worst_days_to_miss(args.num_worst_days_to_miss)
    }
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();

    LoggingConfig {
        level: args.log_level.clone(),
        format: args.log_format,
    }
    .init();

    let security = YahooCsvLoader::new(&args.file).load()?;
    let report = MissedDaysAnalyzer {
        config: AnalysisConfig::from(&args),
    }
    .evaluate(&security)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "If you hold throughout given period, your performance will be: {:.2}%",
        report.result.held_return * 100.0
    );
    println!(
        "If you miss these days, your performance will be: {:.2}%",
        report.result.adjusted_return * 100.0
    );

    Ok(())
}

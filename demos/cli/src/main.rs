use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glycowatch_analysis::{analyze_str, parse_interval};
use glycowatch_core::{AnalysisConfig, AnalysisReport, DailySummary};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "glycowatch_cli=info,glycowatch_analysis=warn";

#[derive(Parser, Debug)]
#[command(
    name = "glycowatch-cli",
    about = "Analyze an exported list of glucose readings."
)]
struct Args {
    /// Path to the JSON export (array of records or `{ "readings": [...] }`).
    #[arg(short, long)]
    input: PathBuf,

    /// Inclusive lower bound (RFC 3339, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD`).
    #[arg(long)]
    start: Option<String>,

    /// Exclusive upper bound, same formats as `--start`.
    #[arg(long)]
    end: Option<String>,

    /// Local UTC offset in minutes, e.g. -180 for UTC-3.
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// JSON file with threshold overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let interval = if args.start.is_some() || args.end.is_some() {
        Some(
            parse_interval(args.start.as_deref(), args.end.as_deref(), &config)
                .context("Invalid --start/--end")?,
        )
    } else {
        None
    };

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read file {:?}", args.input))?;

    let report = analyze_str(&data, interval.as_ref(), &config)
        .with_context(|| format!("Cannot analyze {:?}", args.input))?;

    tracing::info!(
        findings = report
            .alerts
            .iter()
            .filter(|alert| !alert.kind.is_informational())
            .count(),
        days = report.daily.len(),
        "analysis complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {path:?}"))?;
            serde_json::from_str::<AnalysisConfig>(&raw)
                .with_context(|| format!("Invalid config {path:?}"))?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(offset) = args.utc_offset {
        config.utc_offset_minutes = offset;
    }

    config.validate()?;
    Ok(config)
}

fn print_report(report: &AnalysisReport) {
    println!("Generated at: {}", report.generated_at);

    println!("\nAlerts:");
    for alert in &report.alerts {
        println!("  - {alert}");
    }

    println!("\nSymptom correlations:");
    for line in &report.correlations {
        println!("  - {line}");
    }

    if !report.daily.is_empty() {
        println!("\nDaily summary:");
        for day in &report.daily {
            println!("  {}", describe_day(day));
        }
    }
}

fn describe_day(day: &DailySummary) -> String {
    let stat = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    format!(
        "{}  n={} ({} numeric)  mean {}  min {}  max {}  below {}  above {}",
        day.date,
        day.count,
        day.numeric_count,
        stat(day.mean),
        stat(day.min),
        stat(day.max),
        day.below_range,
        day.above_range
    )
}

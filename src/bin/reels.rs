//! Reels CLI - Command-line interface for reel-insight
//!
//! Commands:
//! - analyze: Build the full analysis report from a payload or the sample data
//! - engagement: Engagement rate of one reel's counters
//! - correlate: Pearson correlation of two series, or a matrix over records
//! - regress: Least-squares fit of two series, or of two metrics over records
//! - summarize: Five-number summary of a series, or of engagement rates
//! - sample: Print the bundled sample records
//! - doctor: Diagnose configuration and environment

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use reel_insight::adapters::{GraphApiAdapter, ReelPayloadAdapter};
use reel_insight::correlation::CorrelationEngine;
use reel_insight::encoder::REPORT_VERSION;
use reel_insight::engagement::EngagementCalculator;
use reel_insight::normalizer::Normalizer;
use reel_insight::quantile::QuantileSummarizer;
use reel_insight::sample::sample_reels;
use reel_insight::types::{Metric, MetricRecord};
use reel_insight::{AnalysisConfig, ComputeError, ReelAnalyzer, PRODUCER_NAME, VERSION};

/// Reels - Engagement analytics for short-form video reels
#[derive(Parser)]
#[command(name = "reels")]
#[command(version = VERSION)]
#[command(about = "Analyze reel engagement metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full analysis report
    Analyze {
        #[command(flatten)]
        records: RecordArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Engagement rate: (likes + comments + shares) / views * 100
    Engagement {
        #[arg(long)]
        likes: u64,

        #[arg(long)]
        comments: u64,

        #[arg(long)]
        shares: u64,

        #[arg(long)]
        views: u64,
    },

    /// Pearson correlation of two series, or a matrix over records
    Correlate {
        /// First series, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "y")]
        x: Option<Vec<f64>>,

        /// Second series, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "x")]
        y: Option<Vec<f64>>,

        /// Matrix metrics, comma separated (defaults to the configured metrics)
        #[arg(long, value_delimiter = ',')]
        metrics: Option<Vec<Metric>>,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Least-squares fit of y on x
    Regress {
        /// Independent series, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "y")]
        x: Option<Vec<f64>>,

        /// Dependent series, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "x")]
        y: Option<Vec<f64>>,

        /// Independent metric when fitting records
        #[arg(long)]
        x_metric: Option<Metric>,

        /// Dependent metric when fitting records
        #[arg(long)]
        y_metric: Option<Metric>,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Five-number summary with Tukey fences
    Summarize {
        /// Values, comma separated (defaults to the records' engagement rates)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        values: Option<Vec<f64>>,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Print the bundled sample records
    Sample {
        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where records come from
#[derive(Args)]
struct RecordArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, conflicts_with = "sample")]
    input: Option<PathBuf>,

    /// Input format
    #[arg(long, default_value = "graph")]
    source: InputSource,

    /// Use the bundled sample records
    #[arg(long)]
    sample: bool,

    /// Analysis configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputSource {
    /// Graph API media page or array of media objects
    Graph,
    /// JSON array of metric records
    Records,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

static LOGGER: Once = Once::new();

fn initialize_logger() {
    LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        let _ = builder.try_init();
    });
}

fn main() -> ExitCode {
    initialize_logger();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ReelsCliError> {
    match cli.command {
        Commands::Analyze {
            records,
            output,
            output_format,
        } => cmd_analyze(&records, &output, output_format),

        Commands::Engagement {
            likes,
            comments,
            shares,
            views,
        } => cmd_engagement(likes, comments, shares, views),

        Commands::Correlate {
            x,
            y,
            metrics,
            records,
        } => cmd_correlate(x, y, metrics, &records),

        Commands::Regress {
            x,
            y,
            x_metric,
            y_metric,
            records,
        } => cmd_regress(x, y, x_metric, y_metric, &records),

        Commands::Summarize { values, records } => cmd_summarize(values, &records),

        Commands::Sample { output_format } => {
            let output = format_output(&sample_reels(), output_format)?;
            println!("{}", output);
            Ok(())
        }

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_analyze(
    args: &RecordArgs,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), ReelsCliError> {
    let config = load_config(args.config.as_deref())?;
    let records = load_records(args, &config)?;

    let analyzer = ReelAnalyzer::new(config)?;
    let report = analyzer.analyze(&records);

    if !report.omitted.is_empty() {
        log::info!("{} panels omitted from the report", report.omitted.len());
    }

    let output_data = format_output(&report, output_format)?;
    write_output(output, &output_data)
}

fn cmd_engagement(likes: u64, comments: u64, shares: u64, views: u64) -> Result<(), ReelsCliError> {
    let engagement_rate =
        EngagementCalculator::compute_engagement_rate(likes, comments, shares, views)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "engagement_rate": engagement_rate }))?
    );
    Ok(())
}

fn cmd_correlate(
    x: Option<Vec<f64>>,
    y: Option<Vec<f64>>,
    metrics: Option<Vec<Metric>>,
    args: &RecordArgs,
) -> Result<(), ReelsCliError> {
    if let (Some(x), Some(y)) = (x, y) {
        let correlation = CorrelationEngine::compute_correlation(&x, &y)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "correlation": correlation }))?
        );
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let records = load_records(args, &config)?;
    let metrics = metrics.unwrap_or_else(|| config.metrics.clone());

    let matrix = CorrelationEngine::compute_correlation_matrix(
        &records,
        &metrics,
        config.missing_metric_policy,
    )?;
    println!("{}", serde_json::to_string_pretty(&matrix)?);
    Ok(())
}

fn cmd_regress(
    x: Option<Vec<f64>>,
    y: Option<Vec<f64>>,
    x_metric: Option<Metric>,
    y_metric: Option<Metric>,
    args: &RecordArgs,
) -> Result<(), ReelsCliError> {
    let model = if let (Some(x), Some(y)) = (x, y) {
        CorrelationEngine::fit_linear_regression(&x, &y)?
    } else {
        let config = load_config(args.config.as_deref())?;
        let records = load_records(args, &config)?;
        CorrelationEngine::fit_metrics(
            &records,
            x_metric.unwrap_or(config.regression_x),
            y_metric.unwrap_or(config.regression_y),
            config.missing_metric_policy,
        )?
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "slope": model.slope,
            "intercept": model.intercept,
            "per_thousand": model.per_thousand(),
        }))?
    );
    Ok(())
}

fn cmd_summarize(values: Option<Vec<f64>>, args: &RecordArgs) -> Result<(), ReelsCliError> {
    let values = match values {
        Some(values) => values,
        None => {
            let config = load_config(args.config.as_deref())?;
            load_records(args, &config)?
                .iter()
                .filter_map(|r| EngagementCalculator::record_engagement_rate(r).ok())
                .collect()
        }
    };

    let summary = QuantileSummarizer::summarize(&values)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), ReelsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, VERSION),
    });

    checks.push(DoctorCheck {
        name: "report_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Report schema: {}", REPORT_VERSION),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match AnalysisConfig::from_json(&content) {
                    Ok(parsed) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid ({} matrix metrics, regression {} on {})",
                            parsed.metrics.len(),
                            parsed.regression_y,
                            parsed.regression_x
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let sample_check = match ReelAnalyzer::new(AnalysisConfig::default()) {
        Ok(analyzer) => {
            let report = analyzer.analyze(&sample_reels());
            if report.omitted.is_empty() {
                DoctorCheck {
                    name: "sample_report".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("Sample report built over {} reels", report.record_count),
                }
            } else {
                DoctorCheck {
                    name: "sample_report".to_string(),
                    status: CheckStatus::Error,
                    message: format!("{} panels omitted from sample report", report.omitted.len()),
                }
            }
        }
        Err(e) => DoctorCheck {
            name: "sample_report".to_string(),
            status: CheckStatus::Error,
            message: format!("Default config rejected: {}", e),
        },
    };
    checks.push(sample_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file> or --sample)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for --input -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Reels Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error))
    {
        Err(ReelsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ReelsCliError> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_records(
    args: &RecordArgs,
    config: &AnalysisConfig,
) -> Result<Vec<MetricRecord>, ReelsCliError> {
    if args.sample {
        return Ok(sample_reels());
    }

    let input = args.input.as_deref().ok_or(ReelsCliError::NoInput)?;
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match args.source {
        InputSource::Graph => {
            let reels = GraphApiAdapter.parse(&input_data)?;
            Normalizer::normalize_all(&reels, config)
        }
        InputSource::Records => serde_json::from_str(&input_data)?,
    };

    if records.is_empty() {
        return Err(ReelsCliError::NoRecords);
    }

    log::info!("loaded {} records", records.len());
    Ok(records)
}

fn format_output<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
) -> Result<String, ReelsCliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    })
}

fn write_output(output: &Path, data: &str) -> Result<(), ReelsCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

// Error handling

#[derive(Debug)]
enum ReelsCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoInput,
    NoRecords,
    DoctorFailed,
}

impl From<io::Error> for ReelsCliError {
    fn from(e: io::Error) -> Self {
        ReelsCliError::Io(e)
    }
}

impl From<ComputeError> for ReelsCliError {
    fn from(e: ComputeError) -> Self {
        ReelsCliError::Compute(e)
    }
}

impl From<serde_json::Error> for ReelsCliError {
    fn from(e: serde_json::Error) -> Self {
        ReelsCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ReelsCliError> for CliError {
    fn from(e: ReelsCliError) -> Self {
        match e {
            ReelsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ReelsCliError::Compute(e) => CliError {
                code: compute_error_code(&e).to_string(),
                hint: compute_error_hint(&e),
                message: e.to_string(),
            },
            ReelsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ReelsCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No input given".to_string(),
                hint: Some("Pass --input <file>, --input - for stdin, or --sample".to_string()),
            },
            ReelsCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No reels found in input".to_string(),
                hint: Some("Only VIDEO and REELS media are analyzed".to_string()),
            },
            ReelsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

fn compute_error_code(e: &ComputeError) -> &'static str {
    match e {
        ComputeError::DivisionByZero(_) => "DIVISION_BY_ZERO",
        ComputeError::DegenerateInput(_) => "DEGENERATE_INPUT",
        ComputeError::EmptyInput(_) => "EMPTY_INPUT",
        ComputeError::LengthMismatch { .. } => "LENGTH_MISMATCH",
        ComputeError::InsufficientData { .. } => "INSUFFICIENT_DATA",
        ComputeError::MissingField(_) => "MISSING_FIELD",
        ComputeError::UnknownMetric(_) => "UNKNOWN_METRIC",
        ComputeError::ParseError(_) | ComputeError::JsonError(_) => "PARSE_ERROR",
        ComputeError::CounterOverflow(_) => "COUNTER_OVERFLOW",
        ComputeError::InvalidConfig(_) => "INVALID_CONFIG",
    }
}

fn compute_error_hint(e: &ComputeError) -> Option<String> {
    let hint = match e {
        ComputeError::DivisionByZero(_) => "A reel with zero views has no engagement rate",
        ComputeError::LengthMismatch { .. } => "Pass the same number of values to --x and --y",
        ComputeError::InsufficientData { .. } => "At least two data points are needed",
        ComputeError::MissingField(_) => "Use missing_metric_policy \"zero\" or \"skip\"",
        ComputeError::UnknownMetric(_) => {
            "Known metrics: views, likes, comments, shares, saves, follows, reach"
        }
        ComputeError::ParseError(_) | ComputeError::JsonError(_) => {
            "Ensure input matches the selected --source"
        }
        ComputeError::InvalidConfig(_) => "Run 'reels doctor --config <file>' for details",
        _ => return None,
    };
    Some(hint.to_string())
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

//! oracle-probe: measure whether an HTTP endpoint leaks timing by input.
//!
//! # Usage
//!
//! ```bash
//! # Compare the two reference cases against a local demo server
//! oracle-probe --serveraddr http://localhost:3001
//!
//! # Look for the odd one out among several candidates
//! oracle-probe --mode baseline --case a@x.com --case b@x.com --case c@x.com
//!
//! # Verbose logging
//! RUST_LOG=http_timing_oracle=trace oracle-probe --debug
//! ```

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use http_timing_oracle::output::{format_round, format_summary, to_json};
use http_timing_oracle::{
    Mode, Precision, RemoteOracle, RoundReport, RunSummary, CONCURRENCY, CONFIDENCE,
    DEFAULT_QUERY_PARAM, MAX_ITERATIONS, MIN_ITERATIONS,
};

#[derive(Parser, Debug)]
#[command(name = "oracle-probe")]
#[command(
    version,
    about = "Detect remote timing side channels in HTTP endpoints",
    long_about = None
)]
struct Args {
    /// Target base URL
    #[arg(long, env = "ORACLE_SERVERADDR", default_value = "http://localhost:3001")]
    serveraddr: String,

    /// Enable debug logging
    #[arg(long, env = "ORACLE_DEBUG")]
    debug: bool,

    /// Ceiling on accumulated iterations per case
    #[arg(
        long,
        alias = "maxIterScan",
        env = "ORACLE_MAX_ITER_SCAN",
        default_value_t = MAX_ITERATIONS
    )]
    max_iter_scan: usize,

    /// Concurrent probe workers
    #[arg(long, env = "ORACLE_CONCURRENCY", default_value_t = CONCURRENCY)]
    concurrency: usize,

    /// Per-round iteration floor
    #[arg(long, env = "ORACLE_MIN_ITERATIONS", default_value_t = MIN_ITERATIONS)]
    min_iterations: usize,

    /// Two-sided confidence level
    #[arg(long, env = "ORACLE_CONFIDENCE", default_value_t = CONFIDENCE)]
    confidence: f64,

    /// Estimation strategy
    #[arg(long, value_enum, default_value = "interval")]
    mode: ModeArg,

    /// Unit handling before interval statistics
    #[arg(long, value_enum, default_value = "nanos")]
    precision: PrecisionArg,

    /// Stop after this many consecutive distinguishable rounds
    #[arg(long, value_name = "ROUNDS")]
    early_stop: Option<usize>,

    /// Print one JSON object per round instead of text
    #[arg(long)]
    json: bool,

    /// Case label (repeatable); the first is the base in interval mode
    #[arg(long = "case", default_values = ["whatever@fake.com", "correct@email.com"])]
    cases: Vec<String>,

    /// Query parameter carrying the case label
    #[arg(long, default_value = DEFAULT_QUERY_PARAM)]
    param: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Interval,
    Baseline,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PrecisionArg {
    Nanos,
    Millis,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Interval => Mode::Interval,
            ModeArg::Baseline => Mode::Baseline,
        }
    }
}

impl From<PrecisionArg> for Precision {
    fn from(arg: PrecisionArg) -> Self {
        match arg {
            PrecisionArg::Nanos => Precision::Nanoseconds,
            PrecisionArg::Millis => Precision::TruncatedMillis,
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_round(report: &RoundReport, json: bool) {
    if json {
        match to_json(report) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, round = report.round, "failed to serialize round"),
        }
    } else {
        println!("{}", format_round(report));
    }
}

async fn run(args: &Args) -> http_timing_oracle::Result<RunSummary> {
    let mut oracle = RemoteOracle::for_target(&args.serveraddr, &args.param, &args.cases)?
        .concurrency(args.concurrency)
        .min_iterations(args.min_iterations)
        .max_iterations(args.max_iter_scan)
        .confidence(args.confidence)
        .mode(args.mode.into())
        .precision(args.precision.into());
    if let Some(rounds) = args.early_stop {
        oracle = oracle.early_stop(rounds);
    }

    info!(
        target_url = %args.serveraddr,
        cases = ?args.cases,
        max_iterations = args.max_iter_scan,
        concurrency = args.concurrency,
        "starting scan"
    );
    let json = args.json;
    oracle.run(|report| print_round(report, json)).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(&args).await {
        Ok(summary) => {
            if !args.json {
                print!("{}", format_summary(&summary));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "scan failed");
            ExitCode::FAILURE
        }
    }
}

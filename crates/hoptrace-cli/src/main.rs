//! CLI for hoptrace.

mod runner;

use clap::{Parser, ValueEnum};
use hoptrace_core::{TraceConfig, DEFAULT_FIRST_TTL, DEFAULT_MAX_TTL, MIN_WAIT_SECS};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Output rendering for a finished trace.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// hoptrace - UDP traceroute for IPv4 and IPv6.
#[derive(Parser, Debug)]
#[command(name = "hoptrace")]
#[command(version)]
#[command(about = "hoptrace - UDP traceroute for IPv4 and IPv6")]
pub struct Args {
    /// Target hostname, IP address or URL.
    #[arg(env = "HOPTRACE_TARGET")]
    pub target: String,

    /// TTL of the first probe.
    #[arg(short = 'f', long = "first-ttl", default_value_t = DEFAULT_FIRST_TTL, allow_negative_numbers = true)]
    pub first_ttl: i32,

    /// Maximum TTL (capped at 64).
    #[arg(short = 'm', long = "max-ttl", default_value_t = DEFAULT_MAX_TTL, allow_negative_numbers = true)]
    pub max_ttl: i32,

    /// Extra probes per TTL after a timeout.
    #[arg(short = 'r', long, default_value_t = 0, allow_negative_numbers = true)]
    pub retry: i32,

    /// Seconds to wait for each reply (1 to 10).
    #[arg(short = 'w', long, default_value_t = MIN_WAIT_SECS, allow_negative_numbers = true)]
    pub wait: i64,

    /// Log every hop as it is recorded.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Resolve the target to an IPv4 address.
    #[arg(short = '4', conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Resolve the target to an IPv6 address.
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    fn to_config(&self) -> TraceConfig {
        TraceConfig {
            first_ttl: self.first_ttl,
            max_ttl: self.max_ttl,
            retry: self.retry,
            wait_secs: self.wait,
            debug: self.debug,
        }
    }

    fn preferred_family(&self) -> Option<runner::Preference> {
        match (self.ipv4, self.ipv6) {
            (true, _) => Some(runner::Preference::V4),
            (_, true) => Some(runner::Preference::V6),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let request = runner::TraceRequest {
        target: args.target.clone(),
        config: args.to_config(),
        prefer: args.preferred_family(),
    };

    let report = match runner::run_trace(request).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Traceroute failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.format {
        OutputFormat::Json => match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize results: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Text => print!("{}", report.to_text()),
    }

    ExitCode::SUCCESS
}

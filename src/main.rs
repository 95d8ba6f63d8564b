//! # Main — CLI Entry Point
//!
//! Parses the command line, sets up logging and the Rayon pool, then hands
//! off to [`cli::run`] for one Lucas–Lehmer test.
//!
//! ## Options
//!
//! - `<EXPONENT>`: q ≥ 2, decimal or `0x`/`0o`/`0b` prefixed (a bare leading
//!   `0` means octal).
//! - `--iterations` / `MERSENNE_ITERATIONS`: squarings to run (0 = full test).
//! - `--fft-log2`: force the transform length instead of searching upward.
//! - `--verify`: cross-check the residue against the GMP reference.
//! - `--threads`: Rayon thread pool size (default: all cores).
//! - `--report-interval`: seconds between progress lines (0 disables).
//! - `--json`: print the report as one JSON object.
//! - `--cpu-profile`: write a pprof protobuf CPU profile of the run.
//!
//! ## Logging
//!
//! `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` sets the filter
//! (default `info`). Logs go to stderr because stdout carries the report.

mod cli;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "mersenne", about = "Lucas-Lehmer test of 2^q-1 using an NTT-based IBDWT")]
pub struct Cli {
    /// Mersenne exponent q (decimal, or 0x/0o/0b prefixed)
    #[arg(value_parser = cli::parse_exponent)]
    exponent: u64,

    /// Number of squarings to run (0 runs the full q-2 for a primality verdict)
    #[arg(long, env = "MERSENNE_ITERATIONS", default_value_t = 0)]
    iterations: u64,

    /// Force the transform length to 2^L instead of picking the smallest that fits
    #[arg(long = "fft-log2", value_name = "L")]
    fft_log2: Option<u8>,

    /// Cross-check the residue against a GMP Lucas-Lehmer (slow for large q)
    #[arg(long)]
    verify: bool,

    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seconds between progress log lines (0 disables)
    #[arg(long, default_value_t = 30)]
    report_interval: u64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write a CPU profile (pprof protobuf) of the run to this file
    #[arg(long = "cpu-profile", value_name = "PATH")]
    cpu_profile: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    cli::configure_rayon(cli.threads);
    cli::run(&cli)
}

//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: exponent parsing,
//! the test run with its progress reporter, report printing, CPU profiling,
//! and rayon configuration.
//!
//! In text mode the header line is printed as soon as the transform size is
//! known, before any squaring; the residue and verdict follow when the run
//! finishes.

use anyhow::{anyhow, Context, Result};
use mersenne::config::{report_interval, RunConfig};
use mersenne::progress::Progress;
use mersenne::{modmath, Mersenne, TestReport};
use std::io::Write;
use tracing::{info, warn};

use super::Cli;

// ── Argument Parsing ────────────────────────────────────────────

/// Parse an exponent with its radix taken from the prefix: `0x` hex, `0o` or
/// a bare leading `0` octal, `0b` binary, decimal otherwise. Underscores
/// between digits are allowed.
pub fn parse_exponent(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return Err(format!("invalid exponent '{}'", s));
    }
    let q = u64::from_str_radix(&digits.replace('_', ""), radix)
        .map_err(|e| format!("invalid exponent '{}': {}", s, e))?;
    if q < 2 {
        return Err(format!("exponent must be at least 2, got {}", q));
    }
    Ok(q)
}

// ── Test Run ────────────────────────────────────────────────────

/// Run one test as configured on the command line, under the CPU profiler
/// when `--cpu-profile` is given.
pub fn run(cli: &Cli) -> Result<()> {
    let config = RunConfig {
        iterations: cli.iterations,
        log_n: cli.fft_log2,
        verify: cli.verify,
        cpu_profile: cli.cpu_profile.clone(),
    };

    let Some(path) = config.cpu_profile.as_deref() else {
        return run_test(cli, &config);
    };
    let profiler = profile::start()?;
    let result = run_test(cli, &config);
    // the profile is written even when the run fails; the run error wins
    let written = profile::finish(profiler, path);
    result?;
    written
}

fn run_test(cli: &Cli, config: &RunConfig) -> Result<()> {
    info!(
        exponent = cli.exponent,
        threads = rayon::current_num_threads(),
        backend = modmath::backend_name(),
        "mersenne starting"
    );

    let context = || format!("testing 2**{}-1", cli.exponent);
    let mut m = Mersenne::for_config(cli.exponent, config).with_context(context)?;

    let stdout = std::io::stdout();
    if !cli.json {
        let mut out = stdout.lock();
        let iterations = m.resolve_iterations(config.iterations);
        write_header(&mut out, m.exponent(), m.log_n(), iterations)?;
        out.flush()?;
    }

    let progress = Progress::new();
    let reporter = report_interval(cli.report_interval).map(|i| progress.start_reporter(i));

    let result = m.test(config, Some(&*progress));

    progress.stop();
    if let Some(handle) = reporter {
        handle
            .join()
            .map_err(|_| anyhow!("progress reporter thread panicked"))?;
    }

    let report = result.with_context(context)?;
    info!(
        exponent = report.exponent,
        iterations = report.iterations,
        residue = %report.residue_hex,
        elapsed = format_args!("{:.3}s", report.elapsed_secs),
        "test complete"
    );

    let mut out = stdout.lock();
    if cli.json {
        let line = serde_json::to_string(&report).context("serializing report")?;
        writeln!(out, "{}", line)?;
    } else {
        write_outcome(&mut out, &report)?;
    }
    Ok(())
}

/// First text line, printed before the run starts.
pub fn write_header(out: &mut impl Write, exponent: u64, log_n: u8, iterations: u64) -> Result<()> {
    writeln!(
        out,
        "Testing 2**{}-1 with fft size 2**{} for {} iterations",
        exponent, log_n, iterations
    )?;
    Ok(())
}

/// Residue and, for full tests, the verdict.
pub fn write_outcome(out: &mut impl Write, report: &TestReport) -> Result<()> {
    writeln!(out, "Residue {}", report.residue_hex)?;
    match report.is_prime {
        Some(true) => writeln!(out, "2**{}-1 is prime", report.exponent)?,
        Some(false) => writeln!(out, "2**{}-1 is not prime", report.exponent)?,
        None => {}
    }
    Ok(())
}

// ── CPU Profiling ───────────────────────────────────────────────

#[cfg(unix)]
mod profile {
    use anyhow::{Context, Result};
    use pprof::protos::Message;
    use pprof::{ProfilerGuard, ProfilerGuardBuilder};
    use std::path::Path;
    use tracing::info;

    /// Sampling rate in Hz.
    const FREQUENCY: i32 = 1000;

    pub fn start() -> Result<ProfilerGuard<'static>> {
        ProfilerGuardBuilder::default()
            .frequency(FREQUENCY)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()
            .context("starting CPU profiler")
    }

    /// Stop sampling and write a pprof protobuf to `path`.
    pub fn finish(guard: ProfilerGuard<'static>, path: &Path) -> Result<()> {
        let report = guard.report().build().context("building CPU profile")?;
        let profile = report.pprof().context("converting CPU profile")?;
        let mut content = Vec::new();
        profile
            .encode(&mut content)
            .context("encoding CPU profile")?;
        std::fs::write(path, &content)
            .with_context(|| format!("writing CPU profile to {}", path.display()))?;
        info!(path = %path.display(), bytes = content.len(), "cpu profile written");
        Ok(())
    }
}

#[cfg(not(unix))]
mod profile {
    use anyhow::{bail, Result};
    use std::path::Path;

    pub struct Unsupported;

    pub fn start() -> Result<Unsupported> {
        bail!("--cpu-profile is only supported on unix targets")
    }

    pub fn finish(_: Unsupported, _: &Path) -> Result<()> {
        Ok(())
    }
}

// ── Rayon Configuration ─────────────────────────────────────────

/// Configure the rayon global thread pool with an optional thread count.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!(error = %e, "Could not configure rayon thread pool");
        }
    }
}

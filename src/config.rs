//! Run configuration, built once by the binary and passed into
//! [`crate::test_exponent`]. The library keeps no process-wide flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::MersenneError;
use crate::modmath::MAX_LOG_N;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Squarings to run; 0 runs the full q − 2.
    pub iterations: u64,
    /// Forced transform length as log₂n; `None` searches from the smallest.
    pub log_n: Option<u8>,
    /// Cross-check the final state against the GMP reference.
    pub verify: bool,
    /// Where the binary writes a CPU profile of the run, if anywhere.
    pub cpu_profile: Option<PathBuf>,
}

impl RunConfig {
    /// Reject a forced transform length the field cannot support before any
    /// tables are built.
    pub fn validate(&self) -> Result<(), MersenneError> {
        match self.log_n {
            Some(log_n) if log_n > MAX_LOG_N => Err(MersenneError::InvalidTransformSize {
                log_n,
                max_log_n: MAX_LOG_N,
            }),
            _ => Ok(()),
        }
    }
}

/// Background reporter cadence; `None` disables it.
pub fn report_interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

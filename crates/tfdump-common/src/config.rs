//! Run configuration.
//!
//! Everything the pipeline would otherwise read from the process
//! environment is collected here once and passed in explicitly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, TfdumpError};

/// Backoff policy for artifact downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub wait_min: Duration,
    /// Cap on the wait between retries.
    pub wait_max: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            wait_min: Duration::ZERO,
            wait_max: Duration::ZERO,
        }
    }

    /// Returns the wait before retry number `attempt` (0-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.wait_min.saturating_mul(factor).min(self.wait_max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: constants::DEFAULT_RETRY_MAX,
            wait_min: constants::DEFAULT_RETRY_WAIT_MIN,
            wait_max: constants::DEFAULT_RETRY_WAIT_MAX,
        }
    }
}

/// Root configuration for a dump run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Path to the Terraform binary. Required.
    pub tf_bin: Option<PathBuf>,
    /// Host (optionally `host:port`) that replaces the artifact URL host.
    pub source_host_override: Option<String>,
    /// Download retry policy.
    pub retry: RetryPolicy,
}

impl DumpConfig {
    /// Builds a configuration from `TF_BIN` and `SOURCE_CONTROLLER_LOCALHOST`.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            tf_bin: non_empty_env(constants::TF_BIN_ENV).map(PathBuf::from),
            source_host_override: non_empty_env(constants::SOURCE_HOST_OVERRIDE_ENV),
            retry: RetryPolicy::default(),
        }
    }

    /// Returns the Terraform binary path.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::Config` if no binary path was supplied.
    pub fn require_tf_bin(&self) -> Result<&PathBuf> {
        self.tf_bin.as_ref().ok_or_else(|| TfdumpError::Config {
            message: format!("{} env var is unset", constants::TF_BIN_ENV),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

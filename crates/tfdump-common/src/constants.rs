//! System-wide constants and environment variable names.

use std::time::Duration;

/// File written into the working directory with the composed variables.
pub const GENERATED_VARS_FILE: &str = "generated.auto.tfvars.json";

/// Environment variable holding the path to the Terraform binary.
pub const TF_BIN_ENV: &str = "TF_BIN";

/// Environment variable that redirects artifact downloads to another host.
pub const SOURCE_HOST_OVERRIDE_ENV: &str = "SOURCE_CONTROLLER_LOCALHOST";

/// Namespace used when none is given on the command line.
pub const DEFAULT_NAMESPACE: &str = "flux-system";

/// Workspace selected when the resource does not declare one.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Number of retries after the first download attempt.
pub const DEFAULT_RETRY_MAX: u32 = 4;

/// Lower bound of the download backoff.
pub const DEFAULT_RETRY_WAIT_MIN: Duration = Duration::from_secs(1);

/// Upper bound of the download backoff.
pub const DEFAULT_RETRY_WAIT_MAX: Duration = Duration::from_secs(30);

/// Application name used in CLI output.
pub const APP_NAME: &str = "tfdump";

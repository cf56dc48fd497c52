//! Backend configuration for `terraform init`.
//!
//! Options are emitted in declaration order and never deduplicated: when a
//! key appears twice, Terraform's own flag processing lets the later one win.

use std::fmt;

use tfdump_common::cancel::CancelToken;
use tfdump_common::error::{Result, ResultExt};
use tfdump_common::types::BackendConfigsFromRef;

use crate::resolver::SourceLookup;
use crate::store::ObjectStore;

/// A single `terraform init` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOption {
    /// `-upgrade=<bool>`.
    Upgrade(bool),
    /// `-backend-config=<key=value>`.
    BackendConfig(String),
}

impl InitOption {
    /// Renders the option as a command-line flag.
    #[must_use]
    pub fn to_arg(&self) -> String {
        match self {
            Self::Upgrade(upgrade) => format!("-upgrade={upgrade}"),
            Self::BackendConfig(kv) => format!("-backend-config={kv}"),
        }
    }
}

impl fmt::Display for InitOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upgrade(upgrade) => write!(f, "upgrade={upgrade}"),
            Self::BackendConfig(kv) => f.write_str(kv),
        }
    }
}

fn backend_config(key: &str, raw: &[u8]) -> InitOption {
    InitOption::BackendConfig(format!("{key}={}", String::from_utf8_lossy(raw)))
}

/// Builds the `terraform init` options from the backend sources.
///
/// The list always starts with `Upgrade(true)`.
///
/// # Errors
///
/// Fails on the first required source that cannot be resolved.
pub fn compose_backend_options(
    store: &dyn ObjectStore,
    namespace: &str,
    refs: &[BackendConfigsFromRef],
    cancel: &CancelToken,
) -> Result<Vec<InitOption>> {
    let mut options = vec![InitOption::Upgrade(true)];

    for (index, bf) in refs.iter().enumerate() {
        let data = SourceLookup {
            namespace,
            kind: bf.kind,
            name: &bf.name,
            optional: bf.optional,
        }
        .resolve(store, cancel)
        .with_context(|| {
            format!("backendConfigsFrom[{index}] {} {namespace}/{}", bf.kind, bf.name)
        })?;

        match &bf.keys {
            None => options.extend(data.iter().map(|(key, raw)| backend_config(key, raw))),
            Some(keys) => options.extend(keys.iter().map(|key| {
                backend_config(key, data.get(key).map_or(&[][..], Vec::as_slice))
            })),
        }
    }

    tracing::debug!(count = options.len(), "backend options composed");
    Ok(options)
}

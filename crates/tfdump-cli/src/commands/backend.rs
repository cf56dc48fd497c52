//! `tfdump backend`: Print the `terraform init` options of a resource.

use std::io::Write;

use clap::Args;
use tfdump_common::cancel::CancelToken;
use tfdump_compose::backend::compose_backend_options;

use super::GlobalArgs;

/// Arguments for the `backend` command.
#[derive(Args, Debug)]
pub struct BackendArgs {
    /// Terraform resource, as `name` or `namespace/name`.
    pub resource: String,
}

/// Executes the `backend` command.
///
/// Prints one command-line argument per line, in the order they are passed
/// to `terraform init`.
///
/// # Errors
///
/// Returns an error if the resource or a required backend source cannot be
/// resolved.
pub fn execute(args: BackendArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let (store, terraform) = global.terraform(&args.resource)?;
    let options = compose_backend_options(
        &store,
        &terraform.key.namespace,
        &terraform.spec.backend_configs_from,
        &CancelToken::new(),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut stdout = std::io::stdout().lock();
    for option in &options {
        writeln!(stdout, "{}", option.to_arg())?;
    }
    Ok(())
}

//! `tfdump vars`: Print the composed variables of a Terraform resource.

use std::io::Write;

use clap::Args;
use tfdump_common::cancel::CancelToken;
use tfdump_compose::vars::compose_variables;

use super::GlobalArgs;

/// Arguments for the `vars` command.
#[derive(Args, Debug)]
pub struct VarsArgs {
    /// Terraform resource, as `name` or `namespace/name`.
    pub resource: String,
}

/// Executes the `vars` command.
///
/// Prints the same JSON object that `dump` writes to the var file.
///
/// # Errors
///
/// Returns an error if the resource or a required variable source cannot be
/// resolved.
pub fn execute(args: VarsArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let (store, terraform) = global.terraform(&args.resource)?;
    let vars = compose_variables(
        &store,
        &terraform.key.namespace,
        &terraform.spec.vars,
        &terraform.spec.vars_from,
        &CancelToken::new(),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let json = vars.to_json().map_err(|e| anyhow::anyhow!("{e}"))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&json)?;
    writeln!(stdout)?;
    Ok(())
}

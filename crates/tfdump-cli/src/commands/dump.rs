//! `tfdump dump`: Materialize a Terraform resource into a directory.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tfdump_common::cancel::CancelToken;
use tfdump_runtime::backend::cli::TerraformCliFactory;
use tfdump_runtime::engine::Dumper;

use super::GlobalArgs;
use crate::output;

/// Arguments for the `dump` command.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Terraform resource, as `name` or `namespace/name`.
    pub resource: String,

    /// Target directory; created if missing.
    pub dir: PathBuf,
}

/// Executes the `dump` command.
///
/// # Errors
///
/// Returns an error if any step of the dump fails or it is interrupted.
pub fn execute(args: DumpArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = global.config();
    let store = global.store()?;
    let engines = TerraformCliFactory::from_config(&config).map_err(|e| anyhow::anyhow!("{e}"))?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| anyhow::anyhow!("failed to install Ctrl+C handler: {e}"))?;

    let key = global.resource_key(&args.resource);
    let dumper = Dumper::new(&config, &store, &engines)
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .with_cancel(cancel);

    let mut stdout = std::io::stdout().lock();
    let report = dumper
        .dump(&mut stdout, &key, &args.dir)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    stdout.flush()?;

    output::print_report(&key, &report, start.elapsed());
    Ok(())
}

//! CLI command definitions and dispatch.

pub mod backend;
pub mod dump;
pub mod vars;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tfdump_common::config::DumpConfig;
use tfdump_common::constants;
use tfdump_common::types::{ObjectKey, TerraformResource};
use tfdump_compose::manifest::load_manifests;
use tfdump_compose::store::{MemoryStore, ObjectStore};

/// Materialize Terraform resources into runnable working directories.
#[derive(Parser, Debug)]
#[command(name = "tfdump", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Manifest file or directory holding the Terraform, source, Secret and ConfigMap objects.
    #[arg(long, short = 'f', global = true, default_value = ".")]
    pub manifests: PathBuf,

    /// Namespace used when the resource and its objects do not name one.
    #[arg(long, short = 'n', global = true, default_value = constants::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Terraform binary to run.
    #[arg(long, global = true, env = constants::TF_BIN_ENV)]
    pub tf_bin: Option<PathBuf>,

    /// Host (optionally `host:port`) that replaces the artifact URL host.
    #[arg(long, global = true, env = constants::SOURCE_HOST_OVERRIDE_ENV)]
    pub source_host: Option<String>,
}

impl GlobalArgs {
    /// Builds the run configuration; flags win over the environment.
    pub fn config(&self) -> DumpConfig {
        let env = DumpConfig::from_env();
        DumpConfig {
            tf_bin: self.tf_bin.clone().or(env.tf_bin),
            source_host_override: self
                .source_host
                .clone()
                .filter(|h| !h.is_empty())
                .or(env.source_host_override),
            retry: env.retry,
        }
    }

    /// Loads the object store from the manifests path.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest cannot be read or parsed.
    pub fn store(&self) -> anyhow::Result<MemoryStore> {
        let store = load_manifests(&self.manifests, &self.namespace)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        tracing::debug!(
            path = %self.manifests.display(),
            terraforms = store.terraform_count(),
            "manifests loaded"
        );
        Ok(store)
    }

    /// Resolves a `name` or `namespace/name` argument.
    pub fn resource_key(&self, resource: &str) -> ObjectKey {
        resource.split_once('/').map_or_else(
            || ObjectKey::new(self.namespace.as_str(), resource),
            |(ns, name)| ObjectKey::new(ns, name),
        )
    }

    /// Loads the store and looks up `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be loaded or holds no such resource.
    pub fn terraform(&self, resource: &str) -> anyhow::Result<(MemoryStore, TerraformResource)> {
        let store = self.store()?;
        let key = self.resource_key(resource);
        let terraform = store.get_terraform(&key).map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok((store, terraform))
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Unpack a Terraform resource, initialize its backend, select its workspace and
    /// generate its vars.
    Dump(dump::DumpArgs),
    /// Print the composed variables of a Terraform resource as JSON.
    Vars(vars::VarsArgs),
    /// Print the `terraform init` options of a Terraform resource.
    Backend(backend::BackendArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Dump(args) => dump::execute(args, &cli.global),
        Command::Vars(args) => vars::execute(args, &cli.global),
        Command::Backend(args) => backend::execute(args, &cli.global),
    }
}

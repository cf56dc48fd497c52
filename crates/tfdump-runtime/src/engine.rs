//! Dump orchestrator.
//!
//! Materializes one Terraform resource into a runnable working directory:
//! download and unpack its source artifact, initialize the backend, select
//! the workspace, and write the composed variables next to the root module.
//!
//! Nothing is rolled back on failure. Re-running from scratch into a fresh
//! directory is the recovery path.

use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tfdump_common::cancel::CancelToken;
use tfdump_common::config::DumpConfig;
use tfdump_common::error::{Result, ResultExt, TfdumpError};
use tfdump_common::types::ObjectKey;
use tfdump_compose::backend::compose_backend_options;
use tfdump_compose::store::ObjectStore;
use tfdump_compose::vars::{compose_variables, write_var_file};
use tfdump_source::archive::extract_archive;
use tfdump_source::download::ArtifactFetcher;

use crate::backend::EngineFactory;

/// Summary of a completed dump.
#[derive(Debug, Clone)]
pub struct DumpReport {
    /// Directory holding the Terraform root module.
    pub working_dir: PathBuf,
    /// Path of the generated var file.
    pub var_file: PathBuf,
    /// Source revision of the artifact, when published.
    pub revision: Option<String>,
    /// Size of the downloaded artifact in bytes.
    pub bytes: usize,
    /// Number of archive entries unpacked.
    pub entries: usize,
    /// Number of `terraform init` options passed, upgrade included.
    pub init_options: usize,
    /// Number of variables written.
    pub variables: usize,
}

/// Runs the dump pipeline against an object store and an engine factory.
pub struct Dumper<'a> {
    store: &'a dyn ObjectStore,
    engines: &'a dyn EngineFactory,
    fetcher: ArtifactFetcher,
    cancel: CancelToken,
}

impl fmt::Debug for Dumper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dumper")
            .field("fetcher", &self.fetcher)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<'a> Dumper<'a> {
    /// Creates a dumper.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::Config` if no Terraform binary is configured or
    /// the HTTP client cannot be built.
    pub fn new(
        config: &DumpConfig,
        store: &'a dyn ObjectStore,
        engines: &'a dyn EngineFactory,
    ) -> Result<Self> {
        let _ = config.require_tf_bin()?;
        Ok(Self {
            store,
            engines,
            fetcher: ArtifactFetcher::new(config)?,
            cancel: CancelToken::new(),
        })
    }

    /// Uses `cancel` to abort the run at the next blocking call.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Materializes the Terraform resource `key` into `dir`.
    ///
    /// Progress notices are written to `out`, interleaved with Terraform's
    /// own output.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Engine errors are returned as
    /// reported; all others carry the resource they concern.
    pub fn dump(&self, out: &mut dyn Write, key: &ObjectKey, dir: &Path) -> Result<DumpReport> {
        let cancel = &self.cancel;
        let context = || format!("terraform {key}");

        notice(
            out,
            format_args!(" {key} Unpacking terraform resource into {}", dir.display()),
        )?;
        cancel.check()?;
        let terraform = self.store.get_terraform(key).with_context(context)?;
        let spec = &terraform.spec;

        cancel.check()?;
        let artifact = self
            .store
            .get_artifact(&spec.source_ref, &key.namespace)
            .with_context(context)?;
        let data = self.fetcher.fetch(&artifact, cancel).with_context(context)?;
        cancel.check()?;
        let entries = extract_archive(&data, dir).with_context(context)?;

        notice(out, format_args!(" Configuring backend"))?;
        let options = compose_backend_options(
            self.store,
            &key.namespace,
            &spec.backend_configs_from,
            cancel,
        )
        .with_context(context)?;

        let working_dir = module_dir(dir, &spec.path);
        let engine = self.engines.create(&working_dir)?;
        cancel.check()?;
        engine.init(&options, out)?;

        notice(out, format_args!(" Selecting workspace: {}", spec.workspace))?;
        cancel.check()?;
        engine.workspace_select(&spec.workspace, out)?;

        notice(out, format_args!(" Generating vars"))?;
        let vars = compose_variables(
            self.store,
            &key.namespace,
            &spec.vars,
            &spec.vars_from,
            cancel,
        )
        .with_context(context)?;
        let var_file = write_var_file(&vars, engine.working_dir()).with_context(context)?;

        tracing::info!(
            resource = %key,
            dir = %working_dir.display(),
            revision = artifact.revision.as_deref().unwrap_or("-"),
            "terraform resource dumped"
        );

        Ok(DumpReport {
            working_dir,
            var_file,
            revision: artifact.revision,
            bytes: data.len(),
            entries,
            init_options: options.len(),
            variables: vars.len(),
        })
    }
}

/// Joins the resource path under `dir`, dropping any root or prefix so an
/// absolute path cannot replace the target directory.
fn module_dir(dir: &Path, path: &str) -> PathBuf {
    let relative: PathBuf = Path::new(path)
        .components()
        .filter(|c| {
            matches!(
                c,
                Component::Normal(_) | Component::CurDir | Component::ParentDir
            )
        })
        .collect();
    dir.join(relative)
}

fn notice(out: &mut dyn Write, message: fmt::Arguments<'_>) -> Result<()> {
    tracing::info!("{message}");
    writeln!(out, "{message}").map_err(|e| TfdumpError::Io {
        path: PathBuf::from("<output>"),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use tfdump_compose::store::MemoryStore;

    use super::*;
    use crate::backend::recording::RecordingEngine;

    #[test]
    fn module_dir_stays_under_target() {
        let dir = Path::new("/work/out");
        assert_eq!(module_dir(dir, "envs/prod"), dir.join("envs/prod"));
        assert_eq!(module_dir(dir, "./infra"), dir.join("./infra"));
        assert_eq!(module_dir(dir, "/infra"), dir.join("infra"));
        assert_eq!(module_dir(dir, ""), dir.to_path_buf());
    }

    #[test]
    fn new_requires_tf_bin() {
        let store = MemoryStore::new();
        let engines = RecordingEngine::new();
        let err = Dumper::new(&DumpConfig::default(), &store, &engines).expect_err("unset");
        assert!(matches!(err, TfdumpError::Config { .. }));
    }

    #[test]
    fn missing_resource_is_not_found_with_context() {
        let store = MemoryStore::new();
        let engines = RecordingEngine::new();
        let config = DumpConfig {
            tf_bin: Some(PathBuf::from("terraform")),
            ..DumpConfig::default()
        };
        let dumper = Dumper::new(&config, &store, &engines).expect("dumper");
        let dir = tempfile::tempdir().expect("failed to create tempdir");

        let mut out = Vec::new();
        let err = dumper
            .dump(&mut out, &ObjectKey::new("ns", "app"), dir.path())
            .expect_err("missing");
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("terraform ns/app"));
        assert!(engines.calls().is_empty());
        assert_eq!(
            String::from_utf8(out).expect("utf8").lines().next(),
            Some(
                format!(" ns/app Unpacking terraform resource into {}", dir.path().display())
                    .as_str()
            )
        );
    }

    #[test]
    fn cancelled_dump_stops_before_lookup() {
        let store = MemoryStore::new();
        let engines = RecordingEngine::new();
        let config = DumpConfig {
            tf_bin: Some(PathBuf::from("terraform")),
            ..DumpConfig::default()
        };
        let cancel = CancelToken::new();
        cancel.cancel();
        let dumper = Dumper::new(&config, &store, &engines)
            .expect("dumper")
            .with_cancel(cancel);
        let dir = tempfile::tempdir().expect("failed to create tempdir");

        let err = dumper
            .dump(&mut std::io::sink(), &ObjectKey::new("ns", "app"), dir.path())
            .expect_err("cancelled");
        assert!(matches!(err, TfdumpError::Cancelled));
    }
}

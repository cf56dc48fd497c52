//! Terraform input variable composition.
//!
//! Inline variables are applied first, then every `varsFrom` reference in
//! declaration order. Later writers win, so an external source overrides an
//! inline value and a later reference overrides an earlier one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tfdump_common::cancel::CancelToken;
use tfdump_common::constants::GENERATED_VARS_FILE;
use tfdump_common::error::{Result, ResultExt, TfdumpError};
use tfdump_common::types::{VarEntry, VarsFromRef};

use crate::rename::parse_rename_pattern;
use crate::resolver::SourceLookup;
use crate::store::ObjectStore;

/// Flat mapping of variable name to JSON value.
///
/// Serialized with sorted keys, so identical inputs give identical bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedVariables {
    vars: BTreeMap<String, Value>,
}

impl ComposedVariables {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a JSON value, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let _ = self.vars.insert(name.into(), value);
    }

    /// Stores raw bytes as a JSON string, replacing any previous value.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn set_raw(&mut self, name: impl Into<String>, raw: &[u8]) {
        self.set(name, Value::String(String::from_utf8_lossy(raw).into_owned()));
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// Encodes the mapping as a single JSON object.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.vars)?)
    }
}

/// Merges inline variables and external sources into one mapping.
///
/// # Errors
///
/// Fails on the first required source that cannot be resolved, and on any
/// malformed rename pattern, optional source or not.
pub fn compose_variables(
    store: &dyn ObjectStore,
    namespace: &str,
    inline: &[VarEntry],
    refs: &[VarsFromRef],
    cancel: &CancelToken,
) -> Result<ComposedVariables> {
    let mut vars = ComposedVariables::new();
    for entry in inline {
        vars.set(entry.name.clone(), entry.value.clone());
    }

    for (index, vf) in refs.iter().enumerate() {
        apply_ref(&mut vars, store, namespace, vf, cancel)
            .with_context(|| format!("varsFrom[{index}] {} {namespace}/{}", vf.kind, vf.name))?;
    }

    tracing::debug!(count = vars.len(), "variables composed");
    Ok(vars)
}

fn apply_ref(
    vars: &mut ComposedVariables,
    store: &dyn ObjectStore,
    namespace: &str,
    vf: &VarsFromRef,
    cancel: &CancelToken,
) -> Result<()> {
    let data = SourceLookup {
        namespace,
        kind: vf.kind,
        name: &vf.name,
        optional: vf.optional,
    }
    .resolve(store, cancel)?;

    match &vf.vars_keys {
        None => {
            for (key, raw) in &data {
                vars.set_raw(key.clone(), raw);
            }
        }
        Some(patterns) => {
            for pattern in patterns {
                let pair = parse_rename_pattern(pattern)?;
                let raw = data.get(&pair.old_key).map_or(&[][..], Vec::as_slice);
                vars.set_raw(pair.new_key, raw);
            }
        }
    }
    Ok(())
}

/// Writes the mapping to `<dir>/generated.auto.tfvars.json`, replacing any
/// previous file. Returns the path written.
///
/// # Errors
///
/// Returns `TfdumpError::Io` if the file cannot be written.
pub fn write_var_file(vars: &ComposedVariables, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(GENERATED_VARS_FILE);
    let json = vars.to_json()?;
    std::fs::write(&path, json).map_err(|e| TfdumpError::Io {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), count = vars.len(), "var file written");
    Ok(path)
}

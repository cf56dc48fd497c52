//! Object store abstraction.
//!
//! Terraform resources, source artifacts, secrets, and config maps live in
//! an external API server. Composition only needs read access by key, so the
//! store is a narrow trait; [`MemoryStore`] backs tests and manifest-driven
//! runs.

use std::collections::{BTreeMap, BTreeSet};

use tfdump_common::error::{Result, TfdumpError};
use tfdump_common::types::{
    Artifact, KeyValueData, ObjectKey, SourceRef, TerraformResource, TerraformSpec,
};

/// Binary key/value object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretObject {
    /// Raw values.
    pub data: BTreeMap<String, Vec<u8>>,
    /// Write-only string values, merged over `data` on read.
    pub string_data: BTreeMap<String, String>,
}

impl SecretObject {
    /// Flattens the secret into key/value data.
    #[must_use]
    pub fn into_data(self) -> KeyValueData {
        let mut data = self.data;
        data.extend(
            self.string_data
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes())),
        );
        data
    }
}

/// Text key/value object with an optional binary side map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMapObject {
    /// String values.
    pub data: BTreeMap<String, String>,
    /// Binary values; win over `data` on key collision.
    pub binary_data: BTreeMap<String, Vec<u8>>,
}

impl ConfigMapObject {
    /// Flattens the config map into key/value data.
    #[must_use]
    pub fn into_data(self) -> KeyValueData {
        let mut data: KeyValueData = self
            .data
            .into_iter()
            .map(|(k, v)| (k, v.into_bytes()))
            .collect();
        data.extend(self.binary_data);
        data
    }
}

/// Read-only access to the objects a dump run consumes.
pub trait ObjectStore: Send + Sync {
    /// Fetches a Terraform resource.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AccessDenied`.
    fn get_terraform(&self, key: &ObjectKey) -> Result<TerraformResource>;

    /// Fetches the artifact currently published by a source object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the source does not exist or has no artifact yet.
    fn get_artifact(&self, source: &SourceRef, namespace: &str) -> Result<Artifact>;

    /// Fetches a secret.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AccessDenied`.
    fn get_secret(&self, key: &ObjectKey) -> Result<SecretObject>;

    /// Fetches a config map.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AccessDenied`.
    fn get_config_map(&self, key: &ObjectKey) -> Result<ConfigMapObject>;
}

/// In-memory object store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    terraforms: BTreeMap<ObjectKey, TerraformSpec>,
    sources: BTreeMap<(String, ObjectKey), Option<Artifact>>,
    secrets: BTreeMap<ObjectKey, SecretObject>,
    config_maps: BTreeMap<ObjectKey, ConfigMapObject>,
    denied: BTreeSet<(&'static str, ObjectKey)>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a Terraform resource.
    pub fn insert_terraform(&mut self, key: ObjectKey, spec: TerraformSpec) -> &mut Self {
        let _ = self.terraforms.insert(key, spec);
        self
    }

    /// Adds or replaces a source object; `None` means no artifact is published yet.
    pub fn insert_source(
        &mut self,
        kind: impl Into<String>,
        key: ObjectKey,
        artifact: Option<Artifact>,
    ) -> &mut Self {
        let _ = self.sources.insert((kind.into(), key), artifact);
        self
    }

    /// Adds or replaces a secret.
    pub fn insert_secret(&mut self, key: ObjectKey, secret: SecretObject) -> &mut Self {
        let _ = self.secrets.insert(key, secret);
        self
    }

    /// Adds or replaces a config map.
    pub fn insert_config_map(&mut self, key: ObjectKey, config_map: ConfigMapObject) -> &mut Self {
        let _ = self.config_maps.insert(key, config_map);
        self
    }

    /// Makes reads of `kind` at `key` fail with `AccessDenied`.
    pub fn deny(&mut self, kind: &'static str, key: ObjectKey) -> &mut Self {
        let _ = self.denied.insert((kind, key));
        self
    }

    /// Number of Terraform resources held.
    #[must_use]
    pub fn terraform_count(&self) -> usize {
        self.terraforms.len()
    }

    fn check_access(&self, kind: &'static str, key: &ObjectKey) -> Result<()> {
        if self.denied.contains(&(kind, key.clone())) {
            return Err(TfdumpError::AccessDenied {
                kind,
                id: key.to_string(),
            });
        }
        Ok(())
    }
}

fn lookup<T: Clone>(
    map: &BTreeMap<ObjectKey, T>,
    kind: &'static str,
    key: &ObjectKey,
) -> Result<T> {
    map.get(key).cloned().ok_or_else(|| TfdumpError::NotFound {
        kind,
        id: key.to_string(),
    })
}

impl ObjectStore for MemoryStore {
    fn get_terraform(&self, key: &ObjectKey) -> Result<TerraformResource> {
        self.check_access("Terraform", key)?;
        let spec = lookup(&self.terraforms, "Terraform", key)?;
        Ok(TerraformResource {
            key: key.clone(),
            spec,
        })
    }

    fn get_artifact(&self, source: &SourceRef, namespace: &str) -> Result<Artifact> {
        let key = source.key(namespace);
        let id = format!("{} {key}", source.kind);
        match self.sources.get(&(source.kind.clone(), key)) {
            None => Err(TfdumpError::NotFound { kind: "source", id }),
            Some(None) => Err(TfdumpError::NotFound {
                kind: "artifact of source",
                id,
            }),
            Some(Some(artifact)) => Ok(artifact.clone()),
        }
    }

    fn get_secret(&self, key: &ObjectKey) -> Result<SecretObject> {
        self.check_access("Secret", key)?;
        lookup(&self.secrets, "Secret", key)
    }

    fn get_config_map(&self, key: &ObjectKey) -> Result<ConfigMapObject> {
        self.check_access("ConfigMap", key)?;
        lookup(&self.config_maps, "ConfigMap", key)
    }
}

//! Domain primitive types used across the tfdump workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TfdumpError;

/// Raw key/value data resolved from a `ConfigMap` or `Secret`.
///
/// Sorted by key so every traversal is deterministic.
pub type KeyValueData = BTreeMap<String, Vec<u8>>;

/// Identity of a namespaced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Namespace (scope) of the object.
    pub namespace: String,
    /// Object name.
    pub name: String,
}

impl ObjectKey {
    /// Creates a key from a namespace and a name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Kind of an external key/value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceKind {
    /// Text map; values are strings, optionally with a binary side map.
    ConfigMap,
    /// Binary map; values are raw bytes.
    Secret,
}

impl SourceKind {
    /// Returns the kind name as it appears in manifests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMap => "ConfigMap",
            Self::Secret => "Secret",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = TfdumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ConfigMap" => Ok(Self::ConfigMap),
            "Secret" => Ok(Self::Secret),
            other => Err(TfdumpError::UnsupportedKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SourceKind {
    type Error = TfdumpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        kind.as_str().to_string()
    }
}

/// An inline Terraform input variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarEntry {
    /// Variable name.
    pub name: String,
    /// Variable value; any JSON value.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl VarEntry {
    /// Creates an inline variable.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Reference to a key/value object that supplies input variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarsFromRef {
    /// Kind of the referenced object.
    pub kind: SourceKind,
    /// Name of the referenced object, in the resource's namespace.
    pub name: String,
    /// Whether a missing object is tolerated.
    #[serde(default)]
    pub optional: bool,
    /// Rename patterns (`old:new` or `key`); `None` takes every key as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars_keys: Option<Vec<String>>,
}

/// Reference to a key/value object that supplies backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfigsFromRef {
    /// Kind of the referenced object.
    pub kind: SourceKind,
    /// Name of the referenced object, in the resource's namespace.
    pub name: String,
    /// Whether a missing object is tolerated.
    #[serde(default)]
    pub optional: bool,
    /// Keys to take; `None` takes every key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

/// Reference from a Terraform resource to the source object carrying its artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source object kind, e.g. `GitRepository`, `Bucket`, `OCIRepository`.
    pub kind: String,
    /// Source object name.
    pub name: String,
    /// Source namespace; defaults to the resource's namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SourceRef {
    /// Resolves the object key, falling back to `default_namespace`.
    #[must_use]
    pub fn key(&self, default_namespace: &str) -> ObjectKey {
        ObjectKey::new(
            self.namespace.as_deref().unwrap_or(default_namespace),
            self.name.clone(),
        )
    }
}

/// A packaged source snapshot published by a source object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Download URL.
    pub url: String,
    /// Declared size in bytes, if published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Source revision the artifact was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Desired state of a Terraform resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerraformSpec {
    /// Source object carrying the artifact.
    pub source_ref: SourceRef,
    /// Path of the Terraform root module inside the artifact.
    #[serde(default)]
    pub path: String,
    /// Terraform workspace to select.
    #[serde(default = "default_workspace")]
    pub workspace: String,
    /// Inline variables.
    #[serde(default)]
    pub vars: Vec<VarEntry>,
    /// External variable sources, applied in order.
    #[serde(default)]
    pub vars_from: Vec<VarsFromRef>,
    /// External backend configuration sources, applied in order.
    #[serde(default)]
    pub backend_configs_from: Vec<BackendConfigsFromRef>,
}

fn default_workspace() -> String {
    crate::constants::DEFAULT_WORKSPACE.to_string()
}

/// A resolved Terraform resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformResource {
    /// Resource identity.
    pub key: ObjectKey,
    /// Desired state.
    pub spec: TerraformSpec,
}

//! Loading objects from YAML manifests.
//!
//! Lets a dump run without an API server: Terraform resources, sources,
//! secrets, and config maps are read from multi-document YAML files into a
//! [`MemoryStore`].
//!
//! Values follow the API server's shapes: `Secret.data` and
//! `ConfigMap.binaryData` hold base64 strings, `Secret.stringData` and
//! `ConfigMap.data` hold plain text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer};
use tfdump_common::error::{Result, ResultExt, TfdumpError};
use tfdump_common::types::{Artifact, ObjectKey, TerraformSpec};

use crate::store::{ConfigMapObject, MemoryStore, SecretObject};

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SourceStatus {
    #[serde(default)]
    artifact: Option<Artifact>,
}

#[derive(Debug, Deserialize)]
struct SourceManifest {
    metadata: Metadata,
    #[serde(default)]
    status: SourceStatus,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
enum Manifest {
    Terraform {
        metadata: Metadata,
        spec: TerraformSpec,
    },
    Secret {
        metadata: Metadata,
        #[serde(default, deserialize_with = "base64_values")]
        data: BTreeMap<String, Vec<u8>>,
        #[serde(default, rename = "stringData")]
        string_data: BTreeMap<String, String>,
    },
    ConfigMap {
        metadata: Metadata,
        #[serde(default)]
        data: BTreeMap<String, String>,
        #[serde(default, rename = "binaryData", deserialize_with = "base64_values")]
        binary_data: BTreeMap<String, Vec<u8>>,
    },
    GitRepository(SourceManifest),
    Bucket(SourceManifest),
    #[serde(rename = "OCIRepository")]
    OciRepository(SourceManifest),
    #[serde(other)]
    Unknown,
}

/// Decodes a map of base64 strings; a null map reads as empty.
fn base64_values<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = Option::<BTreeMap<String, String>>::deserialize(deserializer)?;
    encoded
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            STANDARD
                .decode(value.trim())
                .map(|bytes| (key.clone(), bytes))
                .map_err(|e| {
                    serde::de::Error::custom(format!("key {key:?}: invalid base64: {e}"))
                })
        })
        .collect()
}

impl Metadata {
    fn key(self, default_namespace: &str) -> ObjectKey {
        ObjectKey::new(
            self.namespace.unwrap_or_else(|| default_namespace.to_string()),
            self.name,
        )
    }
}

/// Loads every manifest under `path` into a store.
///
/// `path` may be a single file or a directory; directories are scanned
/// (non-recursively) for `.yaml`, `.yml`, and `.json` files in name order.
/// Objects without a namespace land in `default_namespace`. Later documents
/// replace earlier ones with the same identity.
///
/// # Errors
///
/// Returns `TfdumpError::Io` if a file cannot be read and
/// `TfdumpError::Manifest` (with the file name) if a document is malformed.
pub fn load_manifests(path: &Path, default_namespace: &str) -> Result<MemoryStore> {
    let mut store = MemoryStore::new();
    for file in manifest_files(path)? {
        let content = std::fs::read_to_string(&file).map_err(|e| TfdumpError::Io {
            path: file.clone(),
            source: e,
        })?;
        load_documents(&mut store, &content, default_namespace)
            .with_context(|| file.display().to_string())?;
    }
    tracing::info!(
        path = %path.display(),
        terraforms = store.terraform_count(),
        "manifests loaded"
    );
    Ok(store)
}

/// Loads the YAML documents in `content` into `store`.
///
/// # Errors
///
/// Returns `TfdumpError::Manifest` if a document is malformed.
pub fn load_documents(
    store: &mut MemoryStore,
    content: &str,
    default_namespace: &str,
) -> Result<()> {
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        match serde_yaml::from_value::<Manifest>(value)? {
            Manifest::Terraform { metadata, spec } => {
                let _ = store.insert_terraform(metadata.key(default_namespace), spec);
            }
            Manifest::Secret {
                metadata,
                data,
                string_data,
            } => {
                let _ = store.insert_secret(
                    metadata.key(default_namespace),
                    SecretObject { data, string_data },
                );
            }
            Manifest::ConfigMap {
                metadata,
                data,
                binary_data,
            } => {
                let _ = store.insert_config_map(
                    metadata.key(default_namespace),
                    ConfigMapObject { data, binary_data },
                );
            }
            Manifest::GitRepository(source) => {
                insert_source(store, "GitRepository", source, default_namespace);
            }
            Manifest::Bucket(source) => insert_source(store, "Bucket", source, default_namespace),
            Manifest::OciRepository(source) => {
                insert_source(store, "OCIRepository", source, default_namespace);
            }
            Manifest::Unknown => tracing::debug!("skipping manifest of unhandled kind"),
        }
    }
    Ok(())
}

fn insert_source(
    store: &mut MemoryStore,
    kind: &str,
    source: SourceManifest,
    default_namespace: &str,
) {
    let _ = store.insert_source(
        kind,
        source.metadata.key(default_namespace),
        source.status.artifact,
    );
}

fn manifest_files(path: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |e| TfdumpError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let file = entry.map_err(io_err)?.path();
        let is_manifest = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json"));
        if is_manifest && file.is_file() {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use tfdump_common::types::{SourceKind, SourceRef};

    use super::*;
    use crate::store::ObjectStore;

    const MANIFESTS: &str = r#"
apiVersion: infra.contrib.fluxcd.io/v1alpha2
kind: Terraform
metadata:
  name: app
  namespace: apps
spec:
  path: ./infra
  workspace: prod
  sourceRef:
    kind: GitRepository
    name: repo
  vars:
    - name: region
      value: us-east-1
  varsFrom:
    - kind: ConfigMap
      name: db
      varsKeys: ["db_user:username"]
  backendConfigsFrom:
    - kind: Secret
      name: state
      optional: true
---
apiVersion: source.toolkit.fluxcd.io/v1
kind: GitRepository
metadata:
  name: repo
  namespace: apps
status:
  artifact:
    url: http://source-controller/gitrepository/apps/repo/abc.tar.gz
    size: 1024
    revision: main@sha1:abc
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: db
data:
  db_user: admin
binaryData:
  blob: AQID
---
apiVersion: v1
kind: Secret
metadata:
  name: state
stringData:
  bucket: b1
---
apiVersion: v1
kind: ServiceAccount
metadata:
  name: ignored
"#;

    fn loaded() -> MemoryStore {
        let mut store = MemoryStore::new();
        load_documents(&mut store, MANIFESTS, "apps").expect("load");
        store
    }

    #[test]
    fn terraform_spec_is_loaded() {
        let tf = loaded()
            .get_terraform(&ObjectKey::new("apps", "app"))
            .expect("terraform");
        assert_eq!(tf.spec.path, "./infra");
        assert_eq!(tf.spec.workspace, "prod");
        assert_eq!(tf.spec.vars_from[0].kind, SourceKind::ConfigMap);
        assert!(tf.spec.backend_configs_from[0].optional);
    }

    #[test]
    fn source_artifact_is_loaded() {
        let source = SourceRef {
            kind: "GitRepository".into(),
            name: "repo".into(),
            namespace: None,
        };
        let artifact = loaded().get_artifact(&source, "apps").expect("artifact");
        assert_eq!(artifact.size, Some(1024));
        assert_eq!(artifact.revision.as_deref(), Some("main@sha1:abc"));
    }

    #[test]
    fn objects_without_namespace_use_default() {
        let store = loaded();
        let cm = store
            .get_config_map(&ObjectKey::new("apps", "db"))
            .expect("config map");
        assert_eq!(cm.binary_data.get("blob"), Some(&vec![1, 2, 3]));
        let secret = store
            .get_secret(&ObjectKey::new("apps", "state"))
            .expect("secret");
        assert_eq!(secret.into_data().get("bucket"), Some(&b"b1".to_vec()));
    }

    #[test]
    fn secret_data_is_base64_decoded() {
        let doc = r"
apiVersion: v1
kind: Secret
metadata: {name: creds}
type: Opaque
data:
  password: aHVudGVyMg==
stringData:
  user: admin
";
        let mut store = MemoryStore::new();
        load_documents(&mut store, doc, "ns").expect("load");
        let data = store
            .get_secret(&ObjectKey::new("ns", "creds"))
            .expect("secret")
            .into_data();
        assert_eq!(data.get("password"), Some(&b"hunter2".to_vec()));
        assert_eq!(data.get("user"), Some(&b"admin".to_vec()));
    }

    #[test]
    fn null_secret_data_reads_as_empty() {
        let mut store = MemoryStore::new();
        load_documents(&mut store, "kind: Secret
metadata: {name: s}
data:
", "ns")
            .expect("load");
        let secret = store.get_secret(&ObjectKey::new("ns", "s")).expect("secret");
        assert!(secret.data.is_empty());
    }

    #[test]
    fn invalid_base64_names_the_key() {
        let doc = "kind: Secret\nmetadata: {name: s}\ndata:\n  token: '%%%'\n";
        let mut store = MemoryStore::new();
        let err = load_documents(&mut store, doc, "ns").expect_err("bad base64");
        assert!(err.to_string().contains("\"token\""), "{err}");
    }

    #[test]
    fn unsupported_reference_kind_is_rejected() {
        let doc = r"
kind: Terraform
metadata: {name: bad}
spec:
  sourceRef: {kind: GitRepository, name: repo}
  varsFrom:
    - kind: Bucket
      name: nope
";
        let mut store = MemoryStore::new();
        let err = load_documents(&mut store, doc, "ns").expect_err("bad kind");
        assert!(err.to_string().contains("unsupported source kind"));
    }

    #[test]
    fn load_manifests_scans_directory() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        std::fs::write(dir.path().join("all.yaml"), MANIFESTS).expect("write");
        std::fs::write(dir.path().join("README.md"), "not yaml: [").expect("write");

        let store = load_manifests(dir.path(), "apps").expect("load");
        assert_eq!(store.terraform_count(), 1);
    }

    #[test]
    fn malformed_file_error_names_the_file() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "kind: Terraform\nmetadata: [").expect("write");

        let err = load_manifests(&path, "ns").expect_err("malformed");
        assert!(err.to_string().contains("broken.yaml"));
    }
}

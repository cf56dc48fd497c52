//! Key/value source resolution.
//!
//! Turns a `(kind, name)` reference into flat [`KeyValueData`], and applies
//! the `optional` rule shared by variable and backend composition.

use tfdump_common::cancel::CancelToken;
use tfdump_common::error::Result;
use tfdump_common::types::{KeyValueData, ObjectKey, SourceKind};

use crate::store::{ConfigMapObject, ObjectStore, SecretObject};

/// Fetches the key/value data of a `ConfigMap` or `Secret`.
///
/// # Errors
///
/// Propagates `NotFound` and `AccessDenied` from the store.
pub fn get_key_value_data(
    store: &dyn ObjectStore,
    key: &ObjectKey,
    kind: SourceKind,
) -> Result<KeyValueData> {
    tracing::debug!(%kind, object = %key, "resolving key/value source");
    match kind {
        SourceKind::ConfigMap => store.get_config_map(key).map(ConfigMapObject::into_data),
        SourceKind::Secret => store.get_secret(key).map(SecretObject::into_data),
    }
}

/// A reference to an external key/value object, as seen by the resolver.
#[derive(Debug, Clone, Copy)]
pub struct SourceLookup<'a> {
    /// Namespace of the referring resource.
    pub namespace: &'a str,
    /// Object kind.
    pub kind: SourceKind,
    /// Object name.
    pub name: &'a str,
    /// Whether a missing object is tolerated.
    pub optional: bool,
}

impl SourceLookup<'_> {
    /// Resolves the reference.
    ///
    /// Resolution is always attempted. When the object is missing and the
    /// reference is optional, the reference contributes empty data instead
    /// of failing; every other error propagates.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled`, `AccessDenied`, or `NotFound` for a required reference.
    pub fn resolve(&self, store: &dyn ObjectStore, cancel: &CancelToken) -> Result<KeyValueData> {
        cancel.check()?;
        let key = ObjectKey::new(self.namespace, self.name);
        match get_key_value_data(store, &key, self.kind) {
            Ok(data) => Ok(data),
            Err(e) if self.optional && e.is_not_found() => {
                tracing::info!(
                    kind = %self.kind,
                    object = %key,
                    "optional source not found, contributing no data"
                );
                Ok(KeyValueData::new())
            }
            Err(e) => Err(e),
        }
    }
}

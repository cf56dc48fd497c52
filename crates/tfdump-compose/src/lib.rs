//! # tfdump-compose
//!
//! Composition of Terraform backend and variable configuration from
//! layered key/value sources.
//!
//! - [`store`]: read-only object store trait and the in-memory store.
//! - [`manifest`]: loads the in-memory store from YAML manifests.
//! - [`resolver`]: `ConfigMap` / `Secret` data resolution and the optional rule.
//! - [`rename`]: `old:new` rename directives.
//! - [`vars`]: input variable composition and the generated var file.
//! - [`backend`]: `terraform init` backend options.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod backend;
pub mod manifest;
pub mod rename;
pub mod resolver;
pub mod store;
pub mod vars;

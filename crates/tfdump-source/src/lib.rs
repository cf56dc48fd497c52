//! # tfdump-source
//!
//! Retrieval of packaged Terraform sources.
//!
//! Handles:
//! - **Host override**: redirecting artifact URLs to a local mirror.
//! - **Download**: HTTP GET with retry, status, and size checks.
//! - **Archive**: gzip-tar extraction into a working directory.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod archive;
pub mod download;
pub mod host;

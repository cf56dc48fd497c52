//! Terraform execution and the dump orchestrator for tfdump.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod backend;
pub mod engine;
pub mod exec;

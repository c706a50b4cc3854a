//! # kaa-cli: Command-Line Interface
//!
//! Provides the `kaa` binary. Argument parsing lives in `main.rs`; the
//! handlers here turn parsed arguments into an explicit configuration
//! value and drive the `kaa-schema` pipeline.
//!
//! ```bash
//! kaa validate service.yaml --schema schema.yaml
//! kaa validate https://example.com/service.yaml -u https://example.com/schema.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Loading, materialization, and validation belong to `kaa-schema`.
//! - This crate is the only place that prints to stdout or chooses an
//!   exit code.

pub mod validate;

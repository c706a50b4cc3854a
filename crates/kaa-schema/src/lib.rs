//! # kaa-schema: YAML Loading, Materialization & Validation
//!
//! Validates YAML documents against JSON Schemas that may themselves be
//! written in YAML. The pipeline is:
//!
//! 1. [`source`]: read bytes from a local file or one HTTP GET and parse
//!    them into a [`ParsedTree`] (a YAML mapping).
//! 2. [`materialize`]: encode a tree as a [`CanonicalSchema`] (JSON
//!    string) or a [`CanonicalDocument`] (JSON bytes).
//! 3. [`validate`]: run the `jsonschema` engine and report violations to
//!    a caller-supplied sink.
//!
//! ## Crate Policy
//!
//! - Every stage returns its error to the caller immediately. Nothing here
//!   prints user-facing output except the violation lines written to the
//!   sink passed into [`validate::validate`].
//! - Schema well-formedness is the engine's business. A nonsensical schema
//!   is materialized as-is and rejected at validation time.

pub mod error;
pub mod materialize;
pub mod source;
pub mod validate;

pub use error::{KaaError, Result};
pub use materialize::{materialize_document, materialize_schema, CanonicalDocument, CanonicalSchema};
pub use source::{load, load_document, load_schema, Loader, ParsedTree, Source};
pub use validate::{check, validate, ValidationOutcome, Violation};

//! # Validation
//!
//! Runs the `jsonschema` engine over a materialized document and schema.
//! The draft is picked from the schema's `$schema` keyword, and the schema
//! is checked against its meta-schema before any instance is evaluated.
//!
//! ## Failure Reporting
//!
//! [`validate`] writes one `- <field>: <message>` line per violation to the
//! caller's sink, in engine order, and then fails with
//! [`KaaError::InvalidYaml`]. A schema the engine cannot compile fails
//! with the same error: callers cannot tell the two cases apart.

use std::fmt;
use std::io::Write;

use serde_json::Value;

use crate::error::{KaaError, Result};
use crate::materialize::{CanonicalDocument, CanonicalSchema};

/// A single violation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Engine-provided description of the failure.
    pub message: String,
}

impl Violation {
    /// The instance path in dotted form (`spec.ports.0`), or `(root)`.
    pub fn field(&self) -> String {
        if self.instance_path.is_empty() || self.instance_path == "/" {
            return "(root)".to_string();
        }
        self.instance_path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field(), self.message)
    }
}

/// Result of evaluating a document against a compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    /// Violations in the order the engine reported them.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }
}

/// Evaluate a document without writing anything.
///
/// # Errors
///
/// Returns [`KaaError::InvalidYaml`] if the schema or document is not JSON
/// or the schema does not compile. Violations are reported through
/// [`ValidationOutcome::Invalid`], not as an error.
pub fn check(document: &CanonicalDocument, schema: &CanonicalSchema) -> Result<ValidationOutcome> {
    let schema_value: Value = serde_json::from_str(schema.as_str()).map_err(|e| {
        tracing::debug!(error = %e, "schema is not valid JSON");
        KaaError::InvalidYaml
    })?;
    let instance: Value = serde_json::from_slice(document.as_bytes()).map_err(|e| {
        tracing::debug!(error = %e, "document is not valid JSON");
        KaaError::InvalidYaml
    })?;

    let validator = jsonschema::validator_for(&schema_value).map_err(|e| {
        tracing::debug!(error = %e, "schema failed to compile");
        KaaError::InvalidYaml
    })?;

    let violations: Vec<Violation> = validator
        .iter_errors(&instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(ValidationOutcome::Valid)
    } else {
        Ok(ValidationOutcome::Invalid(violations))
    }
}

/// Validate a document and report violations to `sink`.
///
/// Nothing is written for a valid document. Write failures on the sink do
/// not change the result.
///
/// # Errors
///
/// Returns [`KaaError::InvalidYaml`] when the document has violations or
/// the schema cannot be compiled.
pub fn validate<W: Write + ?Sized>(
    document: &CanonicalDocument,
    schema: &CanonicalSchema,
    sink: &mut W,
) -> Result<ValidationOutcome> {
    match check(document, schema)? {
        ValidationOutcome::Valid => Ok(ValidationOutcome::Valid),
        ValidationOutcome::Invalid(violations) => {
            tracing::info!(count = violations.len(), "document failed validation");
            for violation in &violations {
                tracing::debug!(
                    instance_path = %violation.instance_path,
                    schema_path = %violation.schema_path,
                    "violation"
                );
                if let Err(e) = writeln!(sink, "- {violation}") {
                    tracing::debug!(error = %e, "could not write violation");
                }
            }
            Err(KaaError::InvalidYaml)
        }
    }
}

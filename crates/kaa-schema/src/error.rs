//! # Error Types
//!
//! A single error taxonomy shared by every pipeline stage. Display strings
//! are user-facing: the CLI prints them verbatim after
//! `Validation failed: `.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, materializing, or validating YAML.
#[derive(Error, Debug)]
pub enum KaaError {
    /// A local file could not be read (missing, a directory, no permission).
    #[error("cannot read file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource had no content, or only whitespace.
    #[error("YAML file is empty")]
    EmptyResource {
        /// Path or URL the empty content came from.
        origin: String,
    },

    /// The bytes are not well-formed YAML, or the root is not a mapping.
    #[error("could not unmarshal YAML: {reason}")]
    Parse { reason: String },

    /// A resource loaded in the schema role failed to parse.
    #[error("Schema file is invalid: {reason}")]
    InvalidSchema { reason: String },

    /// The parsed tree holds a value JSON cannot encode.
    #[error("Cannot marshal YAML into JSON: {reason}")]
    Serialization { reason: String },

    /// The GET request could not be sent or its body could not be read.
    #[error("failed to GET from URL \"{url}\": {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with anything other than `200 OK`.
    #[error("received non-OK HTTP status {status} from URL \"{url}\"")]
    NonSuccessStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The validation engine rejected the input.
    ///
    /// Covers both a schema the engine cannot compile and a document that
    /// violates a compiled schema. The two are not distinguished here.
    #[error("YAML file is invalid")]
    InvalidYaml,
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, KaaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resource_message_omits_origin() {
        let err = KaaError::EmptyResource {
            origin: "/tmp/empty.yaml".to_string(),
        };
        assert_eq!(err.to_string(), "YAML file is empty");
    }

    #[test]
    fn invalid_yaml_message_is_stable() {
        assert_eq!(KaaError::InvalidYaml.to_string(), "YAML file is invalid");
    }

    #[test]
    fn read_error_names_path() {
        let err = KaaError::Read {
            path: PathBuf::from("/no/such/file.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/no/such/file.yaml"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn non_success_status_includes_reason_phrase() {
        let err = KaaError::NonSuccessStatus {
            url: "https://example.com/schema.yaml".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(
            err.to_string(),
            "received non-OK HTTP status 404 Not Found from URL \"https://example.com/schema.yaml\""
        );
    }
}

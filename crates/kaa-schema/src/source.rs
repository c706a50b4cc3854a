//! # Source Loader
//!
//! Obtains the raw bytes of a resource, from local disk or with a single
//! blocking HTTP GET, and parses them as YAML into a [`ParsedTree`].
//!
//! ## Resource Addressing
//!
//! A [`Source`] is a URL only when the identifier parses as an absolute
//! URI with an `http` or `https` scheme. Anything else is a filesystem
//! path, so `my-http-config.yaml` or `C:\schemas\service.yaml` stay local.
//!
//! ## Roles
//!
//! [`Loader::load`] is role-agnostic. [`Loader::load_schema`] wraps it and
//! reports YAML decode failures as [`KaaError::InvalidSchema`];
//! [`Loader::load_document`] passes errors through untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use crate::error::{KaaError, Result};

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An `http` or `https` URL fetched with one GET.
    Url(Url),
}

impl Source {
    /// Classify an identifier as a URL or a local path.
    pub fn parse(identifier: &str) -> Self {
        Self::remote(identifier).unwrap_or_else(|| Self::Path(PathBuf::from(identifier)))
    }

    /// Parse an identifier that must be a remote URL.
    ///
    /// Returns `None` unless the identifier is an absolute `http`/`https` URI.
    pub fn remote(identifier: &str) -> Option<Self> {
        let url = Url::parse(identifier).ok()?;
        match url.scheme() {
            "http" | "https" => Some(Self::Url(url)),
            _ => None,
        }
    }

    /// Returns true for [`Source::Url`].
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// A YAML document whose root is a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTree(serde_yaml::Mapping);

impl ParsedTree {
    /// Parse YAML bytes, requiring a mapping at the root.
    ///
    /// # Errors
    ///
    /// Returns [`KaaError::Parse`] for malformed YAML, for multi-document
    /// streams, for merge keys (`<<`) that do not name a mapping, and for
    /// scalar, sequence, or null roots.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut value: serde_yaml::Value =
            serde_yaml::from_slice(bytes).map_err(|e| KaaError::Parse {
                reason: e.to_string(),
            })?;
        // `<<: *anchor` is expanded in place, as YAML 1.1 decoders do.
        value.apply_merge().map_err(|e| KaaError::Parse {
            reason: e.to_string(),
        })?;

        match value {
            serde_yaml::Value::Mapping(mapping) => Ok(Self(mapping)),
            other => Err(KaaError::Parse {
                reason: format!(
                    "expected a mapping at the document root, found {}",
                    value_kind(&other)
                ),
            }),
        }
    }

    /// Borrow the underlying mapping.
    pub fn as_mapping(&self) -> &serde_yaml::Mapping {
        &self.0
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.0.get(key)
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the root mapping has no keys (`{}`).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Reads and parses resources. Holds the HTTP client so both loads of a
/// run share one connection pool.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    client: Client,
}

impl Loader {
    /// Create a loader with a default blocking HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse a resource in no particular role.
    ///
    /// # Errors
    ///
    /// [`KaaError::Read`], [`KaaError::Transport`],
    /// [`KaaError::NonSuccessStatus`], [`KaaError::EmptyResource`] or
    /// [`KaaError::Parse`].
    pub fn load(&self, source: &Source) -> Result<ParsedTree> {
        let bytes = self.read_bytes(source)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(KaaError::EmptyResource {
                origin: source.to_string(),
            });
        }
        ParsedTree::from_slice(&bytes)
    }

    /// Load a resource that will be used as a schema.
    pub fn load_schema(&self, source: &Source) -> Result<ParsedTree> {
        self.load(source).map_err(|e| match e {
            KaaError::Parse { reason } => KaaError::InvalidSchema { reason },
            other => other,
        })
    }

    /// Load a resource that will be validated.
    pub fn load_document(&self, source: &Source) -> Result<ParsedTree> {
        self.load(source)
    }

    fn read_bytes(&self, source: &Source) -> Result<Vec<u8>> {
        match source {
            Source::Path(path) => read_file(path),
            Source::Url(url) => self.fetch(url),
        }
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!(%url, "fetching remote resource");

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| KaaError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(KaaError::NonSuccessStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().map_err(|source| KaaError::Transport {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(%url, bytes = body.len(), "fetched remote resource");
        Ok(body.to_vec())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|source| KaaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read local resource");
    Ok(bytes)
}

/// Load a resource with a fresh [`Loader`].
pub fn load(source: &Source) -> Result<ParsedTree> {
    Loader::new().load(source)
}

/// Load a schema resource with a fresh [`Loader`].
pub fn load_schema(source: &Source) -> Result<ParsedTree> {
    Loader::new().load_schema(source)
}

/// Load a document resource with a fresh [`Loader`].
pub fn load_document(source: &Source) -> Result<ParsedTree> {
    Loader::new().load_document(source)
}

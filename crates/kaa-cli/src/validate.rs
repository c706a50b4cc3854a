//! # Validate Subcommand
//!
//! `kaa validate <DOCUMENT> (--schema <PATH> | --schema-url <URL>)`
//!
//! Loads the schema, then the document, materializes both as JSON and
//! runs the validator. Violations and the final verdict go to stdout.
//! Exit code is 0 when the document is valid and 1 for any failure,
//! including a missing schema flag.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use thiserror::Error;

use kaa_schema::{materialize_document, materialize_schema, validate, Loader, Source};

/// Printed when the arguments do not name a usable schema.
pub const USAGE: &str = "Usage: kaa validate <DOCUMENT> (--schema <PATH> | --schema-url <URL>)";

/// Arguments for the `kaa validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate: a local path or an http(s) URL.
    #[arg(value_name = "DOCUMENT")]
    pub document: String,

    /// Path to a local schema file (YAML or JSON).
    #[arg(short = 's', long = "schema", value_name = "PATH", conflicts_with = "schema_url")]
    pub schema: Option<PathBuf>,

    /// URL of a remote schema file (YAML or JSON).
    #[arg(short = 'u', long = "schema-url", value_name = "URL")]
    pub schema_url: Option<String>,
}

/// Arguments that parsed but do not form a runnable configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no schema given: pass --schema or --schema-url")]
    MissingSchema,

    #[error("--schema-url must be an absolute http or https URL, got '{0}'")]
    InvalidSchemaUrl(String),
}

/// Everything one validation run needs, resolved from the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateConfig {
    pub document: Source,
    pub schema: Source,
}

impl TryFrom<&ValidateArgs> for ValidateConfig {
    type Error = ConfigError;

    fn try_from(args: &ValidateArgs) -> std::result::Result<Self, Self::Error> {
        let schema = match (&args.schema, &args.schema_url) {
            (Some(path), _) => Source::Path(path.clone()),
            (None, Some(url)) => {
                Source::remote(url).ok_or_else(|| ConfigError::InvalidSchemaUrl(url.clone()))?
            }
            (None, None) => return Err(ConfigError::MissingSchema),
        };

        Ok(Self {
            document: Source::parse(&args.document),
            schema,
        })
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let config = match ValidateConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            writeln!(out, "{e}").context("failed to write to stdout")?;
            writeln!(out, "{USAGE}").context("failed to write to stdout")?;
            return Ok(1);
        }
    };

    tracing::info!(document = %config.document, schema = %config.schema, "validating");

    execute(&config, &Loader::new(), &mut out).context("failed to write to stdout")
}

/// Run one validation and print the verdict to `out`.
pub fn execute<W: Write>(config: &ValidateConfig, loader: &Loader, out: &mut W) -> io::Result<u8> {
    match check_document(config, loader, out) {
        Ok(()) => {
            writeln!(out, "YAML file is valid!")?;
            Ok(0)
        }
        Err(e) => {
            writeln!(out, "Validation failed: {e}")?;
            Ok(1)
        }
    }
}

/// Load, materialize, and validate, writing violations to `sink`.
pub fn check_document<W: Write + ?Sized>(
    config: &ValidateConfig,
    loader: &Loader,
    sink: &mut W,
) -> kaa_schema::Result<()> {
    let schema_tree = loader.load_schema(&config.schema)?;
    let document_tree = loader.load_document(&config.document)?;

    let schema = materialize_schema(&schema_tree)?;
    let document = materialize_document(&document_tree)?;

    validate(&document, &schema, sink)?;
    Ok(())
}

//! Core logic behind the command-line filters.
//!
//! - `wcon-normalize`:     repair a vendor WCON file into canonical WCON
//! - `wcon-sparse-render`: print the `data` section in sparse debug form
//!
//! Everything here works on text and returns text, so the binaries only deal
//! with argument parsing and I/O.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use wcon_dialect::normalize::parse_index;
use wcon_dialect::{normalize, NormalizeError, NormalizeOptions, SparseList};

/// Name used for the input when reading from stdin.
pub const STDIN_NAME: &str = "<stdin>";

// ── Errors ────────────────────────────────────────────────────────────────

/// Failures of a filter run. Each carries the input it concerns.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{source_name}: {error}")]
    Json {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },
    #[error("{source_name}: {error}")]
    Normalize {
        source_name: String,
        #[source]
        error: NormalizeError,
    },
    #[error("{source_name}: `data` must be an object or an array")]
    DataShape { source_name: String },
    #[error("invalid config {}: {error}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        error: toml::de::Error,
    },
    #[error("{}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl CliError {
    fn json(source_name: &str, error: serde_json::Error) -> Self {
        CliError::Json {
            source_name: source_name.to_string(),
            error,
        }
    }
}

// ── Config ────────────────────────────────────────────────────────────────

/// Filter configuration, usually read from a TOML file:
///
/// ```toml
/// [normalize]
/// data_layout = "dense"
/// extension_key = "@MWT"
/// unwrap_fields = ["t", "x", "y"]
///
/// [output]
/// pretty = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub normalize: NormalizeOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|error| CliError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let config = Self::from_toml_str(&text).map_err(|error| CliError::Config {
            path: path.to_path_buf(),
            error,
        })?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

// ── Logging ───────────────────────────────────────────────────────────────

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wcon=info,wcon_dialect=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

// ── I/O ───────────────────────────────────────────────────────────────────

/// Reads the whole input, from `path` or stdin. Returns the text and the
/// name to report it under.
pub fn read_input(path: Option<&Path>) -> Result<(String, String), CliError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|error| CliError::Io {
                path: path.to_path_buf(),
                error,
            })?;
            Ok((text, path.display().to_string()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|error| CliError::Io {
                    path: PathBuf::from(STDIN_NAME),
                    error,
                })?;
            Ok((text, STDIN_NAME.to_string()))
        }
    }
}

/// Writes `text` plus a trailing newline to `path`, or stdout.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<(), CliError> {
    let result = match path {
        Some(path) => fs::write(path, format!("{text}\n")),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
        }
    };
    result.map_err(|error| CliError::Io {
        path: path.map_or_else(|| PathBuf::from("<stdout>"), Path::to_path_buf),
        error,
    })
}

// ── wcon-normalize ────────────────────────────────────────────────────────

/// Repairs a WCON document given as JSON text and returns canonical JSON
/// text.
pub fn normalize_json(
    text: &str,
    source_name: &str,
    options: &NormalizeOptions,
    pretty: bool,
) -> Result<String, CliError> {
    let raw: Value = serde_json::from_str(text).map_err(|e| CliError::json(source_name, e))?;
    let doc = normalize(&raw, options).map_err(|error| CliError::Normalize {
        source_name: source_name.to_string(),
        error,
    })?;
    info!(
        source = source_name,
        slots = doc.data().span(),
        "normalized WCON document"
    );
    let out = if pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    };
    out.map_err(|e| CliError::json(source_name, e))
}

// ── wcon-sparse-render ────────────────────────────────────────────────────

/// Renders the raw `data` section of a WCON document in sparse debug form:
/// entries in index order with a blank marker where indices are skipped.
///
/// Object-shaped `data` is keyed by the parsed object keys; array-shaped
/// `data` uses positions, with `null` elements treated as gaps.
pub fn render_sparse_data(text: &str, source_name: &str) -> Result<String, CliError> {
    let raw: Value = serde_json::from_str(text).map_err(|e| CliError::json(source_name, e))?;
    let normalize_error = |error: NormalizeError| CliError::Normalize {
        source_name: source_name.to_string(),
        error,
    };
    let list: SparseList<&Value> = match raw.get("data") {
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(key, record)| parse_index(key).map(|index| (index, record)))
            .collect::<Result<_, _>>()
            .map_err(normalize_error)?,
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.is_null())
            .collect(),
        Some(_) => {
            return Err(CliError::DataShape {
                source_name: source_name.to_string(),
            })
        }
        None => return Err(normalize_error(NormalizeError::MissingData)),
    };
    Ok(list.to_string())
}

//! Parser for raking target specs and iteration configs (YAML/TOML/JSON).
//!
//! This module reads target specs into an order-preserving [`RawTargetSpec`]
//! and iteration settings into an [`IterationConfig`]. Target specs are not
//! checked against any data here; that happens when a weighting session is
//! created.
//!
//! # Example
//!
//! ```rust
//! use raking_parser::parse_targets_yaml;
//!
//! let yaml = r#"
//! Gender:
//!   M: 49
//!   F: 51
//! Region:
//!   North: 30
//!   South: 70
//! "#;
//!
//! let targets = parse_targets_yaml(yaml).expect("Failed to parse targets");
//! assert_eq!(targets.columns().collect::<Vec<_>>(), vec!["Gender", "Region"]);
//! ```

use raking_core::{IterationConfig, RawTargetSpec};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use serde_yaml_ng::Value as YamlValue;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while parsing targets or configs.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Document does not have the expected shape
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Detect the file format from a path based on its extension.
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a target spec from a YAML string.
///
/// Non-string category keys (`1: 50`, `true: 30`) are turned into their
/// string form so they can match numeric or boolean columns.
pub fn parse_targets_yaml(content: &str) -> Result<RawTargetSpec> {
    let yaml: YamlValue = serde_yaml_ng::from_str(content)?;
    targets_from_value(yaml_to_json(yaml)?)
}

/// Parse a target spec from a TOML string.
///
/// # Example
///
/// ```rust
/// use raking_parser::parse_targets_toml;
///
/// let toml = r#"
/// [Gender]
/// M = 48.5
/// F = 51.5
/// "#;
///
/// let targets = parse_targets_toml(toml).unwrap();
/// assert_eq!(targets.len(), 1);
/// ```
pub fn parse_targets_toml(content: &str) -> Result<RawTargetSpec> {
    let value: Value =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    targets_from_value(value)
}

/// Parse a target spec from a JSON string.
pub fn parse_targets_json(content: &str) -> Result<RawTargetSpec> {
    let value: Value = serde_json::from_str(content)?;
    targets_from_value(value)
}

/// Parse a target spec from a string in the given format.
pub fn parse_targets(content: &str, format: FileFormat) -> Result<RawTargetSpec> {
    match format {
        FileFormat::Yaml => parse_targets_yaml(content),
        FileFormat::Toml => parse_targets_toml(content),
        FileFormat::Json => parse_targets_json(content),
    }
}

/// Parse a target spec from a file with automatic format detection.
///
/// ```no_run
/// use raking_parser::parse_targets_file;
/// use std::path::Path;
///
/// let targets = parse_targets_file(Path::new("targets/census_2021.yml")).unwrap();
/// println!("Loaded targets for {} columns", targets.len());
/// ```
pub fn parse_targets_file(path: &Path) -> Result<RawTargetSpec> {
    let content = std::fs::read_to_string(path)?;
    let format = detect_format(path)?;
    parse_targets(&content, format)
}

/// Parse an iteration config from a string in the given format.
///
/// Keys left out take their defaults; unknown keys are rejected.
pub fn parse_config(content: &str, format: FileFormat) -> Result<IterationConfig> {
    let config: IterationConfig = deserialize(content, format)?;
    config
        .validate()
        .map_err(|e| ParserError::InvalidDocument(e.to_string()))?;
    Ok(config)
}

/// Parse an iteration config from a file with automatic format detection.
pub fn parse_config_file(path: &Path) -> Result<IterationConfig> {
    let content = std::fs::read_to_string(path)?;
    let format = detect_format(path)?;
    parse_config(&content, format)
}

fn deserialize<T: DeserializeOwned>(content: &str, format: FileFormat) -> Result<T> {
    match format {
        FileFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
        FileFormat::Toml => {
            toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))
        }
        FileFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

fn targets_from_value(value: Value) -> Result<RawTargetSpec> {
    match value {
        // An empty YAML document
        Value::Null => Ok(RawTargetSpec::new()),
        other => RawTargetSpec::from_json(other).ok_or_else(|| {
            ParserError::InvalidDocument(
                "target spec must be a mapping of column name to category targets".to_string(),
            )
        }),
    }
}

/// Converts YAML to JSON, keeping mapping order and stringifying scalar keys.
fn yaml_to_json(value: YamlValue) -> Result<Value> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        ParserError::InvalidDocument(format!("non-finite number {n}"))
                    })?
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_key(key: YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) => f.to_string(),
            _ => n.to_string(),
        }),
        other => Err(ParserError::InvalidDocument(format!(
            "unsupported mapping key: {other:?}"
        ))),
    }
}

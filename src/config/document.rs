use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::lenient;
use super::matcher::LabelMatcher;
use crate::errors::ConfigError;

/// The rule set the engine evaluates, whatever document version it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelerConfig {
    pub version: u32,
    /// Scheduled runs also process open issues, not only pull requests.
    pub issues: bool,
    /// Labels are only ever added, never removed.
    pub append_only: bool,
    pub labels: Vec<LabelMatcher>,
}

/// Version 1+ document: an explicit list of clauses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VersionedDocument {
    pub version: u32,
    #[serde(deserialize_with = "lenient::flag")]
    pub issues: bool,
    #[serde(
        rename = "appendOnly",
        alias = "appendonly",
        alias = "append-only",
        deserialize_with = "lenient::flag"
    )]
    pub append_only: bool,
    pub labels: Vec<LabelMatcher>,
}

/// The two on-disk shapes of a rule set.
#[derive(Debug)]
pub enum ConfigDocument {
    /// Version 0: `label -> clause`, one clause per label.
    Legacy(Vec<LabelMatcher>),
    Versioned(Box<VersionedDocument>),
}

impl ConfigDocument {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(raw)?;
        let mapping = match value {
            Value::Null => return Ok(ConfigDocument::Legacy(Vec::new())),
            Value::Mapping(mapping) => mapping,
            _ => return Err(ConfigError::NotAMapping),
        };

        if document_version(&mapping)? == 0 {
            return legacy_clauses(mapping).map(ConfigDocument::Legacy);
        }

        let doc: VersionedDocument = serde_yaml::from_value(Value::Mapping(mapping))?;
        Ok(ConfigDocument::Versioned(Box::new(doc)))
    }

    pub fn into_config(self) -> LabelerConfig {
        match self {
            ConfigDocument::Legacy(labels) => LabelerConfig {
                version: 0,
                issues: false,
                append_only: false,
                labels,
            },
            ConfigDocument::Versioned(doc) => LabelerConfig {
                version: doc.version,
                issues: doc.issues,
                append_only: doc.append_only,
                labels: doc.labels,
            },
        }
    }
}

fn document_version(mapping: &Mapping) -> Result<u32, ConfigError> {
    match mapping.get("version") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ConfigError::InvalidVersion(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVersion(s.clone())),
        Some(other) => Err(ConfigError::InvalidVersion(format!("{other:?}"))),
    }
}

fn legacy_clauses(mapping: Mapping) -> Result<Vec<LabelMatcher>, ConfigError> {
    let mut labels = Vec::new();
    for (key, value) in mapping {
        let label = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        if label == "version" {
            continue;
        }
        let mut matcher: LabelMatcher =
            serde_yaml::from_value(value).map_err(|source| ConfigError::Rule {
                label: label.clone(),
                source,
            })?;
        matcher.label = label;
        labels.push(matcher);
    }
    Ok(labels)
}

/// Parse a YAML rule set of any supported version.
pub fn parse_config(raw: &str) -> Result<LabelerConfig, ConfigError> {
    Ok(ConfigDocument::parse(raw)?.into_config())
}

use std::num::ParseIntError;
use thiserror::Error;

/// Why a condition produced no verdict for a clause.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// The clause does not set this condition's parameter.
    #[error("{0} is not set in config")]
    NotConfigured(&'static str),

    /// The parameter is set but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The target lacks the data the condition needs.
    #[error("target data unavailable: {0}")]
    Unavailable(String),

    /// An external collaborator failed; processing of the target stops.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl ConditionError {
    /// Configuration and data gaps skip the condition; collaborator
    /// failures do not.
    pub fn is_skip(&self) -> bool {
        !matches!(self, ConditionError::Provider(_))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DurationError {
    #[error("invalid number in duration `{input}`: {source}")]
    Number {
        input: String,
        source: ParseIntError,
    },

    #[error("invalid duration `{input}`: {reason}")]
    Format { input: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to parse labeler config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("labeler config must be a mapping at the top level")]
    NotAMapping,

    #[error("invalid version `{0}` in labeler config")]
    InvalidVersion(String),

    #[error("rule for label `{label}` is invalid: {source}")]
    Rule {
        label: String,
        source: serde_yaml::Error,
    },
}

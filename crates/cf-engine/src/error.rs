//! Error types for tokenizing, modifiers, and the pipeline.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("empty command")]
    EmptyInput,
}

/// Failure of a single modifier. The pipeline records these per modifier
/// and carries on with the next one.
#[derive(Debug, Error)]
pub enum ModifierError {
    /// The modifier has no implementation for the requested technique.
    #[error("not implemented")]
    NotImplemented,
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid sed statement {statement:?}: {reason}")]
    SedStatement { statement: String, reason: String },
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),
    #[error("{0} must not be empty")]
    EmptyPool(&'static str),
}

impl ModifierError {
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, ModifierError::NotImplemented)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObfuscateError {
    #[error("no profile variant available")]
    NoProfile,
    #[error("tokenize: {0}")]
    Tokenize(#[from] TokenizeError),
}

//! Token types produced by the tokenizer and rewritten by modifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic role of one element of a command line.
///
/// Modifiers decide eligibility by membership of a token's type in their
/// configured `AppliesTo` set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// The executable itself. Always the first token.
    Command,
    /// A flag or switch, e.g. `-urlcache`.
    Argument,
    /// A plain value, bound to a flag or positional.
    Value,
    /// A file-system path.
    Path,
    /// A URL.
    Url,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Command => "command",
            TokenType::Argument => "argument",
            TokenType::Value => "value",
            TokenType::Path => "path",
            TokenType::Url => "url",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified unit of a command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenType,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn command(value: impl Into<String>) -> Self {
        Self::new(TokenType::Command, value)
    }

    pub fn argument(value: impl Into<String>) -> Self {
        Self::new(TokenType::Argument, value)
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self::new(TokenType::Value, value)
    }

    pub fn path(value: impl Into<String>) -> Self {
        Self::new(TokenType::Path, value)
    }

    pub fn url(value: impl Into<String>) -> Self {
        Self::new(TokenType::Url, value)
    }

    /// Copy of this token with a new value. The type never changes.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            value: value.into(),
        }
    }
}

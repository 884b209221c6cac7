//! Configuration fields shared by every modifier.
//!
//! Profile files store numbers as JSON strings (`"Probability": "0.5"`);
//! the helpers here accept either a string or a number.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::token::TokenType;

/// The two fields every modifier configuration carries. Modifier-specific
/// config structs embed this with `#[serde(flatten)]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseModifierConfig {
    /// Token types the modifier may act on.
    #[serde(rename = "AppliesTo", default)]
    pub applies_to: Vec<TokenType>,
    /// Activation chance per eligible token (or per character, depending
    /// on the modifier).
    #[serde(rename = "Probability")]
    pub probability: Probability,
}

impl BaseModifierConfig {
    pub fn new(applies_to: &[TokenType], probability: f64) -> Result<Self, ProbabilityError> {
        Ok(Self {
            applies_to: applies_to.to_vec(),
            probability: Probability::new(probability)?,
        })
    }

    /// Whether a token of this type is eligible.
    pub fn applies_to(&self, kind: TokenType) -> bool {
        self.applies_to.contains(&kind)
    }
}

/// A probability in `[0.0, 1.0]`. Out-of-range values are rejected, never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

/// Invalid probability text or value.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbabilityError {
    /// Not a number.
    Parse(String),
    /// A number outside `[0, 1]` (or NaN).
    OutOfRange(f64),
}

impl fmt::Display for ProbabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityError::Parse(text) => write!(f, "invalid probability {text:?}"),
            ProbabilityError::OutOfRange(v) => {
                write!(f, "probability must be between 0 and 1, got {v}")
            }
        }
    }
}

impl std::error::Error for ProbabilityError {}

impl Probability {
    pub const NEVER: Probability = Probability(0.0);
    pub const ALWAYS: Probability = Probability(1.0);

    pub fn new(value: f64) -> Result<Self, ProbabilityError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProbabilityError::OutOfRange(value))
        }
    }

    pub fn parse(text: &str) -> Result<Self, ProbabilityError> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| ProbabilityError::Parse(text.to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// A JSON field that may be written as a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Probability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(v) => Probability::new(v),
            NumberOrText::Text(s) => Probability::parse(&s),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

impl Serialize for Probability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// `deserialize_with` helper for non-negative integer fields such as
/// `"Offset": "2"`.
pub fn lenient_usize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    use serde::de::Error;

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(v) if v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64 => {
            Ok(v as usize)
        }
        NumberOrText::Number(v) => Err(D::Error::custom(format!(
            "expected a non-negative integer, got {v}"
        ))),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a non-negative integer, got {s:?}"))),
    }
}

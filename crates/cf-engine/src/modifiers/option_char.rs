//! OptionCharSubstitution: swap a flag's leading `-` or `/` for a
//! lookalike.
//!
//! `-urlcache` -> `/urlcache` or `–urlcache` (en dash). Replacements may be
//! multi-byte, so the swap works on characters, not bytes.

use cf_protocol::{BaseModifierConfig, Token};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::Value;

use super::{decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct OptionCharSubstitution;

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(flatten)]
    base: BaseModifierConfig,
    #[serde(rename = "OutputOptionChars", default)]
    output_option_chars: Vec<String>,
}

impl Modifier for OptionCharSubstitution {
    fn name(&self) -> &'static str {
        "OptionCharSubstitution"
    }

    fn description(&self) -> &'static str {
        "Replace - or / with a lookalike Unicode option char"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: Config = decode(raw)?;
        if cfg.output_option_chars.is_empty() {
            return Err(ModifierError::EmptyPool("OutputOptionChars"));
        }

        Ok(map_eligible(tokens, &cfg.base, |value| {
            let Some(first) = value.chars().next().filter(|c| *c == '-' || *c == '/') else {
                return value.to_string();
            };
            if !cx.roll(cfg.base.probability) {
                return value.to_string();
            }
            match cfg.output_option_chars.choose(&mut *cx.rng) {
                Some(replacement) => format!("{replacement}{}", &value[first.len_utf8()..]),
                None => value.to_string(),
            }
        }))
    }
}

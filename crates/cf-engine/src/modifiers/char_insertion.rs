//! CharacterInsertion: insert an invisible character into a token.
//!
//! The target's argument parser ignores these code points, but string
//! signatures no longer match. One character from the configured pool is
//! inserted at `Offset` characters into the token, or at the end when the
//! token is shorter.

use cf_protocol::{lenient_usize, BaseModifierConfig, Token};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::Value;

use super::{byte_offset, decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct CharacterInsertion;

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(flatten)]
    base: BaseModifierConfig,
    /// Pool to sample from. Entries may be multi-byte.
    #[serde(rename = "Characters", default)]
    characters: Vec<String>,
    /// Insertion point in characters from the start of the token.
    #[serde(rename = "Offset", default, deserialize_with = "lenient_usize")]
    offset: usize,
}

impl Modifier for CharacterInsertion {
    fn name(&self) -> &'static str {
        "CharacterInsertion"
    }

    fn description(&self) -> &'static str {
        "Insert invisible Unicode characters into tokens"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: Config = decode(raw)?;
        if cfg.characters.is_empty() {
            return Err(ModifierError::EmptyPool("Characters"));
        }

        Ok(map_eligible(tokens, &cfg.base, |value| {
            if !cx.roll(cfg.base.probability) {
                return value.to_string();
            }
            let Some(ch) = cfg.characters.choose(&mut *cx.rng) else {
                return value.to_string();
            };
            let at = byte_offset(value, cfg.offset);
            let mut out = String::with_capacity(value.len() + ch.len());
            out.push_str(&value[..at]);
            out.push_str(ch);
            out.push_str(&value[at..]);
            out
        }))
    }
}

//! QuoteInsertion: insert an empty quote pair inside a token.
//!
//! `-urlcache` -> `-url""cache` or `-ur''lcache`. The shell drops the
//! empty string. The pair only goes between two characters, never at
//! either end, so the token's first and last characters are unchanged.

use cf_protocol::{BaseModifierConfig, Token};
use rand::Rng;
use serde_json::Value;

use super::{byte_offset, decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct QuoteInsertion;

impl Modifier for QuoteInsertion {
    fn name(&self) -> &'static str {
        "QuoteInsertion"
    }

    fn description(&self) -> &'static str {
        "Insert empty quote pairs inside tokens"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: BaseModifierConfig = decode(raw)?;
        let p = cfg.probability;

        Ok(map_eligible(tokens, &cfg, |value| {
            let len = value.chars().count();
            if len < 2 || !cx.roll(p) {
                return value.to_string();
            }
            let pos = cx.rng.random_range(1..len);
            let pair = if cx.rng.random_bool(0.5) { "\"\"" } else { "''" };
            let at = byte_offset(value, pos);
            format!("{}{pair}{}", &value[..at], &value[at..])
        }))
    }
}

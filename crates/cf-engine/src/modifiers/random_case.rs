//! RandomCase: flip the case of individual characters.
//!
//! `-urlcache` -> `-uRlCAcHe`. Every character of an eligible token gets
//! its own coin flip; characters without case pass through.

use cf_protocol::{BaseModifierConfig, Token};
use serde_json::Value;

use super::{decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct RandomCase;

impl Modifier for RandomCase {
    fn name(&self) -> &'static str {
        "RandomCase"
    }

    fn description(&self) -> &'static str {
        "Randomly flip UPPER/lower case per character"
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
            let mut out = String::with_capacity(value.len());
            for c in value.chars() {
                if cx.roll(p) {
                    flip_case(c, &mut out);
                } else {
                    out.push(c);
                }
            }
            out
        }))
    }
}

fn flip_case(c: char, out: &mut String) {
    if c.is_uppercase() {
        out.extend(c.to_lowercase());
    } else if c.is_lowercase() {
        out.extend(c.to_uppercase());
    } else {
        out.push(c);
    }
}

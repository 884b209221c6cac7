//! ReorderArgs: shuffle arguments while keeping each flag with its values.
//!
//! Most parsers accept flags in any order. Tokens after the command are
//! grouped as (flag, its bound values) using the same table as the
//! tokenizer; unknown flags and stray values form singleton groups. One
//! coin flip per call decides whether the groups are shuffled.

use std::ops::Range;

use cf_protocol::{BaseModifierConfig, Token, TokenType};
use rand::seq::SliceRandom;
use serde_json::Value;

use super::decode;
use crate::arguments::ArgumentTable;
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct ReorderArgs;

impl Modifier for ReorderArgs {
    fn name(&self) -> &'static str {
        "ReorderArgs"
    }

    fn description(&self) -> &'static str {
        "Shuffle argument order (keeps flag-value pairs)"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: BaseModifierConfig = decode(raw)?;
        if !cfg.applies_to(TokenType::Argument) || !cx.roll(cfg.probability) {
            return Ok(tokens.to_vec());
        }

        let head = usize::from(tokens.first().is_some_and(|t| t.kind == TokenType::Command));
        let mut groups = group_arguments(tokens, head, cx.arguments);
        groups.shuffle(&mut *cx.rng);

        let mut out = Vec::with_capacity(tokens.len());
        out.extend_from_slice(&tokens[..head]);
        for range in groups {
            out.extend_from_slice(&tokens[range]);
        }
        Ok(out)
    }
}

/// Partition `tokens[start..]` into index ranges: a known flag plus up to
/// `valueCount` following tokens, or a single token otherwise. A flag
/// near the end binds only the tokens that remain.
pub fn group_arguments(tokens: &[Token], start: usize, table: &ArgumentTable) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut i = start;
    while i < tokens.len() {
        let bound = match tokens[i].kind {
            TokenType::Argument => table.value_count(&tokens[i].value).unwrap_or(0),
            _ => 0,
        };
        let end = (i + 1 + bound).min(tokens.len());
        groups.push(i..end);
        i = end;
    }
    groups
}

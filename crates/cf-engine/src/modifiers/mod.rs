//! Built-in modifiers and the helpers they share.
//!
//! Each modifier decodes its own configuration shape from the raw profile
//! JSON when it runs, and builds a fresh token sequence rather than
//! touching the one it was handed.

use cf_protocol::{BaseModifierConfig, Token};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ModifierError;
use crate::registry::Registry;

pub mod char_insertion;
pub mod file_path;
pub mod option_char;
pub mod quote_insertion;
pub mod random_case;
pub mod regex_replace;
pub mod reorder_args;
pub mod sed;
pub mod shorthands;
pub mod url_transformer;

pub use char_insertion::CharacterInsertion;
pub use file_path::FilePathTransformer;
pub use option_char::OptionCharSubstitution;
pub use quote_insertion::QuoteInsertion;
pub use random_case::RandomCase;
pub use regex_replace::RegexReplace;
pub use reorder_args::ReorderArgs;
pub use sed::Sed;
pub use shorthands::Shorthands;
pub use url_transformer::UrlTransformer;

/// Register every built-in modifier. The order here is the order the
/// pipeline applies them in: structural rewrites first, while flags and
/// URLs are still intact, character-level noise last.
pub fn register_builtin(registry: &mut Registry) {
    registry.register(ReorderArgs);
    registry.register(Shorthands);
    registry.register(UrlTransformer);
    registry.register(FilePathTransformer);
    registry.register(RegexReplace);
    registry.register(Sed);
    registry.register(OptionCharSubstitution);
    registry.register(RandomCase);
    registry.register(QuoteInsertion);
    registry.register(CharacterInsertion);
}

/// Decode a modifier's configuration from its raw profile entry.
pub(crate) fn decode<'a, T: Deserialize<'a>>(raw: &'a Value) -> Result<T, ModifierError> {
    Ok(T::deserialize(raw)?)
}

/// Copy `tokens`, rewriting the value of each eligible token with `f`.
pub(crate) fn map_eligible(
    tokens: &[Token],
    base: &BaseModifierConfig,
    mut f: impl FnMut(&str) -> String,
) -> Vec<Token> {
    tokens
        .iter()
        .map(|t| {
            if base.applies_to(t.kind) {
                t.with_value(f(&t.value))
            } else {
                t.clone()
            }
        })
        .collect()
}

/// Byte offset of the `n`th character of `s`, or `s.len()` past the end.
pub(crate) fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

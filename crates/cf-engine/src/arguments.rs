//! Lookup table of known flags, built once per profile variant.

use std::collections::HashMap;

use cf_protocol::{ArgumentDefinition, ProfileVariant};

/// Option-character prefixes recognised in front of a flag name, longest
/// first.
const OPTION_PREFIXES: &[&str] = &["--", "-", "/"];

/// Known flag spellings and how many values each one consumes.
#[derive(Debug, Clone, Default)]
pub struct ArgumentTable {
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
    /// Flag names without option characters, lowercased, deduplicated, in
    /// definition order.
    names: Vec<String>,
}

impl ArgumentTable {
    pub fn new(definitions: &[ArgumentDefinition]) -> Self {
        let mut table = Self::default();
        for def in definitions {
            for flag in &def.flags {
                table.exact.entry(flag.clone()).or_insert(def.value_count);
                table
                    .folded
                    .entry(flag.to_lowercase())
                    .or_insert(def.value_count);

                let name = split_option_prefix(flag).1.to_lowercase();
                if !name.is_empty() && !table.names.contains(&name) {
                    table.names.push(name);
                }
            }
        }
        table
    }

    pub fn from_variant(variant: &ProfileVariant) -> Self {
        Self::new(&variant.parameters.arguments)
    }

    /// Declared value count for `flag`: exact spelling first, then a
    /// case-insensitive match.
    pub fn value_count(&self, flag: &str) -> Option<usize> {
        self.exact
            .get(flag)
            .or_else(|| self.folded.get(&flag.to_lowercase()))
            .copied()
    }

    pub fn is_flag(&self, flag: &str) -> bool {
        self.value_count(flag).is_some()
    }

    /// Known flag names, stripped of option characters and lowercased.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// Split `flag` into its option-character prefix and the bare name:
/// `--file` -> (`--`, `file`), `/f` -> (`/`, `f`), `x` -> (``, `x`).
pub fn split_option_prefix(flag: &str) -> (&str, &str) {
    for prefix in OPTION_PREFIXES {
        if let Some(rest) = flag.strip_prefix(prefix) {
            return (&flag[..prefix.len()], rest);
        }
    }
    ("", flag)
}

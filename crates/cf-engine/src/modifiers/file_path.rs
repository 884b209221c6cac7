//! FilePathTransformer: structural noise in file paths.
//!
//! Windows and most POSIX tools accept `\` and `/` interchangeably on
//! Windows, ignore `.` segments and collapse doubled separators, so the
//! rewritten path still names the same file.

use cf_protocol::{BaseModifierConfig, Token};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use super::{decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct FilePathTransformer;

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(flatten)]
    base: BaseModifierConfig,
    #[serde(rename = "PathTraversal", default)]
    path_traversal: bool,
    #[serde(rename = "SubstituteSlashes", default)]
    substitute_slashes: bool,
    #[serde(rename = "ExtraSlashes", default)]
    extra_slashes: bool,
}

fn is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

impl Modifier for FilePathTransformer {
    fn name(&self) -> &'static str {
        "FilePathTransformer"
    }

    fn description(&self) -> &'static str {
        "Add path traversal, swap slashes, or duplicate separators"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: Config = decode(raw)?;

        Ok(map_eligible(tokens, &cfg.base, |value| {
            if !value.contains(is_sep) || !cx.roll(cfg.base.probability) {
                return value.to_string();
            }
            let mut path = value.to_string();
            if cfg.substitute_slashes {
                path = substitute_slashes(&path, cx.rng);
            }
            if cfg.path_traversal {
                path = insert_traversal(&path, cx.rng);
            }
            if cfg.extra_slashes {
                path = duplicate_separator(&path, cx.rng);
            }
            path
        }))
    }
}

/// Flip each separator to the other kind with even odds.
pub fn substitute_slashes(path: &str, rng: &mut dyn rand::RngCore) -> String {
    path.chars()
        .map(|c| match c {
            '/' if rng.random_bool(0.5) => '\\',
            '\\' if rng.random_bool(0.5) => '/',
            other => other,
        })
        .collect()
}

/// Insert a `.` segment after a separator that is followed by a path
/// component: `C:\foo` becomes `C:\.\foo`. The new separator copies the
/// one it follows.
pub fn insert_traversal(path: &str, rng: &mut dyn rand::RngCore) -> String {
    let candidates: Vec<(usize, char)> = path
        .char_indices()
        .zip(path.chars().skip(1))
        .filter(|((_, c), next)| is_sep(*c) && !is_sep(*next))
        .map(|(at, _)| at)
        .collect();
    let Some(&(at, sep)) = candidates.choose(rng) else {
        return path.to_string();
    };
    let split = at + sep.len_utf8();
    format!("{}.{sep}{}", &path[..split], &path[split..])
}

/// Double one separator chosen at random.
pub fn duplicate_separator(path: &str, rng: &mut dyn rand::RngCore) -> String {
    let seps: Vec<(usize, char)> = path.char_indices().filter(|(_, c)| is_sep(*c)).collect();
    let Some(&(at, sep)) = seps.choose(rng) else {
        return path.to_string();
    };
    format!("{}{sep}{}", &path[..at], &path[at..])
}

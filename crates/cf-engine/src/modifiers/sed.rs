//! Sed: character substitution driven by sed-style statements.
//!
//! `SedStatements` holds one statement per line, e.g. `s/a/ᵃ/i`. The
//! character after `s` is the delimiter; the pattern must be a single
//! character; the `i` flag makes it match both cases. Statements compile
//! into a character table once per call, then every table hit in an
//! eligible token gets its own coin flip.

use std::collections::HashMap;

use cf_protocol::{BaseModifierConfig, Token};
use serde::Deserialize;
use serde_json::Value;

use super::{decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct Sed;

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(flatten)]
    base: BaseModifierConfig,
    #[serde(rename = "SedStatements", default)]
    sed_statements: String,
}

/// Compiled substitutions: source character -> replacement text.
pub type SedTable = HashMap<char, String>;

impl Modifier for Sed {
    fn name(&self) -> &'static str {
        "Sed"
    }

    fn description(&self) -> &'static str {
        "Replace chars with Unicode lookalikes via sed rules"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: Config = decode(raw)?;
        let table = compile(&cfg.sed_statements)?;

        Ok(map_eligible(tokens, &cfg.base, |value| {
            let mut out = String::with_capacity(value.len());
            for c in value.chars() {
                match table.get(&c) {
                    Some(replacement) if cx.roll(cfg.base.probability) => out.push_str(replacement),
                    _ => out.push(c),
                }
            }
            out
        }))
    }
}

/// Compile newline-separated statements. Blank lines and `#` comments are
/// skipped. When two statements cover the same character the first wins.
pub fn compile(statements: &str) -> Result<SedTable, ModifierError> {
    let mut table = SedTable::new();
    for line in statements.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (from, to, fold) = parse_statement(line).map_err(|reason| ModifierError::SedStatement {
            statement: line.to_string(),
            reason,
        })?;

        table.entry(from).or_insert_with(|| to.clone());
        if fold {
            for variant in from.to_lowercase().chain(from.to_uppercase()) {
                table.entry(variant).or_insert_with(|| to.clone());
            }
        }
    }
    Ok(table)
}

fn parse_statement(line: &str) -> Result<(char, String, bool), String> {
    let mut chars = line.chars();
    if chars.next() != Some('s') {
        return Err("expected an s command".to_string());
    }
    let delim = chars.next().ok_or("missing delimiter")?;
    if delim.is_alphanumeric() || delim.is_whitespace() {
        return Err(format!("invalid delimiter {delim:?}"));
    }

    let parts: Vec<&str> = chars.as_str().split(delim).collect();
    let (pattern, replacement, flags) = match parts.as_slice() {
        [p, r] => (*p, *r, ""),
        [p, r, f] => (*p, *r, *f),
        _ => return Err("expected s<d>pattern<d>replacement<d>flags".to_string()),
    };

    let mut pattern_chars = pattern.chars();
    let from = match (pattern_chars.next(), pattern_chars.next()) {
        (Some(c), None) => c,
        _ => return Err(format!("pattern must be one character, got {pattern:?}")),
    };

    let mut fold = false;
    for flag in flags.chars() {
        match flag {
            'i' | 'I' => fold = true,
            'g' => {}
            other => return Err(format!("unsupported flag {other:?}")),
        }
    }

    Ok((from, replacement.to_string(), fold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::testing::{kinds, run, sample};
    use serde_json::json;

    fn cfg(p: &str, statements: &str) -> Value {
        json!({"AppliesTo": ["argument", "value"], "Probability": p, "SedStatements": statements})
    }

    #[test]
    fn compiles_case_insensitive_rule() {
        let table = compile("s/a/ᵃ/i").unwrap();
        assert_eq!(table.get(&'a').map(String::as_str), Some("ᵃ"));
        assert_eq!(table.get(&'A').map(String::as_str), Some("ᵃ"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn case_sensitive_without_flag() {
        let table = compile("s/e/ᵉ/").unwrap();
        assert!(table.contains_key(&'e'));
        assert!(!table.contains_key(&'E'));
    }

    #[test]
    fn two_part_statement_allowed() {
        let table = compile("s/o/0").unwrap();
        assert_eq!(table.get(&'o').map(String::as_str), Some("0"));
    }

    #[test]
    fn custom_delimiter_and_slash_pattern() {
        let table = compile("s|/|∕|").unwrap();
        assert_eq!(table.get(&'/').map(String::as_str), Some("∕"));
    }

    #[test]
    fn multiple_lines_and_comments() {
        let table = compile("# lookalikes\ns/a/ᵃ/i\n\n  s/e/ᵉ/i  \r\n").unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn first_rule_wins() {
        let table = compile("s/a/1/\ns/a/2/").unwrap();
        assert_eq!(table.get(&'a').map(String::as_str), Some("1"));
    }

    #[test]
    fn rejects_bad_statements() {
        for bad in ["y/a/b/", "s", "s/ab/c/", "s/a/b/x", "s/a/b/i/extra", "sxaxbx", "s//b/"] {
            let err = compile(bad).unwrap_err();
            assert!(
                matches!(err, ModifierError::SedStatement { .. }),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn substitutes_at_probability_one() {
        let tokens = [Token::argument("-urlcache"), Token::path("C:/a")];
        let out = run(&Sed, &tokens, cfg("1", "s/a/ᵃ/i\ns/e/ᵉ/i")).unwrap();
        assert_eq!(out[0].value, "-urlcᵃchᵉ");
        assert_eq!(out[1], tokens[1]);
    }

    #[test]
    fn probability_zero_never_modifies() {
        let tokens = sample();
        let out = run(&Sed, &tokens, cfg("0", "s/a/ᵃ/i")).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn bad_statement_is_a_modifier_error() {
        assert!(run(&Sed, &sample(), cfg("1", "s/abc/x/")).is_err());
    }

    #[test]
    fn empty_statements_are_a_no_op() {
        let tokens = sample();
        let out = run(&Sed, &tokens, cfg("1", "")).unwrap();
        assert_eq!(out, tokens);
        assert_eq!(kinds(&out), kinds(&tokens));
    }
}

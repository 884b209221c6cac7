//! Regex: ordered find-and-replace rules from the profile.
//!
//! Every pattern is compiled once per call. An eligible token that wins
//! its coin flip has each rule applied in order, with `$1`-style group
//! references available in the replacement.

use cf_protocol::{BaseModifierConfig, Token};
use serde::Deserialize;
use serde_json::Value;

use super::{decode, map_eligible};
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct RegexReplace;

#[derive(Debug, Deserialize)]
struct Rule {
    #[serde(rename = "Pattern", alias = "pattern")]
    pattern: String,
    #[serde(rename = "Replacement", alias = "replacement", default)]
    replacement: String,
}

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(flatten)]
    base: BaseModifierConfig,
    #[serde(rename = "Rules", alias = "rules", default)]
    rules: Vec<Rule>,
}

impl Modifier for RegexReplace {
    fn name(&self) -> &'static str {
        "Regex"
    }

    fn description(&self) -> &'static str {
        "Apply regex find-and-replace substitutions"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: Config = decode(raw)?;
        let compiled = cfg
            .rules
            .iter()
            .map(|rule| -> Result<_, ModifierError> {
                Ok((::regex::Regex::new(&rule.pattern)?, rule.replacement.as_str()))
            })
            .collect::<Result<Vec<_>, ModifierError>>()?;

        Ok(map_eligible(tokens, &cfg.base, |value| {
            if compiled.is_empty() || !cx.roll(cfg.base.probability) {
                return value.to_string();
            }
            compiled
                .iter()
                .fold(value.to_string(), |acc, (re, replacement)| {
                    re.replace_all(&acc, *replacement).into_owned()
                })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::testing::{kinds, run, sample};
    use serde_json::json;

    fn cfg(applies_to: &[&str], p: &str, rules: Value) -> Value {
        json!({"AppliesTo": applies_to, "Probability": p, "Rules": rules})
    }

    #[test]
    fn applies_rules_in_order() {
        let rules = json!([
            {"Pattern": "cache", "Replacement": "CACHE"},
            {"Pattern": "CACHE$", "Replacement": "c^ache"}
        ]);
        let out = run(&RegexReplace, &[Token::argument("-urlcache")], cfg(&["argument"], "1", rules)).unwrap();
        assert_eq!(out[0].value, "-urlc^ache");
    }

    #[test]
    fn capture_groups_in_replacement() {
        let rules = json!([{"pattern": "^-(\\w+)$", "replacement": "/$1"}]);
        let out = run(&RegexReplace, &[Token::argument("-split")], cfg(&["argument"], "1", rules)).unwrap();
        assert_eq!(out[0].value, "/split");
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let rules = json!([{"Pattern": "(unclosed", "Replacement": ""}]);
        let err = run(&RegexReplace, &sample(), cfg(&["argument"], "1", rules)).unwrap_err();
        assert!(matches!(err, ModifierError::Regex(_)));
    }

    #[test]
    fn probability_zero_and_eligibility() {
        let rules = json!([{"Pattern": ".", "Replacement": "x"}]);
        let tokens = sample();
        let out = run(&RegexReplace, &tokens, cfg(&["argument"], "0", rules.clone())).unwrap();
        assert_eq!(out, tokens);

        let out = run(&RegexReplace, &tokens, cfg(&["url"], "1", rules)).unwrap();
        assert_eq!(kinds(&out), kinds(&tokens));
        for (before, after) in tokens.iter().zip(&out) {
            if before.kind == cf_protocol::TokenType::Url {
                assert!(after.value.chars().all(|c| c == 'x'));
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn no_rules_is_a_no_op() {
        let tokens = sample();
        let raw = json!({"AppliesTo": ["argument"], "Probability": "1"});
        assert_eq!(run(&RegexReplace, &tokens, raw).unwrap(), tokens);
    }
}

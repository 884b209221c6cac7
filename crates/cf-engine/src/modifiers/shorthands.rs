//! Shorthands: abbreviate a flag to its shortest unambiguous prefix.
//!
//! Many parsers accept any unique prefix of a long flag: PowerShell takes
//! `-NonI` for `-NonInteractive`. The prefix is computed against every
//! flag name the profile declares, case-insensitively. Tokens that are not
//! declared flags, and flags with no prefix shorter than the full name,
//! are left alone.

use cf_protocol::{BaseModifierConfig, Token};
use serde_json::Value;

use super::{decode, map_eligible};
use crate::arguments::split_option_prefix;
use crate::error::ModifierError;
use crate::registry::{ApplyContext, Modifier};

pub struct Shorthands;

impl Modifier for Shorthands {
    fn name(&self) -> &'static str {
        "Shorthands"
    }

    fn description(&self) -> &'static str {
        "Abbreviate flags to shortest unambiguous prefix"
    }

    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let cfg: BaseModifierConfig = decode(raw)?;
        let known = cx.arguments.names().to_vec();

        Ok(map_eligible(tokens, &cfg, |value| {
            let (prefix, name) = split_option_prefix(value);
            if name.is_empty() || !known.contains(&name.to_lowercase()) {
                return value.to_string();
            }
            if !cx.roll(cfg.probability) {
                return value.to_string();
            }
            match unambiguous_prefix_len(name, &known) {
                Some(len) => {
                    let short: String = name.chars().take(len).collect();
                    format!("{prefix}{short}")
                }
                None => value.to_string(),
            }
        }))
    }
}

/// Length in characters of the shortest prefix of `name` that no other
/// name in `known` starts with. Comparison ignores case. `None` when no
/// prefix shorter than `name` itself is unique.
pub fn unambiguous_prefix_len(name: &str, known: &[String]) -> Option<usize> {
    let folded = name.to_lowercase();
    let others: Vec<String> = known
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|k| *k != folded)
        .collect();

    let total = name.chars().count();
    (1..total).find(|&len| {
        let candidate: String = name.chars().take(len).collect::<String>().to_lowercase();
        !others.iter().any(|o| o.starts_with(&candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::testing::{run_seeded, sample};
    use crate::ArgumentTable;
    use cf_protocol::ArgumentDefinition;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn powershell() -> ArgumentTable {
        ArgumentTable::new(&[
            ArgumentDefinition::new(&["-NonInteractive"], 0),
            ArgumentDefinition::new(&["-NoProfile"], 0),
            ArgumentDefinition::new(&["-Nop"], 0),
            ArgumentDefinition::new(&["-ExecutionPolicy", "-ep"], 1),
            ArgumentDefinition::new(&["-Command", "-c"], 1),
        ])
    }

    fn cfg(p: &str) -> Value {
        json!({"AppliesTo": ["argument"], "Probability": p})
    }

    #[test]
    fn prefix_not_ambiguous() {
        let known = names(&["noninteractive", "noprofile", "nop"]);
        assert_eq!(unambiguous_prefix_len("NonInteractive", &known), Some(3));
    }

    #[test]
    fn prefix_of_another_name_has_no_abbreviation() {
        let known = names(&["noninteractive", "noprofile", "nop"]);
        assert_eq!(unambiguous_prefix_len("Nop", &known), None);
        assert_eq!(unambiguous_prefix_len("NoProfile", &known), Some(4));
    }

    #[test]
    fn single_char_name_unchanged() {
        assert_eq!(unambiguous_prefix_len("f", &names(&["f", "file"])), None);
    }

    #[test]
    fn lone_flag_collapses_to_one_char() {
        assert_eq!(unambiguous_prefix_len("urlcache", &names(&["urlcache"])), Some(1));
    }

    #[test]
    fn abbreviates_non_interactive() {
        let tokens = [Token::command("powershell"), Token::argument("-NonInteractive")];
        let out = run_seeded(&Shorthands, &tokens, cfg("1"), &powershell(), 1).unwrap();
        assert_eq!(out[1].value, "-Non");
    }

    #[test]
    fn keeps_token_casing_and_prefix() {
        let tokens = [Token::argument("--EXECUTIONPOLICY")];
        let out = run_seeded(&Shorthands, &tokens, cfg("1"), &powershell(), 1).unwrap();
        assert_eq!(out[0].value, "--EX");
    }

    #[test]
    fn ambiguous_flag_left_alone() {
        let tokens = [Token::argument("-Nop")];
        let out = run_seeded(&Shorthands, &tokens, cfg("1"), &powershell(), 1).unwrap();
        assert_eq!(out[0].value, "-Nop");
    }

    #[test]
    fn unknown_flag_left_alone() {
        let tokens = [Token::argument("-Whatever")];
        let out = run_seeded(&Shorthands, &tokens, cfg("1"), &powershell(), 1).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn probability_zero_never_modifies() {
        let tokens = [Token::argument("-NonInteractive"), Token::argument("-Command")];
        let out = run_seeded(&Shorthands, &tokens, cfg("0"), &powershell(), 1).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn non_argument_tokens_untouched() {
        let tokens = sample();
        let out = run_seeded(&Shorthands, &tokens, cfg("1"), &powershell(), 1).unwrap();
        assert_eq!(out, tokens);
    }
}

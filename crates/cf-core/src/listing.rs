//! Plain-text tables for `--list` and `--modifiers`, shared with the REPL.

use std::fmt::Write;

use cf_engine::ModifierSummary;
use cf_protocol::ProfileVariant;

use crate::loader::ProfileSet;
use crate::style::Style;

/// Profiles grouped by platform, optionally only one platform. Returns
/// `None` when the filter matches nothing.
pub fn format_profiles(set: &ProfileSet, platform: Option<&str>, style: &Style) -> Option<String> {
    let groups = set.group_by_platform();
    let mut out = String::new();
    for (name, files) in &groups {
        if platform.is_some_and(|p| !p.eq_ignore_ascii_case(name)) {
            continue;
        }
        let _ = writeln!(out, "{}{name}{}", style.bold_start(), style.reset());
        for file in files {
            let aliases: Vec<&str> = file
                .variants
                .iter()
                .filter(|v| v.platform.eq_ignore_ascii_case(name) || v.platform.is_empty())
                .flat_map(|v| v.alias.iter().map(String::as_str))
                .collect();
            if aliases.is_empty() {
                let _ = writeln!(out, "  {}", file.name);
            } else {
                let _ = writeln!(
                    out,
                    "  {} {}({}){}",
                    file.name,
                    style.dim_start(),
                    aliases.join(", "),
                    style.reset()
                );
            }
        }
    }
    (!out.is_empty()).then_some(out)
}

/// One line per registered modifier: on/off marker, name, description.
/// Modifiers the variant does not configure are marked `n/a`.
pub fn format_modifiers(
    summaries: &[ModifierSummary],
    variant: &ProfileVariant,
    style: &Style,
) -> String {
    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for s in summaries {
        let (marker, color) = if variant.modifier_config(s.name).is_none() {
            ("n/a", style.dim_start())
        } else if s.enabled {
            ("on ", style.green_start())
        } else {
            ("off", style.yellow_start())
        };
        let _ = writeln!(
            out,
            "{color}{marker}{} {:<width$}  {}{}{}",
            style.reset(),
            s.name,
            style.dim_start(),
            s.description,
            style.reset(),
        );
    }
    out
}

//! Renderer: token sequence -> command line. The inverse of the tokenizer.
//!
//! Inside a value, an empty `""` or `''` pair is quoting syntax that the
//! shell drops; any other quote character is literal text. The tokenizer
//! does not remember which quote style a field was written with, so
//! values that need quoting come back in `"` by default: `cmd 'a b'`
//! renders as `cmd "a b"`.

use std::borrow::Cow;

use cf_protocol::Token;

use crate::tokenizer::is_separator;

/// Join token values with single spaces, quoting values that would
/// otherwise split into several fields.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| quote(&t.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote `value` if it is empty or contains a field separator.
///
/// Values that already start and end with the same quote character are
/// returned as-is. A value is wrapped whole in `"` or `'` when every
/// occurrence of that quote is part of an empty pair and the other quote
/// does not appear. Otherwise it is split around its empty pairs and each
/// literal run is quoted on its own.
pub fn quote(value: &str) -> Cow<'_, str> {
    if value.is_empty() {
        return Cow::Borrowed("\"\"");
    }
    if !value.chars().any(is_separator) || is_wrapped(value) {
        return Cow::Borrowed(value);
    }
    if let Some(q) = whole_wrapper(value) {
        return Cow::Owned(format!("{q}{value}{q}"));
    }

    let mut out = String::with_capacity(value.len() + 8);
    let mut rest = value;
    while !rest.is_empty() {
        let (text, pair, tail) = next_pair(rest);
        push_literal(&mut out, text);
        out.push_str(pair);
        rest = tail;
    }
    Cow::Owned(out)
}

fn is_wrapped(value: &str) -> bool {
    let mut chars = value.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return false;
    };
    if first != last || !is_quote(first) {
        return false;
    }
    let inner = chars.as_str();
    !without_pairs(inner, first).contains(first)
}

/// Quote character that can wrap the whole value, if any.
fn whole_wrapper(value: &str) -> Option<char> {
    ['"', '\''].into_iter().find(|&q| {
        let other = if q == '"' { '\'' } else { '"' };
        !value.contains(other) && !without_pairs(value, q).contains(q)
    })
}

fn without_pairs(s: &str, q: char) -> String {
    let pair: String = [q, q].iter().collect();
    s.replace(&pair, "")
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Split `s` at its first empty quote pair: literal text before it, the
/// pair itself, and the remainder. The pair is empty when none is found.
fn next_pair(s: &str) -> (&str, &str, &str) {
    let bytes = s.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        let b = bytes[i];
        if (b == b'"' || b == b'\'') && bytes[i + 1] == b {
            return (&s[..i], &s[i..i + 2], &s[i + 2..]);
        }
    }
    (s, "", "")
}

/// Append literal text so it reads back as exactly `text`.
fn push_literal(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !text.chars().any(|c| is_separator(c) || is_quote(c)) {
        out.push_str(text);
        return;
    }
    if !text.contains('"') {
        out.push('"');
        out.push_str(text);
        out.push('"');
        return;
    }
    if !text.contains('\'') {
        out.push('\'');
        out.push_str(text);
        out.push('\'');
        return;
    }

    // Both quote kinds: `"` runs go in single quotes, the rest in double.
    let mut run = String::new();
    let mut run_is_dq = false;
    for c in text.chars() {
        let dq = c == '"';
        if !run.is_empty() && dq != run_is_dq {
            push_run(out, &run, run_is_dq);
            run.clear();
        }
        run_is_dq = dq;
        run.push(c);
    }
    push_run(out, &run, run_is_dq);
}

fn push_run(out: &mut String, run: &str, double_quotes: bool) {
    let q = if double_quotes { '\'' } else { '"' };
    out.push(q);
    out.push_str(run);
    out.push(q);
}

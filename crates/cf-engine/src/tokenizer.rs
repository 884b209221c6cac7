//! Command-line tokenizer: raw string + argument table -> typed tokens.
//!
//! Fields are split on whitespace; a `"..."` or `'...'` run is part of one
//! field and its quotes are stripped. There is no backslash escaping since
//! backslash is the Windows path separator.
//!
//! The first field is the command. A known flag becomes an Argument and
//! claims the next `valueCount` fields as Values, whatever they look like.
//! When fewer fields remain than declared, the flag binds only what is
//! left. Every other field is classified by content.

use cf_protocol::{ProfileVariant, Token, TokenType};

use crate::arguments::ArgumentTable;
use crate::error::TokenizeError;

/// Characters that separate fields. The renderer quotes any value holding
/// one of these, so both directions agree.
pub fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Tokenize `command` using the variant's argument definitions.
pub fn tokenize(command: &str, variant: &ProfileVariant) -> Result<Vec<Token>, TokenizeError> {
    tokenize_with(command, &ArgumentTable::from_variant(variant))
}

/// Tokenize `command` against a prebuilt argument table.
pub fn tokenize_with(command: &str, table: &ArgumentTable) -> Result<Vec<Token>, TokenizeError> {
    let fields = split_fields(command);
    let mut fields = fields.into_iter();

    let first = fields.next().ok_or(TokenizeError::EmptyInput)?;
    let mut tokens = vec![Token::command(first)];

    while let Some(field) = fields.next() {
        match table.value_count(&field) {
            Some(count) => {
                tokens.push(Token::argument(field));
                // Truncates silently when the command ends early.
                tokens.extend(fields.by_ref().take(count).map(Token::value));
            }
            None => {
                let kind = classify(&field);
                tokens.push(Token::new(kind, field));
            }
        }
    }

    Ok(tokens)
}

/// Classify a field that is not a known flag or a flag's value.
pub fn classify(field: &str) -> TokenType {
    if field.starts_with("http://") || field.starts_with("https://") {
        TokenType::Url
    } else if field.contains('/') || field.contains('\\') {
        TokenType::Path
    } else {
        TokenType::Value
    }
}

/// Split on unquoted whitespace, stripping quote characters.
///
/// An explicitly quoted empty field (`""`) is kept as an empty string. An
/// unterminated quote extends to the end of input.
pub fn split_fields(command: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_single = false;
    let mut in_double = false;

    for ch in command.chars() {
        if ch == '\'' && !in_double {
            in_single = !in_single;
            quoted = true;
            continue;
        }

        if ch == '"' && !in_single {
            in_double = !in_double;
            quoted = true;
            continue;
        }

        if is_separator(ch) && !in_single && !in_double {
            if !current.is_empty() || quoted {
                fields.push(std::mem::take(&mut current));
            }
            quoted = false;
            continue;
        }

        current.push(ch);
    }

    if !current.is_empty() || quoted {
        fields.push(current);
    }

    fields
}

//! Profile file types: one executable, one or more platform variants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::token::{Token, TokenType};

/// Root of a single JSON profile file.
///
/// `name` is derived from the file name (`certutil.json` -> `certutil`)
/// and is not present in the JSON itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileFile {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub versions: Versions,
    #[serde(default, rename = "profiles")]
    pub variants: Vec<ProfileVariant>,
}

/// Format metadata from the file header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Versions {
    #[serde(default)]
    pub argfuscator: String,
    #[serde(default)]
    pub format: String,
}

/// One platform/version-specific description of an executable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileVariant {
    #[serde(default)]
    pub executable_version: String,
    /// `windows`, `linux` or `macos`.
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub operating_system: String,
    #[serde(default)]
    pub operating_system_version: String,
    #[serde(default)]
    pub alias: Vec<String>,
    pub parameters: ProfileParameters,
}

/// Command template, known flags, and raw modifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileParameters {
    #[serde(default)]
    pub command: Vec<CommandElement>,
    #[serde(default)]
    pub arguments: Vec<ArgumentDefinition>,
    /// Modifier name -> that modifier's own configuration shape. Each
    /// modifier decodes its entry only when it runs.
    #[serde(default)]
    pub modifiers: BTreeMap<String, Value>,
}

/// One element of the command template, e.g. `{"argument": "-f"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandElement {
    Command(String),
    Argument(String),
    Value(String),
    Path(String),
    Url(String),
}

impl CommandElement {
    pub fn kind(&self) -> TokenType {
        match self {
            CommandElement::Command(_) => TokenType::Command,
            CommandElement::Argument(_) => TokenType::Argument,
            CommandElement::Value(_) => TokenType::Value,
            CommandElement::Path(_) => TokenType::Path,
            CommandElement::Url(_) => TokenType::Url,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            CommandElement::Command(s)
            | CommandElement::Argument(s)
            | CommandElement::Value(s)
            | CommandElement::Path(s)
            | CommandElement::Url(s) => s,
        }
    }

    pub fn to_token(&self) -> Token {
        Token::new(self.kind(), self.text())
    }
}

/// One logical flag: its equivalent spellings and how many values follow it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDefinition {
    pub flags: Vec<String>,
    #[serde(default)]
    pub value_count: usize,
}

impl ArgumentDefinition {
    pub fn new(flags: &[&str], value_count: usize) -> Self {
        Self {
            flags: flags.iter().map(|f| f.to_string()).collect(),
            value_count,
        }
    }
}

impl ProfileVariant {
    /// The command template as a token sequence.
    pub fn template_tokens(&self) -> Vec<Token> {
        self.parameters
            .command
            .iter()
            .map(CommandElement::to_token)
            .collect()
    }

    /// Raw configuration for one modifier, if this variant describes it.
    pub fn modifier_config(&self, name: &str) -> Option<&Value> {
        self.parameters.modifiers.get(name)
    }

    /// Whether this variant targets `platform` (case-insensitive).
    pub fn targets(&self, platform: &str) -> bool {
        self.platform.eq_ignore_ascii_case(platform)
    }
}

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub profiles: ProfilesConfig,
    pub modifiers: ModifiersConfig,
    pub output: OutputConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Directory of `*.json` profiles. The bundled set is used when unset.
    pub dir: Option<String>,
    /// Platform to prefer when a profile has several variants. Defaults to the host OS.
    pub platform: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModifiersConfig {
    /// Modifiers switched off even when a profile configures them.
    pub disabled: Vec<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit one JSON object per result instead of plain command lines.
    pub json: bool,
    /// Variations printed per input command in batch mode.
    pub count: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            count: 1,
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    /// Record every obfuscation to a JSONL log.
    pub enabled: bool,
    /// Custom audit log path. Defaults to ~/.local/share/cmdfuscator/audit.jsonl.
    pub path: Option<String>,
}

impl AuditConfig {
    /// Resolve the audit log path, using the configured path or the XDG default.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(ref custom) = self.path {
            return PathBuf::from(custom);
        }

        let base = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".local").join("share")
            });
        base.join("cmdfuscator").join("audit.jsonl")
    }
}

impl ProfilesConfig {
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }
}

impl Config {
    pub fn load_or_default() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("[cf:config] warning: failed to parse {}: {e}", path.display());
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("cmdfuscator").join("config.toml")
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|_| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

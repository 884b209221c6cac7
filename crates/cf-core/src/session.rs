//! Everything a run needs before it can obfuscate: profiles, the shared
//! obfuscator, and the enable/disable overrides from config and flags.

use std::sync::Arc;

use cf_engine::{default_enabled, EnabledMap, Obfuscator, Registry};
use cf_protocol::{ProfileFile, ProfileVariant};

use crate::cli::Options;
use crate::config::Config;
use crate::loader::{LoadError, ProfileSet};

pub struct Session {
    pub profiles: ProfileSet,
    pub obfuscator: Obfuscator,
    disabled: Vec<String>,
    enabled: Vec<String>,
}

impl Session {
    /// Load profiles (flag, then config, then bundled) and build the
    /// obfuscator. Per-file load problems are printed as warnings.
    pub fn open(config: &Config, options: &Options) -> Result<Self, LoadError> {
        let dir = options
            .profiles
            .clone()
            .or_else(|| config.profiles.resolve_dir());
        let profiles = match dir {
            Some(dir) => ProfileSet::load_dir(&dir)?,
            None => ProfileSet::bundled()?,
        };
        for warning in &profiles.warnings {
            eprintln!("[cf:load] warning: {warning}");
        }

        let mut obfuscator = Obfuscator::new(Arc::new(Registry::builtin()));
        if let Some(platform) = options.platform.as_ref().or(config.profiles.platform.as_ref()) {
            obfuscator = obfuscator.with_platform(platform.clone());
        }

        let mut disabled = config.modifiers.disabled.clone();
        disabled.extend(options.disable.iter().cloned());

        Ok(Self::new(profiles, obfuscator, disabled, options.enable.clone()))
    }

    pub fn new(
        profiles: ProfileSet,
        obfuscator: Obfuscator,
        disabled: Vec<String>,
        enabled: Vec<String>,
    ) -> Self {
        Self {
            profiles,
            obfuscator,
            disabled,
            enabled,
        }
    }

    pub fn registry(&self) -> &Registry {
        self.obfuscator.registry()
    }

    /// The profile for `executable` and its variant for the current platform.
    pub fn resolve(&self, executable: &str) -> Result<(&ProfileFile, &ProfileVariant), LoadError> {
        let file = self.profiles.find(executable)?;
        let variant = self
            .obfuscator
            .select_variant(&file.variants)
            .ok_or_else(|| LoadError::NoVariants(file.name.clone()))?;
        Ok((file, variant))
    }

    /// Modifiers to run for `variant`: everything it configures, minus the
    /// disabled list, plus the forced-on list. Names match case-insensitively.
    pub fn enabled_for(&self, variant: &ProfileVariant) -> EnabledMap {
        let mut map = default_enabled(variant);
        for name in &self.disabled {
            if let Some(canonical) = canonical_name(self.registry(), name) {
                map.insert(canonical.to_string(), false);
            }
        }
        for name in &self.enabled {
            if let Some(canonical) = canonical_name(self.registry(), name) {
                map.insert(canonical.to_string(), true);
            }
        }
        map
    }

    /// Override names that match no registered modifier.
    pub fn unknown_modifiers(&self) -> Vec<&str> {
        self.disabled
            .iter()
            .chain(&self.enabled)
            .filter(|name| canonical_name(self.registry(), name).is_none())
            .map(String::as_str)
            .collect()
    }
}

/// Registered spelling of a modifier name, ignoring case.
pub fn canonical_name(registry: &Registry, name: &str) -> Option<&'static str> {
    registry
        .names()
        .into_iter()
        .find(|n| n.eq_ignore_ascii_case(name))
}

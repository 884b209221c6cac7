//! Pipeline orchestration: pick a variant, tokenize, apply modifiers,
//! render.
//!
//! A failing modifier never aborts the run. Its error is recorded and the
//! token sequence it was given is passed on unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use cf_protocol::{ProfileVariant, Token};
use rand::RngCore;

use crate::arguments::ArgumentTable;
use crate::error::{ModifierError, ObfuscateError};
use crate::registry::{ApplyContext, ModifierSummary, Registry};
use crate::render::render;
use crate::tokenizer::tokenize_with;

/// Modifier name -> enabled. Names absent from the map are disabled.
pub type EnabledMap = BTreeMap<String, bool>;

/// Output of one pipeline run.
#[derive(Debug, Default)]
pub struct ObfuscateResult {
    pub output: String,
    /// Final token sequence that produced `output`.
    pub tokens: Vec<Token>,
    /// Modifiers that ran successfully, in order.
    pub applied: Vec<String>,
    /// Modifiers that reported `NotImplemented`.
    pub skipped: Vec<String>,
    /// Modifiers that failed, keyed by name.
    pub errors: BTreeMap<String, ModifierError>,
}

/// Platform name of the running host, in profile spelling.
pub fn host_platform() -> &'static str {
    std::env::consts::OS
}

/// Enable map with every modifier the variant configures switched on.
pub fn default_enabled(variant: &ProfileVariant) -> EnabledMap {
    variant
        .parameters
        .modifiers
        .keys()
        .map(|name| (name.clone(), true))
        .collect()
}

/// Obfuscation coordinator. Cheap to clone and safe to share: the registry
/// is read-only and all mutable state lives in each call.
#[derive(Clone)]
pub struct Obfuscator {
    registry: Arc<Registry>,
    platform: String,
}

impl Obfuscator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            platform: host_platform().to_string(),
        }
    }

    /// Prefer variants for `platform` instead of the host platform.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn summary(&self, enabled: &EnabledMap) -> Vec<ModifierSummary> {
        self.registry.summary(enabled)
    }

    /// First variant targeting the configured platform, else the first one.
    pub fn select_variant<'v>(&self, variants: &'v [ProfileVariant]) -> Option<&'v ProfileVariant> {
        variants
            .iter()
            .find(|v| v.targets(&self.platform))
            .or_else(|| variants.first())
    }

    /// Run the pipeline with an explicit random source.
    pub fn obfuscate(
        &self,
        command: &str,
        variants: &[ProfileVariant],
        enabled: &EnabledMap,
        rng: &mut dyn RngCore,
    ) -> Result<ObfuscateResult, ObfuscateError> {
        let variant = self
            .select_variant(variants)
            .ok_or(ObfuscateError::NoProfile)?;
        self.obfuscate_variant(command, variant, enabled, rng)
    }

    /// Run the pipeline with the thread-local random source.
    pub fn obfuscate_random(
        &self,
        command: &str,
        variants: &[ProfileVariant],
        enabled: &EnabledMap,
    ) -> Result<ObfuscateResult, ObfuscateError> {
        let mut rng = rand::rng();
        self.obfuscate(command, variants, enabled, &mut rng)
    }

    /// Run the pipeline against an already chosen variant.
    pub fn obfuscate_variant(
        &self,
        command: &str,
        variant: &ProfileVariant,
        enabled: &EnabledMap,
        rng: &mut dyn RngCore,
    ) -> Result<ObfuscateResult, ObfuscateError> {
        let table = ArgumentTable::from_variant(variant);
        let mut tokens = tokenize_with(command, &table)?;
        let mut result = ObfuscateResult::default();

        for modifier in self.registry.all() {
            let name = modifier.name();
            if !enabled.get(name).copied().unwrap_or(false) {
                continue;
            }
            // The profile does not describe this technique for this target.
            let Some(raw) = variant.modifier_config(name) else {
                continue;
            };

            let mut cx = ApplyContext::new(&table, &mut *rng);
            match modifier.apply(&tokens, raw, &mut cx) {
                Ok(modified) => {
                    tokens = modified;
                    result.applied.push(name.to_string());
                }
                Err(ModifierError::NotImplemented) => result.skipped.push(name.to_string()),
                Err(err) => {
                    result.errors.insert(name.to_string(), err);
                }
            }
        }

        result.output = render(&tokens);
        result.tokens = tokens;
        Ok(result)
    }
}

//! The modifier contract and the name-keyed, insertion-ordered registry.

use std::collections::HashMap;

use cf_protocol::{Probability, Token};
use rand::{Rng, RngCore};
use serde_json::Value;

use crate::arguments::ArgumentTable;
use crate::error::ModifierError;
use crate::modifiers;
use crate::pipeline::EnabledMap;

/// Per-call state handed to a modifier: the variant's flag table and the
/// random source. Nothing here outlives one pipeline invocation.
pub struct ApplyContext<'a> {
    pub arguments: &'a ArgumentTable,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> ApplyContext<'a> {
    pub fn new(arguments: &'a ArgumentTable, rng: &'a mut dyn RngCore) -> Self {
        Self { arguments, rng }
    }

    /// Coin flip. Probability 0 never fires, probability 1 always fires.
    pub fn roll(&mut self, probability: Probability) -> bool {
        let p = probability.value();
        p > 0.0 && self.rng.random::<f64>() < p
    }
}

/// One named obfuscation technique.
///
/// `apply` never mutates its input: it returns a new sequence, or an error
/// and the pipeline keeps the previous sequence.
pub trait Modifier: Send + Sync {
    /// Exact key of this modifier in a profile's `modifiers` object.
    fn name(&self) -> &'static str;

    /// Short summary for option listings.
    fn description(&self) -> &'static str;

    /// Transform `tokens` using the raw configuration from the profile.
    fn apply(
        &self,
        tokens: &[Token],
        raw: &Value,
        cx: &mut ApplyContext<'_>,
    ) -> Result<Vec<Token>, ModifierError> {
        let _ = (tokens, raw, cx);
        Err(ModifierError::NotImplemented)
    }
}

/// Read-only view of a registered modifier for option displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierSummary {
    pub name: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

/// Registered modifiers in registration order. Populated once at startup,
/// read-only afterwards.
#[derive(Default)]
pub struct Registry {
    modifiers: Vec<Box<dyn Modifier>>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in modifier in pipeline order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        modifiers::register_builtin(&mut registry);
        registry
    }

    /// Add a modifier. Panics on a duplicate name: that is a startup
    /// defect, not a runtime condition.
    pub fn register<M: Modifier + 'static>(&mut self, modifier: M) {
        let name = modifier.name();
        if self.index.contains_key(name) {
            panic!("modifiers: duplicate registration for {name:?}");
        }
        self.index.insert(name, self.modifiers.len());
        self.modifiers.push(Box::new(modifier));
    }

    /// Builder form of [`Registry::register`].
    pub fn with<M: Modifier + 'static>(mut self, modifier: M) -> Self {
        self.register(modifier);
        self
    }

    /// Every modifier in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Modifier> + '_ {
        self.modifiers.iter().map(|m| m.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Modifier> {
        self.index.get(name).map(|&i| self.modifiers[i].as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.all().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Summary of every registered modifier against an enable map.
    pub fn summary(&self, enabled: &EnabledMap) -> Vec<ModifierSummary> {
        self.all()
            .map(|m| ModifierSummary {
                name: m.name(),
                description: m.description(),
                enabled: enabled.get(m.name()).copied().unwrap_or(false),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Stub(&'static str);

    impl Modifier for Stub {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "stub"
        }
    }

    #[test]
    fn keeps_registration_order() {
        let registry = Registry::new().with(Stub("B")).with(Stub("A")).with(Stub("C"));
        assert_eq!(registry.names(), vec!["B", "A", "C"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate registration")]
    fn duplicate_name_panics() {
        let _ = Registry::new().with(Stub("A")).with(Stub("A"));
    }

    #[test]
    fn get_by_name() {
        let registry = Registry::new().with(Stub("A"));
        assert_eq!(registry.get("A").map(|m| m.name()), Some("A"));
        assert!(registry.get("Z").is_none());
    }

    #[test]
    fn default_apply_is_not_implemented() {
        let table = ArgumentTable::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut cx = ApplyContext::new(&table, &mut rng);
        let err = Stub("A")
            .apply(&[Token::command("x")], &Value::Null, &mut cx)
            .unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[test]
    fn summary_reflects_enable_map() {
        let registry = Registry::new().with(Stub("A")).with(Stub("B"));
        let mut enabled = EnabledMap::new();
        enabled.insert("B".to_string(), true);
        enabled.insert("A".to_string(), false);
        let summary = registry.summary(&enabled);
        assert_eq!(summary.len(), 2);
        assert!(!summary[0].enabled);
        assert!(summary[1].enabled);
        assert_eq!(summary[1].description, "stub");
    }

    #[test]
    fn builtin_registry_order() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.names(),
            vec![
                "ReorderArgs",
                "Shorthands",
                "UrlTransformer",
                "FilePathTransformer",
                "Regex",
                "Sed",
                "OptionCharSubstitution",
                "RandomCase",
                "QuoteInsertion",
                "CharacterInsertion",
            ]
        );
    }

    #[test]
    fn roll_boundaries() {
        let table = ArgumentTable::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut cx = ApplyContext::new(&table, &mut rng);
        for _ in 0..500 {
            assert!(!cx.roll(Probability::NEVER));
            assert!(cx.roll(Probability::ALWAYS));
        }
    }
}

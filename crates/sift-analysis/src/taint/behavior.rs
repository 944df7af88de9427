//! YAML-driven method behavior table.
//!
//! Maps API members (keyed by containing type + member name, with an
//! optional argument-type discriminator for overloads) to descriptors of
//! how taint moves through them: which arguments are injectable into which
//! sink, which carry password material, which propagate taint to the
//! result, and field-level sink flags. Built once from configuration and
//! read-only during analysis.

use std::collections::BTreeMap;

use serde::Deserialize;
use sift_core::errors::ConfigError;
use sift_core::types::collections::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::syntax::{ConstantValue, Symbol};

use super::lattice::Taint;

/// Built-in behavior definitions shipped with the analyzer.
const DEFAULT_BEHAVIORS: &str = include_str!("../../behaviors/default.yml");

/// How one argument position (or field) can be abused as a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectableArgument {
    /// Rule reported when an unsanitized value reaches this sink.
    pub rule_id: String,
    /// Sanitizer bits that neutralize the sink; unset accepts any safe
    /// value.
    pub required_bits: Taint,
    /// Inverts the sanitizer-bit test.
    pub negated: bool,
}

/// Behavior applied only when one argument is a specific constant.
#[derive(Debug, Clone)]
pub struct BehaviorCondition {
    pub argument_index: usize,
    pub expected: ConstantValue,
    pub behavior: MethodBehavior,
}

/// Everything the engine knows about one API member.
#[derive(Debug, Clone, Default)]
pub struct MethodBehavior {
    pub injectable_arguments: FxHashMap<usize, InjectableArgument>,
    pub password_arguments: SmallVec<[usize; 2]>,
    pub password_rule: Option<String>,
    /// Argument indices whose taint propagates into the call's result.
    pub taint_from_arguments: SmallVec<[usize; 4]>,
    /// Set when assigning to this property/field is an injection sink.
    pub injectable_field: Option<InjectableArgument>,
    /// Rule reported when a constant is assigned to this password field.
    pub password_field: Option<String>,
    /// Taint of the call's result, for sanitizer APIs.
    pub return_taint: Option<Taint>,
    /// Constant-gated override of the markers above.
    pub condition: Option<Box<BehaviorCondition>>,
}

impl MethodBehavior {
    /// The behavior to apply for a call whose argument states are known:
    /// the conditional behavior when its gate matches, `self` otherwise.
    pub fn select<'a>(&'a self, constant_argument: impl Fn(usize) -> Option<ConstantValue>) -> &'a MethodBehavior {
        if let Some(condition) = &self.condition {
            if constant_argument(condition.argument_index).as_ref() == Some(&condition.expected) {
                return &condition.behavior;
            }
        }
        self
    }
}

/// Read-only lookup from API member to [`MethodBehavior`].
#[derive(Debug, Default)]
pub struct BehaviorTable {
    behaviors: FxHashMap<String, MethodBehavior>,
    taint_types: FxHashMap<String, Taint>,
}

impl BehaviorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table loaded with the built-in behavior definitions.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut table = Self::new();
        table.load_yaml(DEFAULT_BEHAVIORS)?;
        Ok(table)
    }

    /// Load additional behavior definitions from a YAML document.
    ///
    /// Malformed definitions are hard errors; analysis never sees a
    /// half-loaded table.
    pub fn load_yaml(&mut self, yaml: &str) -> Result<(), ConfigError> {
        let file: BehaviorFile = serde_yaml::from_str(yaml)?;

        for name in &file.taint_types {
            self.declare_taint_type(name)?;
        }

        for (label, entry) in &file.behaviors {
            let behavior = self.build_behavior(label, entry)?;
            let type_name = if entry.namespace.is_empty() {
                entry.class_name.clone()
            } else {
                format!("{}.{}", entry.namespace, entry.class_name)
            };

            let (full_key, alias_key) = match &entry.arg_types {
                Some(sig) => (
                    format!("{}|{}|{}", type_name, entry.name, sig),
                    format!("{}|{}|{}", entry.class_name, entry.name, sig),
                ),
                None => (
                    format!("{}|{}", type_name, entry.name),
                    format!("{}|{}", entry.class_name, entry.name),
                ),
            };

            if self.behaviors.contains_key(&full_key) {
                return Err(ConfigError::DuplicateBehavior { key: full_key });
            }
            self.behaviors.insert(full_key.clone(), behavior.clone());

            // Short alias for syntactic resolvers that cannot see the
            // namespace. First entry wins.
            if alias_key != full_key && !self.behaviors.contains_key(&alias_key) {
                self.behaviors.insert(alias_key, behavior);
            } else if alias_key != full_key {
                debug!(alias = %alias_key, entry = %label, "alias key already taken");
            }
        }

        Ok(())
    }

    /// Register a named custom sanitizer category, returning its bit.
    /// Idempotent per name.
    pub fn declare_taint_type(&mut self, name: &str) -> Result<Taint, ConfigError> {
        if let Some(bit) = self.taint_types.get(name) {
            return Ok(*bit);
        }
        let index = self.taint_types.len();
        if index >= Taint::MAX_CUSTOM_TYPES {
            return Err(ConfigError::TaintTypeLimit { limit: Taint::MAX_CUSTOM_TYPES });
        }
        let bit = Taint::custom(index);
        self.taint_types.insert(name.to_string(), bit);
        Ok(bit)
    }

    /// The bit registered for a named sanitizer category.
    pub fn taint_type(&self, name: &str) -> Option<Taint> {
        self.taint_types.get(name).copied()
    }

    /// Insert a behavior under an explicit key. Intended for tests and
    /// embedders that build tables programmatically.
    pub fn define(&mut self, key: impl Into<String>, behavior: MethodBehavior) {
        self.behaviors.insert(key.into(), behavior);
    }

    /// Behavior for a resolved symbol.
    ///
    /// Resolution order: exact match on type + member + argument signature,
    /// then fallback on type + member alone. `None` means "no special
    /// behavior", never an error.
    pub fn lookup(&self, symbol: &Symbol) -> Option<&MethodBehavior> {
        if let Some(key) = symbol.signature_key() {
            if let Some(behavior) = self.behaviors.get(&key) {
                return Some(behavior);
            }
        }
        self.behaviors.get(&symbol.key())
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    fn build_behavior(&mut self, label: &str, entry: &BehaviorEntry) -> Result<MethodBehavior, ConfigError> {
        let mut behavior = self.build_markers(
            label,
            &entry.markers,
            entry.injectable_field,
            entry.password_field,
        )?;

        behavior.return_taint = match entry.returns.as_deref() {
            None => None,
            Some("Safe") => Some(Taint::SAFE),
            Some(name) => Some(self.require_taint_type(name)?),
        };

        if let Some(condition) = &entry.condition {
            let nested = self.build_markers(label, &condition.markers, false, false)?;
            behavior.condition = Some(Box::new(BehaviorCondition {
                argument_index: condition.argument,
                expected: condition.equals.clone(),
                behavior: nested,
            }));
        }

        let has_markers = !behavior.injectable_arguments.is_empty()
            || !behavior.password_arguments.is_empty()
            || !behavior.taint_from_arguments.is_empty()
            || behavior.injectable_field.is_some()
            || behavior.password_field.is_some()
            || behavior.return_taint.is_some()
            || behavior.condition.is_some();
        if !has_markers {
            return Err(ConfigError::InvalidBehavior {
                key: label.to_string(),
                message: "entry defines no injectable, password, taint, or return markers".into(),
            });
        }

        Ok(behavior)
    }

    fn build_markers(
        &mut self,
        label: &str,
        markers: &MarkerSet,
        injectable_field: bool,
        password_field: bool,
    ) -> Result<MethodBehavior, ConfigError> {
        let mut required_bits = Taint::UNSET;
        for name in &markers.requires {
            required_bits = required_bits | self.require_taint_type(name)?;
        }

        let injectable = |rule: &Option<String>| -> Result<InjectableArgument, ConfigError> {
            let rule_id = rule.clone().ok_or_else(|| ConfigError::InvalidBehavior {
                key: label.to_string(),
                message: "injectable marker without injection_rule".into(),
            })?;
            Ok(InjectableArgument {
                rule_id,
                required_bits,
                negated: markers.negate_requires,
            })
        };

        let mut behavior = MethodBehavior::default();

        for index in &markers.injectable_arguments {
            behavior
                .injectable_arguments
                .insert(*index, injectable(&markers.injection_rule)?);
        }
        if injectable_field {
            behavior.injectable_field = Some(injectable(&markers.injection_rule)?);
        }

        if !markers.password_arguments.is_empty() || password_field {
            let rule = markers.password_rule.clone().ok_or_else(|| ConfigError::InvalidBehavior {
                key: label.to_string(),
                message: "password marker without password_rule".into(),
            })?;
            behavior.password_arguments = markers.password_arguments.iter().copied().collect();
            behavior.password_rule = Some(rule.clone());
            if password_field {
                behavior.password_field = Some(rule);
            }
        }

        behavior.taint_from_arguments = markers.taint_from_arguments.iter().copied().collect();

        Ok(behavior)
    }

    fn require_taint_type(&mut self, name: &str) -> Result<Taint, ConfigError> {
        self.taint_types
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownTaintType { name: name.to_string() })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BehaviorFile {
    #[serde(default)]
    taint_types: Vec<String>,
    #[serde(default)]
    behaviors: BTreeMap<String, BehaviorEntry>,
}

/// Marker fields shared between an entry and its conditional override.
#[derive(Debug, Default, Deserialize)]
struct MarkerSet {
    #[serde(default)]
    injectable_arguments: Vec<usize>,
    #[serde(default)]
    injection_rule: Option<String>,
    #[serde(default)]
    password_arguments: Vec<usize>,
    #[serde(default)]
    password_rule: Option<String>,
    #[serde(default)]
    taint_from_arguments: Vec<usize>,
    /// Named sanitizer categories that neutralize the injectable markers.
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    negate_requires: bool,
}

#[derive(Debug, Deserialize)]
struct BehaviorEntry {
    #[serde(default)]
    namespace: String,
    class_name: String,
    name: String,
    #[serde(default)]
    arg_types: Option<String>,
    #[serde(default)]
    injectable_field: bool,
    #[serde(default)]
    password_field: bool,
    /// `Safe` or a declared taint type name.
    #[serde(default)]
    returns: Option<String>,
    #[serde(default)]
    condition: Option<ConditionEntry>,
    #[serde(flatten)]
    markers: MarkerSet,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    argument: usize,
    equals: ConstantValue,
    #[serde(flatten)]
    markers: MarkerSet,
}

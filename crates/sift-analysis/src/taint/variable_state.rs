//! Per-variable taint records.

use sift_core::types::collections::FxHashMap;
use smallvec::SmallVec;

use crate::syntax::ConstantValue;

use super::lattice::Taint;

/// Marker kinds extensions attach to variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    HttpCookieSecure,
    HttpCookieHttpOnly,
}

/// A tag plus an optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTag {
    pub tag: Tag,
    pub value: Option<ConstantValue>,
}

/// State of one variable: its taint, the literal payload when the taint is
/// constant, the node that last wrote it, extension tags, and nested
/// per-property states for member taint.
#[derive(Debug, Clone)]
pub struct VariableState<N> {
    pub taint: Taint,
    /// Literal payload; present only when `taint` is constant.
    pub value: Option<ConstantValue>,
    /// Provenance: the node that produced the current taint.
    pub node: N,
    tags: SmallVec<[VariableTag; 2]>,
    pub property_states: FxHashMap<String, VariableState<N>>,
}

impl<N: Copy> VariableState<N> {
    pub fn new(node: N, taint: Taint) -> Self {
        Self {
            taint,
            value: None,
            node,
            tags: SmallVec::new(),
            property_states: FxHashMap::default(),
        }
    }

    pub fn constant(node: N, value: ConstantValue) -> Self {
        Self {
            taint: Taint::CONSTANT,
            value: Some(value),
            node,
            tags: SmallVec::new(),
            property_states: FxHashMap::default(),
        }
    }

    /// Control-flow-safe union with `other`.
    ///
    /// Taint follows the lattice join. Provenance follows the most recent
    /// write: `other`'s node wins unless `other` is unset. Tags are
    /// unioned. Property states merge recursively when a key exists on
    /// both sides and are inserted otherwise.
    pub fn merge(&mut self, other: &VariableState<N>) {
        if self.taint.is_unset() {
            self.taint = other.taint;
            self.value = other.value.clone();
            self.node = other.node;
        } else {
            let merged = self.taint.merge(other.taint);
            self.value = if merged.is_constant() {
                other.value.clone().or_else(|| self.value.take())
            } else {
                None
            };
            if !other.taint.is_unset() {
                self.node = other.node;
            }
            self.taint = merged;
        }

        for tag in &other.tags {
            self.add_tag_record(tag.clone());
        }
        self.merge_property_states(other);
    }

    /// Assignment semantics: unconditionally replace taint, payload, and
    /// provenance (unless `other` is unset), but still accumulate tags and
    /// property states.
    pub fn merge_and_replace_taint(&mut self, other: &VariableState<N>) {
        if !other.taint.is_unset() {
            self.taint = other.taint;
            self.value = other.value.clone();
            self.node = other.node;
        }

        for tag in &other.tags {
            self.add_tag_record(tag.clone());
        }
        self.merge_property_states(other);
    }

    fn merge_property_states(&mut self, other: &VariableState<N>) {
        for (name, incoming) in &other.property_states {
            match self.property_states.get_mut(name) {
                Some(existing) => existing.merge(incoming),
                None => {
                    self.property_states.insert(name.clone(), incoming.clone());
                }
            }
        }
    }

    /// Merge `state` into the property named `name`, creating it if absent.
    pub fn merge_property(&mut self, name: &str, state: VariableState<N>) {
        match self.property_states.get_mut(name) {
            Some(existing) => existing.merge(&state),
            None => {
                self.property_states.insert(name.to_string(), state);
            }
        }
    }

    /// Idempotent tag insert: at most one record per tag kind.
    pub fn add_tag(&mut self, tag: Tag) {
        self.add_tag_with_value(tag, None);
    }

    pub fn add_tag_with_value(&mut self, tag: Tag, value: Option<ConstantValue>) {
        self.add_tag_record(VariableTag { tag, value });
    }

    fn add_tag_record(&mut self, record: VariableTag) {
        if !self.tags.iter().any(|t| t.tag == record.tag) {
            self.tags.push(record);
        }
    }

    pub fn remove_tag(&mut self, tag: Tag) {
        self.tags.retain(|t| t.tag != tag);
    }

    /// Direct tags only.
    pub fn tags(&self) -> &[VariableTag] {
        &self.tags
    }

    /// True when the tag is present directly or on any nested property
    /// state.
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.iter().any(|t| t.tag == tag)
            || self.property_states.values().any(|p| p.has_tag(tag))
    }

    /// All records of `tag`, searching direct tags and nested property
    /// states.
    pub fn find_tags(&self, tag: Tag) -> Vec<&VariableTag> {
        let mut found: Vec<&VariableTag> =
            self.tags.iter().filter(|t| t.tag == tag).collect();
        for property in self.property_states.values() {
            found.extend(property.find_tags(tag));
        }
        found
    }
}

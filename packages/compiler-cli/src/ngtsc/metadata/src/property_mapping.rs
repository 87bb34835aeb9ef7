//! Metadata property mapping utilities.
//!
//! This module handles mapping of directive inputs and outputs to class properties.

use indexmap::IndexMap;
use ngtcb_compiler::render3::view::t2_api::InputOutputPropertySet;

/// Type alias for class property names.
pub type ClassPropertyName = String;

/// Type alias for binding property names, as used in templates.
pub type BindingPropertyName = String;

/// Represents an input or output property mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOrOutput {
    pub class_property_name: ClassPropertyName,
    pub binding_property_name: BindingPropertyName,
}

/// A mapping of class properties to their template bindings (inputs or outputs).
///
/// A single binding name may be claimed by more than one class property, so the reverse
/// lookup yields a list. Insertion order is preserved everywhere.
#[derive(Debug, Clone, Default)]
pub struct ClassPropertyMapping {
    forward: IndexMap<ClassPropertyName, InputOrOutput>,
    reverse: IndexMap<BindingPropertyName, Vec<InputOrOutput>>,
}

impl ClassPropertyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from `(class property, binding property)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut mapping = Self::new();
        for (class_property_name, binding_property_name) in pairs {
            mapping.insert(InputOrOutput {
                class_property_name: class_property_name.to_string(),
                binding_property_name: binding_property_name.to_string(),
            });
        }
        mapping
    }

    pub fn insert(&mut self, entry: InputOrOutput) {
        if let Some(previous) = self.forward.get(&entry.class_property_name) {
            let previous_binding = previous.binding_property_name.clone();
            if let Some(list) = self.reverse.get_mut(&previous_binding) {
                list.retain(|e| e.class_property_name != entry.class_property_name);
                if list.is_empty() {
                    self.reverse.shift_remove(&previous_binding);
                }
            }
        }
        self.reverse
            .entry(entry.binding_property_name.clone())
            .or_default()
            .push(entry.clone());
        self.forward
            .insert(entry.class_property_name.clone(), entry);
    }

    pub fn get_by_class_property_name(&self, class_property_name: &str) -> Option<&InputOrOutput> {
        self.forward.get(class_property_name)
    }

    /// All the mappings claiming `binding_property_name`, or `None` when it isn't bound.
    pub fn get_by_binding_property_name(
        &self,
        binding_property_name: &str,
    ) -> Option<&[InputOrOutput]> {
        self.reverse
            .get(binding_property_name)
            .map(|entries| entries.as_slice())
    }

    pub fn has_binding_property_name(&self, binding_property_name: &str) -> bool {
        self.reverse.contains_key(binding_property_name)
    }

    /// Names of the class properties that are mapped.
    pub fn class_property_names(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(|k| k.as_str())
    }

    /// Names of the binding properties that are mapped.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.reverse.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputOrOutput> {
        self.forward.values()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }
}

impl InputOutputPropertySet for ClassPropertyMapping {
    fn has_binding_property_name(&self, property_name: &str) -> bool {
        ClassPropertyMapping::has_binding_property_name(self, property_name)
    }
}

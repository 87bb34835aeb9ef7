//! Element Schema Registry

use crate::core::SchemaMetadata;

/// Source of truth for which elements exist and which properties they carry.
pub trait ElementSchemaRegistry {
    /// Check if a property exists on an element
    fn has_property(&self, tag_name: &str, prop_name: &str, schema_metas: &[SchemaMetadata])
        -> bool;

    /// Check if an element exists
    fn has_element(&self, tag_name: &str, schema_metas: &[SchemaMetadata]) -> bool;

    /// Property name an attribute maps to, e.g. `class` to `className`.
    fn get_mapped_prop_name(&self, prop_name: &str) -> String;
}

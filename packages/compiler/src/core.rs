//! Core Types
//!
//! Types shared with the runtime that the template pipeline needs to know about.

use serde::{Deserialize, Serialize};

/// A schema declared on an NgModule or standalone component, relaxing DOM validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub name: String,
}

/// Allows unknown elements with a dash in their name, and any property on them.
pub fn custom_elements_schema() -> SchemaMetadata {
    SchemaMetadata {
        name: "custom-elements".to_string(),
    }
}

/// Allows any element and any property.
pub fn no_errors_schema() -> SchemaMetadata {
    SchemaMetadata {
        name: "no-errors-schema".to_string(),
    }
}

//! Metadata source modules.

pub mod property_mapping;

pub use property_mapping::{BindingPropertyName, ClassPropertyMapping, ClassPropertyName, InputOrOutput};

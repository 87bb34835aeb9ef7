//! Schema Module
//!
//! Knowledge of DOM elements and their properties, used to validate bindings.

pub mod dom_element_schema_registry;
pub mod element_schema_registry;

pub use dom_element_schema_registry::*;
pub use element_schema_registry::*;

//! Directive metadata.
//!
//! Only the shapes type-checking consumes live here; reading metadata out of decorators is the
//! job of the front end.

pub mod src;

pub use src::property_mapping::{
    BindingPropertyName, ClassPropertyMapping, ClassPropertyName, InputOrOutput,
};

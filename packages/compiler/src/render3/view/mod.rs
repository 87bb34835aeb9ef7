//! Render3 View Module
//!
//! Binding of templates against directives.

pub mod t2_api;
pub mod t2_binder;

// Re-exports
pub use t2_api::*;
pub use t2_binder::*;

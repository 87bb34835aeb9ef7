//! Render3 Module
//!
//! Template nodes and the binding APIs over them.

pub mod r3_ast;
pub mod view;

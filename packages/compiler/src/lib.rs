#![deny(clippy::all)]

/**
 * Template side of the type-checking pipeline
 *
 * Data produced by the template parser (expression AST, render3 nodes, parse spans) and the
 * binder that resolves a parsed template against directive metadata.
 */
pub mod core;
pub mod directive_matching;
pub mod expression_parser;
pub mod parse_util;
pub mod render3;
pub mod schema;

/**
 * Expression Parser Module
 *
 * The parsed form of template expressions. Parsing itself happens upstream.
 */
pub mod ast;

pub use ast::*;

//! Angular TypeScript Compiler (ngtsc)
//!
//! The parts of the compiler that turn component templates into type-checkable TypeScript.

pub mod diagnostics;
pub mod imports;
pub mod metadata;
pub mod reflection;
pub mod translator;
pub mod typecheck;

pub mod testing;

#![deny(clippy::all)]

/**
 * Angular Template Type-Checking - Rust Implementation
 *
 * Generation of type-check blocks for component templates and the bookkeeping around them
 */
// Re-export compiler for convenience
pub use ngtcb_compiler as compiler;

pub mod ngtsc;

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

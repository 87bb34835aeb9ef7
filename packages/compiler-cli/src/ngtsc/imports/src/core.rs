// Core - Import rewriting utilities
//
// Provides ImportRewriter trait and the no-op implementation.

/// Rewrites imports of symbols being written into generated code.
pub trait ImportRewriter {
    /// Whether `symbol` from `specifier` should be imported at all, or referenced by its bare
    /// name.
    fn should_import_symbol(&self, symbol: &str, specifier: &str) -> bool;

    /// Optionally rewrite a reference to an imported symbol.
    fn rewrite_symbol(&self, symbol: &str, specifier: &str) -> String;

    /// Optionally rewrite the given module specifier in the context of a given file.
    fn rewrite_specifier(&self, specifier: &str, in_context_of_file: &str) -> String;
}

/// `ImportRewriter` that does no rewriting.
#[derive(Debug, Clone, Default)]
pub struct NoopImportRewriter;

impl NoopImportRewriter {
    pub fn new() -> Self {
        Self
    }
}

impl ImportRewriter for NoopImportRewriter {
    fn should_import_symbol(&self, _symbol: &str, _specifier: &str) -> bool {
        true
    }

    fn rewrite_symbol(&self, symbol: &str, _specifier: &str) -> String {
        symbol.to_string()
    }

    fn rewrite_specifier(&self, specifier: &str, _in_context_of_file: &str) -> String {
        specifier.to_string()
    }
}

use indexmap::IndexMap;

use crate::ngtsc::imports::{ImportRewriter, NoopImportRewriter};

/// A namespace import to be added to a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub specifier: String,
    pub qualifier: String,
}

/// How a symbol from another module should be written: `qualifier.symbol` when
/// `module_import` is set, otherwise the bare `symbol`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub module_import: Option<String>,
    pub symbol: String,
}

/// Hands out namespace import identifiers for modules referenced from generated code.
///
/// Every module gets a single identifier, `{prefix}{n}`, numbered from 0 in the order modules are
/// first requested.
pub struct ImportManager {
    rewriter: Box<dyn ImportRewriter>,
    prefix: String,
    specifier_to_identifier: IndexMap<String, String>,
}

impl ImportManager {
    pub fn new(rewriter: Box<dyn ImportRewriter>, prefix: impl Into<String>) -> Self {
        Self {
            rewriter,
            prefix: prefix.into(),
            specifier_to_identifier: IndexMap::new(),
        }
    }

    pub fn generate_namespace_import(&mut self, module_name: &str) -> String {
        if let Some(identifier) = self.specifier_to_identifier.get(module_name) {
            return identifier.clone();
        }
        let identifier = format!("{}{}", self.prefix, self.specifier_to_identifier.len());
        self.specifier_to_identifier
            .insert(module_name.to_string(), identifier.clone());
        identifier
    }

    pub fn generate_named_import(&mut self, module_name: &str, original_symbol: &str) -> NamedImport {
        let symbol = self.rewriter.rewrite_symbol(original_symbol, module_name);
        if !self.rewriter.should_import_symbol(&symbol, module_name) {
            return NamedImport {
                module_import: None,
                symbol,
            };
        }
        NamedImport {
            module_import: Some(self.generate_namespace_import(module_name)),
            symbol,
        }
    }

    /// Every import requested so far, with specifiers rewritten for `context_path`.
    pub fn get_all_imports(&self, context_path: &str) -> Vec<Import> {
        self.specifier_to_identifier
            .iter()
            .map(|(specifier, qualifier)| Import {
                specifier: self.rewriter.rewrite_specifier(specifier, context_path),
                qualifier: qualifier.clone(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.specifier_to_identifier.is_empty()
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new(Box::new(NoopImportRewriter::new()), "i")
    }
}

impl std::fmt::Debug for ImportManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportManager")
            .field("prefix", &self.prefix)
            .field("imports", &self.specifier_to_identifier)
            .finish()
    }
}

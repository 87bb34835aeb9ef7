//! References - Reference type for tracking declarations
//!
//! A Reference is a pointer to a declaration that was extracted from the program somehow.
//! It contains not only the node itself, but the information regarding how the node was located.
//! In particular, it might carry a module specifier which might expose the node.
//!
//! The compiler uses `Reference`s instead of bare declarations when tracking classes or
//! generating imports.

use std::rc::Rc;

use ts::DeclarationId;

use crate::ngtsc::reflection::DeclarationNode;

/// Information about the module that owns a particular reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwningModule {
    /// The module specifier (e.g., "@angular/core").
    pub specifier: String,
    /// The resolution context (usually the file path where the import was found).
    pub resolution_context: String,
}

impl OwningModule {
    pub fn new(specifier: impl Into<String>, resolution_context: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            resolution_context: resolution_context.into(),
        }
    }
}

/// A reference to a declaration in the host program.
///
/// Cloning a `Reference` is cheap; the declaration itself is shared.
#[derive(Debug, Clone)]
pub struct Reference {
    pub node: Rc<DeclarationNode>,

    /// The compiler's best guess at an absolute module specifier which owns this `Reference`.
    ///
    /// This is usually determined by tracking the import statements which led the compiler to a
    /// given node. If any of these imports are absolute, it's an indication that the node being
    /// imported might come from that module.
    ///
    /// If `None`, then it's likely the node came from the current program.
    pub best_guess_owning_module: Option<OwningModule>,

    /// Indicates that the Reference was created synthetically, not as a result of natural value
    /// resolution.
    pub synthetic: bool,
}

impl Reference {
    pub fn new(node: Rc<DeclarationNode>) -> Self {
        Self {
            node,
            best_guess_owning_module: None,
            synthetic: false,
        }
    }

    pub fn with_owning_module(node: Rc<DeclarationNode>, owning_module: OwningModule) -> Self {
        Self {
            node,
            best_guess_owning_module: Some(owning_module),
            synthetic: false,
        }
    }

    /// The best guess at which module specifier owns this particular reference, or `None` if
    /// there isn't one.
    pub fn owned_by_module_guess(&self) -> Option<&str> {
        self.best_guess_owning_module
            .as_ref()
            .map(|m| m.specifier.as_str())
    }

    /// Whether this reference has a potential owning module or not.
    pub fn has_owning_module_guess(&self) -> bool {
        self.best_guess_owning_module.is_some()
    }

    /// A name for the referenced node, suitable for error messages.
    pub fn debug_name(&self) -> &str {
        &self.node.name
    }

    pub fn id(&self) -> DeclarationId {
        self.node.id
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.node.id == other.node.id
            && self.best_guess_owning_module == other.best_guess_owning_module
    }
}

//! Reflection over the host program's declarations.
//!
//! The type-check code generator never parses TypeScript itself. Whatever front end owns the
//! program describes its declarations as [`DeclarationNode`]s and answers identifier lookups
//! through a [`ReflectionHost`].

use std::rc::Rc;

use ts::{DeclarationId, TypeParameterDeclaration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Interface,
    TypeAlias,
    Enum,
    /// A type parameter of some generic declaration. Never top-level.
    TypeParameter,
}

/// A declaration in the host program, reduced to what type-checking needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    pub id: DeclarationId,
    pub name: String,
    pub kind: DeclarationKind,
    /// Absolute path of the declaring file.
    pub source_file: String,
    pub is_declaration_file: bool,
    /// Whether the declaration carries an `export` modifier at the top level of its file.
    pub exported: bool,
    /// `None` for non-generic declarations.
    pub type_parameters: Option<Vec<TypeParameterDeclaration>>,
    /// Start offset of the declaration within its file.
    pub pos: usize,
    /// End offset (exclusive) of the declaration within its file.
    pub end: usize,
    /// Start offset of the declaration's name.
    pub name_pos: usize,
}

impl DeclarationNode {
    pub fn is_top_level(&self) -> bool {
        self.kind != DeclarationKind::TypeParameter
    }

    pub fn has_type_parameters(&self) -> bool {
        self.type_parameters.as_ref().map_or(false, |p| !p.is_empty())
    }

    pub fn declares_type_parameter(&self, id: DeclarationId) -> bool {
        self.type_parameters
            .iter()
            .flatten()
            .any(|param| param.id == id)
    }

    pub fn name_end(&self) -> usize {
        self.name_pos + self.name.len()
    }
}

/// Classes are the declarations components and directives hang off.
pub type ClassDeclaration = DeclarationNode;

/// The result of resolving an identifier to its declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub node: Rc<DeclarationNode>,
    /// The module specifier through which the declaration was imported, when it came from an
    /// absolute (non-relative) import.
    pub via_module: Option<String>,
}

/// Abstracts over reflection of the host program.
pub trait ReflectionHost {
    /// Resolve `name` as written somewhere inside `context` (e.g. in one of its type parameter
    /// bounds) to the declaration it refers to.
    fn get_declaration_of_identifier(
        &self,
        name: &str,
        context: &DeclarationNode,
    ) -> Option<Declaration>;

    /// Whether `decl` can be imported from its file by name.
    fn is_statically_exported(&self, decl: &DeclarationNode) -> bool;
}

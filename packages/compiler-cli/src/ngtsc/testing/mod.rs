//! Testing Utilities
//!
//! Hand-built declarations and an in-memory reflection host, standing in for a parsed program.

use std::collections::HashMap;
use std::rc::Rc;

use ts::{DeclarationId, TypeNode, TypeParameterDeclaration};

use crate::ngtsc::reflection::{Declaration, DeclarationKind, DeclarationNode, ReflectionHost};

/// Builds a [`DeclarationNode`] for a class. Classes are exported and span `0..100` of their
/// file unless told otherwise.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    node: DeclarationNode,
}

impl ClassBuilder {
    pub fn new(id: u32, name: &str, file: &str) -> Self {
        ClassBuilder {
            node: DeclarationNode {
                id: DeclarationId(id),
                name: name.to_string(),
                kind: DeclarationKind::Class,
                source_file: file.to_string(),
                is_declaration_file: file.ends_with(".d.ts"),
                exported: true,
                type_parameters: None,
                pos: 0,
                end: 100,
                name_pos: 0,
            },
        }
    }

    pub fn kind(mut self, kind: DeclarationKind) -> Self {
        self.node.kind = kind;
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.node.exported = exported;
        self
    }

    /// Places the declaration at `pos..end` of its file.
    pub fn range(mut self, pos: usize, end: usize) -> Self {
        self.node.pos = pos;
        self.node.end = end;
        self.node.name_pos = pos;
        self
    }

    /// Adds a type parameter `name`, declared with id `id`.
    pub fn type_param(mut self, id: u32, name: &str, constraint: Option<TypeNode>) -> Self {
        let mut param = TypeParameterDeclaration::new(DeclarationId(id), name);
        param.constraint = constraint;
        self.node
            .type_parameters
            .get_or_insert_with(Vec::new)
            .push(param);
        self
    }

    pub fn build_node(self) -> DeclarationNode {
        self.node
    }

    pub fn build(self) -> Rc<DeclarationNode> {
        Rc::new(self.node)
    }
}

/// Resolves identifiers through a flat table of the declarations it was given.
#[derive(Debug, Default)]
pub struct TestReflectionHost {
    declarations: HashMap<String, Declaration>,
}

impl TestReflectionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `name` resolve to `node`, declared in the program itself.
    pub fn declare(&mut self, name: &str, node: Rc<DeclarationNode>) {
        self.declarations.insert(
            name.to_string(),
            Declaration {
                node,
                via_module: None,
            },
        );
    }

    /// Makes `name` resolve to `node`, imported from the package `module`.
    pub fn import(&mut self, name: &str, node: Rc<DeclarationNode>, module: &str) {
        self.declarations.insert(
            name.to_string(),
            Declaration {
                node,
                via_module: Some(module.to_string()),
            },
        );
    }

    /// Declares every type parameter of `owner` under its name.
    pub fn declare_type_parameters_of(&mut self, owner: &DeclarationNode) {
        for param in owner.type_parameters.iter().flatten() {
            let node = ClassBuilder::new(param.id.0, &param.name, &owner.source_file)
                .kind(DeclarationKind::TypeParameter)
                .exported(false)
                .build();
            self.declare(&param.name, node);
        }
    }
}

impl ReflectionHost for TestReflectionHost {
    fn get_declaration_of_identifier(
        &self,
        name: &str,
        _context: &DeclarationNode,
    ) -> Option<Declaration> {
        self.declarations.get(name).cloned()
    }

    fn is_statically_exported(&self, decl: &DeclarationNode) -> bool {
        decl.is_top_level() && decl.exported
    }
}

// Type Emitter
//
// Re-emission of type syntax into a different file.
//
// A type written in one file (say the bound of a generic directive) can be used in a
// type-checking shim only if every type reference inside it can be written there too. The
// resolver decides that per reference; [`can_emit_type`] checks a whole type up front and
// [`TypeEmitter`] performs the rewrite.
//
// ```text
// import {NgIterable} from '@angular/core';
// class NgForOf<T, U extends NgIterable<T>> {}
// ```
//
// Emitting the bound of `U` into a shim produces `i0.NgIterable<T>`, with `i0` a namespace
// import of `@angular/core`.

use ts::{FunctionTypeNode, Parameter, PropertySignature, TypeNode, TypeParameterDeclaration, TypeReferenceNode};

use crate::ngtsc::imports::Reference;
use crate::ngtsc::typecheck::api::{Result, TypeCheckError};

/// What a type reference resolves to from the point of view of the emitting context.
#[derive(Debug, Clone)]
pub enum TypeReferenceResolution {
    /// A declaration that has to be referenced anew in the target file.
    Reference(Reference),
    /// The reference is valid as written, e.g. a type parameter in scope at the target.
    Verbatim,
    /// The reference can't be written in the target file.
    Unresolved,
}

pub type TypeReferenceResolver<'a> = dyn Fn(&TypeReferenceNode) -> TypeReferenceResolution + 'a;

/// Outcome of visiting a node during the eligibility walk. `Ineligible` stops the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Continue,
    Ineligible,
}

/// Whether `type_node` can be emitted by a [`TypeEmitter`] using the same resolver.
pub fn can_emit_type(type_node: &TypeNode, resolver: &TypeReferenceResolver<'_>) -> bool {
    visit_node(type_node, resolver) == Visit::Continue
}

fn visit_node(node: &TypeNode, resolver: &TypeReferenceResolver<'_>) -> Visit {
    if let TypeNode::Reference(reference) = node {
        if !can_emit_type_reference(reference, resolver) {
            return Visit::Ineligible;
        }
        // Type arguments were checked along with the reference.
        return Visit::Continue;
    }
    for child in node.children() {
        if visit_node(child, resolver) == Visit::Ineligible {
            return Visit::Ineligible;
        }
    }
    Visit::Continue
}

fn can_emit_type_reference(reference: &TypeReferenceNode, resolver: &TypeReferenceResolver<'_>) -> bool {
    if let TypeReferenceResolution::Unresolved = resolver(reference) {
        return false;
    }
    // Emission rewrites every type argument, whatever the reference itself resolved to.
    reference
        .type_arguments
        .iter()
        .flatten()
        .all(|arg| can_emit_type(arg, resolver))
}

/// Rewrites type references so that a type becomes valid in another file.
pub struct TypeEmitter<'a> {
    resolver: &'a TypeReferenceResolver<'a>,
    /// Produces a type valid in the target file for a declaration, typically `i1.Foo`.
    emit_reference: &'a mut dyn FnMut(&Reference) -> Result<TypeNode>,
}

impl<'a> TypeEmitter<'a> {
    pub fn new(
        resolver: &'a TypeReferenceResolver<'a>,
        emit_reference: &'a mut dyn FnMut(&Reference) -> Result<TypeNode>,
    ) -> Self {
        Self {
            resolver,
            emit_reference,
        }
    }

    pub fn emit_type(&mut self, type_node: &TypeNode) -> Result<TypeNode> {
        let emitted = match type_node {
            TypeNode::Reference(reference) => TypeNode::Reference(self.emit_type_reference(reference)?),
            TypeNode::Keyword(_) | TypeNode::Literal(_) | TypeNode::TypeQuery(_) => type_node.clone(),
            TypeNode::Union(types) => TypeNode::Union(self.emit_types(types)?),
            TypeNode::Intersection(types) => TypeNode::Intersection(self.emit_types(types)?),
            TypeNode::Tuple(types) => TypeNode::Tuple(self.emit_types(types)?),
            TypeNode::TypeLiteral(members) => {
                let mut emitted = Vec::with_capacity(members.len());
                for member in members {
                    emitted.push(PropertySignature {
                        name: member.name.clone(),
                        optional: member.optional,
                        type_node: self.emit_type(&member.type_node)?,
                    });
                }
                TypeNode::TypeLiteral(emitted)
            }
            TypeNode::Array(element) => TypeNode::Array(Box::new(self.emit_type(element)?)),
            TypeNode::Parenthesized(inner) => TypeNode::Parenthesized(Box::new(self.emit_type(inner)?)),
            TypeNode::Function(function) => TypeNode::Function(self.emit_function_type(function)?),
            TypeNode::IndexedAccess {
                object_type,
                index_type,
            } => TypeNode::IndexedAccess {
                object_type: Box::new(self.emit_type(object_type)?),
                index_type: Box::new(self.emit_type(index_type)?),
            },
        };
        Ok(emitted)
    }

    fn emit_types(&mut self, types: &[TypeNode]) -> Result<Vec<TypeNode>> {
        types.iter().map(|t| self.emit_type(t)).collect()
    }

    fn emit_function_type(&mut self, function: &FunctionTypeNode) -> Result<FunctionTypeNode> {
        let type_parameters = match &function.type_parameters {
            Some(params) => {
                let mut emitted = Vec::with_capacity(params.len());
                for param in params {
                    emitted.push(TypeParameterDeclaration {
                        id: param.id,
                        name: param.name.clone(),
                        constraint: self.emit_optional(param.constraint.as_ref())?,
                        default: self.emit_optional(param.default.as_ref())?,
                    });
                }
                Some(emitted)
            }
            None => None,
        };
        let mut parameters = Vec::with_capacity(function.parameters.len());
        for param in &function.parameters {
            parameters.push(Parameter {
                type_node: self.emit_optional(param.type_node.as_ref())?,
                ..param.clone()
            });
        }
        Ok(FunctionTypeNode {
            type_parameters,
            parameters,
            return_type: Box::new(self.emit_type(&function.return_type)?),
        })
    }

    fn emit_optional(&mut self, type_node: Option<&TypeNode>) -> Result<Option<TypeNode>> {
        type_node.map(|t| self.emit_type(t)).transpose()
    }

    fn emit_type_reference(&mut self, reference: &TypeReferenceNode) -> Result<TypeReferenceNode> {
        let resolution = (self.resolver)(reference);

        let type_arguments = match &reference.type_arguments {
            Some(args) => Some(self.emit_types(args)?),
            None => None,
        };

        let type_name = match resolution {
            TypeReferenceResolution::Unresolved => return Err(TypeCheckError::UnresolvedReference),
            TypeReferenceResolution::Verbatim => reference.type_name.clone(),
            TypeReferenceResolution::Reference(target) => match (self.emit_reference)(&target)? {
                TypeNode::Reference(emitted) => emitted.type_name,
                other => {
                    return Err(TypeCheckError::ExpectedTypeReference(format!(
                        "for emitted reference, got {:?}",
                        other
                    )))
                }
            },
        };

        Ok(TypeReferenceNode {
            type_name,
            type_arguments,
            comments: reference.comments.clone(),
        })
    }
}

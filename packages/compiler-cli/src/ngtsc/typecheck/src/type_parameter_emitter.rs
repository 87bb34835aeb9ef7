// Type Parameter Emitter
//
// Emission of a declaration's generic parameters into another file.

use ts::{TypeNode, TypeParameterDeclaration, TypeReferenceNode};

use super::type_emitter::{can_emit_type, TypeEmitter, TypeReferenceResolution};
use crate::ngtsc::imports::{OwningModule, Reference};
use crate::ngtsc::reflection::{DeclarationNode, ReflectionHost};
use crate::ngtsc::typecheck::api::Result;

/// Re-emits the type parameters of `owner`, bounds and defaults included. See
/// [`TypeEmitter`] for how individual types are rewritten.
pub struct TypeParameterEmitter<'a> {
    owner: &'a DeclarationNode,
    reflector: &'a dyn ReflectionHost,
}

impl<'a> TypeParameterEmitter<'a> {
    pub fn new(owner: &'a DeclarationNode, reflector: &'a dyn ReflectionHost) -> Self {
        Self { owner, reflector }
    }

    /// Whether [`emit`](Self::emit) would succeed.
    pub fn can_emit(&self) -> bool {
        let resolver = |reference: &TypeReferenceNode| self.resolve_type_reference(reference);
        self.owner.type_parameters.iter().flatten().all(|param| {
            param.constraint.as_ref().map_or(true, |t| can_emit_type(t, &resolver))
                && param.default.as_ref().map_or(true, |t| can_emit_type(t, &resolver))
        })
    }

    /// Emits the parameter list, `None` for a non-generic declaration.
    pub fn emit(
        &self,
        emit_reference: &mut dyn FnMut(&Reference) -> Result<TypeNode>,
    ) -> Result<Option<Vec<TypeParameterDeclaration>>> {
        let params = match &self.owner.type_parameters {
            Some(params) => params,
            None => return Ok(None),
        };

        let resolver = |reference: &TypeReferenceNode| self.resolve_type_reference(reference);
        let mut emitter = TypeEmitter::new(&resolver, emit_reference);

        let mut emitted = Vec::with_capacity(params.len());
        for param in params {
            let constraint = param
                .constraint
                .as_ref()
                .map(|t| emitter.emit_type(t))
                .transpose()?;
            let default = param
                .default
                .as_ref()
                .map(|t| emitter.emit_type(t))
                .transpose()?;
            emitted.push(TypeParameterDeclaration {
                id: param.id,
                name: param.name.clone(),
                constraint,
                default,
            });
        }
        Ok(Some(emitted))
    }

    fn resolve_type_reference(&self, reference: &TypeReferenceNode) -> TypeReferenceResolution {
        let target = reference.type_name.right_most();
        let declaration = match self.reflector.get_declaration_of_identifier(target, self.owner) {
            Some(declaration) => declaration,
            None => return TypeReferenceResolution::Unresolved,
        };

        // Type parameters of the owner are in scope wherever its parameter list is emitted.
        if self.owner.declares_type_parameter(declaration.node.id) {
            return TypeReferenceResolution::Verbatim;
        }

        let owning_module = declaration
            .via_module
            .as_ref()
            .map(|specifier| OwningModule::new(specifier.clone(), self.owner.source_file.clone()));

        match owning_module {
            Some(owning_module) => {
                TypeReferenceResolution::Reference(Reference::with_owning_module(declaration.node, owning_module))
            }
            // Without an owning module the declaration has to be importable from its own file.
            None if declaration.node.is_top_level() && self.reflector.is_statically_exported(&declaration.node) => {
                TypeReferenceResolution::Reference(Reference::new(declaration.node))
            }
            None => TypeReferenceResolution::Unresolved,
        }
    }
}

// TCB Utilities
//
// Decides where the type-check code of a component can live.

use indexmap::IndexMap;

use super::type_parameter_emitter::TypeParameterEmitter;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::{ClassDeclaration, ReflectionHost};

/// Whether a type-check block has to be spliced into the component's own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TcbInliningRequirement {
    /// The block must be inlined: it references something that can't be imported into a shim.
    MustInline,

    /// The block should be inlined because the component's generic bounds can't be written
    /// outside its file. Without inlining it can still be checked with `any` type arguments.
    ShouldInlineForGenericBounds,

    /// The block can live in a shim.
    None,
}

pub fn requires_inline_type_check_block(
    node: &ClassDeclaration,
    used_pipes: &IndexMap<String, Reference>,
    reflector: &dyn ReflectionHost,
) -> TcbInliningRequirement {
    if !check_if_class_is_exported(node, reflector) {
        // The component itself isn't importable from a shim.
        TcbInliningRequirement::MustInline
    } else if !check_if_generic_type_bounds_are_context_free(node, reflector) {
        TcbInliningRequirement::ShouldInlineForGenericBounds
    } else if used_pipes
        .values()
        .any(|pipe| !check_if_class_is_exported(&pipe.node, reflector))
    {
        TcbInliningRequirement::MustInline
    } else {
        TcbInliningRequirement::None
    }
}

pub fn check_if_class_is_exported(node: &ClassDeclaration, reflector: &dyn ReflectionHost) -> bool {
    node.exported || reflector.is_statically_exported(node)
}

/// Whether the bounds and defaults of `node`'s type parameters can be written in another file.
pub fn check_if_generic_type_bounds_are_context_free(
    node: &ClassDeclaration,
    reflector: &dyn ReflectionHost,
) -> bool {
    TypeParameterEmitter::new(node, reflector).can_emit()
}

// Completion API
//
// Locations in type-checking shims that completion providers anchor on.

use indexmap::IndexMap;
use ngtcb_compiler::render3::view::t2_api::TemplateEntity;

/// A position in a type-checking shim file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShimLocation {
    pub shim_path: String,
    pub position_in_shim_file: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Reference,
    Variable,
}

/// A reference or variable in scope at some point of a template.
#[derive(Debug, Clone)]
pub struct TemplateContextCompletion {
    pub kind: CompletionKind,
    pub node: TemplateEntity,
}

/// Completions available at a point of a template.
#[derive(Debug, Clone)]
pub struct GlobalCompletion {
    /// Where members of the component class can be completed.
    pub component_context: ShimLocation,

    /// Template references and variables in scope, by name.
    pub template_context: IndexMap<String, TemplateContextCompletion>,

    /// Where the expression being completed sits, when it is empty.
    pub node_context: Option<ShimLocation>,
}

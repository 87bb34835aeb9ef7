// TypeCheck API
//
// Configuration, metadata and error types shared by the type-check block generator and the
// context that drives it.

use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use ngtcb_compiler::core::SchemaMetadata;
use ngtcb_compiler::render3::view::t2_api::{BoundTarget, DirectiveMeta, InputOutputPropertySet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ngtsc::diagnostics::DiagnosticLocation;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::metadata::ClassPropertyMapping;
use crate::ngtsc::reflection::ClassDeclaration;

/// Fatal errors of the type-checking pass.
///
/// These signal a broken contract between the type-checker and its inputs (an operator the
/// translator doesn't know, a reference that can't be written, ...). Problems in user templates
/// are reported as diagnostics instead.
#[derive(Debug, Error)]
pub enum TypeCheckError {
    #[error("Unsupported Unary.operator: {0}")]
    UnsupportedUnaryOperator(String),

    #[error("Unsupported Binary.operation: {0}")]
    UnsupportedBinaryOperator(String),

    #[error("Method not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Unable to emit an unresolved reference")]
    UnresolvedReference,

    #[error("Expected TypeReferenceNode {0}")]
    ExpectedTypeReference(String),

    #[error("AssertionError: invalid inlining configuration.")]
    InvalidInliningConfiguration,

    #[error("{0} requires an inline type constructor")]
    RequiresInlineTypeCtor(String),

    #[error("Failed to emit a reference to {ref_name} in {context}: {reason}")]
    ReferenceEmitFailed {
        ref_name: String,
        context: String,
        reason: String,
    },

    #[error("Could not resolve {0}")]
    UnresolvedTemplateNode(String),

    #[error("Error resolving operation, got null")]
    UnresolvedOperation,

    #[error("Unexpected unknown template ID: {0}")]
    UnknownTemplateId(TemplateId),

    #[error("Assertion failure: no SourceLocation found for usage of pipe '{0}'.")]
    MissingPipeSpan(String),

    #[error("Assertion failure: no SourceLocation found for property binding.")]
    MissingBindingSpan,

    #[error("Source file {0} is not available to the type-checking host")]
    MissingSourceFile(String),

    #[error("Invalid type-checking configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TypeCheckError>;

/// Identifies a component's template within the file that declares the component, `tcb1`,
/// `tcb2`, ... in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a type-checking context handles code that has to be inlined into user files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InliningMode {
    /// Type-check code that needs to be inlined is spliced into the component's own file.
    InlineOps,

    /// Inlining is not available: templates that need it are reported with a diagnostic.
    Error,
}

/// Controls which checks end up in generated type-check blocks.
///
/// `Default` is the strictest configuration. Hosts usually read this from compiler options
/// with [`TypeCheckingConfig::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeCheckingConfig {
    /// Whether to check the left-hand side type of binding operations to directive inputs.
    pub check_type_of_input_bindings: bool,

    /// Whether to honor `private`/`protected`/`readonly` on directive inputs. When `false`,
    /// such inputs are checked against their declared type without assigning to them.
    pub honor_access_modifiers_for_input_bindings: bool,

    /// Whether to use strict null types for input bindings for directives.
    pub strict_null_input_bindings: bool,

    /// Whether to check text attributes that happen to be consumed by a directive or component.
    pub check_type_of_attributes: bool,

    /// Whether to check the left-hand side type of binding operations to DOM properties.
    pub check_type_of_dom_bindings: bool,

    /// Whether to infer the type of the `$event` variable in event bindings for directive
    /// outputs.
    pub check_type_of_output_events: bool,

    /// Whether to infer the type of the `$event` variable in event bindings for animations.
    pub check_type_of_animation_events: bool,

    /// Whether to infer the type of the `$event` variable in event bindings to DOM events.
    pub check_type_of_dom_events: bool,

    /// Whether to infer the type of local references to DOM elements.
    pub check_type_of_dom_references: bool,

    /// Whether to infer the type of local references to directives and `<ng-template>`s.
    pub check_type_of_non_dom_references: bool,

    /// Whether to include type information from pipes in the type-checking operation.
    pub check_type_of_pipes: bool,

    /// Whether to descend into template bodies and check any bindings there.
    pub check_template_bodies: bool,

    /// Whether to always apply DOM schema checks in template bodies, independently of
    /// `check_template_bodies`.
    pub always_check_schema_in_template_bodies: bool,

    /// Whether to narrow the types of template contexts through `ngTemplateContextGuard`.
    pub apply_template_context_guards: bool,

    /// Whether to check the type of queries.
    pub check_queries: bool,

    /// Whether safe navigation operations produce `null | undefined` rather than `any`.
    pub strict_safe_navigation_types: bool,

    /// Whether the component context parameter keeps the component's generic type.
    pub use_context_generic_type: bool,

    /// Whether object and array literals in templates keep their inferred types.
    pub strict_literal_types: bool,

    /// Whether the generated code also serves the template type-checker's language features
    /// (completions and symbol lookup), which needs every optional operation emitted.
    pub enable_template_type_checker: bool,

    /// Whether inline type constructors may be used for generic directives whose bounds can't be
    /// written outside the declaring file.
    pub use_inline_type_constructors: bool,

    /// Whether to report suggestions where the configuration prevents better type inference.
    pub suggestions_for_suboptimal_type_inference: bool,
}

impl Default for TypeCheckingConfig {
    fn default() -> Self {
        Self {
            check_type_of_input_bindings: true,
            honor_access_modifiers_for_input_bindings: true,
            strict_null_input_bindings: true,
            check_type_of_attributes: true,
            check_type_of_dom_bindings: false,
            check_type_of_output_events: true,
            check_type_of_animation_events: true,
            check_type_of_dom_events: true,
            check_type_of_dom_references: true,
            check_type_of_non_dom_references: true,
            check_type_of_pipes: true,
            check_template_bodies: true,
            always_check_schema_in_template_bodies: true,
            apply_template_context_guards: true,
            check_queries: false,
            strict_safe_navigation_types: true,
            use_context_generic_type: true,
            strict_literal_types: true,
            enable_template_type_checker: false,
            use_inline_type_constructors: true,
            suggestions_for_suboptimal_type_inference: false,
        }
    }
}

impl TypeCheckingConfig {
    /// The configuration used when full template type-checking is off: only top-level
    /// expressions are checked, and most inferred types widen to `any`.
    pub fn basic() -> Self {
        Self {
            check_type_of_input_bindings: false,
            honor_access_modifiers_for_input_bindings: false,
            strict_null_input_bindings: false,
            check_type_of_attributes: false,
            check_type_of_dom_bindings: false,
            check_type_of_output_events: false,
            check_type_of_animation_events: false,
            check_type_of_dom_events: false,
            check_type_of_dom_references: false,
            check_type_of_non_dom_references: false,
            check_type_of_pipes: false,
            check_template_bodies: false,
            always_check_schema_in_template_bodies: true,
            apply_template_context_guards: false,
            check_queries: false,
            strict_safe_navigation_types: false,
            use_context_generic_type: false,
            strict_literal_types: false,
            enable_template_type_checker: false,
            use_inline_type_constructors: true,
            suggestions_for_suboptimal_type_inference: false,
        }
    }

    /// Reads a configuration from JSON. Missing fields keep their strict defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Everything needed to generate the type-check block of one template.
#[derive(Clone)]
pub struct TypeCheckBlockMetadata {
    /// Identifies the template in diagnostics.
    pub id: TemplateId,

    /// The template bound against the directives in scope of the component.
    pub bound_target: Rc<dyn BoundTarget<TypeCheckableDirectiveMeta>>,

    /// Pipes available to the template, by name.
    pub pipes: IndexMap<String, Reference>,

    /// Schemas relaxing DOM validation for the template.
    pub schemas: Vec<SchemaMetadata>,
}

impl fmt::Debug for TypeCheckBlockMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCheckBlockMetadata")
            .field("id", &self.id)
            .field("pipes", &self.pipes.keys().collect::<Vec<_>>())
            .field("schemas", &self.schemas)
            .finish()
    }
}

/// Fields of a directive a type constructor infers generic arguments from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCtorFields {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub queries: Vec<String>,
}

/// Describes a type constructor to generate for a generic directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCtorMetadata {
    /// Name of the generated function or static method.
    pub fn_name: String,

    /// Whether to emit a body. Declaration files only get a signature.
    pub body: bool,

    pub fields: TypeCtorFields,

    /// Inputs whose type comes from a static `ngAcceptInputType_*` member instead.
    pub coerced_input_fields: IndexSet<String>,
}

/// How a `ngTemplateGuard_*` member of a structural directive narrows its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateGuardType {
    /// The guard is the bound expression itself: `ngTemplateGuard_ngIf: 'binding'`.
    Binding,

    /// The guard is a type predicate method invoked with the bound expression.
    Invocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGuardMeta {
    pub input_name: String,
    pub type_: TemplateGuardType,
}

/// Directive metadata as the type-check block generator sees it.
#[derive(Debug, Clone)]
pub struct TypeCheckableDirectiveMeta {
    pub reference: Reference,
    pub name: String,
    pub selector: Option<String>,
    pub is_component: bool,
    pub is_structural: bool,
    pub export_as: Option<Vec<String>>,
    pub inputs: ClassPropertyMapping,
    pub outputs: ClassPropertyMapping,
    pub queries: Vec<String>,
    pub ng_template_guards: Vec<TemplateGuardMeta>,
    pub has_ng_template_context_guard: bool,
    /// Inputs with a static `ngAcceptInputType_*` coercion member.
    pub coerced_input_fields: IndexSet<String>,
    /// Inputs that are `private`, `protected` or `readonly`.
    pub restricted_input_fields: IndexSet<String>,
    /// Inputs whose class member name isn't a valid identifier, e.g. `'data-x'`.
    pub string_literal_input_fields: IndexSet<String>,
    /// Inputs declared in the decorator but missing on the class.
    pub undeclared_input_fields: IndexSet<String>,
    pub is_generic: bool,
}

impl TypeCheckableDirectiveMeta {
    pub fn new(reference: Reference, selector: impl Into<String>) -> Self {
        let is_generic = reference.node.has_type_parameters();
        Self {
            name: reference.debug_name().to_string(),
            reference,
            selector: Some(selector.into()),
            is_component: false,
            is_structural: false,
            export_as: None,
            inputs: ClassPropertyMapping::new(),
            outputs: ClassPropertyMapping::new(),
            queries: Vec::new(),
            ng_template_guards: Vec::new(),
            has_ng_template_context_guard: false,
            coerced_input_fields: IndexSet::new(),
            restricted_input_fields: IndexSet::new(),
            string_literal_input_fields: IndexSet::new(),
            undeclared_input_fields: IndexSet::new(),
            is_generic,
        }
    }
}

impl DirectiveMeta for TypeCheckableDirectiveMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    fn is_component(&self) -> bool {
        self.is_component
    }

    fn inputs(&self) -> &dyn InputOutputPropertySet {
        &self.inputs
    }

    fn outputs(&self) -> &dyn InputOutputPropertySet {
        &self.outputs
    }

    fn export_as(&self) -> Option<&[String]> {
        self.export_as.as_deref()
    }

    fn is_structural(&self) -> bool {
        self.is_structural
    }
}

/// Where a template's text lives, so diagnostics can point back into it.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSourceMapping {
    /// The template is an inline string literal whose offsets line up with the component
    /// file, so template spans are already positions in that file.
    Direct { node: DiagnosticLocation },

    /// The template is inline but its text had to be resolved (e.g. a concatenation), so
    /// diagnostics are reported against a synthetic file holding the template text.
    Indirect {
        component_class: Rc<ClassDeclaration>,
        node: DiagnosticLocation,
        template: String,
    },

    /// The template comes from a `templateUrl`.
    External {
        component_class: Rc<ClassDeclaration>,
        node: DiagnosticLocation,
        template: String,
        template_url: String,
    },
}

//! Render3 T2 API
//!
//! Type definitions for the t2 binder: what a template is bound against and what the binding
//! produces.

use indexmap::IndexSet;

use crate::expression_parser::ast::AST;
use crate::render3::r3_ast::{Element, NodeKey, R3Node, Reference, Template, Variable};

/// Possible values that a reference can be resolved to.
#[derive(Debug, Clone)]
pub enum ReferenceTarget<DirectiveT> {
    DirectiveOnNode {
        directive: DirectiveT,
        node: DirectiveOwner,
    },
    Element(Element),
    Template(Template),
}

/// Entity that is local to the template and defined within the template.
#[derive(Debug, Clone)]
pub enum TemplateEntity {
    Reference(Reference),
    Variable(Variable),
}

impl TemplateEntity {
    pub fn name(&self) -> &str {
        match self {
            TemplateEntity::Reference(r) => &r.name,
            TemplateEntity::Variable(v) => &v.name,
        }
    }

    pub fn key(&self) -> NodeKey {
        match self {
            TemplateEntity::Reference(r) => r.key(),
            TemplateEntity::Variable(v) => v.key(),
        }
    }
}

impl PartialEq for TemplateEntity {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TemplateEntity {}

impl std::hash::Hash for TemplateEntity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Nodes that can have directives applied to them.
#[derive(Debug, Clone)]
pub enum DirectiveOwner {
    Element(Element),
    Template(Template),
}

impl DirectiveOwner {
    pub fn key(&self) -> NodeKey {
        match self {
            DirectiveOwner::Element(el) => el.key(),
            DirectiveOwner::Template(tmpl) => tmpl.key(),
        }
    }
}

/// A logical target for analysis.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub template: Option<Vec<R3Node>>,
}

/// A data structure which can indicate whether a given property name is present or not.
pub trait InputOutputPropertySet {
    fn has_binding_property_name(&self, property_name: &str) -> bool;
}

/// Metadata regarding a directive that's needed to match it against template elements.
pub trait DirectiveMeta {
    /// Name of the directive class (used for debugging).
    fn name(&self) -> &str;
    /// The selector for the directive or `None` if there isn't one.
    fn selector(&self) -> Option<&str>;
    /// Whether the directive is a component.
    fn is_component(&self) -> bool;
    /// Set of inputs which this directive claims.
    fn inputs(&self) -> &dyn InputOutputPropertySet;
    /// Set of outputs which this directive claims.
    fn outputs(&self) -> &dyn InputOutputPropertySet;
    /// Names under which the directive is exported, if any.
    fn export_as(&self) -> Option<&[String]>;
    /// Whether the directive is a structural directive.
    fn is_structural(&self) -> bool;
}

/// Interface to the binding API.
pub trait TargetBinder<D: DirectiveMeta> {
    fn bind(&self, target: Target) -> Box<dyn BoundTarget<D>>;
}

/// Result of performing the binding operation against a `Target`.
pub trait BoundTarget<DirectiveT: DirectiveMeta> {
    /// Get the original `Target` that was bound.
    fn target(&self) -> &Target;

    /// For a given template node, get the set of directives which matched the node.
    fn get_directives_of_node(&self, node: NodeKey) -> Option<Vec<DirectiveT>>;

    /// For a given `Reference`, get the reference's target.
    fn get_reference_target(&self, reference: &Reference) -> Option<ReferenceTarget<DirectiveT>>;

    /// If the given `AST` expression refers to a `Reference` or `Variable`, return that.
    fn get_expression_target(&self, expr: &AST) -> Option<TemplateEntity>;

    /// Get the nesting level of a particular `Template`; the root is level 0.
    fn get_nesting_level(&self, template: &Template) -> usize;

    /// Get all `Reference`s and `Variable`s visible within the given `Template` (or at the
    /// top level, if `None`). Inner declarations shadow outer ones.
    fn get_entities_in_template_scope(&self, template: Option<&Template>)
        -> IndexSet<TemplateEntity>;

    /// Get a list of all the directives used by the target.
    fn get_used_directives(&self) -> Vec<DirectiveT>;

    /// Get a list of all the pipes used by the target.
    fn get_used_pipes(&self) -> Vec<String>;
}

// TypeCheck Block Generation
//
// Type-check block generation.
//
// A type-check block (TCB) is a function whose body mirrors a component template: elements
// become `document.createElement` calls, directives become typed variables, bindings become
// assignments to directive inputs, and every template expression is translated into an
// equivalent TypeScript expression. Handing the block to the host type-checker then reports
// type errors in the template.
//
// Generation is driven by a queue of operations per template scope. Operations are executed in
// order, but any operation may resolve another one (e.g. an input binding needs the directive
// instance it assigns to), which executes the target early and caches its result. Operations
// that only declare something are optional: when nothing needs them they're skipped, unless
// the language service needs the full picture.

use std::collections::{HashMap, HashSet};
use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;
use ngtcb_compiler::core::SchemaMetadata;
use ngtcb_compiler::expression_parser::ast::{
    AbsoluteSourceSpan, BindingType, ParsedEventType, AST,
};
use ngtcb_compiler::parse_util::ParseSourceSpan;
use ngtcb_compiler::render3::r3_ast::{
    BoundAttribute, BoundEvent, BoundText, Element, NodeKey, NodeKind, R3Node,
    Reference as TmplReference, Template, TemplateAttr, TextAttribute, Variable,
};
use ngtcb_compiler::render3::view::t2_api::{BoundTarget, ReferenceTarget};
use ts::factory::*;
use ts::{
    BinaryOperator, DeclarationId, EntityName, Expression, FunctionDeclaration, Parameter,
    Statement, TypeNode,
};

use super::comments::{add_expression_identifier, mark_ignore_diagnostics, ExpressionIdentifier};
use super::diagnostics::{
    add_parse_span_info, add_template_id, parse_span_comment, wrap_for_diagnostics,
    wrap_for_type_checker,
};
use super::dom::DomSchemaChecker;
use super::environment::Environment;
use super::expression::{ast_to_typescript, null_as_any};
use super::oob::OutOfBandDiagnosticRecorder;
use super::template_semantics::ExpressionSemanticVisitor;
use super::ts_util::{
    ts_call_method, ts_cast_to_any, ts_create_element, ts_create_type_query_for_coerced_input,
    ts_create_variable, ts_declare_variable,
};
use super::type_constructor::requires_inline_type_ctor;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::typecheck::api::{
    Result, TemplateGuardType, TemplateId, TypeCheckBlockMetadata, TypeCheckError,
    TypeCheckableDirectiveMeta,
};

const EVENT_PARAMETER: &str = "$event";

/// How the generic parameters of the component are handled in its type-check block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcbGenericContextBehavior {
    /// Re-emit the type parameters through the type parameter emitter. Requires that their
    /// bounds can be written in the file the block goes into.
    UseEmitter,

    /// Copy the type parameters of the class as they are. Only valid when the block is inlined
    /// next to the class.
    CopyClassNodes,

    /// Use `any` for every type argument of the component.
    FallbackToAny,
}

/// Generates the type-check block of the component `reference`, named `name`.
///
/// Declarations the block depends on (type constructors, pipe instances, imports) are
/// registered in `env`. Template problems the host type-checker can't find are reported to
/// `dom_schema_checker` and `oob_recorder`.
pub fn generate_type_check_block(
    env: &mut Environment,
    reference: &Reference,
    name: &str,
    meta: &TypeCheckBlockMetadata,
    dom_schema_checker: &mut dyn DomSchemaChecker,
    oob_recorder: &mut dyn OutOfBandDiagnosticRecorder,
    mut generic_context_behavior: TcbGenericContextBehavior,
) -> Result<Statement> {
    tracing::trace!(template = %meta.id, component = %reference.debug_name(), name, "generating type-check block");

    let nodes = meta
        .bound_target
        .target()
        .template
        .as_deref()
        .unwrap_or(&[]);

    let mut tcb = Tcb {
        env,
        dom: dom_schema_checker,
        oob: oob_recorder,
        id: meta.id.clone(),
        bound_target: meta.bound_target.as_ref(),
        pipes: &meta.pipes,
        schemas: &meta.schemas,
        next_id: 1,
        scopes: Vec::new(),
    };
    let root = tcb.for_nodes(None, ScopeNodes::Nodes(nodes), None)?;

    let ctx_raw_type = match tcb.env.reference_type(reference)? {
        TypeNode::Reference(raw) => raw,
        _ => {
            return Err(TypeCheckError::ExpectedTypeReference(format!(
                "when referencing the ctx param for {}",
                reference.debug_name()
            )))
        }
    };

    let mut type_parameters = None;
    let mut type_arguments = None;
    if let Some(class_params) = &reference.node.type_parameters {
        if !tcb.env.config.use_context_generic_type {
            generic_context_behavior = TcbGenericContextBehavior::FallbackToAny;
        }
        match generic_context_behavior {
            TcbGenericContextBehavior::UseEmitter => {
                let params = tcb
                    .env
                    .emit_type_parameters(&reference.node)?
                    .unwrap_or_default();
                type_arguments = Some(type_arguments_for(&params));
                type_parameters = Some(params);
            }
            TcbGenericContextBehavior::CopyClassNodes => {
                type_arguments = Some(type_arguments_for(class_params));
                type_parameters = Some(class_params.clone());
            }
            TcbGenericContextBehavior::FallbackToAny => {
                type_arguments = Some(class_params.iter().map(|_| create_any_type()).collect());
            }
        }
    }

    let ctx_param = Parameter::new(
        "ctx",
        Some(create_type_reference(ctx_raw_type.type_name, type_arguments)),
    );

    // The prelude is collected after rendering: rendering is what registers type constructors
    // and pipe instances.
    let scope_statements = tcb.render(root)?;
    let mut inner_body = tcb.env.get_prelude_statements();
    inner_body.extend(scope_statements);
    let body = vec![create_if(create_true(), create_block(inner_body))];

    let mut fn_decl = FunctionDeclaration {
        declare: false,
        name: name.to_string(),
        type_parameters: if tcb.env.config.use_context_generic_type {
            type_parameters
        } else {
            None
        },
        parameters: vec![ctx_param],
        return_type: None,
        body: Some(body),
        leading_comments: Vec::new(),
    };
    add_template_id(&mut fn_decl, &meta.id);
    Ok(Statement::Function(fn_decl))
}

fn type_arguments_for(params: &[ts::TypeParameterDeclaration]) -> Vec<TypeNode> {
    params
        .iter()
        .map(|param| create_type_reference(EntityName::identifier(param.name.clone()), None))
        .collect()
}

/// Maps attribute names to the DOM property they set, where the two differ.
fn attr_to_prop(name: &str) -> &str {
    match name {
        "class" => "className",
        "for" => "htmlFor",
        "formaction" => "formAction",
        "innerHtml" => "innerHTML",
        "readonly" => "readOnly",
        "tabindex" => "tabIndex",
        other => other,
    }
}

/// A node directives can be applied to.
#[derive(Debug, Clone, Copy)]
enum DirectiveHost<'a> {
    Element(&'a Element),
    Template(&'a Template),
}

impl<'a> DirectiveHost<'a> {
    fn key(self) -> NodeKey {
        match self {
            DirectiveHost::Element(el) => el.key(),
            DirectiveHost::Template(tmpl) => tmpl.key(),
        }
    }

    fn start_source_span(self) -> &'a ParseSourceSpan {
        match self {
            DirectiveHost::Element(el) => &el.start_source_span,
            DirectiveHost::Template(tmpl) => &tmpl.start_source_span,
        }
    }

    fn inputs(self) -> &'a [BoundAttribute] {
        match self {
            DirectiveHost::Element(el) => &el.inputs,
            DirectiveHost::Template(tmpl) => &tmpl.inputs,
        }
    }

    fn attributes(self) -> &'a [TextAttribute] {
        match self {
            DirectiveHost::Element(el) => &el.attributes,
            DirectiveHost::Template(tmpl) => &tmpl.attributes,
        }
    }

    fn outputs(self) -> &'a [BoundEvent] {
        match self {
            DirectiveHost::Element(el) => &el.outputs,
            DirectiveHost::Template(tmpl) => &tmpl.outputs,
        }
    }

    fn template_attrs(self) -> &'a [TemplateAttr] {
        match self {
            DirectiveHost::Element(_) => &[],
            DirectiveHost::Template(tmpl) => &tmpl.template_attrs,
        }
    }
}

/// An attribute of a node that can feed a directive input.
#[derive(Debug, Clone, Copy)]
enum InputAttribute<'a> {
    Bound(&'a BoundAttribute),
    Text(&'a TextAttribute),
}

impl<'a> InputAttribute<'a> {
    fn name(self) -> &'a str {
        match self {
            InputAttribute::Bound(attr) => &attr.name,
            InputAttribute::Text(attr) => &attr.name,
        }
    }

    fn source_span(self) -> &'a ParseSourceSpan {
        match self {
            InputAttribute::Bound(attr) => &attr.source_span,
            InputAttribute::Text(attr) => &attr.source_span,
        }
    }

    fn key_span(self) -> Option<&'a ParseSourceSpan> {
        match self {
            InputAttribute::Bound(attr) => Some(&attr.key_span),
            InputAttribute::Text(attr) => attr.key_span.as_ref(),
        }
    }

    fn is_text(self) -> bool {
        matches!(self, InputAttribute::Text(_))
    }
}

/// An attribute bound to one or more inputs of a directive.
struct TcbBoundInput<'a> {
    attribute: InputAttribute<'a>,
    /// Class properties the attribute's binding name maps to.
    field_names: Vec<String>,
}

/// The attributes of `host` that bind to inputs of `dir`. Only property bindings and text
/// attributes can set inputs.
fn get_bound_inputs<'a>(
    dir: &TypeCheckableDirectiveMeta,
    host: DirectiveHost<'a>,
) -> Vec<TcbBoundInput<'a>> {
    let attributes = host
        .inputs()
        .iter()
        .map(InputAttribute::Bound)
        .chain(host.attributes().iter().map(InputAttribute::Text))
        .chain(host.template_attrs().iter().map(|attr| match attr {
            TemplateAttr::Bound(bound) => InputAttribute::Bound(bound),
            TemplateAttr::Text(text) => InputAttribute::Text(text),
        }));

    let mut bound_inputs = Vec::new();
    for attribute in attributes {
        if let InputAttribute::Bound(bound) = attribute {
            if bound.type_ != BindingType::Property {
                continue;
            }
        }
        if let Some(inputs) = dir.inputs.get_by_binding_property_name(attribute.name()) {
            bound_inputs.push(TcbBoundInput {
                attribute,
                field_names: inputs
                    .iter()
                    .map(|input| input.class_property_name.clone())
                    .collect(),
            });
        }
    }
    bound_inputs
}

/// What a `#ref` resolves to.
#[derive(Debug, Clone, Copy)]
enum RefTarget {
    Element(NodeKey),
    Template(NodeKey),
    Directive(DeclarationId),
}

/// One unit of type-check block generation. Executing an operation adds statements to its
/// scope and may produce an expression other operations refer to (usually a variable).
#[derive(Debug, Clone)]
enum TcbOp<'a> {
    /// `ctx.`, the anchor for completions of component members.
    ComponentContextCompletion,

    /// `var _t1 = document.createElement("div");`
    Element(&'a Element),

    /// `var _t2 = _t1.$implicit;` for a `let-` variable of a template.
    Variable {
        template: &'a Template,
        variable: &'a Variable,
    },

    /// `var _t1: any = null!;`, the context of a template.
    TemplateContext,

    /// A nested scope for the contents of a template, behind the template's guards.
    TemplateBody(&'a Template),

    /// An interpolation's expression as a statement.
    TextInterpolation(&'a BoundText),

    /// `var _t1: Dir = null!;` for a directive whose type doesn't need inference. Generic
    /// directives get `any` type arguments.
    DirectiveType {
        host: DirectiveHost<'a>,
        dir: Rc<TypeCheckableDirectiveMeta>,
    },

    /// `var _t1 = _ctor1({ "input": value });`, inferring a generic directive's type arguments
    /// from its input bindings.
    DirectiveCtor {
        host: DirectiveHost<'a>,
        dir: Rc<TypeCheckableDirectiveMeta>,
    },

    /// Takes the place of a `DirectiveCtor` whose inputs refer back to the directive itself.
    DirectiveCtorCircularFallback { dir: Rc<TypeCheckableDirectiveMeta> },

    /// Assignments of bound values to a directive's inputs.
    DirectiveInputs {
        host: DirectiveHost<'a>,
        dir: Rc<TypeCheckableDirectiveMeta>,
    },

    /// Subscriptions to a directive's outputs.
    DirectiveOutputs {
        host: DirectiveHost<'a>,
        dir: Rc<TypeCheckableDirectiveMeta>,
    },

    /// `var _t3 = _t1;` for a `#ref`.
    Reference {
        host: DirectiveHost<'a>,
        reference: &'a TmplReference,
        target: RefTarget,
    },

    /// `var _t3 = (null as any);` for a `#ref` without a target.
    InvalidReference,

    /// Validation of an element and its unclaimed property bindings against the DOM schema.
    DomSchemaChecker {
        element: &'a Element,
        check_element: bool,
        claimed_inputs: Rc<HashSet<String>>,
    },

    /// Bindings of an element no directive claims: checked as DOM properties or at least
    /// translated.
    UnclaimedInputs {
        element: &'a Element,
        claimed_inputs: Rc<HashSet<String>>,
    },

    /// Events of an element no directive claims: DOM and animation events.
    UnclaimedOutputs {
        element: &'a Element,
        claimed_outputs: Rc<HashSet<String>>,
    },
}

impl TcbOp<'_> {
    /// Optional operations only run when something resolves them, or when every operation is
    /// wanted.
    fn optional(&self) -> bool {
        matches!(
            self,
            TcbOp::Element(_)
                | TcbOp::TemplateContext
                | TcbOp::DirectiveType { .. }
                | TcbOp::DirectiveCtor { .. }
                | TcbOp::Reference { .. }
                | TcbOp::InvalidReference
        )
    }
}

/// Stand-in result for an operation that is resolved while it executes. `null!` lets the host
/// infer the type of whatever refers to it.
fn infer_type_for_circular_op_expr() -> Expression {
    create_non_null(create_null())
}

enum OpSlot<'a> {
    Op(TcbOp<'a>),
    Result(Option<Expression>),
}

/// Where a scope's nodes come from.
#[derive(Clone, Copy)]
enum ScopeNodes<'a> {
    /// The top level of the component template.
    Nodes(&'a [R3Node]),
    /// The inside of an `<ng-template>`, which also declares its `let-` variables.
    Template(&'a Template),
}

/// The operations of one template scope and the statements they produced.
struct Scope<'a> {
    parent: Option<usize>,
    /// Condition under which the scope's contents are checked, from template guards.
    guard: Option<Expression>,
    op_queue: Vec<OpSlot<'a>>,

    element_op_map: HashMap<NodeKey, usize>,
    /// Directive operations per host node, by directive.
    directive_op_map: HashMap<NodeKey, HashMap<DeclarationId, usize>>,
    reference_op_map: HashMap<NodeKey, usize>,
    template_ctx_op_map: HashMap<NodeKey, usize>,
    var_map: HashMap<NodeKey, usize>,

    statements: Vec<Statement>,
}

impl<'a> Scope<'a> {
    fn new(parent: Option<usize>, guard: Option<Expression>) -> Self {
        Self {
            parent,
            guard,
            op_queue: Vec::new(),
            element_op_map: HashMap::new(),
            directive_op_map: HashMap::new(),
            reference_op_map: HashMap::new(),
            template_ctx_op_map: HashMap::new(),
            var_map: HashMap::new(),
            statements: Vec::new(),
        }
    }

    fn push_op(&mut self, op: TcbOp<'a>) -> usize {
        self.op_queue.push(OpSlot::Op(op));
        self.op_queue.len() - 1
    }
}

/// The type of `$event` in a generated event handler.
enum EventParamType {
    /// Left to the host to infer from the handler's use as a callback.
    Infer,
    Any,
    Type(TypeNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranslateMode {
    Binding,
    /// Inside an event handler, where `$event` names the handler's parameter.
    EventHandler,
}

/// State of one type-check block being generated. Scopes live in an arena and refer to their
/// parent by index.
struct Tcb<'a> {
    env: &'a mut Environment,
    dom: &'a mut dyn DomSchemaChecker,
    oob: &'a mut dyn OutOfBandDiagnosticRecorder,
    id: TemplateId,
    bound_target: &'a dyn BoundTarget<TypeCheckableDirectiveMeta>,
    pipes: &'a IndexMap<String, Reference>,
    schemas: &'a [SchemaMetadata],
    next_id: usize,
    scopes: Vec<Scope<'a>>,
}

impl<'a> Tcb<'a> {
    /// A fresh `_tN` identifier, unique within the block.
    fn allocate_id(&mut self) -> Expression {
        let id = create_identifier(format!("_t{}", self.next_id));
        self.next_id += 1;
        id
    }

    fn add_statement(&mut self, scope: usize, statement: Statement) {
        self.scopes[scope].statements.push(statement);
    }

    fn push_op(&mut self, scope: usize, op: TcbOp<'a>) -> usize {
        self.scopes[scope].push_op(op)
    }

    /// Creates a scope for `nodes` and queues the operations for them.
    fn for_nodes(
        &mut self,
        parent: Option<usize>,
        nodes: ScopeNodes<'a>,
        guard: Option<Expression>,
    ) -> Result<usize> {
        let scope = self.scopes.len();
        self.scopes.push(Scope::new(parent, guard));

        if parent.is_none() && self.env.config.enable_template_type_checker {
            self.push_op(scope, TcbOp::ComponentContextCompletion);
        }

        let children = match nodes {
            ScopeNodes::Nodes(nodes) => nodes,
            ScopeNodes::Template(template) => {
                let mut first_decls: HashMap<&str, &Variable> = HashMap::new();
                for variable in &template.variables {
                    match first_decls.get(variable.name.as_str()) {
                        Some(first) => {
                            self.oob.duplicate_template_var(&self.id, variable, first)?
                        }
                        None => {
                            first_decls.insert(&variable.name, variable);
                        }
                    }
                    // A duplicate still gets declared, so expressions using it translate.
                    let index = self.push_op(scope, TcbOp::Variable { template, variable });
                    self.scopes[scope].var_map.insert(variable.key(), index);
                }
                &template.children[..]
            }
        };

        for node in children {
            self.append_node(scope, node)?;
        }
        Ok(scope)
    }

    fn append_node(&mut self, scope: usize, node: &'a R3Node) -> Result<()> {
        match node {
            R3Node::Element(element) => {
                let index = self.push_op(scope, TcbOp::Element(element));
                self.scopes[scope]
                    .element_op_map
                    .insert(element.key(), index);
                self.append_directives_and_inputs_of_node(scope, DirectiveHost::Element(element));
                self.append_outputs_of_node(scope, DirectiveHost::Element(element));
                for child in &element.children {
                    self.append_node(scope, child)?;
                }
                self.append_references_of_node(scope, DirectiveHost::Element(element), &element.references)?;
            }
            R3Node::Template(template) => {
                self.append_directives_and_inputs_of_node(scope, DirectiveHost::Template(template));
                self.append_outputs_of_node(scope, DirectiveHost::Template(template));
                let ctx_index = self.push_op(scope, TcbOp::TemplateContext);
                self.scopes[scope]
                    .template_ctx_op_map
                    .insert(template.key(), ctx_index);
                if self.env.config.check_template_bodies {
                    self.push_op(scope, TcbOp::TemplateBody(template));
                } else if self.env.config.always_check_schema_in_template_bodies {
                    self.append_deep_schema_checks(scope, &template.children);
                }
                self.append_references_of_node(scope, DirectiveHost::Template(template), &template.references)?;
            }
            R3Node::BoundText(text) => {
                self.push_op(scope, TcbOp::TextInterpolation(text));
            }
            R3Node::Text(_) => {}
        }
        Ok(())
    }

    fn directives_of(&self, key: NodeKey) -> Vec<Rc<TypeCheckableDirectiveMeta>> {
        self.bound_target
            .get_directives_of_node(key)
            .unwrap_or_default()
            .into_iter()
            .map(Rc::new)
            .collect()
    }

    fn append_directives_and_inputs_of_node(&mut self, scope: usize, host: DirectiveHost<'a>) {
        let directives = self.directives_of(host.key());
        if directives.is_empty() {
            // Without directives every binding is a DOM binding.
            if let DirectiveHost::Element(element) = host {
                let claimed_inputs = Rc::new(HashSet::new());
                self.push_op(
                    scope,
                    TcbOp::UnclaimedInputs {
                        element,
                        claimed_inputs: Rc::clone(&claimed_inputs),
                    },
                );
                self.push_op(
                    scope,
                    TcbOp::DomSchemaChecker {
                        element,
                        check_element: true,
                        claimed_inputs,
                    },
                );
            }
            return;
        }

        let mut dir_map = HashMap::new();
        for dir in &directives {
            let op = if !dir.is_generic {
                TcbOp::DirectiveType {
                    host,
                    dir: Rc::clone(dir),
                }
            } else if !requires_inline_type_ctor(&dir.reference.node, self.env.reflector.as_ref())
                || self.env.config.use_inline_type_constructors
            {
                TcbOp::DirectiveCtor {
                    host,
                    dir: Rc::clone(dir),
                }
            } else {
                // No type constructor can be written for the directive, so its type arguments
                // become `any`.
                TcbOp::DirectiveType {
                    host,
                    dir: Rc::clone(dir),
                }
            };
            let dir_index = self.push_op(scope, op);
            dir_map.insert(dir.reference.id(), dir_index);
            self.push_op(
                scope,
                TcbOp::DirectiveInputs {
                    host,
                    dir: Rc::clone(dir),
                },
            );
        }
        self.scopes[scope]
            .directive_op_map
            .insert(host.key(), dir_map);

        if let DirectiveHost::Element(element) = host {
            let claimed_inputs: Rc<HashSet<String>> = Rc::new(
                directives
                    .iter()
                    .flat_map(|dir| dir.inputs.property_names().map(String::from).collect::<Vec<_>>())
                    .collect(),
            );
            self.push_op(
                scope,
                TcbOp::UnclaimedInputs {
                    element,
                    claimed_inputs: Rc::clone(&claimed_inputs),
                },
            );
            self.push_op(
                scope,
                TcbOp::DomSchemaChecker {
                    element,
                    check_element: false,
                    claimed_inputs,
                },
            );
        }
    }

    fn append_outputs_of_node(&mut self, scope: usize, host: DirectiveHost<'a>) {
        let directives = self.directives_of(host.key());
        if directives.is_empty() {
            if let DirectiveHost::Element(element) = host {
                self.push_op(
                    scope,
                    TcbOp::UnclaimedOutputs {
                        element,
                        claimed_outputs: Rc::new(HashSet::new()),
                    },
                );
            }
            return;
        }

        for dir in &directives {
            self.push_op(
                scope,
                TcbOp::DirectiveOutputs {
                    host,
                    dir: Rc::clone(dir),
                },
            );
        }

        if let DirectiveHost::Element(element) = host {
            let claimed_outputs = directives
                .iter()
                .flat_map(|dir| dir.outputs.property_names().map(String::from).collect::<Vec<_>>())
                .collect();
            self.push_op(
                scope,
                TcbOp::UnclaimedOutputs {
                    element,
                    claimed_outputs: Rc::new(claimed_outputs),
                },
            );
        }
    }

    /// Queues DOM schema checks for elements inside template bodies that aren't checked
    /// otherwise.
    fn append_deep_schema_checks(&mut self, scope: usize, nodes: &'a [R3Node]) {
        for node in nodes {
            let children = match node {
                R3Node::Element(element) => {
                    let directives = self.directives_of(element.key());
                    let claimed_inputs: HashSet<String> = directives
                        .iter()
                        .flat_map(|dir| dir.inputs.property_names().map(String::from).collect::<Vec<_>>())
                        .collect();
                    self.push_op(
                        scope,
                        TcbOp::DomSchemaChecker {
                            element,
                            check_element: directives.is_empty(),
                            claimed_inputs: Rc::new(claimed_inputs),
                        },
                    );
                    &element.children
                }
                R3Node::Template(template) => &template.children,
                _ => continue,
            };
            self.append_deep_schema_checks(scope, children);
        }
    }

    fn append_references_of_node(
        &mut self,
        scope: usize,
        host: DirectiveHost<'a>,
        references: &'a [TmplReference],
    ) -> Result<()> {
        for reference in references {
            let op = match self.bound_target.get_reference_target(reference) {
                None => {
                    self.oob.missing_reference_target(&self.id, reference)?;
                    TcbOp::InvalidReference
                }
                Some(target) => {
                    let target = match target {
                        ReferenceTarget::Element(element) => RefTarget::Element(element.key()),
                        ReferenceTarget::Template(template) => RefTarget::Template(template.key()),
                        ReferenceTarget::DirectiveOnNode { directive, .. } => {
                            RefTarget::Directive(directive.reference.id())
                        }
                    };
                    TcbOp::Reference {
                        host,
                        reference,
                        target,
                    }
                }
            };
            let index = self.push_op(scope, op);
            self.scopes[scope]
                .reference_op_map
                .insert(reference.key(), index);
        }
        Ok(())
    }

    /// Executes every operation of `scope` and hands back the statements they produced.
    fn render(&mut self, scope: usize) -> Result<Vec<Statement>> {
        let skip_optional = !self.env.config.enable_template_type_checker;
        for index in 0..self.scopes[scope].op_queue.len() {
            self.execute_op(scope, index, skip_optional)?;
        }
        Ok(mem::take(&mut self.scopes[scope].statements))
    }

    /// The guard conditions in effect for `scope`, its parents' first.
    fn guards(&self, scope: usize) -> Option<Expression> {
        let current = &self.scopes[scope];
        let parent_guards = current.parent.and_then(|parent| self.guards(parent));
        match (parent_guards, &current.guard) {
            (None, guard) => guard.clone(),
            (Some(parent_guards), None) => Some(parent_guards),
            (Some(parent_guards), Some(guard)) => Some(create_binary(
                parent_guards,
                BinaryOperator::AmpersandAmpersand,
                guard.clone(),
            )),
        }
    }

    /// The expression an operation of `scope` produces, executing it if needed.
    fn resolve_op(&mut self, scope: usize, index: usize) -> Result<Expression> {
        self.execute_op(scope, index, false)?
            .ok_or(TypeCheckError::UnresolvedOperation)
    }

    fn execute_op(
        &mut self,
        scope: usize,
        index: usize,
        skip_optional: bool,
    ) -> Result<Option<Expression>> {
        let slot = &mut self.scopes[scope].op_queue[index];
        let op = match slot {
            OpSlot::Result(result) => return Ok(result.clone()),
            OpSlot::Op(op) if skip_optional && op.optional() => return Ok(None),
            OpSlot::Op(op) => op.clone(),
        };

        // Anything resolving this operation while it runs gets the fallback instead.
        *slot = match &op {
            TcbOp::DirectiveCtor { dir, .. } => OpSlot::Op(TcbOp::DirectiveCtorCircularFallback {
                dir: Rc::clone(dir),
            }),
            _ => OpSlot::Result(Some(infer_type_for_circular_op_expr())),
        };

        tracing::trace!(template = %self.id, scope, index, "executing type-check operation");
        let result = self.run_op(scope, op)?;
        self.scopes[scope].op_queue[index] = OpSlot::Result(result.clone());
        Ok(result)
    }

    /// Resolves the expression standing for a template node: an element, a template's context,
    /// a reference, a variable or (with `directive`) a directive instance on a node.
    ///
    /// The result is a copy without span comments, so it can be reused anywhere.
    fn resolve(
        &mut self,
        scope: usize,
        key: NodeKey,
        directive: Option<DeclarationId>,
    ) -> Result<Expression> {
        let mut current = Some(scope);
        while let Some(index) = current {
            if let Some(resolved) = self.resolve_local(index, key, directive)? {
                return Ok(resolved.without_comments());
            }
            current = self.scopes[index].parent;
        }
        Err(TypeCheckError::UnresolvedTemplateNode(format!(
            "{:?} at {}..{}",
            key.kind, key.start, key.end
        )))
    }

    fn resolve_local(
        &mut self,
        scope: usize,
        key: NodeKey,
        directive: Option<DeclarationId>,
    ) -> Result<Option<Expression>> {
        let local = &self.scopes[scope];
        let index = match (key.kind, directive) {
            (NodeKind::Reference, _) => local.reference_op_map.get(&key).copied(),
            (NodeKind::Variable, _) => local.var_map.get(&key).copied(),
            (NodeKind::Template, None) => local.template_ctx_op_map.get(&key).copied(),
            (NodeKind::Element | NodeKind::Template, Some(directive)) => {
                match local.directive_op_map.get(&key) {
                    Some(dir_map) => dir_map.get(&directive).copied(),
                    None if matches!(key.kind, NodeKind::Element) => {
                        local.element_op_map.get(&key).copied()
                    }
                    None => None,
                }
            }
            (NodeKind::Element, None) => local.element_op_map.get(&key).copied(),
        };
        match index {
            Some(index) => self.resolve_op(scope, index).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves a directive instance once per operation.
    fn resolve_cached(
        &mut self,
        cache: &mut Option<Expression>,
        scope: usize,
        key: NodeKey,
        directive: Option<DeclarationId>,
    ) -> Result<Expression> {
        if let Some(cached) = cache {
            return Ok(cached.clone());
        }
        let resolved = self.resolve(scope, key, directive)?;
        *cache = Some(resolved.clone());
        Ok(resolved)
    }

    fn run_op(&mut self, scope: usize, op: TcbOp<'a>) -> Result<Option<Expression>> {
        match op {
            TcbOp::ComponentContextCompletion => {
                let mut ctx_dot = create_property_access(create_identifier("ctx"), "");
                mark_ignore_diagnostics(&mut ctx_dot);
                add_expression_identifier(&mut ctx_dot, ExpressionIdentifier::ComponentCompletion);
                self.add_statement(scope, create_expression_statement(ctx_dot));
                Ok(None)
            }
            TcbOp::Element(element) => {
                let id = self.allocate_id();
                let mut initializer = ts_create_element(&element.name);
                add_parse_span_info(&mut initializer, &element.start_source_span);
                self.add_statement(scope, ts_create_variable(id.clone(), initializer));
                Ok(Some(id))
            }
            TcbOp::Variable { template, variable } => {
                let ctx = self.resolve(scope, template.key(), None)?;
                let mut id = self.allocate_id();
                let value = if variable.value.is_empty() {
                    "$implicit"
                } else {
                    variable.value.as_str()
                };
                let mut initializer = create_property_access(ctx, value);
                add_parse_span_info(&mut id, &variable.key_span);
                let initializer = match &variable.value_span {
                    Some(value_span) => {
                        add_parse_span_info(&mut initializer, value_span);
                        wrap_for_type_checker(initializer)
                    }
                    None => initializer,
                };
                let mut statement = ts_create_variable(id.clone(), initializer);
                if let Statement::Variable(declaration) = &mut statement {
                    declaration
                        .comments
                        .push(parse_span_comment(&variable.source_span));
                }
                self.add_statement(scope, statement);
                Ok(Some(id))
            }
            TcbOp::TemplateContext => {
                let ctx = self.allocate_id();
                self.add_statement(scope, ts_declare_variable(ctx.clone(), create_any_type()));
                Ok(Some(ctx))
            }
            TcbOp::TemplateBody(template) => self.execute_template_body(scope, template),
            TcbOp::TextInterpolation(text) => {
                let expr = self.translate(scope, &text.value, TranslateMode::Binding)?;
                self.add_statement(scope, create_expression_statement(expr));
                Ok(None)
            }
            TcbOp::DirectiveType { host, dir } => self.execute_directive_type(scope, host, &dir),
            TcbOp::DirectiveCtor { host, dir } => self.execute_directive_ctor(scope, host, &dir),
            TcbOp::DirectiveCtorCircularFallback { dir } => {
                let id = self.allocate_id();
                let type_ctor = self.env.type_ctor_for(&dir)?;
                let placeholder = create_call(type_ctor, vec![create_non_null(create_null())]);
                self.add_statement(scope, ts_create_variable(id.clone(), placeholder));
                Ok(Some(id))
            }
            TcbOp::DirectiveInputs { host, dir } => {
                self.execute_directive_inputs(scope, host, &dir)?;
                Ok(None)
            }
            TcbOp::DirectiveOutputs { host, dir } => {
                self.execute_directive_outputs(scope, host, &dir)?;
                Ok(None)
            }
            TcbOp::Reference {
                host,
                reference,
                target,
            } => self.execute_reference(scope, host, reference, target),
            TcbOp::InvalidReference => {
                let id = self.allocate_id();
                self.add_statement(scope, ts_create_variable(id.clone(), null_as_any()));
                Ok(Some(id))
            }
            TcbOp::DomSchemaChecker {
                element,
                check_element,
                claimed_inputs,
            } => {
                if check_element {
                    self.dom.check_element(&self.id, element, self.schemas)?;
                }
                for binding in &element.inputs {
                    if binding.type_ != BindingType::Property
                        || claimed_inputs.contains(&binding.name)
                        || binding.name == "style"
                        || binding.name == "class"
                    {
                        continue;
                    }
                    let property_name = attr_to_prop(&binding.name);
                    self.dom.check_property(
                        &self.id,
                        element,
                        property_name,
                        &binding.source_span,
                        self.schemas,
                    )?;
                }
                Ok(None)
            }
            TcbOp::UnclaimedInputs {
                element,
                claimed_inputs,
            } => {
                self.execute_unclaimed_inputs(scope, element, &claimed_inputs)?;
                Ok(None)
            }
            TcbOp::UnclaimedOutputs {
                element,
                claimed_outputs,
            } => {
                self.execute_unclaimed_outputs(scope, element, &claimed_outputs)?;
                Ok(None)
            }
        }
    }

    fn execute_template_body(
        &mut self,
        scope: usize,
        template: &'a Template,
    ) -> Result<Option<Expression>> {
        // Guards narrow the types within the template body, e.g. `NgIf` makes its bound
        // expression truthy in there.
        let mut directive_guards = Vec::new();

        for dir in self.directives_of(template.key()) {
            let dir_inst_id = self.resolve(scope, template.key(), Some(dir.reference.id()))?;
            let dir_id = self.env.reference(&dir.reference)?;

            for guard in &dir.ng_template_guards {
                let bound_input = template
                    .inputs
                    .iter()
                    .find(|input| input.name == guard.input_name)
                    .or_else(|| {
                        template.template_attrs.iter().find_map(|attr| match attr {
                            TemplateAttr::Bound(bound) if bound.name == guard.input_name => {
                                Some(bound)
                            }
                            _ => None,
                        })
                    });
                let Some(bound_input) = bound_input else {
                    continue;
                };

                // The guard is checked as part of the input binding already.
                let mut expr = self.translate(scope, &bound_input.value, TranslateMode::Binding)?;
                mark_ignore_diagnostics(&mut expr);

                match guard.type_ {
                    TemplateGuardType::Binding => directive_guards.push(expr),
                    TemplateGuardType::Invocation => {
                        let mut guard_invoke = ts_call_method(
                            dir_id.clone(),
                            &format!("ngTemplateGuard_{}", guard.input_name),
                            vec![dir_inst_id.clone(), expr],
                        );
                        add_parse_span_info(&mut guard_invoke, bound_input.value.source_span());
                        directive_guards.push(guard_invoke);
                    }
                }
            }

            if dir.has_ng_template_context_guard {
                if self.env.config.apply_template_context_guards {
                    let ctx = self.resolve(scope, template.key(), None)?;
                    let mut guard_invoke =
                        ts_call_method(dir_id, "ngTemplateContextGuard", vec![dir_inst_id, ctx]);
                    add_parse_span_info(&mut guard_invoke, &template.source_span);
                    directive_guards.push(guard_invoke);
                } else if !template.variables.is_empty()
                    && self.env.config.suggestions_for_suboptimal_type_inference
                {
                    // The context guard would have typed the variables; without it they're `any`.
                    self.oob
                        .suboptimal_type_inference(&self.id, &template.variables)?;
                }
            }
        }

        let guard = directive_guards.pop().map(|seed| {
            directive_guards.into_iter().fold(seed, |expr, dir_guard| {
                create_binary(expr, BinaryOperator::AmpersandAmpersand, dir_guard)
            })
        });

        let tmpl_scope = self.for_nodes(Some(scope), ScopeNodes::Template(template), guard.clone())?;
        let statements = self.render(tmpl_scope)?;
        if statements.is_empty() {
            return Ok(None);
        }

        let block = create_block(statements);
        let statement = match guard {
            Some(guard) => create_if(guard, block),
            None => block,
        };
        self.add_statement(scope, statement);
        Ok(None)
    }

    fn execute_directive_type(
        &mut self,
        scope: usize,
        host: DirectiveHost<'a>,
        dir: &TypeCheckableDirectiveMeta,
    ) -> Result<Option<Expression>> {
        let raw_type = self.env.reference_type(&dir.reference)?;
        let mut type_node = match (&dir.reference.node.type_parameters, dir.is_generic) {
            (Some(params), true) => match raw_type {
                TypeNode::Reference(raw) => create_type_reference(
                    raw.type_name,
                    Some(params.iter().map(|_| create_any_type()).collect()),
                ),
                _ => {
                    return Err(TypeCheckError::ExpectedTypeReference(format!(
                        "when referencing the type for {}",
                        dir.reference.debug_name()
                    )))
                }
            },
            _ => raw_type,
        };
        if let TypeNode::Reference(reference) = &mut type_node {
            reference
                .comments
                .push(ExpressionIdentifier::Directive.comment_text());
            reference
                .comments
                .push(parse_span_comment(host.start_source_span()));
        }

        let id = self.allocate_id();
        self.add_statement(scope, ts_declare_variable(id.clone(), type_node));
        Ok(Some(id))
    }

    fn execute_directive_ctor(
        &mut self,
        scope: usize,
        host: DirectiveHost<'a>,
        dir: &TypeCheckableDirectiveMeta,
    ) -> Result<Option<Expression>> {
        let mut id = self.allocate_id();
        add_expression_identifier(&mut id, ExpressionIdentifier::Directive);
        add_parse_span_info(&mut id, host.start_source_span());

        let mut generic_inputs: IndexMap<String, Option<(Expression, AbsoluteSourceSpan)>> =
            IndexMap::new();
        for input in get_bound_inputs(dir, host) {
            // Skip text attributes if configured to do so.
            if !self.env.config.check_type_of_attributes && input.attribute.is_text() {
                continue;
            }
            for field_name in &input.field_names {
                // Only the first binding of a field counts.
                if generic_inputs.contains_key(field_name) {
                    continue;
                }
                let expression = self.translate_input(scope, input.attribute)?;
                generic_inputs.insert(
                    field_name.clone(),
                    Some((expression, input.attribute.source_span().into())),
                );
            }
        }

        // Inputs without a binding still take part in inference, as `any`.
        for field_name in dir.inputs.class_property_names() {
            generic_inputs.entry(field_name.to_string()).or_insert(None);
        }

        let mut type_ctor = self.call_type_ctor(dir, generic_inputs)?;
        mark_ignore_diagnostics(&mut type_ctor);
        self.add_statement(scope, ts_create_variable(id.clone(), type_ctor));
        Ok(Some(id))
    }

    /// `ctor({ "field": value, ... })`
    fn call_type_ctor(
        &mut self,
        dir: &TypeCheckableDirectiveMeta,
        inputs: IndexMap<String, Option<(Expression, AbsoluteSourceSpan)>>,
    ) -> Result<Expression> {
        let type_ctor = self.env.type_ctor_for(dir)?;
        let config = &self.env.config;

        let members = inputs
            .into_iter()
            .map(|(field, input)| match input {
                Some((expr, span)) => {
                    let expr = if !config.check_type_of_input_bindings {
                        ts_cast_to_any(expr)
                    } else if !config.strict_null_input_bindings {
                        create_non_null(expr)
                    } else {
                        expr
                    };
                    let mut assignment = create_property_assignment(field, wrap_for_diagnostics(expr));
                    assignment.comments.push(parse_span_comment(span));
                    assignment
                }
                None => create_property_assignment(field, null_as_any()),
            })
            .collect();

        Ok(create_call(type_ctor, vec![create_object_literal(members)]))
    }

    fn execute_directive_inputs(
        &mut self,
        scope: usize,
        host: DirectiveHost<'a>,
        dir: &TypeCheckableDirectiveMeta,
    ) -> Result<()> {
        let mut dir_id = None;

        for input in get_bound_inputs(dir, host) {
            let expr = self.translate_input(scope, input.attribute)?;
            let expr = self.widen_binding(expr);
            let mut assignment = wrap_for_diagnostics(expr);

            for field_name in &input.field_names {
                let mut target = if dir.coerced_input_fields.contains(field_name) {
                    // The input accepts a wider type than the field declares.
                    let type_name = match self.env.reference_type(&dir.reference)? {
                        TypeNode::Reference(raw) => raw.type_name,
                        _ => {
                            return Err(TypeCheckError::ExpectedTypeReference(format!(
                                "from reference to {}",
                                dir.reference.debug_name()
                            )))
                        }
                    };
                    let id = self.allocate_id();
                    let type_node = ts_create_type_query_for_coerced_input(&type_name, field_name);
                    self.add_statement(scope, ts_declare_variable(id.clone(), type_node));
                    id
                } else if dir.undeclared_input_fields.contains(field_name) {
                    // Nothing on the class to check the binding against.
                    continue;
                } else if !self.env.config.honor_access_modifiers_for_input_bindings
                    && dir.restricted_input_fields.contains(field_name)
                {
                    // Check against the field's type without assigning to the field itself.
                    let dir_expr =
                        self.resolve_cached(&mut dir_id, scope, host.key(), Some(dir.reference.id()))?;
                    let dir_name = dir_expr.as_identifier().ok_or_else(|| {
                        TypeCheckError::ExpectedTypeReference(format!(
                            "for the instance of {}",
                            dir.reference.debug_name()
                        ))
                    })?;
                    let type_node = TypeNode::IndexedAccess {
                        object_type: Box::new(TypeNode::TypeQuery(EntityName::identifier(dir_name))),
                        index_type: Box::new(create_string_literal_type(field_name.clone())),
                    };
                    let id = self.allocate_id();
                    self.add_statement(scope, ts_declare_variable(id.clone(), type_node));
                    id
                } else {
                    let dir_expr =
                        self.resolve_cached(&mut dir_id, scope, host.key(), Some(dir.reference.id()))?;
                    if dir.string_literal_input_fields.contains(field_name) {
                        create_element_access(dir_expr, create_string_literal(field_name.clone()))
                    } else {
                        create_property_access(dir_expr, field_name.clone())
                    }
                };

                if let Some(key_span) = input.attribute.key_span() {
                    add_parse_span_info(&mut target, key_span);
                }
                // `a = b = value` for an attribute bound to several fields.
                assignment = create_binary(target, BinaryOperator::Equals, assignment);
            }

            add_parse_span_info(&mut assignment, input.attribute.source_span());
            if !self.env.config.check_type_of_attributes && input.attribute.is_text() {
                mark_ignore_diagnostics(&mut assignment);
            }
            self.add_statement(scope, create_expression_statement(assignment));
        }
        Ok(())
    }

    fn execute_directive_outputs(
        &mut self,
        scope: usize,
        host: DirectiveHost<'a>,
        dir: &TypeCheckableDirectiveMeta,
    ) -> Result<()> {
        let mut dir_id = None;

        for output in host.outputs() {
            if output.type_ != ParsedEventType::Regular {
                continue;
            }
            let Some(field) = dir
                .outputs
                .get_by_binding_property_name(&output.name)
                .and_then(|outputs| outputs.first())
                .map(|output| output.class_property_name.clone())
            else {
                continue;
            };

            let dir_expr =
                self.resolve_cached(&mut dir_id, scope, host.key(), Some(dir.reference.id()))?;
            let mut output_field = create_element_access(dir_expr, create_string_literal(field));
            add_parse_span_info(&mut output_field, &output.key_span);

            if self.env.config.check_type_of_output_events {
                // `subscribe` makes the host infer `$event` from the output's type.
                let handler = self.create_event_handler(scope, output, EventParamType::Infer)?;
                let subscribe_fn = create_property_access(output_field, "subscribe");
                let mut call = create_call(subscribe_fn, vec![handler]);
                add_parse_span_info(&mut call, &output.source_span);
                self.add_statement(scope, create_expression_statement(call));
            } else {
                // The field is still read, so a misspelled output is reported.
                self.add_statement(scope, create_expression_statement(output_field));
                let handler = self.create_event_handler(scope, output, EventParamType::Any)?;
                self.add_statement(scope, create_expression_statement(handler));
            }

            ExpressionSemanticVisitor::visit(&output.handler, &self.id, self.bound_target, &mut *self.oob)?;
        }
        Ok(())
    }

    fn execute_reference(
        &mut self,
        scope: usize,
        host: DirectiveHost<'a>,
        reference: &'a TmplReference,
        target: RefTarget,
    ) -> Result<Option<Expression>> {
        let mut id = self.allocate_id();
        let mut initializer = match target {
            RefTarget::Element(key) | RefTarget::Template(key) => self.resolve(scope, key, None)?,
            RefTarget::Directive(directive) => self.resolve(scope, host.key(), Some(directive))?,
        };

        let config = &self.env.config;
        let widen_to_any = (matches!(target, RefTarget::Element(_)) && !config.check_type_of_dom_references)
            || !config.check_type_of_non_dom_references;
        if widen_to_any {
            initializer = create_as(initializer, create_any_type());
        } else if let RefTarget::Template(_) = target {
            // The context variable of a template is `any`; a reference to the template is a
            // `TemplateRef`.
            let template_ref = self.env.reference_external_type(
                "@angular/core",
                "TemplateRef",
                Some(vec![create_any_type()]),
            );
            initializer = create_parenthesized(create_as(
                create_as(initializer, create_any_type()),
                template_ref,
            ));
        }
        add_parse_span_info(&mut initializer, &reference.source_span);
        add_parse_span_info(&mut id, &reference.key_span);
        self.add_statement(scope, ts_create_variable(id.clone(), initializer));
        Ok(Some(id))
    }

    fn execute_unclaimed_inputs(
        &mut self,
        scope: usize,
        element: &'a Element,
        claimed_inputs: &HashSet<String>,
    ) -> Result<()> {
        let mut el_id = None;

        for binding in &element.inputs {
            let is_property = binding.type_ == BindingType::Property;
            if is_property && claimed_inputs.contains(&binding.name) {
                continue;
            }

            let expr = self.translate(scope, &binding.value, TranslateMode::Binding)?;
            let expr = self.widen_binding(expr);

            if self.env.config.check_type_of_dom_bindings
                && is_property
                && binding.name != "style"
                && binding.name != "class"
            {
                let el_expr = self.resolve_cached(&mut el_id, scope, element.key(), None)?;
                let property_name = attr_to_prop(&binding.name);
                let prop = create_element_access(el_expr, create_string_literal(property_name));
                let mut stmt = create_binary(prop, BinaryOperator::Equals, wrap_for_diagnostics(expr));
                add_parse_span_info(&mut stmt, &binding.source_span);
                self.add_statement(scope, create_expression_statement(stmt));
            } else {
                // Not checked against the element, but the expression itself still is.
                self.add_statement(scope, create_expression_statement(expr));
            }
        }
        Ok(())
    }

    fn execute_unclaimed_outputs(
        &mut self,
        scope: usize,
        element: &'a Element,
        claimed_outputs: &HashSet<String>,
    ) -> Result<()> {
        let mut el_id = None;

        for output in &element.outputs {
            if claimed_outputs.contains(&output.name) {
                continue;
            }

            if output.type_ == ParsedEventType::Animation {
                let event_type = if self.env.config.check_type_of_animation_events {
                    EventParamType::Type(self.env.reference_external_type(
                        "@angular/animations",
                        "AnimationEvent",
                        None,
                    ))
                } else {
                    EventParamType::Any
                };
                let handler = self.create_event_handler(scope, output, event_type)?;
                self.add_statement(scope, create_expression_statement(handler));
            } else if self.env.config.check_type_of_dom_events {
                // `addEventListener` lets the host pick the event type from the event name.
                let handler = self.create_event_handler(scope, output, EventParamType::Infer)?;
                let el_expr = self.resolve_cached(&mut el_id, scope, element.key(), None)?;
                let mut property_access = create_property_access(el_expr, "addEventListener");
                add_parse_span_info(&mut property_access, &output.key_span);
                let mut call = create_call(
                    property_access,
                    vec![create_string_literal(output.name.clone()), handler],
                );
                add_parse_span_info(&mut call, &output.source_span);
                self.add_statement(scope, create_expression_statement(call));
            } else {
                let handler = self.create_event_handler(scope, output, EventParamType::Any)?;
                self.add_statement(scope, create_expression_statement(handler));
            }

            ExpressionSemanticVisitor::visit(&output.handler, &self.id, self.bound_target, &mut *self.oob)?;
        }
        Ok(())
    }

    /// Loosens the type of a bound value according to the configuration.
    fn widen_binding(&self, expr: Expression) -> Expression {
        let config = &self.env.config;
        if !config.check_type_of_input_bindings {
            ts_cast_to_any(expr)
        } else if !config.strict_null_input_bindings {
            // Literals are never null.
            if matches!(
                expr.kind,
                ts::ExpressionKind::ObjectLiteral(_) | ts::ExpressionKind::ArrayLiteral(_)
            ) {
                expr
            } else {
                create_non_null(expr)
            }
        } else {
            expr
        }
    }

    fn translate_input(&mut self, scope: usize, attribute: InputAttribute<'a>) -> Result<Expression> {
        match attribute {
            InputAttribute::Bound(bound) => self.translate(scope, &bound.value, TranslateMode::Binding),
            InputAttribute::Text(text) => Ok(create_string_literal(text.value.clone())),
        }
    }

    /// `function ($event): any { handler; }`, behind the scope's guards.
    fn create_event_handler(
        &mut self,
        scope: usize,
        event: &BoundEvent,
        event_type: EventParamType,
    ) -> Result<Expression> {
        let handler = self.translate(scope, &event.handler, TranslateMode::EventHandler)?;
        let param_type = match event_type {
            EventParamType::Infer => None,
            EventParamType::Any => Some(create_any_type()),
            EventParamType::Type(type_node) => Some(type_node),
        };

        let mut body = create_expression_statement(handler);
        if let Some(guards) = self.guards(scope) {
            body = create_if(guards, body);
        }

        let mut event_param = Parameter::new(EVENT_PARAMETER, param_type);
        event_param
            .comments
            .push(ExpressionIdentifier::EventParameter.comment_text());
        Ok(create_function_expression(
            vec![event_param],
            Some(create_any_type()),
            vec![body],
        ))
    }

    /// Translates a template expression in the context of `scope`.
    fn translate(&mut self, scope: usize, ast: &AST, mode: TranslateMode) -> Result<Expression> {
        let config = self.env.config.clone();
        ast_to_typescript(ast, &mut |node| self.resolve_ast(scope, node, mode), &config)
    }

    /// Takes over the translation of nodes that refer to the template or the component.
    fn resolve_ast(
        &mut self,
        scope: usize,
        ast: &AST,
        mode: TranslateMode,
    ) -> Result<Option<Expression>> {
        match ast {
            AST::PropertyRead(read)
                if mode == TranslateMode::EventHandler
                    && matches!(*read.receiver, AST::ImplicitReceiver(_))
                    && read.name == EVENT_PARAMETER =>
            {
                let mut event = create_identifier(EVENT_PARAMETER);
                add_parse_span_info(&mut event, read.name_span);
                Ok(Some(event))
            }
            AST::PropertyRead(read) if read.receiver.is_implicit_receiver() => {
                // A read of a template variable or reference; anything else reads the component.
                self.resolve_target(scope, ast)
            }
            AST::PropertyWrite(write) if write.receiver.is_implicit_receiver() => {
                let Some(target) = self.resolve_target(scope, ast)? else {
                    return Ok(None);
                };
                let value = self.translate(scope, &write.value, mode)?;
                let mut result = create_parenthesized(create_binary(target, BinaryOperator::Equals, value));
                add_parse_span_info(&mut result, write.source_span);
                Ok(Some(result))
            }
            AST::ImplicitReceiver(_) | AST::ThisReceiver(_) => Ok(Some(create_identifier("ctx"))),
            AST::BindingPipe(pipe) => {
                let expr = self.translate(scope, &pipe.exp, mode)?;
                let pipes = self.pipes;
                let pipe_inst = match pipes.get(&pipe.name) {
                    Some(reference) => self.env.pipe_inst(reference)?,
                    None => {
                        self.oob.missing_pipe(&self.id, pipe)?;
                        null_as_any()
                    }
                };
                let mut args = vec![expr];
                for arg in &pipe.args {
                    args.push(self.translate(scope, arg, mode)?);
                }

                let mut method_access = create_property_access(pipe_inst, "transform");
                add_parse_span_info(&mut method_access, pipe.name_span);
                if !self.env.config.check_type_of_pipes {
                    method_access = create_as(method_access, create_any_type());
                }
                let mut result = create_call(method_access, args);
                add_parse_span_info(&mut result, pipe.source_span);
                Ok(Some(result))
            }
            AST::MethodCall(call) if matches!(*call.receiver, AST::ImplicitReceiver(_)) => {
                // `$any(expr)` casts its argument, unless a template entity is named `$any`.
                if call.name == "$any" && call.args.len() == 1 {
                    let expr = self.translate(scope, &call.args[0], mode)?;
                    let mut result = create_parenthesized(create_as(expr, create_any_type()));
                    add_parse_span_info(&mut result, call.source_span);
                    return Ok(Some(result));
                }

                let Some(receiver) = self.resolve_target(scope, ast)? else {
                    return Ok(None);
                };
                let mut method = wrap_for_diagnostics(receiver);
                add_parse_span_info(&mut method, call.name_span);
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.translate(scope, arg, mode)?);
                }
                let mut node = create_call(method, args);
                add_parse_span_info(&mut node, call.source_span);
                Ok(Some(node))
            }
            _ => Ok(None),
        }
    }

    /// The variable of the template entity `ast` refers to, if it refers to one.
    fn resolve_target(&mut self, scope: usize, ast: &AST) -> Result<Option<Expression>> {
        let Some(binding) = self.bound_target.get_expression_target(ast) else {
            return Ok(None);
        };
        let mut expr = self.resolve(scope, binding.key(), None)?;
        add_parse_span_info(&mut expr, ast.source_span());
        Ok(Some(expr))
    }
}

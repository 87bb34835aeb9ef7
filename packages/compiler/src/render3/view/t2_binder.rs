//! Render3 T2 Binder
//!
//! Binds a template against a set of directives: matches directives to elements by selector,
//! resolves `#ref`s, builds the scope tree of references and `let-` variables, and maps
//! expressions that read template-local names to the entity they refer to.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use crate::directive_matching::{create_css_selector, CssSelector, SelectorMatcher};
use crate::expression_parser::ast::{AstKey, AST};
use crate::render3::r3_ast::{Element, NodeKey, R3Node, Reference, Template, TemplateAttr};

use super::t2_api::{
    BoundTarget, DirectiveMeta, DirectiveOwner, ReferenceTarget, Target, TargetBinder,
    TemplateEntity,
};

/// Processes `Target`s with a given set of directives and performs binding.
pub struct R3TargetBinder<DirectiveT: DirectiveMeta + Clone> {
    directive_matcher: SelectorMatcher<DirectiveT>,
}

impl<DirectiveT: DirectiveMeta + Clone + 'static> R3TargetBinder<DirectiveT> {
    pub fn new(directive_matcher: SelectorMatcher<DirectiveT>) -> Self {
        R3TargetBinder { directive_matcher }
    }

    /// Builds a binder over `directives`, registering each one under its parsed selector.
    /// Directives without a selector, or with one that fails to parse, never match.
    pub fn from_directives(directives: impl IntoIterator<Item = DirectiveT>) -> Self {
        let mut matcher = SelectorMatcher::new();
        for directive in directives {
            let Some(selector) = directive.selector() else {
                continue;
            };
            match CssSelector::parse(selector) {
                Ok(selectors) => matcher.add_selectables(selectors, directive),
                Err(err) => {
                    tracing::warn!(directive = directive.name(), %err, "ignoring invalid selector")
                }
            }
        }
        Self::new(matcher)
    }
}

impl<DirectiveT: DirectiveMeta + Clone + 'static> TargetBinder<DirectiveT>
    for R3TargetBinder<DirectiveT>
{
    fn bind(&self, target: Target) -> Box<dyn BoundTarget<DirectiveT>> {
        let mut bound = R3BoundTarget {
            target: Target::default(),
            directives: HashMap::new(),
            references: HashMap::new(),
            expressions: HashMap::new(),
            scopes: vec![BindingScope::root()],
            template_scopes: HashMap::new(),
            used_directives: IndexMap::new(),
            used_pipes: IndexSet::new(),
        };
        if let Some(nodes) = &target.template {
            bound.ingest_scope(nodes, ROOT_SCOPE);
            bound.match_directives(nodes, &self.directive_matcher);
            bound.bind_expressions(nodes, ROOT_SCOPE);
        }
        bound.target = target;
        Box::new(bound)
    }
}

const ROOT_SCOPE: usize = 0;

/// A binding scope: the top level of the template, or the inside of one `<ng-template>`.
struct BindingScope {
    parent: Option<usize>,
    level: usize,
    /// First declaration of a name wins.
    named_entities: IndexMap<String, TemplateEntity>,
}

impl BindingScope {
    fn root() -> Self {
        BindingScope {
            parent: None,
            level: 0,
            named_entities: IndexMap::new(),
        }
    }

    fn maybe_declare(&mut self, entity: TemplateEntity) {
        if !self.named_entities.contains_key(entity.name()) {
            self.named_entities.insert(entity.name().to_string(), entity);
        }
    }
}

/// Metadata container for a bound `Target`.
pub struct R3BoundTarget<DirectiveT: DirectiveMeta + Clone> {
    target: Target,
    directives: HashMap<NodeKey, Vec<DirectiveT>>,
    references: HashMap<NodeKey, ReferenceTarget<DirectiveT>>,
    expressions: HashMap<AstKey, TemplateEntity>,
    scopes: Vec<BindingScope>,
    template_scopes: HashMap<NodeKey, usize>,
    used_directives: IndexMap<String, DirectiveT>,
    used_pipes: IndexSet<String>,
}

impl<DirectiveT: DirectiveMeta + Clone> R3BoundTarget<DirectiveT> {
    fn ingest_scope(&mut self, nodes: &[R3Node], scope: usize) {
        for node in nodes {
            match node {
                R3Node::Element(el) => {
                    for reference in &el.references {
                        self.scopes[scope].maybe_declare(TemplateEntity::Reference(reference.clone()));
                    }
                    self.ingest_scope(&el.children, scope);
                }
                R3Node::Template(tmpl) => {
                    // References on the template itself live in the enclosing scope.
                    for reference in &tmpl.references {
                        self.scopes[scope].maybe_declare(TemplateEntity::Reference(reference.clone()));
                    }
                    let child = self.scopes.len();
                    self.scopes.push(BindingScope {
                        parent: Some(scope),
                        level: self.scopes[scope].level + 1,
                        named_entities: IndexMap::new(),
                    });
                    for variable in &tmpl.variables {
                        self.scopes[child].maybe_declare(TemplateEntity::Variable(variable.clone()));
                    }
                    self.template_scopes.insert(tmpl.key(), child);
                    self.ingest_scope(&tmpl.children, child);
                }
                R3Node::BoundText(_) | R3Node::Text(_) => {}
            }
        }
    }

    fn match_directives(&mut self, nodes: &[R3Node], matcher: &SelectorMatcher<DirectiveT>) {
        for node in nodes {
            match node {
                R3Node::Element(el) => {
                    let selector = create_css_selector(&el.name, &element_attrs_for_matching(el));
                    let owner = DirectiveOwner::Element(el.clone());
                    self.match_node(&selector, owner, &el.references, matcher);
                    self.match_directives(&el.children, matcher);
                }
                R3Node::Template(tmpl) => {
                    let selector =
                        create_css_selector("ng-template", &template_attrs_for_matching(tmpl));
                    let owner = DirectiveOwner::Template(tmpl.clone());
                    self.match_node(&selector, owner, &tmpl.references, matcher);
                    self.match_directives(&tmpl.children, matcher);
                }
                R3Node::BoundText(_) | R3Node::Text(_) => {}
            }
        }
    }

    fn match_node(
        &mut self,
        selector: &CssSelector,
        owner: DirectiveOwner,
        references: &[Reference],
        matcher: &SelectorMatcher<DirectiveT>,
    ) {
        let mut directives = Vec::new();
        matcher.match_selector(selector, |_, directive| directives.push(directive.clone()));
        for directive in &directives {
            self.used_directives
                .entry(directive.name().to_string())
                .or_insert_with(|| directive.clone());
        }

        for reference in references {
            let target = if reference.value.trim().is_empty() {
                // A bare `#ref` points at the component on the node, else at the node itself.
                match directives.iter().find(|dir| dir.is_component()) {
                    Some(component) => Some(ReferenceTarget::DirectiveOnNode {
                        directive: component.clone(),
                        node: owner.clone(),
                    }),
                    None => Some(match &owner {
                        DirectiveOwner::Element(el) => ReferenceTarget::Element(el.clone()),
                        DirectiveOwner::Template(tmpl) => ReferenceTarget::Template(tmpl.clone()),
                    }),
                }
            } else {
                directives
                    .iter()
                    .find(|dir| {
                        dir.export_as()
                            .map_or(false, |names| names.iter().any(|n| n == &reference.value))
                    })
                    .map(|directive| ReferenceTarget::DirectiveOnNode {
                        directive: directive.clone(),
                        node: owner.clone(),
                    })
            };
            if let Some(target) = target {
                self.references.insert(reference.key(), target);
            }
        }

        self.directives.insert(owner.key(), directives);
    }

    fn bind_expressions(&mut self, nodes: &[R3Node], scope: usize) {
        for node in nodes {
            match node {
                R3Node::Element(el) => {
                    for input in &el.inputs {
                        self.bind_expression(&input.value, scope);
                    }
                    for output in &el.outputs {
                        self.bind_expression(&output.handler, scope);
                    }
                    self.bind_expressions(&el.children, scope);
                }
                R3Node::Template(tmpl) => {
                    for attr in &tmpl.template_attrs {
                        if let TemplateAttr::Bound(bound) = attr {
                            self.bind_expression(&bound.value, scope);
                        }
                    }
                    for input in &tmpl.inputs {
                        self.bind_expression(&input.value, scope);
                    }
                    for output in &tmpl.outputs {
                        self.bind_expression(&output.handler, scope);
                    }
                    if let Some(&inner) = self.template_scopes.get(&tmpl.key()) {
                        self.bind_expressions(&tmpl.children, inner);
                    }
                }
                R3Node::BoundText(text) => self.bind_expression(&text.value, scope),
                R3Node::Text(_) => {}
            }
        }
    }

    fn bind_expression(&mut self, ast: &AST, scope: usize) {
        match ast {
            AST::PropertyRead(read) => self.maybe_map(ast, &read.receiver, &read.name, scope),
            AST::SafePropertyRead(read) => self.maybe_map(ast, &read.receiver, &read.name, scope),
            AST::PropertyWrite(write) => self.maybe_map(ast, &write.receiver, &write.name, scope),
            AST::MethodCall(call) => self.maybe_map(ast, &call.receiver, &call.name, scope),
            AST::SafeMethodCall(call) => self.maybe_map(ast, &call.receiver, &call.name, scope),
            AST::BindingPipe(pipe) => {
                self.used_pipes.insert(pipe.name.clone());
            }
            _ => {}
        }
        ast.for_each_child(&mut |child| self.bind_expression(child, scope));
    }

    fn maybe_map(&mut self, ast: &AST, receiver: &AST, name: &str, scope: usize) {
        // Only reads through the implicit receiver can refer to template entities; `this.x`
        // always reads the component.
        if !matches!(receiver, AST::ImplicitReceiver(_)) {
            return;
        }
        if let Some(entity) = self.lookup(scope, name) {
            self.expressions.insert(ast.key(), entity);
        }
    }

    fn lookup(&self, scope: usize, name: &str) -> Option<TemplateEntity> {
        let mut current = Some(scope);
        while let Some(idx) = current {
            if let Some(entity) = self.scopes[idx].named_entities.get(name) {
                return Some(entity.clone());
            }
            current = self.scopes[idx].parent;
        }
        None
    }
}

impl<DirectiveT: DirectiveMeta + Clone + 'static> BoundTarget<DirectiveT>
    for R3BoundTarget<DirectiveT>
{
    fn target(&self) -> &Target {
        &self.target
    }

    fn get_directives_of_node(&self, node: NodeKey) -> Option<Vec<DirectiveT>> {
        self.directives.get(&node).cloned()
    }

    fn get_reference_target(&self, reference: &Reference) -> Option<ReferenceTarget<DirectiveT>> {
        self.references.get(&reference.key()).cloned()
    }

    fn get_expression_target(&self, expr: &AST) -> Option<TemplateEntity> {
        self.expressions.get(&expr.key()).cloned()
    }

    fn get_nesting_level(&self, template: &Template) -> usize {
        self.template_scopes
            .get(&template.key())
            .map_or(0, |&scope| self.scopes[scope].level)
    }

    fn get_entities_in_template_scope(
        &self,
        template: Option<&Template>,
    ) -> IndexSet<TemplateEntity> {
        let start = match template {
            Some(tmpl) => match self.template_scopes.get(&tmpl.key()) {
                Some(&scope) => scope,
                None => return IndexSet::new(),
            },
            None => ROOT_SCOPE,
        };

        let mut seen = IndexMap::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            for (name, entity) in &self.scopes[idx].named_entities {
                seen.entry(name.clone()).or_insert_with(|| entity.clone());
            }
            current = self.scopes[idx].parent;
        }
        seen.into_values().collect()
    }

    fn get_used_directives(&self) -> Vec<DirectiveT> {
        self.used_directives.values().cloned().collect()
    }

    fn get_used_pipes(&self) -> Vec<String> {
        self.used_pipes.iter().cloned().collect()
    }
}

fn element_attrs_for_matching(el: &Element) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = el
        .attributes
        .iter()
        .map(|attr| (attr.name.clone(), attr.value.clone()))
        .collect();
    attrs.extend(el.inputs.iter().map(|input| (input.name.clone(), String::new())));
    attrs.extend(el.outputs.iter().map(|output| (output.name.clone(), String::new())));
    attrs
}

/// Structural templates (`*ngFor` on an element) match on their template attributes only;
/// an explicit `<ng-template>` matches on its own attributes and bindings.
fn template_attrs_for_matching(tmpl: &Template) -> Vec<(String, String)> {
    if tmpl.tag_name.as_deref() != Some("ng-template") {
        return tmpl
            .template_attrs
            .iter()
            .map(|attr| match attr {
                TemplateAttr::Bound(bound) => (bound.name.clone(), String::new()),
                TemplateAttr::Text(text) => (text.name.clone(), text.value.clone()),
            })
            .collect();
    }
    let mut attrs: Vec<(String, String)> = tmpl
        .attributes
        .iter()
        .map(|attr| (attr.name.clone(), attr.value.clone()))
        .collect();
    attrs.extend(tmpl.inputs.iter().map(|input| (input.name.clone(), String::new())));
    attrs.extend(tmpl.outputs.iter().map(|output| (output.name.clone(), String::new())));
    attrs
}

//! Binding Tests
//!
//! Exercises `R3TargetBinder` against hand-built templates.

use std::collections::HashSet;

use ngtcb_compiler::expression_parser::{AbsoluteSourceSpan, EmptyExpr, ParseSpan, AST};
use ngtcb_compiler::render3::r3_ast as t;
use ngtcb_compiler::render3::view::t2_api::{
    BoundTarget, DirectiveMeta, DirectiveOwner, InputOutputPropertySet, ReferenceTarget, Target, TargetBinder,
    TemplateEntity,
};
use ngtcb_compiler::render3::view::t2_binder::R3TargetBinder;

#[path = "util.rs"]
mod view_util;

use view_util::TemplateText;

/// A `InputOutputPropertySet` which only uses an identity mapping for fields and properties.
#[derive(Debug, Clone)]
struct IdentityInputMapping {
    names: HashSet<String>,
}

impl IdentityInputMapping {
    fn new(names: &[&str]) -> Self {
        IdentityInputMapping {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl InputOutputPropertySet for IdentityInputMapping {
    fn has_binding_property_name(&self, property_name: &str) -> bool {
        self.names.contains(property_name)
    }
}

#[derive(Debug, Clone)]
struct TestDirectiveMeta {
    name: String,
    selector: String,
    export_as: Option<Vec<String>>,
    inputs: IdentityInputMapping,
    outputs: IdentityInputMapping,
    is_component: bool,
    is_structural: bool,
}

impl DirectiveMeta for TestDirectiveMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Option<&str> {
        Some(&self.selector)
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

fn directive(name: &str, selector: &str) -> TestDirectiveMeta {
    TestDirectiveMeta {
        name: name.to_string(),
        selector: selector.to_string(),
        export_as: None,
        inputs: IdentityInputMapping::new(&[]),
        outputs: IdentityInputMapping::new(&[]),
        is_component: false,
        is_structural: false,
    }
}

fn make_selector_matcher() -> R3TargetBinder<TestDirectiveMeta> {
    let mut ng_for = directive("NgFor", "[ngFor][ngForOf]");
    ng_for.inputs = IdentityInputMapping::new(&["ngForOf"]);
    ng_for.is_structural = true;

    let mut dir = directive("Dir", "[dir]");
    dir.export_as = Some(vec!["dir".to_string()]);

    let mut cmp = directive("Cmp", "my-cmp");
    cmp.is_component = true;

    R3TargetBinder::from_directives(vec![ng_for, dir, cmp, directive("HasInput", "[hasInput]")])
}

fn bind(nodes: Vec<t::R3Node>) -> Box<dyn BoundTarget<TestDirectiveMeta>> {
    make_selector_matcher().bind(Target {
        template: Some(nodes),
    })
}

#[test]
fn should_match_directives_by_attribute() {
    let src = TemplateText::new(r#"<div dir></div>"#);
    let mut el = src.element("div", 0);
    el.attributes.push(src.text_attr("dir", ""));
    let key = el.key();

    let res = bind(vec![t::R3Node::Element(el)]);
    let dirs = res.get_directives_of_node(key).expect("node was matched");
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].name, "Dir");
    let used: Vec<String> = res.get_used_directives().into_iter().map(|d| d.name).collect();
    assert_eq!(used, vec!["Dir".to_string()]);
}

#[test]
fn should_match_directives_by_bound_input_name() {
    let src = TemplateText::new(r#"<div [hasInput]="value"></div>"#);
    let mut el = src.element("div", 0);
    el.inputs.push(src.input("hasInput", src.read("value", 0)));
    let key = el.key();

    let res = bind(vec![t::R3Node::Element(el)]);
    let dirs = res.get_directives_of_node(key).expect("node was matched");
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].name, "HasInput");
}

#[test]
fn should_record_an_empty_match_for_plain_elements() {
    let src = TemplateText::new("<span></span>");
    let el = src.element("span", 0);
    let key = el.key();

    let res = bind(vec![t::R3Node::Element(el)]);
    assert!(res.get_directives_of_node(key).map_or(false, |d| d.is_empty()));
    assert!(res.get_used_directives().is_empty());
}

#[test]
fn should_resolve_a_bare_reference_to_the_element() {
    let src = TemplateText::new("<div #el></div>");
    let mut el = src.element("div", 0);
    el.references.push(src.reference("el", ""));
    let reference = el.references[0].clone();

    let res = bind(vec![t::R3Node::Element(el)]);
    match res.get_reference_target(&reference) {
        Some(ReferenceTarget::Element(target)) => assert_eq!(target.name, "div"),
        other => panic!("expected element target, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn should_resolve_a_bare_reference_to_the_component() {
    let src = TemplateText::new("<my-cmp #cmp></my-cmp>");
    let mut el = src.element("my-cmp", 0);
    el.references.push(src.reference("cmp", ""));
    let reference = el.references[0].clone();

    let res = bind(vec![t::R3Node::Element(el)]);
    match res.get_reference_target(&reference) {
        Some(ReferenceTarget::DirectiveOnNode { directive, node }) => {
            assert_eq!(directive.name, "Cmp");
            assert!(matches!(node, DirectiveOwner::Element(_)));
        }
        _ => panic!("expected the component to be the reference target"),
    }
}

#[test]
fn should_resolve_a_reference_by_export_as() {
    let src = TemplateText::new(r#"<div dir #d="dir"></div>"#);
    let mut el = src.element("div", 0);
    el.attributes.push(src.text_attr("dir", ""));
    el.references.push(src.reference("d", "dir"));
    let reference = el.references[0].clone();

    let res = bind(vec![t::R3Node::Element(el)]);
    match res.get_reference_target(&reference) {
        Some(ReferenceTarget::DirectiveOnNode { directive, .. }) => {
            assert_eq!(directive.name, "Dir")
        }
        _ => panic!("expected the exported directive to be the reference target"),
    }
}

#[test]
fn should_not_resolve_a_reference_to_an_unknown_export() {
    let src = TemplateText::new(r#"<div dir #d="unknown"></div>"#);
    let mut el = src.element("div", 0);
    el.attributes.push(src.text_attr("dir", ""));
    el.references.push(src.reference("d", "unknown"));
    let reference = el.references[0].clone();

    let res = bind(vec![t::R3Node::Element(el)]);
    assert!(res.get_reference_target(&reference).is_none());
}

#[test]
fn should_collect_entities_in_template_scope() {
    let src = TemplateText::new(
        r#"<div #outer></div><ng-template let-item><ng-template let-inner>{{item}}</ng-template></ng-template>"#,
    );
    let mut outer = src.element("div", 0);
    outer.references.push(src.reference("outer", ""));

    let mut inner_tmpl = src.template(1);
    inner_tmpl.variables.push(src.variable("inner", ""));
    inner_tmpl.children.push(src.bound_text(src.read("item", 1)));

    let mut outer_tmpl = src.template(0);
    outer_tmpl.variables.push(src.variable("item", ""));
    outer_tmpl.children.push(t::R3Node::Template(inner_tmpl.clone()));

    let res = bind(vec![
        t::R3Node::Element(outer),
        t::R3Node::Template(outer_tmpl.clone()),
    ]);

    let names = |entities: indexmap::IndexSet<TemplateEntity>| -> Vec<String> {
        entities.iter().map(|e| e.name().to_string()).collect()
    };
    assert_eq!(names(res.get_entities_in_template_scope(None)), vec!["outer"]);
    assert_eq!(
        names(res.get_entities_in_template_scope(Some(&outer_tmpl))),
        vec!["item", "outer"]
    );
    assert_eq!(
        names(res.get_entities_in_template_scope(Some(&inner_tmpl))),
        vec!["inner", "item", "outer"]
    );

    assert_eq!(res.get_nesting_level(&outer_tmpl), 1);
    assert_eq!(res.get_nesting_level(&inner_tmpl), 2);
}

#[test]
fn should_prefer_inner_declarations_when_shadowing() {
    let src = TemplateText::new(r#"<div #x></div><ng-template let-x>{{x}}</ng-template>"#);
    let mut outer = src.element("div", 0);
    outer.references.push(src.reference("x", ""));
    let mut tmpl = src.template(0);
    tmpl.variables.push(src.variable("x", ""));

    let res = bind(vec![t::R3Node::Element(outer), t::R3Node::Template(tmpl.clone())]);
    let entities = res.get_entities_in_template_scope(Some(&tmpl));
    assert_eq!(entities.len(), 1);
    assert!(matches!(entities.first(), Some(TemplateEntity::Variable(_))));
}

#[test]
fn should_map_implicit_reads_to_template_variables() {
    let src = TemplateText::new(r#"<ng-template let-item>{{item}} {{this.item}}</ng-template>"#);
    let read = src.read("item", 1);
    let this_read = src.this_read("item", 0);

    let mut tmpl = src.template(0);
    tmpl.variables.push(src.variable("item", ""));
    tmpl.children.push(src.bound_text(read.clone()));
    tmpl.children.push(src.bound_text(this_read.clone()));

    let res = bind(vec![t::R3Node::Template(tmpl)]);
    match res.get_expression_target(&read) {
        Some(TemplateEntity::Variable(v)) => assert_eq!(v.name, "item"),
        _ => panic!("expected `item` to resolve to the template variable"),
    }
    assert!(res.get_expression_target(&this_read).is_none());
}

#[test]
fn should_not_map_reads_outside_the_declaring_template() {
    let src = TemplateText::new(r#"<ng-template let-item></ng-template>{{item}}"#);
    let read = src.read("item", 1);
    let mut tmpl = src.template(0);
    tmpl.variables.push(src.variable("item", ""));

    let res = bind(vec![t::R3Node::Template(tmpl), src.bound_text(read.clone())]);
    assert!(res.get_expression_target(&read).is_none());
}

#[test]
fn should_record_used_pipes() {
    let src = TemplateText::new(r#"{{ value | date }}"#);
    let expr = src.pipe(src.read("value", 0), "date");

    let res = bind(vec![src.bound_text(expr)]);
    assert_eq!(res.get_used_pipes(), vec!["date".to_string()]);
}

#[test]
fn should_match_structural_directives_on_template_attrs() {
    let src = TemplateText::new(r#"<ng-template ngFor [ngForOf]="items"><li></li></ng-template>"#);
    let mut tmpl = src.template(0);
    tmpl.tag_name = Some("li".to_string());
    tmpl.template_attrs
        .push(t::TemplateAttr::Text(src.text_attr("ngFor", "")));
    tmpl.template_attrs.push(t::TemplateAttr::Bound(
        src.input("ngForOf", src.read("items", 0)),
    ));
    tmpl.children.push(t::R3Node::Element(src.element("li", 0)));
    let key = tmpl.key();

    let res = bind(vec![t::R3Node::Template(tmpl)]);
    let dirs = res.get_directives_of_node(key).expect("template was matched");
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].name, "NgFor");
    assert!(dirs[0].is_structural);
}

#[test]
fn should_keep_the_bound_target() {
    let src = TemplateText::new("<span></span>");
    let res = bind(vec![t::R3Node::Element(src.element("span", 0))]);
    assert_eq!(res.target().template.as_ref().map(|nodes| nodes.len()), Some(1));
    assert!(matches!(
        res.get_expression_target(&AST::EmptyExpr(EmptyExpr {
            span: ParseSpan::new(0, 0),
            source_span: AbsoluteSourceSpan::new(0, 0),
        })),
        None
    ));
}

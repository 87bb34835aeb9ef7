//! Render3 AST
//!
//! Template nodes as produced by the template parser: elements, `<ng-template>`s, text and
//! interpolations, together with their attributes, bindings, references and variables.

use crate::expression_parser::ast::{BindingType, ParsedEventType, AST};
use crate::parse_util::ParseSourceSpan;

/// Base trait for all R3 AST nodes
pub trait Node {
    fn source_span(&self) -> &ParseSourceSpan;
}

/// Kind tag used by [`NodeKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Template,
    Reference,
    Variable,
}

/// Identity of a node within one template, derived from its kind and span offsets.
///
/// An element and the `<ng-template>` synthesized around it by a structural directive share a
/// source span, so the kind is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
}

impl NodeKey {
    fn new(kind: NodeKind, span: &ParseSourceSpan) -> Self {
        NodeKey {
            kind,
            start: span.start.offset,
            end: span.end.offset,
        }
    }
}

/// Text node
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Node for Text {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Bound text node (interpolation)
#[derive(Debug, Clone, PartialEq)]
pub struct BoundText {
    pub value: AST,
    pub source_span: ParseSourceSpan,
}

impl Node for BoundText {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Text attribute in the template
#[derive(Debug, Clone, PartialEq)]
pub struct TextAttribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: Option<ParseSourceSpan>,
    pub value_span: Option<ParseSourceSpan>,
}

impl Node for TextAttribute {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Bound attribute node
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAttribute {
    pub name: String,
    pub type_: BindingType,
    pub value: AST,
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    pub value_span: Option<ParseSourceSpan>,
}

impl Node for BoundAttribute {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Bound event node
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEvent {
    pub name: String,
    pub type_: ParsedEventType,
    pub handler: AST,
    pub target: Option<String>,
    pub phase: Option<String>,
    pub source_span: ParseSourceSpan,
    pub handler_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
}

impl Node for BoundEvent {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Element node
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<TextAttribute>,
    pub inputs: Vec<BoundAttribute>,
    pub outputs: Vec<BoundEvent>,
    pub children: Vec<R3Node>,
    pub references: Vec<Reference>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Element {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(NodeKind::Element, &self.source_span)
    }
}

impl Node for Element {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Template node
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub tag_name: Option<String>,
    pub attributes: Vec<TextAttribute>,
    pub inputs: Vec<BoundAttribute>,
    pub outputs: Vec<BoundEvent>,
    pub template_attrs: Vec<TemplateAttr>,
    pub children: Vec<R3Node>,
    pub references: Vec<Reference>,
    pub variables: Vec<Variable>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Template {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(NodeKind::Template, &self.source_span)
    }
}

impl Node for Template {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Template attribute (either bound or text)
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateAttr {
    Bound(BoundAttribute),
    Text(TextAttribute),
}

/// Variable node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    pub value_span: Option<ParseSourceSpan>,
}

impl Variable {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(NodeKind::Variable, &self.key_span)
    }
}

impl Node for Variable {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

/// Reference node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    pub value_span: Option<ParseSourceSpan>,
}

impl Reference {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(NodeKind::Reference, &self.key_span)
    }
}

impl Node for Reference {
    fn source_span(&self) -> &ParseSourceSpan {
        &self.source_span
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum R3Node {
    Element(Element),
    Template(Template),
    BoundText(BoundText),
    Text(Text),
}

impl Node for R3Node {
    fn source_span(&self) -> &ParseSourceSpan {
        match self {
            R3Node::Element(n) => &n.source_span,
            R3Node::Template(n) => &n.source_span,
            R3Node::BoundText(n) => &n.source_span,
            R3Node::Text(n) => &n.source_span,
        }
    }
}

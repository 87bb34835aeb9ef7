// TypeCheck Comments
//
// Synthetic comments in generated type-check code.
//
// Type-check blocks carry their bookkeeping in trailing `/*...*/` comments: the template span
// a node was generated from (`12,17`), markers that tell diagnostics mapping to skip a node
// (`D:ignore`), and tags identifying special expressions (`T:DIR`, `T:COMPCOMP`, `T:EP`).
// This module writes those comments and finds nodes by them.

use ngtcb_compiler::expression_parser::ast::AbsoluteSourceSpan;
use once_cell::sync::Lazy;
use regex::Regex;
use ts::{for_each_child, Expression, Node, Statement};

static PARSE_SPAN_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+),(\d+)$").expect("static pattern is valid"));

const IGNORE_FOR_DIAGNOSTICS_MARKER: &str = "D:ignore";

/// Reads the template span recorded on `node`, if any.
pub fn read_span_comment(node: &Expression) -> Option<AbsoluteSourceSpan> {
    node.comments.iter().find_map(|comment| {
        let captures = PARSE_SPAN_COMMENT.captures(comment)?;
        let start = captures.get(1)?.as_str().parse().ok()?;
        let end = captures.get(2)?.as_str().parse().ok()?;
        Some(AbsoluteSourceSpan::new(start, end))
    })
}

/// Tags attached to generated expressions so they can be found again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionIdentifier {
    /// The variable holding a directive instance.
    Directive,
    /// The `ctx.` access completions for the component are computed at.
    ComponentCompletion,
    /// The `$event` parameter of an event handler.
    EventParameter,
}

impl ExpressionIdentifier {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpressionIdentifier::Directive => "DIR",
            ExpressionIdentifier::ComponentCompletion => "COMPCOMP",
            ExpressionIdentifier::EventParameter => "EP",
        }
    }

    pub fn comment_text(self) -> String {
        format!("T:{}", self.as_str())
    }
}

pub fn add_expression_identifier(node: &mut Expression, identifier: ExpressionIdentifier) {
    node.add_comment(identifier.comment_text());
}

/// Tags a node so that diagnostics the host reports against it are dropped.
pub fn mark_ignore_diagnostics(node: &mut Expression) {
    node.add_comment(IGNORE_FOR_DIAGNOSTICS_MARKER);
}

pub fn has_ignore_for_diagnostics_marker(node: &Expression) -> bool {
    node.comments
        .iter()
        .any(|comment| comment == IGNORE_FOR_DIAGNOSTICS_MARKER)
}

pub fn has_expression_identifier(node: &Expression, identifier: ExpressionIdentifier) -> bool {
    let text = identifier.comment_text();
    node.comments.iter().any(|comment| *comment == text)
}

/// Criteria for [`find_first_matching_node`].
pub struct FindOptions {
    pub filter: fn(&Expression) -> bool,
    pub with_span: Option<AbsoluteSourceSpan>,
    pub with_expression_identifier: Option<ExpressionIdentifier>,
}

impl FindOptions {
    pub fn new(filter: fn(&Expression) -> bool) -> Self {
        Self {
            filter,
            with_span: None,
            with_expression_identifier: None,
        }
    }

    pub fn with_span(mut self, span: AbsoluteSourceSpan) -> Self {
        self.with_span = Some(span);
        self
    }

    pub fn with_expression_identifier(mut self, identifier: ExpressionIdentifier) -> Self {
        self.with_expression_identifier = Some(identifier);
        self
    }

    fn matches(&self, node: &Expression) -> bool {
        if !(self.filter)(node) {
            return false;
        }
        if let Some(span) = self.with_span {
            if read_span_comment(node) != Some(span) {
                return false;
            }
        }
        match self.with_expression_identifier {
            Some(identifier) => has_expression_identifier(node, identifier),
            None => true,
        }
    }
}

/// Finds the first expression below `tcb`, in pre-order, that satisfies `opts`.
pub fn find_first_matching_node<'a>(
    tcb: &'a Statement,
    opts: &FindOptions,
) -> Option<&'a Expression> {
    fn visit<'a>(node: Node<'a>, opts: &FindOptions) -> Option<&'a Expression> {
        if let Some(expr) = node.as_expression() {
            if opts.matches(expr) {
                return Some(expr);
            }
        }
        for_each_child(node, &mut |child| visit(child, opts))
    }
    for_each_child(Node::Statement(tcb), &mut |child| visit(child, opts))
}

// TypeCheck Span Annotations
//
// Helpers that tie generated nodes back to the template source they were produced from.

use ngtcb_compiler::expression_parser::ast::AbsoluteSourceSpan;
use ts::factory::create_parenthesized;
use ts::{Expression, FunctionDeclaration};

use crate::ngtsc::typecheck::api::TemplateId;

/// Wraps an expression in parentheses so diagnostics reported against it stay on this node
/// rather than spreading to its operands.
pub fn wrap_for_diagnostics(expr: Expression) -> Expression {
    create_parenthesized(expr)
}

/// Wraps an expression in parentheses so that its type is computed on its own. Without it,
/// `a || b` would be checked as a whole instead of `b` separately.
pub fn wrap_for_type_checker(expr: Expression) -> Expression {
    create_parenthesized(expr)
}

/// The `start,end` comment text recording a template span.
pub fn parse_span_comment(span: impl Into<AbsoluteSourceSpan>) -> String {
    let span = span.into();
    format!("{},{}", span.start, span.end)
}

/// Records the template span `node` was generated from as a trailing `start,end` comment.
pub fn add_parse_span_info(node: &mut Expression, span: impl Into<AbsoluteSourceSpan>) {
    node.add_comment(parse_span_comment(span));
}

/// Marks a type-check block with the id of the template it checks.
pub fn add_template_id(tcb: &mut FunctionDeclaration, id: &TemplateId) {
    tcb.leading_comments.push(id.to_string());
}

// TypeScript Helpers
//
// Node construction shared by the type-check block generator and the type constructors.

use ts::factory::*;
use ts::{EntityName, Expression, ExpressionKind, KeywordType, Statement, TypeNode, VariableKeyword};

/// Expression kinds that can be followed by `as any` without parenthesizing them first.
fn is_safe_to_cast_without_parens(expr: &Expression) -> bool {
    matches!(
        expr.kind,
        ExpressionKind::Parenthesized(_)
            | ExpressionKind::Identifier(_)
            | ExpressionKind::Call { .. }
            | ExpressionKind::NonNull(_)
            | ExpressionKind::ElementAccess { .. }
            | ExpressionKind::PropertyAccess { .. }
            | ExpressionKind::ArrayLiteral(_)
            | ExpressionKind::ObjectLiteral(_)
            | ExpressionKind::StringLiteral(_)
            | ExpressionKind::NumericLiteral(_)
            | ExpressionKind::BooleanLiteral(_)
            | ExpressionKind::Null
    ) || expr.as_identifier() == Some("undefined")
}

/// `(expr as any)`, parenthesizing `expr` first when the cast would otherwise bind to part of it.
pub fn ts_cast_to_any(expr: Expression) -> Expression {
    let expr = if is_safe_to_cast_without_parens(&expr) {
        expr
    } else {
        create_parenthesized(expr)
    };
    create_parenthesized(create_as(expr, create_keyword_type(KeywordType::Any)))
}

/// `document.createElement("tag")`, which the host types as the specific element interface.
pub fn ts_create_element(tag_name: &str) -> Expression {
    let create_element = create_property_access(create_identifier("document"), "createElement");
    create_call(create_element, vec![create_string_literal(tag_name)])
}

/// `var id: T = null!;`
pub fn ts_declare_variable(id: Expression, type_node: TypeNode) -> Statement {
    create_variable_statement(
        VariableKeyword::Var,
        id,
        Some(type_node),
        Some(create_non_null(create_null())),
    )
}

/// `typeof T.ngAcceptInputType_field`, the type an input coercion member declares.
pub fn ts_create_type_query_for_coerced_input(type_name: &EntityName, field: &str) -> TypeNode {
    TypeNode::TypeQuery(EntityName::Qualified {
        left: Box::new(type_name.clone()),
        right: format!("ngAcceptInputType_{}", field),
    })
}

/// `var id = initializer;`
pub fn ts_create_variable(id: Expression, initializer: Expression) -> Statement {
    create_variable_statement(VariableKeyword::Var, id, None, Some(initializer))
}

/// `receiver.method(args)`
pub fn ts_call_method(receiver: Expression, method_name: &str, args: Vec<Expression>) -> Expression {
    create_call(create_property_access(receiver, method_name), args)
}

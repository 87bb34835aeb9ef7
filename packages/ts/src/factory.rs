//! Node factory, in the shape of `ts.factory`.

use crate::node::*;

pub fn create_identifier(name: impl Into<String>) -> Expression {
    Expression::new(ExpressionKind::Identifier(name.into()))
}

pub fn create_string_literal(value: impl Into<String>) -> Expression {
    Expression::new(ExpressionKind::StringLiteral(value.into()))
}

pub fn create_numeric_literal(value: impl Into<String>) -> Expression {
    Expression::new(ExpressionKind::NumericLiteral(value.into()))
}

pub fn create_true() -> Expression {
    Expression::new(ExpressionKind::BooleanLiteral(true))
}

pub fn create_false() -> Expression {
    Expression::new(ExpressionKind::BooleanLiteral(false))
}

pub fn create_null() -> Expression {
    Expression::new(ExpressionKind::Null)
}

pub fn create_property_access(expression: Expression, name: impl Into<String>) -> Expression {
    Expression::new(ExpressionKind::PropertyAccess {
        expression: Box::new(expression),
        name: name.into(),
    })
}

pub fn create_element_access(expression: Expression, argument: Expression) -> Expression {
    Expression::new(ExpressionKind::ElementAccess {
        expression: Box::new(expression),
        argument: Box::new(argument),
    })
}

pub fn create_call(expression: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::new(ExpressionKind::Call {
        expression: Box::new(expression),
        arguments,
    })
}

pub fn create_prefix(operator: PrefixOperator, operand: Expression) -> Expression {
    Expression::new(ExpressionKind::Prefix {
        operator,
        operand: Box::new(operand),
    })
}

pub fn create_logical_not(operand: Expression) -> Expression {
    create_prefix(PrefixOperator::Exclamation, operand)
}

pub fn create_binary(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    Expression::new(ExpressionKind::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

pub fn create_conditional(
    condition: Expression,
    when_true: Expression,
    when_false: Expression,
) -> Expression {
    Expression::new(ExpressionKind::Conditional {
        condition: Box::new(condition),
        when_true: Box::new(when_true),
        when_false: Box::new(when_false),
    })
}

pub fn create_parenthesized(expression: Expression) -> Expression {
    Expression::new(ExpressionKind::Parenthesized(Box::new(expression)))
}

pub fn create_non_null(expression: Expression) -> Expression {
    Expression::new(ExpressionKind::NonNull(Box::new(expression)))
}

pub fn create_as(expression: Expression, type_node: TypeNode) -> Expression {
    Expression::new(ExpressionKind::As {
        expression: Box::new(expression),
        type_node: Box::new(type_node),
    })
}

pub fn create_array_literal(elements: Vec<Expression>) -> Expression {
    Expression::new(ExpressionKind::ArrayLiteral(elements))
}

pub fn create_object_literal(properties: Vec<PropertyAssignment>) -> Expression {
    Expression::new(ExpressionKind::ObjectLiteral(properties))
}

pub fn create_property_assignment(
    name: impl Into<String>,
    initializer: Expression,
) -> PropertyAssignment {
    PropertyAssignment {
        name: name.into(),
        initializer,
        comments: Vec::new(),
    }
}

pub fn create_comma_list(elements: Vec<Expression>) -> Expression {
    Expression::new(ExpressionKind::CommaList(elements))
}

pub fn create_function_expression(
    parameters: Vec<Parameter>,
    return_type: Option<TypeNode>,
    body: Vec<Statement>,
) -> Expression {
    Expression::new(ExpressionKind::Function {
        parameters,
        return_type: return_type.map(Box::new),
        body,
    })
}

pub fn create_keyword_type(keyword: KeywordType) -> TypeNode {
    TypeNode::Keyword(keyword)
}

pub fn create_any_type() -> TypeNode {
    TypeNode::Keyword(KeywordType::Any)
}

pub fn create_type_reference(
    type_name: EntityName,
    type_arguments: Option<Vec<TypeNode>>,
) -> TypeNode {
    TypeNode::Reference(TypeReferenceNode {
        type_name,
        type_arguments,
        comments: Vec::new(),
    })
}

pub fn create_string_literal_type(value: impl Into<String>) -> TypeNode {
    TypeNode::Literal(LiteralType::String(value.into()))
}

pub fn create_expression_statement(expression: Expression) -> Statement {
    Statement::Expression(expression)
}

pub fn create_variable_statement(
    keyword: VariableKeyword,
    name: Expression,
    type_node: Option<TypeNode>,
    initializer: Option<Expression>,
) -> Statement {
    Statement::Variable(VariableStatement {
        keyword,
        name,
        type_node,
        initializer,
        comments: Vec::new(),
    })
}

pub fn create_if(condition: Expression, then_statement: Statement) -> Statement {
    Statement::If {
        condition,
        then_statement: Box::new(then_statement),
    }
}

pub fn create_block(statements: Vec<Statement>) -> Statement {
    Statement::Block(statements)
}

pub fn create_return(expression: Option<Expression>) -> Statement {
    Statement::Return(expression)
}

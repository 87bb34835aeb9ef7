// Expression Translation
//
// Translation of template expressions into TypeScript expressions.
//
// The translation is mechanical except for two things the caller controls: how names are
// resolved (`maybe_resolve` gets the first look at every node and can substitute its own
// expression), and how strictly literals and safe navigation are typed.

use ngtcb_compiler::expression_parser::ast::{LiteralValue, AST};
use ts::factory::*;
use ts::{BinaryOperator, Expression, KeywordType, PrefixOperator};

use super::diagnostics::{add_parse_span_info, wrap_for_diagnostics, wrap_for_type_checker};
use super::ts_util::ts_cast_to_any;
use crate::ngtsc::translator::ts_numeric_expression;
use crate::ngtsc::typecheck::api::{Result, TypeCheckError, TypeCheckingConfig};

/// `(null as any)`, the placeholder for anything whose type can't or shouldn't be inferred.
pub fn null_as_any() -> Expression {
    create_parenthesized(create_as(create_null(), create_keyword_type(KeywordType::Any)))
}

fn undefined() -> Expression {
    create_identifier("undefined")
}

fn unary_operator(operator: &str) -> Option<PrefixOperator> {
    match operator {
        "+" => Some(PrefixOperator::Plus),
        "-" => Some(PrefixOperator::Minus),
        _ => None,
    }
}

fn binary_operator(operation: &str) -> Option<BinaryOperator> {
    let op = match operation {
        "+" => BinaryOperator::Plus,
        "-" => BinaryOperator::Minus,
        "<" => BinaryOperator::LessThan,
        ">" => BinaryOperator::GreaterThan,
        "<=" => BinaryOperator::LessThanEquals,
        ">=" => BinaryOperator::GreaterThanEquals,
        "==" => BinaryOperator::EqualsEquals,
        "===" => BinaryOperator::EqualsEqualsEquals,
        "*" => BinaryOperator::Asterisk,
        "/" => BinaryOperator::Slash,
        "%" => BinaryOperator::Percent,
        "!=" => BinaryOperator::ExclamationEquals,
        "!==" => BinaryOperator::ExclamationEqualsEquals,
        "||" => BinaryOperator::BarBar,
        "&&" => BinaryOperator::AmpersandAmpersand,
        "&" => BinaryOperator::Ampersand,
        "|" => BinaryOperator::Bar,
        "??" => BinaryOperator::QuestionQuestion,
        _ => return None,
    };
    Some(op)
}

/// Callback that may take over the translation of a node. Returning `Ok(None)` lets the
/// translator handle it.
pub type MaybeResolve<'r> = dyn FnMut(&AST) -> Result<Option<Expression>> + 'r;

/// Converts a template expression into a TypeScript expression, recording the template span of
/// each produced node in a trailing comment.
pub fn ast_to_typescript(
    ast: &AST,
    maybe_resolve: &mut MaybeResolve<'_>,
    config: &TypeCheckingConfig,
) -> Result<Expression> {
    AstTranslator {
        maybe_resolve,
        config,
    }
    .translate(ast)
}

struct AstTranslator<'a, 'r> {
    maybe_resolve: &'a mut MaybeResolve<'r>,
    config: &'a TypeCheckingConfig,
}

impl AstTranslator<'_, '_> {
    fn translate(&mut self, ast: &AST) -> Result<Expression> {
        let ast = ast.unwrap_source();

        // An empty expression stays `undefined` no matter what the resolver thinks of it.
        if let AST::EmptyExpr(empty) = ast {
            let mut node = undefined();
            add_parse_span_info(&mut node, empty.source_span);
            return Ok(node);
        }

        if let Some(resolved) = (self.maybe_resolve)(ast)? {
            return Ok(resolved);
        }

        self.visit(ast)
    }

    fn translate_all(&mut self, asts: &[AST]) -> Result<Vec<Expression>> {
        asts.iter().map(|ast| self.translate(ast)).collect()
    }

    fn visit(&mut self, ast: &AST) -> Result<Expression> {
        let node = match ast {
            AST::Unary(unary) => {
                let expr = self.translate(&unary.expr)?;
                let op = unary_operator(&unary.operator)
                    .ok_or_else(|| TypeCheckError::UnsupportedUnaryOperator(unary.operator.clone()))?;
                let mut node = wrap_for_diagnostics(create_prefix(op, expr));
                add_parse_span_info(&mut node, unary.source_span);
                node
            }
            AST::Binary(binary) => {
                let lhs = wrap_for_diagnostics(self.translate(&binary.left)?);
                let rhs = wrap_for_diagnostics(self.translate(&binary.right)?);
                let op = binary_operator(&binary.operation).ok_or_else(|| {
                    TypeCheckError::UnsupportedBinaryOperator(binary.operation.clone())
                })?;
                let mut node = create_binary(lhs, op, rhs);
                add_parse_span_info(&mut node, binary.source_span);
                node
            }
            AST::Chain(chain) => {
                let elements = self.translate_all(&chain.expressions)?;
                let mut node = wrap_for_diagnostics(create_comma_list(elements));
                add_parse_span_info(&mut node, chain.source_span);
                node
            }
            AST::Conditional(conditional) => {
                let cond = self.translate(&conditional.condition)?;
                let when_true = self.translate(&conditional.true_exp)?;
                // The false branch is parenthesized so `a ? b : c ? d : e` keeps its grouping
                // once spans are attached.
                let when_false = wrap_for_type_checker(self.translate(&conditional.false_exp)?);
                let mut node = create_parenthesized(create_conditional(cond, when_true, when_false));
                add_parse_span_info(&mut node, conditional.source_span);
                node
            }
            AST::FunctionCall(call) => {
                let receiver = wrap_for_diagnostics(self.translate(&call.target)?);
                let args = self.translate_all(&call.args)?;
                let mut node = create_call(receiver, args);
                add_parse_span_info(&mut node, call.source_span);
                node
            }
            AST::Interpolation(interpolation) => {
                // `"" + (a) + (b)` makes every interpolated value part of a string concatenation.
                let mut node = create_string_literal("");
                for expr in &interpolation.expressions {
                    let expr = wrap_for_type_checker(self.translate(expr)?);
                    node = create_binary(node, BinaryOperator::Plus, expr);
                }
                node
            }
            AST::KeyedRead(read) => {
                let receiver = wrap_for_diagnostics(self.translate(&read.receiver)?);
                let key = self.translate(&read.key)?;
                let mut node = create_element_access(receiver, key);
                add_parse_span_info(&mut node, read.source_span);
                node
            }
            AST::KeyedWrite(write) => {
                let receiver = wrap_for_diagnostics(self.translate(&write.receiver)?);
                let left = create_element_access(receiver, self.translate(&write.key)?);
                let right = wrap_for_type_checker(self.translate(&write.value)?);
                let mut node =
                    wrap_for_diagnostics(create_binary(left, BinaryOperator::Equals, right));
                add_parse_span_info(&mut node, write.source_span);
                node
            }
            AST::LiteralArray(array) => {
                let elements = self.translate_all(&array.expressions)?;
                let literal = create_array_literal(elements);
                let mut node = if self.config.strict_literal_types {
                    literal
                } else {
                    ts_cast_to_any(literal)
                };
                add_parse_span_info(&mut node, array.source_span);
                node
            }
            AST::LiteralMap(map) => {
                let mut properties = Vec::with_capacity(map.keys.len());
                for (key, value) in map.keys.iter().zip(&map.values) {
                    properties.push(create_property_assignment(
                        key.key.clone(),
                        self.translate(value)?,
                    ));
                }
                let literal = create_object_literal(properties);
                let mut node = if self.config.strict_literal_types {
                    literal
                } else {
                    ts_cast_to_any(literal)
                };
                add_parse_span_info(&mut node, map.source_span);
                node
            }
            AST::LiteralPrimitive(primitive) => {
                let mut node = match &primitive.value {
                    LiteralValue::Undefined => undefined(),
                    LiteralValue::Null => create_null(),
                    LiteralValue::Boolean(true) => create_true(),
                    LiteralValue::Boolean(false) => create_false(),
                    LiteralValue::String(value) => create_string_literal(value.clone()),
                    LiteralValue::Number(value) => ts_numeric_expression(*value),
                };
                add_parse_span_info(&mut node, primitive.source_span);
                node
            }
            AST::MethodCall(call) => {
                let receiver = wrap_for_diagnostics(self.translate(&call.receiver)?);
                let mut method = create_property_access(receiver, call.name.clone());
                add_parse_span_info(&mut method, call.name_span);
                let args = self.translate_all(&call.args)?;
                let mut node = create_call(method, args);
                add_parse_span_info(&mut node, call.source_span);
                node
            }
            AST::NonNullAssert(assert) => {
                let expr = wrap_for_diagnostics(self.translate(&assert.expression)?);
                let mut node = create_non_null(expr);
                add_parse_span_info(&mut node, assert.source_span);
                node
            }
            AST::PrefixNot(not) => {
                let expr = wrap_for_diagnostics(self.translate(&not.expression)?);
                let mut node = create_logical_not(expr);
                add_parse_span_info(&mut node, not.source_span);
                node
            }
            AST::PropertyRead(read) => {
                // The access carries the name span, the parentheses around it the full span, so
                // that diagnostics can point at either.
                let receiver = wrap_for_diagnostics(self.translate(&read.receiver)?);
                let mut name = create_property_access(receiver, read.name.clone());
                add_parse_span_info(&mut name, read.name_span);
                let mut node = wrap_for_diagnostics(name);
                add_parse_span_info(&mut node, read.source_span);
                node
            }
            AST::PropertyWrite(write) => {
                let receiver = wrap_for_diagnostics(self.translate(&write.receiver)?);
                let mut left = create_property_access(receiver, write.name.clone());
                add_parse_span_info(&mut left, write.name_span);
                let mut left_with_path = wrap_for_diagnostics(left);
                add_parse_span_info(&mut left_with_path, write.source_span);
                let right = wrap_for_type_checker(self.translate(&write.value)?);
                let mut node = wrap_for_diagnostics(create_binary(
                    left_with_path,
                    BinaryOperator::Equals,
                    right,
                ));
                add_parse_span_info(&mut node, write.source_span);
                node
            }
            AST::Quote(_) => null_as_any(),
            AST::SafePropertyRead(read) => {
                let receiver = wrap_for_diagnostics(self.translate(&read.receiver)?);
                let mut node = if self.config.strict_safe_navigation_types {
                    // "a?.b" becomes "(null as any ? a!.b : undefined)": the conditional makes
                    // the result `T | undefined` without having to narrow `a` first.
                    let mut expr = create_property_access(create_non_null(receiver), read.name.clone());
                    add_parse_span_info(&mut expr, read.name_span);
                    create_parenthesized(create_conditional(null_as_any(), expr, undefined()))
                } else if VeSafeLhsInferenceBugDetector::ve_will_infer_any_for(&read.receiver) {
                    create_property_access(ts_cast_to_any(receiver), read.name.clone())
                } else {
                    let mut expr = create_property_access(create_non_null(receiver), read.name.clone());
                    add_parse_span_info(&mut expr, read.name_span);
                    ts_cast_to_any(expr)
                };
                add_parse_span_info(&mut node, read.source_span);
                node
            }
            AST::SafeMethodCall(call) => {
                let receiver = wrap_for_diagnostics(self.translate(&call.receiver)?);
                let args = self.translate_all(&call.args)?;
                let mut node = if self.config.strict_safe_navigation_types {
                    let mut method =
                        create_property_access(create_non_null(receiver), call.name.clone());
                    add_parse_span_info(&mut method, call.name_span);
                    let call = create_call(method, args);
                    create_parenthesized(create_conditional(null_as_any(), call, undefined()))
                } else if VeSafeLhsInferenceBugDetector::ve_will_infer_any_for(&call.receiver) {
                    let mut method = create_property_access(ts_cast_to_any(receiver), call.name.clone());
                    add_parse_span_info(&mut method, call.name_span);
                    create_call(method, args)
                } else {
                    let mut method =
                        create_property_access(create_non_null(receiver), call.name.clone());
                    add_parse_span_info(&mut method, call.name_span);
                    ts_cast_to_any(create_call(method, args))
                };
                add_parse_span_info(&mut node, call.source_span);
                node
            }
            AST::SafeKeyedRead(read) => {
                let receiver = wrap_for_diagnostics(self.translate(&read.receiver)?);
                let key = self.translate(&read.key)?;
                let mut node = if self.config.strict_safe_navigation_types {
                    let mut expr = create_element_access(create_non_null(receiver), key);
                    add_parse_span_info(&mut expr, read.source_span);
                    create_parenthesized(create_conditional(null_as_any(), expr, undefined()))
                } else if VeSafeLhsInferenceBugDetector::ve_will_infer_any_for(&read.receiver) {
                    create_element_access(ts_cast_to_any(receiver), key)
                } else {
                    let mut expr = create_element_access(create_non_null(receiver), key);
                    add_parse_span_info(&mut expr, read.source_span);
                    ts_cast_to_any(expr)
                };
                add_parse_span_info(&mut node, read.source_span);
                node
            }
            AST::BindingPipe(_) => return Err(TypeCheckError::NotImplemented("visitPipe")),
            AST::ImplicitReceiver(_) => {
                return Err(TypeCheckError::NotImplemented("visitImplicitReceiver"))
            }
            AST::ThisReceiver(_) => return Err(TypeCheckError::NotImplemented("visitThisReceiver")),
            AST::EmptyExpr(_) | AST::ASTWithSource(_) => {
                unreachable!("handled in translate")
            }
        };
        Ok(node)
    }
}

/// Decides whether the legacy View Engine compiler would infer `any` for the receiver of a safe
/// navigation. In non-strict mode such receivers are cast to `any` as well, so templates that
/// compiled there keep compiling.
struct VeSafeLhsInferenceBugDetector;

impl VeSafeLhsInferenceBugDetector {
    fn ve_will_infer_any_for(receiver: &AST) -> bool {
        Self::visit(receiver)
    }

    fn visit(ast: &AST) -> bool {
        match ast.unwrap_source() {
            AST::FunctionCall(_)
            | AST::MethodCall(_)
            | AST::SafeMethodCall(_)
            | AST::BindingPipe(_)
            | AST::LiteralArray(_)
            | AST::LiteralMap(_) => true,
            AST::Unary(unary) => Self::visit(&unary.expr),
            AST::Binary(binary) => Self::visit(&binary.left) || Self::visit(&binary.right),
            AST::Conditional(conditional) => {
                Self::visit(&conditional.condition)
                    || Self::visit(&conditional.true_exp)
                    || Self::visit(&conditional.false_exp)
            }
            AST::Interpolation(interpolation) => interpolation.expressions.iter().any(Self::visit),
            AST::PrefixNot(not) => Self::visit(&not.expression),
            AST::NonNullAssert(assert) => Self::visit(&assert.expression),
            _ => false,
        }
    }
}

use ts::factory::{create_identifier, create_numeric_literal, create_prefix};
use ts::{Expression, PrefixOperator};

/// Creates a node representing a numeric value.
///
/// Negative numbers are represented as a prefix `-` applied to the absolute value, the way the
/// TypeScript printer expects them.
pub fn ts_numeric_expression(value: f64) -> Expression {
    if value.is_nan() {
        return create_identifier("NaN");
    }
    if value < 0.0 {
        return create_prefix(PrefixOperator::Minus, ts_numeric_expression(-value));
    }
    if value.is_infinite() {
        return create_identifier("Infinity");
    }
    create_numeric_literal(format!("{}", value))
}

use ts::factory::{create_identifier, create_property_access, create_type_reference};
use ts::{EntityName, Expression, TypeNode};

use super::import_manager::ImportManager;
use crate::ngtsc::imports::OutputExpr;

/// A type position naming `value`, optionally applied to type arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionType {
    pub value: OutputExpr,
    pub type_params: Option<Vec<TypeNode>>,
}

impl ExpressionType {
    pub fn new(value: OutputExpr, type_params: Option<Vec<TypeNode>>) -> Self {
        Self { value, type_params }
    }
}

/// Translates a value reference, registering any import it needs with `imports`.
pub fn translate_expression(expr: &OutputExpr, imports: &mut ImportManager) -> Expression {
    match expr {
        OutputExpr::Local(name) => create_identifier(name.as_str()),
        OutputExpr::External { module_name, name } => {
            let named = imports.generate_named_import(module_name, name);
            match named.module_import {
                Some(qualifier) => create_property_access(create_identifier(qualifier), named.symbol),
                None => create_identifier(named.symbol),
            }
        }
    }
}

/// Translates a type reference, registering any import it needs with `imports`.
pub fn translate_type(ty: &ExpressionType, imports: &mut ImportManager) -> TypeNode {
    let type_name = match &ty.value {
        OutputExpr::Local(name) => EntityName::identifier(name.as_str()),
        OutputExpr::External { module_name, name } => {
            let named = imports.generate_named_import(module_name, name);
            match named.module_import {
                Some(qualifier) => EntityName::qualified(qualifier, named.symbol),
                None => EntityName::identifier(named.symbol),
            }
        }
    };
    create_type_reference(type_name, ty.type_params.clone())
}

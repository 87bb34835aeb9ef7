// Type Constructors
//
// Type constructors for generic directives.
//
// A type constructor is a function whose signature lets the host type-checker infer a
// directive's generic arguments from the values bound to its inputs:
//
// ```text
// const _ctor1: <T = any>(init: Pick<NgForOf<T>, "ngForOf" | "ngForTrackBy">) => NgForOf<T> = null!;
// ```
//
// Calling `_ctor1({ngForOf: items, ngForTrackBy: null as any})` yields an instance typed after
// `items`. Inputs with an `ngAcceptInputType_*` coercion member are typed through that member
// instead of being picked from the class.

use ts::factory::*;
use ts::{
    EntityName, FunctionDeclaration, FunctionTypeNode, MethodDeclaration, Parameter,
    PropertySignature, Statement, TypeNode, TypeParameterDeclaration, VariableKeyword,
};

use super::tcb_util::check_if_generic_type_bounds_are_context_free;
use super::ts_util::ts_create_type_query_for_coerced_input;
use crate::ngtsc::reflection::{ClassDeclaration, ReflectionHost};
use crate::ngtsc::typecheck::api::{Result, TypeCheckError, TypeCtorMetadata};

/// Builds a type constructor declared outside of the directive, in a shim file.
///
/// `node_type_ref` names the directive in the shim and `type_params` are its type parameters as
/// emitted there.
pub fn generate_type_ctor_declaration_fn(
    node: &ClassDeclaration,
    meta: &TypeCtorMetadata,
    node_type_ref: &EntityName,
    type_params: Option<Vec<TypeParameterDeclaration>>,
    reflector: &dyn ReflectionHost,
) -> Result<Statement> {
    if requires_inline_type_ctor(node, reflector) {
        return Err(TypeCheckError::RequiresInlineTypeCtor(node.name.clone()));
    }

    let raw_type_args = type_params.as_deref().map(generate_generic_args);
    let raw_type = create_type_reference(node_type_ref.clone(), raw_type_args);
    let init_param = construct_type_ctor_parameter(meta, node_type_ref, &raw_type);
    let type_parameters = type_parameters_with_default_types(type_params);

    let statement = if meta.body {
        let fn_type = TypeNode::Function(FunctionTypeNode {
            type_parameters,
            parameters: vec![init_param],
            return_type: Box::new(raw_type),
        });
        create_variable_statement(
            VariableKeyword::Const,
            create_identifier(meta.fn_name.clone()),
            Some(fn_type),
            Some(create_non_null(create_null())),
        )
    } else {
        Statement::Function(FunctionDeclaration {
            declare: true,
            name: meta.fn_name.clone(),
            type_parameters,
            parameters: vec![init_param],
            return_type: Some(raw_type),
            body: None,
            leading_comments: Vec::new(),
        })
    };
    Ok(statement)
}

/// Builds a type constructor as a static method, to be spliced into the directive class itself.
pub fn generate_inline_type_ctor(node: &ClassDeclaration, meta: &TypeCtorMetadata) -> Statement {
    let type_name = EntityName::identifier(node.name.clone());
    let raw_type_args = node.type_parameters.as_deref().map(generate_generic_args);
    let raw_type = create_type_reference(type_name.clone(), raw_type_args);
    let init_param = construct_type_ctor_parameter(meta, &type_name, &raw_type);

    let body = if meta.body {
        Some(vec![create_return(Some(create_non_null(create_null())))])
    } else {
        None
    };

    Statement::Method(MethodDeclaration {
        is_static: true,
        name: meta.fn_name.clone(),
        type_parameters: type_parameters_with_default_types(node.type_parameters.clone()),
        parameters: vec![init_param],
        return_type: Some(raw_type),
        body,
    })
}

fn construct_type_ctor_parameter(
    meta: &TypeCtorMetadata,
    type_name: &EntityName,
    raw_type: &TypeNode,
) -> Parameter {
    let mut plain_keys = Vec::new();
    let mut coerced_keys = Vec::new();
    for key in &meta.fields.inputs {
        if meta.coerced_input_fields.contains(key) {
            coerced_keys.push(PropertySignature {
                name: key.clone(),
                optional: false,
                type_node: ts_create_type_query_for_coerced_input(type_name, key),
            });
        } else {
            plain_keys.push(create_string_literal_type(key.clone()));
        }
    }

    let mut init_type = None;
    if !plain_keys.is_empty() {
        init_type = Some(create_type_reference(
            EntityName::identifier("Pick"),
            Some(vec![raw_type.clone(), TypeNode::Union(plain_keys)]),
        ));
    }
    if !coerced_keys.is_empty() {
        let coerced_literal = TypeNode::TypeLiteral(coerced_keys);
        init_type = Some(match init_type {
            Some(picked) => TypeNode::Intersection(vec![picked, coerced_literal]),
            None => coerced_literal,
        });
    }

    Parameter::new(
        "init",
        Some(init_type.unwrap_or_else(|| TypeNode::TypeLiteral(Vec::new()))),
    )
}

fn generate_generic_args(params: &[TypeParameterDeclaration]) -> Vec<TypeNode> {
    params
        .iter()
        .map(|param| create_type_reference(EntityName::identifier(param.name.clone()), None))
        .collect()
}

/// Whether a type constructor for `node` can only be written inside its own file.
pub fn requires_inline_type_ctor(node: &ClassDeclaration, host: &dyn ReflectionHost) -> bool {
    // The bounds have to be expressible in the shim for the constructor to live there.
    !check_if_generic_type_bounds_are_context_free(node, host)
}

/// Gives every parameter without a default an `any` default, so the constructor can be
/// referenced without explicit type arguments.
fn type_parameters_with_default_types(
    params: Option<Vec<TypeParameterDeclaration>>,
) -> Option<Vec<TypeParameterDeclaration>> {
    params.map(|params| {
        params
            .into_iter()
            .map(|mut param| {
                if param.default.is_none() {
                    param.default = Some(create_any_type());
                }
                param
            })
            .collect()
    })
}

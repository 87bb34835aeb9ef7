use indexmap::IndexSet;
use ts::factory::create_type_reference;
use ts::{EntityName, Printer};

use super::super::api::{TypeCheckError, TypeCtorFields, TypeCtorMetadata};
use super::super::src::type_constructor::{
    generate_inline_type_ctor, generate_type_ctor_declaration_fn, requires_inline_type_ctor,
};
use super::super::testing::class;
use crate::ngtsc::testing::TestReflectionHost;

fn meta(fn_name: &str, body: bool, inputs: &[&str], coerced: &[&str]) -> TypeCtorMetadata {
    TypeCtorMetadata {
        fn_name: fn_name.to_string(),
        body,
        fields: TypeCtorFields {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: vec![],
            queries: vec![],
        },
        coerced_input_fields: coerced.iter().map(|s| s.to_string()).collect::<IndexSet<_>>(),
    }
}

fn print(stmt: &ts::Statement) -> String {
    Printer::new(true).print_statement(stmt)
}

#[test]
fn test_declared_in_shim() {
    let node = class(5, "NgForOf", "ng_for_of").type_param(6, "T", None).build();
    let host = TestReflectionHost::new();
    let type_params = node.type_parameters.clone();

    let stmt = generate_type_ctor_declaration_fn(
        &node,
        &meta("_ctor1", true, &["ngForOf", "ngForTrackBy"], &[]),
        &EntityName::qualified("i1", "NgForOf"),
        type_params,
        &host,
    )
    .unwrap();

    assert_eq!(
        print(&stmt),
        "const _ctor1: <T = any>(init: Pick<i1.NgForOf<T>, \"ngForOf\" | \"ngForTrackBy\">) => i1.NgForOf<T> = null!;"
    );
}

#[test]
fn test_declaration_without_body() {
    let node = class(5, "Dir", "dir").type_param(6, "T", None).build();
    let host = TestReflectionHost::new();
    let type_params = node.type_parameters.clone();

    let stmt = generate_type_ctor_declaration_fn(
        &node,
        &meta("ngTypeCtor", false, &["value"], &[]),
        &EntityName::identifier("Dir"),
        type_params,
        &host,
    )
    .unwrap();

    assert_eq!(
        print(&stmt),
        "declare function ngTypeCtor<T = any>(init: Pick<Dir<T>, \"value\">): Dir<T>;"
    );
}

#[test]
fn test_coerced_inputs_use_accept_type() {
    let node = class(5, "Dir", "dir").type_param(6, "T", None).build();
    let host = TestReflectionHost::new();
    let type_params = node.type_parameters.clone();

    let stmt = generate_type_ctor_declaration_fn(
        &node,
        &meta("_ctor1", true, &["value", "disabled"], &["disabled"]),
        &EntityName::qualified("i1", "Dir"),
        type_params,
        &host,
    )
    .unwrap();

    let text = print(&stmt);
    assert!(text.contains(
        "(init: Pick<i1.Dir<T>, \"value\"> & { disabled: typeof i1.Dir.ngAcceptInputType_disabled; })"
    ));
}

#[test]
fn test_only_coerced_inputs() {
    let node = class(5, "Dir", "dir").type_param(6, "T", None).build();
    let host = TestReflectionHost::new();
    let type_params = node.type_parameters.clone();

    let stmt = generate_type_ctor_declaration_fn(
        &node,
        &meta("_ctor1", true, &["disabled"], &["disabled"]),
        &EntityName::identifier("Dir"),
        type_params,
        &host,
    )
    .unwrap();

    let text = print(&stmt);
    assert!(text.contains("(init: { disabled: typeof Dir.ngAcceptInputType_disabled; })"));
    assert!(!text.contains("Pick"));
}

#[test]
fn test_no_inputs_takes_empty_object() {
    let node = class(5, "Dir", "dir").type_param(6, "T", None).build();
    let host = TestReflectionHost::new();
    let type_params = node.type_parameters.clone();

    let stmt = generate_type_ctor_declaration_fn(
        &node,
        &meta("_ctor1", true, &[], &[]),
        &EntityName::identifier("Dir"),
        type_params,
        &host,
    )
    .unwrap();

    assert!(print(&stmt).contains("(init: {}) => Dir<T>"));
}

#[test]
fn test_inline_static_method() {
    let node = class(5, "Dir", "dir").type_param(6, "T", None).build();

    let stmt = generate_inline_type_ctor(&node, &meta("ngTypeCtor", true, &["value"], &[]));
    assert_eq!(
        print(&stmt),
        "static ngTypeCtor<T = any>(init: Pick<Dir<T>, \"value\">): Dir<T> {\n    return null!;\n}"
    );
}

#[test]
fn test_requires_inline_for_unresolvable_bound() {
    let bound = create_type_reference(EntityName::identifier("Local"), None);
    let node = class(5, "Dir", "dir").type_param(6, "T", Some(bound)).build();
    let host = TestReflectionHost::new();

    assert!(requires_inline_type_ctor(&node, &host));

    let type_params = node.type_parameters.clone();
    let result = generate_type_ctor_declaration_fn(
        &node,
        &meta("_ctor1", true, &["value"], &[]),
        &EntityName::identifier("Dir"),
        type_params,
        &host,
    );
    assert!(matches!(result, Err(TypeCheckError::RequiresInlineTypeCtor(name)) if name == "Dir"));
}

#[test]
fn test_exported_bound_can_live_in_shim() {
    let bound_decl = class(7, "Model", "model").build();
    let bound = create_type_reference(EntityName::identifier("Model"), None);
    let node = class(5, "Dir", "dir").type_param(6, "T", Some(bound)).build();
    let mut host = TestReflectionHost::new();
    host.declare("Model", bound_decl);

    assert!(!requires_inline_type_ctor(&node, &host));
}

#[test]
fn test_non_generic_never_requires_inline() {
    let node = class(5, "Dir", "dir").build();
    assert!(!requires_inline_type_ctor(&node, &TestReflectionHost::new()));
}

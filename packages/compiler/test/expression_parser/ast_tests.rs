/**
 * AST Tests
 *
 * Child traversal, identity keys and spans of expression nodes.
 */

#[cfg(test)]
mod tests {
    use ngtcb_compiler::expression_parser::ast::*;

    fn implicit(at: usize) -> AST {
        AST::ImplicitReceiver(ImplicitReceiver {
            span: ParseSpan::new(at, at),
            source_span: AbsoluteSourceSpan::new(at, at),
        })
    }

    fn read(name: &str, at: usize) -> AST {
        let span = AbsoluteSourceSpan::new(at, at + name.len());
        AST::PropertyRead(PropertyRead {
            span: ParseSpan::new(at, at + name.len()),
            source_span: span,
            name_span: span,
            receiver: Box::new(implicit(at)),
            name: name.to_string(),
        })
    }

    fn number(value: f64, at: usize, len: usize) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span: ParseSpan::new(at, at + len),
            source_span: AbsoluteSourceSpan::new(at, at + len),
            value: LiteralValue::Number(value),
        })
    }

    /// Collects node kinds in pre-order.
    fn path(ast: &AST) -> Vec<&'static str> {
        let mut out = vec![ast.kind_name()];
        ast.for_each_child(&mut |child| out.extend(path(child)));
        out
    }

    #[test]
    fn should_visit_children_in_source_order() {
        // a + 1
        let ast = AST::Binary(Binary {
            span: ParseSpan::new(0, 5),
            source_span: AbsoluteSourceSpan::new(0, 5),
            operation: "+".to_string(),
            left: Box::new(read("a", 0)),
            right: Box::new(number(1.0, 4, 1)),
        });

        assert_eq!(
            path(&ast),
            vec!["Binary", "PropertyRead", "ImplicitReceiver", "LiteralPrimitive"]
        );
    }

    #[test]
    fn should_visit_method_call_receiver_before_arguments() {
        // a.b(c)
        let ast = AST::MethodCall(MethodCall {
            span: ParseSpan::new(0, 6),
            source_span: AbsoluteSourceSpan::new(0, 6),
            name_span: AbsoluteSourceSpan::new(2, 3),
            receiver: Box::new(read("a", 0)),
            name: "b".to_string(),
            args: vec![read("c", 4)],
        });

        let mut names = Vec::new();
        ast.for_each_child(&mut |child| {
            if let AST::PropertyRead(read) = child {
                names.push(read.name.clone());
            }
        });
        assert_eq!(names, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn should_unwrap_ast_with_source() {
        let inner = read("value", 10);
        let wrapped = AST::ASTWithSource(ASTWithSource {
            ast: Box::new(inner.clone()),
            source: Some("value".to_string()),
            location: "test.html".to_string(),
            absolute_offset: 10,
        });

        assert_eq!(wrapped.unwrap_source(), &inner);
        assert_eq!(wrapped.source_span(), AbsoluteSourceSpan::new(10, 15));
        assert_eq!(wrapped.kind_name(), "ASTWithSource");
    }

    #[test]
    fn should_distinguish_keys_by_kind_and_span() {
        let a = read("a", 0);
        let a_again = read("a", 0);
        let b = read("a", 5);

        assert_eq!(a.key(), a_again.key());
        assert_ne!(a.key(), b.key());
        // The receiver shares the start offset but is a different node.
        assert_ne!(a.key(), implicit(0).key());
    }

    #[test]
    fn should_treat_this_as_an_implicit_receiver() {
        let this = AST::ThisReceiver(ThisReceiver {
            span: ParseSpan::new(0, 4),
            source_span: AbsoluteSourceSpan::new(0, 4),
        });

        assert!(this.is_implicit_receiver());
        assert!(implicit(0).is_implicit_receiver());
        assert!(!read("a", 0).is_implicit_receiver());
    }

    #[test]
    fn should_convert_relative_spans_to_absolute() {
        let span = ParseSpan::new(2, 7);
        assert_eq!(span.to_absolute(100), AbsoluteSourceSpan::new(102, 107));
    }

    #[test]
    fn should_serialize_with_a_type_tag() {
        let json = serde_json::to_value(number(42.0, 0, 2)).unwrap();
        assert_eq!(json["type"], "LiteralPrimitive");
        assert_eq!(json["data"]["value"]["Number"], 42.0);
    }
}

//! Printer for the synthetic syntax tree.
//!
//! Output follows the layout of the TypeScript printer: four-space indentation, one statement
//! per line, synthetic comments emitted as `/*text*/` right after the node they belong to.

use crate::node::*;

/// Location of a node within printed text, as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePosition {
    pub start: usize,
    /// End of the node itself, excluding trailing comments.
    pub end: usize,
    /// Span of the name token for property accesses.
    pub name_span: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    remove_comments: bool,
}

impl Printer {
    pub fn new(remove_comments: bool) -> Self {
        Self { remove_comments }
    }

    pub fn print_statement(&self, stmt: &Statement) -> String {
        let mut writer = Writer::new(self.remove_comments, None);
        writer.statement(stmt);
        writer.out
    }

    pub fn print_expression(&self, expr: &Expression) -> String {
        let mut writer = Writer::new(self.remove_comments, None);
        writer.expression(expr);
        writer.out
    }

    pub fn print_type(&self, type_node: &TypeNode) -> String {
        let mut writer = Writer::new(self.remove_comments, None);
        writer.type_node(type_node);
        writer.out
    }

    /// Prints `stmt` and reports where `target` (which must be a node inside `stmt`, compared
    /// by address) ended up in the output.
    pub fn locate(&self, stmt: &Statement, target: &Expression) -> Option<NodePosition> {
        let mut writer = Writer::new(self.remove_comments, Some(target as *const Expression));
        writer.statement(stmt);
        writer.found
    }
}

struct Writer {
    out: String,
    indent: usize,
    remove_comments: bool,
    target: Option<*const Expression>,
    found: Option<NodePosition>,
}

impl Writer {
    fn new(remove_comments: bool, target: Option<*const Expression>) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            remove_comments,
            target,
            found: None,
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn comments(&mut self, comments: &[String]) {
        if self.remove_comments {
            return;
        }
        for comment in comments {
            self.out.push_str(" /*");
            self.out.push_str(comment);
            self.out.push_str("*/");
        }
    }

    fn list<T>(&mut self, items: &[T], separator: &str, mut each: impl FnMut(&mut Self, &T)) {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.out.push_str(separator);
            }
            each(self, item);
        }
    }

    // --- Statements ---

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Variable(var) => {
                self.out.push_str(var.keyword.as_str());
                self.out.push(' ');
                self.expression(&var.name);
                if let Some(type_node) = &var.type_node {
                    self.out.push_str(": ");
                    self.type_node(type_node);
                }
                if let Some(init) = &var.initializer {
                    self.out.push_str(" = ");
                    self.expression(init);
                }
                self.comments(&var.comments);
                self.out.push(';');
            }
            Statement::Function(func) => {
                if !self.remove_comments {
                    for comment in &func.leading_comments {
                        self.out.push_str("/*");
                        self.out.push_str(comment);
                        self.out.push_str("*/");
                        self.newline();
                    }
                }
                if func.declare {
                    self.out.push_str("declare ");
                }
                self.out.push_str("function ");
                self.out.push_str(&func.name);
                self.signature(
                    func.type_parameters.as_deref(),
                    &func.parameters,
                    func.return_type.as_ref(),
                );
                match &func.body {
                    Some(body) => {
                        self.out.push(' ');
                        self.block(body);
                    }
                    None => self.out.push(';'),
                }
            }
            Statement::Method(method) => {
                if method.is_static {
                    self.out.push_str("static ");
                }
                self.out.push_str(&method.name);
                self.signature(
                    method.type_parameters.as_deref(),
                    &method.parameters,
                    method.return_type.as_ref(),
                );
                match &method.body {
                    Some(body) => {
                        self.out.push(' ');
                        self.block(body);
                    }
                    None => self.out.push(';'),
                }
            }
            Statement::Expression(expr) => {
                self.expression(expr);
                self.out.push(';');
            }
            Statement::If {
                condition,
                then_statement,
            } => {
                self.out.push_str("if (");
                self.expression(condition);
                self.out.push(')');
                match then_statement.as_ref() {
                    Statement::Block(stmts) => {
                        self.out.push(' ');
                        self.block(stmts);
                    }
                    other => {
                        self.indent += 1;
                        self.newline();
                        self.statement(other);
                        self.indent -= 1;
                    }
                }
            }
            Statement::Block(stmts) => self.block(stmts),
            Statement::Return(expr) => {
                self.out.push_str("return");
                if let Some(expr) = expr {
                    self.out.push(' ');
                    self.expression(expr);
                }
                self.out.push(';');
            }
        }
    }

    fn block(&mut self, stmts: &[Statement]) {
        if stmts.is_empty() {
            self.out.push_str("{ }");
            return;
        }
        self.out.push('{');
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.statement(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn signature(
        &mut self,
        type_parameters: Option<&[TypeParameterDeclaration]>,
        parameters: &[Parameter],
        return_type: Option<&TypeNode>,
    ) {
        if let Some(params) = type_parameters {
            self.type_parameters(params);
        }
        self.out.push('(');
        self.list(parameters, ", ", |w, p| w.parameter(p));
        self.out.push(')');
        if let Some(ret) = return_type {
            self.out.push_str(": ");
            self.type_node(ret);
        }
    }

    fn type_parameters(&mut self, params: &[TypeParameterDeclaration]) {
        if params.is_empty() {
            return;
        }
        self.out.push('<');
        self.list(params, ", ", |w, p| {
            w.out.push_str(&p.name);
            if let Some(constraint) = &p.constraint {
                w.out.push_str(" extends ");
                w.type_node(constraint);
            }
            if let Some(default) = &p.default {
                w.out.push_str(" = ");
                w.type_node(default);
            }
        });
        self.out.push('>');
    }

    fn parameter(&mut self, param: &Parameter) {
        self.out.push_str(&param.name);
        if param.optional {
            self.out.push('?');
        }
        if let Some(type_node) = &param.type_node {
            self.out.push_str(": ");
            self.type_node(type_node);
        }
        self.comments(&param.comments);
    }

    // --- Expressions ---

    fn expression(&mut self, expr: &Expression) {
        let start = self.out.len();
        let mut name_span = None;
        match &expr.kind {
            ExpressionKind::Identifier(name) => self.out.push_str(name),
            ExpressionKind::StringLiteral(value) => self.string_literal(value),
            ExpressionKind::NumericLiteral(value) => self.out.push_str(value),
            ExpressionKind::BooleanLiteral(value) => {
                self.out.push_str(if *value { "true" } else { "false" })
            }
            ExpressionKind::Null => self.out.push_str("null"),
            ExpressionKind::PropertyAccess { expression, name } => {
                self.expression(expression);
                self.out.push('.');
                let name_start = self.out.len();
                self.out.push_str(name);
                name_span = Some((name_start, self.out.len()));
            }
            ExpressionKind::ElementAccess {
                expression,
                argument,
            } => {
                self.expression(expression);
                self.out.push('[');
                self.expression(argument);
                self.out.push(']');
            }
            ExpressionKind::Call {
                expression,
                arguments,
            } => {
                self.expression(expression);
                self.out.push('(');
                self.list(arguments, ", ", |w, a| w.expression(a));
                self.out.push(')');
            }
            ExpressionKind::Prefix { operator, operand } => {
                self.out.push_str(operator.as_str());
                self.expression(operand);
            }
            ExpressionKind::Binary {
                left,
                operator,
                right,
            } => {
                self.expression(left);
                self.out.push(' ');
                self.out.push_str(operator.as_str());
                self.out.push(' ');
                self.expression(right);
            }
            ExpressionKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.expression(condition);
                self.out.push_str(" ? ");
                self.expression(when_true);
                self.out.push_str(" : ");
                self.expression(when_false);
            }
            ExpressionKind::Parenthesized(inner) => {
                self.out.push('(');
                self.expression(inner);
                self.out.push(')');
            }
            ExpressionKind::NonNull(inner) => {
                self.expression(inner);
                self.out.push('!');
            }
            ExpressionKind::As {
                expression,
                type_node,
            } => {
                self.expression(expression);
                self.out.push_str(" as ");
                self.type_node(type_node);
            }
            ExpressionKind::ArrayLiteral(elements) => {
                self.out.push('[');
                self.list(elements, ", ", |w, e| w.expression(e));
                self.out.push(']');
            }
            ExpressionKind::ObjectLiteral(properties) => {
                if properties.is_empty() {
                    self.out.push_str("{}");
                } else {
                    self.out.push_str("{ ");
                    self.list(properties, ", ", |w, p| {
                        w.string_literal(&p.name);
                        w.out.push_str(": ");
                        w.expression(&p.initializer);
                        w.comments(&p.comments);
                    });
                    self.out.push_str(" }");
                }
            }
            ExpressionKind::CommaList(elements) => {
                self.list(elements, ", ", |w, e| w.expression(e));
            }
            ExpressionKind::Function {
                parameters,
                return_type,
                body,
            } => {
                self.out.push_str("function ");
                self.signature(None, parameters, return_type.as_deref());
                self.out.push(' ');
                self.block(body);
            }
        }
        let end = self.out.len();
        if self.found.is_none() && self.target == Some(expr as *const Expression) {
            self.found = Some(NodePosition {
                start,
                end,
                name_span,
            });
        }
        self.comments(&expr.comments);
    }

    fn string_literal(&mut self, value: &str) {
        self.out.push('"');
        for ch in value.chars() {
            match ch {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_control() => self.out.push_str(&format!("\\u{:04X}", c as u32)),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    // --- Types ---

    fn entity_name(&mut self, name: &EntityName) {
        match name {
            EntityName::Identifier(id) => self.out.push_str(id),
            EntityName::Qualified { left, right } => {
                self.entity_name(left);
                self.out.push('.');
                self.out.push_str(right);
            }
        }
    }

    fn type_node(&mut self, type_node: &TypeNode) {
        match type_node {
            TypeNode::Keyword(keyword) => self.out.push_str(keyword.as_str()),
            TypeNode::Reference(reference) => {
                self.entity_name(&reference.type_name);
                if let Some(args) = &reference.type_arguments {
                    self.out.push('<');
                    self.list(args, ", ", |w, t| w.type_node(t));
                    self.out.push('>');
                }
                self.comments(&reference.comments);
            }
            TypeNode::Union(types) => self.list(types, " | ", |w, t| w.type_node(t)),
            TypeNode::Intersection(types) => self.list(types, " & ", |w, t| w.type_node(t)),
            TypeNode::Literal(literal) => match literal {
                LiteralType::String(value) => self.string_literal(value),
                LiteralType::Number(value) => self.out.push_str(value),
                LiteralType::Boolean(value) => {
                    self.out.push_str(if *value { "true" } else { "false" })
                }
                LiteralType::Null => self.out.push_str("null"),
            },
            TypeNode::TypeLiteral(members) => {
                if members.is_empty() {
                    self.out.push_str("{}");
                } else {
                    self.out.push_str("{ ");
                    for member in members {
                        if is_identifier_name(&member.name) {
                            self.out.push_str(&member.name);
                        } else {
                            self.string_literal(&member.name);
                        }
                        if member.optional {
                            self.out.push('?');
                        }
                        self.out.push_str(": ");
                        self.type_node(&member.type_node);
                        self.out.push_str("; ");
                    }
                    self.out.push('}');
                }
            }
            TypeNode::Array(element) => {
                self.type_node(element);
                self.out.push_str("[]");
            }
            TypeNode::Tuple(types) => {
                self.out.push('[');
                self.list(types, ", ", |w, t| w.type_node(t));
                self.out.push(']');
            }
            TypeNode::Function(function) => {
                if let Some(params) = &function.type_parameters {
                    self.type_parameters(params);
                }
                self.out.push('(');
                self.list(&function.parameters, ", ", |w, p| w.parameter(p));
                self.out.push_str(") => ");
                self.type_node(&function.return_type);
            }
            TypeNode::TypeQuery(name) => {
                self.out.push_str("typeof ");
                self.entity_name(name);
            }
            TypeNode::IndexedAccess {
                object_type,
                index_type,
            } => {
                self.type_node(object_type);
                self.out.push('[');
                self.type_node(index_type);
                self.out.push(']');
            }
            TypeNode::Parenthesized(inner) => {
                self.out.push('(');
                self.type_node(inner);
                self.out.push(')');
            }
        }
    }
}

/// Whether `name` can be printed as a bare identifier.
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

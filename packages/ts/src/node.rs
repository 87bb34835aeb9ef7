//! Synthetic syntax tree for generated TypeScript code.
//!
//! Only the shapes the type-check code generator produces are modelled. Every expression
//! carries a list of synthetic trailing comments (`/*...*/`) which the printer emits right
//! after the node, in insertion order.

/// Stable identity of a declaration (class, interface, type parameter, ...) within one
/// compilation. Caches that would otherwise key on node identity key on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(pub u32);

// --- Expressions ---

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Identifier(String),
    StringLiteral(String),
    NumericLiteral(String),
    BooleanLiteral(bool),
    Null,
    PropertyAccess {
        expression: Box<Expression>,
        name: String,
    },
    ElementAccess {
        expression: Box<Expression>,
        argument: Box<Expression>,
    },
    Call {
        expression: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        when_true: Box<Expression>,
        when_false: Box<Expression>,
    },
    Parenthesized(Box<Expression>),
    NonNull(Box<Expression>),
    As {
        expression: Box<Expression>,
        type_node: Box<TypeNode>,
    },
    ArrayLiteral(Vec<Expression>),
    ObjectLiteral(Vec<PropertyAssignment>),
    CommaList(Vec<Expression>),
    /// `function (params): type { body }`
    Function {
        parameters: Vec<Parameter>,
        return_type: Option<Box<TypeNode>>,
        body: Vec<Statement>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self {
            kind,
            comments: Vec::new(),
        }
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.add_comment(comment);
        self
    }

    /// A copy of this node without its trailing comments.
    pub fn without_comments(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            comments: Vec::new(),
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, ExpressionKind::Identifier(_))
    }

    pub fn is_property_access(&self) -> bool {
        matches!(self.kind, ExpressionKind::PropertyAccess { .. })
    }

    pub fn is_parenthesized(&self) -> bool {
        matches!(self.kind, ExpressionKind::Parenthesized(_))
    }

    /// Property and element accesses.
    pub fn is_access_expression(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::PropertyAccess { .. } | ExpressionKind::ElementAccess { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    Plus,
    Minus,
    Exclamation,
}

impl PrefixOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOperator::Plus => "+",
            PrefixOperator::Minus => "-",
            PrefixOperator::Exclamation => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    EqualsEquals,
    EqualsEqualsEquals,
    ExclamationEquals,
    ExclamationEqualsEquals,
    AmpersandAmpersand,
    BarBar,
    QuestionQuestion,
    Ampersand,
    Bar,
    Equals,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Asterisk => "*",
            BinaryOperator::Slash => "/",
            BinaryOperator::Percent => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanEquals => "<=",
            BinaryOperator::GreaterThanEquals => ">=",
            BinaryOperator::EqualsEquals => "==",
            BinaryOperator::EqualsEqualsEquals => "===",
            BinaryOperator::ExclamationEquals => "!=",
            BinaryOperator::ExclamationEqualsEquals => "!==",
            BinaryOperator::AmpersandAmpersand => "&&",
            BinaryOperator::BarBar => "||",
            BinaryOperator::QuestionQuestion => "??",
            BinaryOperator::Ampersand => "&",
            BinaryOperator::Bar => "|",
            BinaryOperator::Equals => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAssignment {
    /// Printed as a string literal key.
    pub name: String,
    pub initializer: Expression,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub optional: bool,
    pub type_node: Option<TypeNode>,
    pub comments: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_node: Option<TypeNode>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            type_node,
            comments: Vec::new(),
        }
    }
}

// --- Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordType {
    Any,
    Unknown,
    Never,
    String,
    Number,
    Boolean,
    Void,
    Undefined,
    Null,
    Object,
    Symbol,
    BigInt,
}

impl KeywordType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordType::Any => "any",
            KeywordType::Unknown => "unknown",
            KeywordType::Never => "never",
            KeywordType::String => "string",
            KeywordType::Number => "number",
            KeywordType::Boolean => "boolean",
            KeywordType::Void => "void",
            KeywordType::Undefined => "undefined",
            KeywordType::Null => "null",
            KeywordType::Object => "object",
            KeywordType::Symbol => "symbol",
            KeywordType::BigInt => "bigint",
        }
    }
}

/// `Foo` or `ns.Foo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityName {
    Identifier(String),
    Qualified { left: Box<EntityName>, right: String },
}

impl EntityName {
    pub fn identifier(name: impl Into<String>) -> Self {
        EntityName::Identifier(name.into())
    }

    pub fn qualified(left: impl Into<String>, right: impl Into<String>) -> Self {
        EntityName::Qualified {
            left: Box::new(EntityName::Identifier(left.into())),
            right: right.into(),
        }
    }

    /// The right-most identifier, which is what a declaration lookup resolves.
    pub fn right_most(&self) -> &str {
        match self {
            EntityName::Identifier(name) => name,
            EntityName::Qualified { right, .. } => right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeReferenceNode {
    pub type_name: EntityName,
    pub type_arguments: Option<Vec<TypeNode>>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub optional: bool,
    pub type_node: TypeNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeNode {
    pub type_parameters: Option<Vec<TypeParameterDeclaration>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Box<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Keyword(KeywordType),
    Reference(TypeReferenceNode),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Literal(LiteralType),
    TypeLiteral(Vec<PropertySignature>),
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Function(FunctionTypeNode),
    TypeQuery(EntityName),
    IndexedAccess {
        object_type: Box<TypeNode>,
        index_type: Box<TypeNode>,
    },
    Parenthesized(Box<TypeNode>),
}

impl TypeNode {
    pub fn as_type_reference(&self) -> Option<&TypeReferenceNode> {
        match self {
            TypeNode::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Direct child type nodes, in source order.
    pub fn children(&self) -> Vec<&TypeNode> {
        match self {
            TypeNode::Keyword(_)
            | TypeNode::Literal(_)
            | TypeNode::TypeQuery(_) => Vec::new(),
            TypeNode::Reference(reference) => reference
                .type_arguments
                .iter()
                .flatten()
                .collect(),
            TypeNode::Union(types) | TypeNode::Intersection(types) | TypeNode::Tuple(types) => {
                types.iter().collect()
            }
            TypeNode::TypeLiteral(members) => members.iter().map(|m| &m.type_node).collect(),
            TypeNode::Array(element) | TypeNode::Parenthesized(element) => vec![element.as_ref()],
            TypeNode::Function(function) => {
                let mut children = Vec::new();
                for param in function.type_parameters.iter().flatten() {
                    children.extend(param.constraint.iter());
                    children.extend(param.default.iter());
                }
                for param in &function.parameters {
                    children.extend(param.type_node.iter());
                }
                children.push(function.return_type.as_ref());
                children
            }
            TypeNode::IndexedAccess {
                object_type,
                index_type,
            } => vec![object_type.as_ref(), index_type.as_ref()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterDeclaration {
    pub id: DeclarationId,
    pub name: String,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
}

impl TypeParameterDeclaration {
    pub fn new(id: DeclarationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            constraint: None,
            default: None,
        }
    }
}

// --- Statements ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKeyword {
    Var,
    Let,
    Const,
}

impl VariableKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKeyword::Var => "var",
            VariableKeyword::Let => "let",
            VariableKeyword::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableStatement {
    pub keyword: VariableKeyword,
    /// The bound identifier; may carry its own span comments.
    pub name: Expression,
    pub type_node: Option<TypeNode>,
    pub initializer: Option<Expression>,
    /// Comments attached to the declaration as a whole.
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub declare: bool,
    pub name: String,
    pub type_parameters: Option<Vec<TypeParameterDeclaration>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    pub body: Option<Vec<Statement>>,
    pub leading_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub is_static: bool,
    pub name: String,
    pub type_parameters: Option<Vec<TypeParameterDeclaration>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    pub body: Option<Vec<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Variable(VariableStatement),
    Function(FunctionDeclaration),
    Method(MethodDeclaration),
    Expression(Expression),
    If {
        condition: Expression,
        then_statement: Box<Statement>,
    },
    Block(Vec<Statement>),
    Return(Option<Expression>),
}

// --- Traversal ---

/// A borrowed view of any traversable node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> Node<'a> {
    pub fn as_expression(self) -> Option<&'a Expression> {
        match self {
            Node::Expression(expr) => Some(expr),
            Node::Statement(_) => None,
        }
    }
}

/// Invokes `cb` for each direct child of `node` in source order, stopping at the first
/// `Some` result.
pub fn for_each_child<'a, T>(
    node: Node<'a>,
    cb: &mut dyn FnMut(Node<'a>) -> Option<T>,
) -> Option<T> {
    match node {
        Node::Statement(stmt) => for_each_statement_child(stmt, cb),
        Node::Expression(expr) => for_each_expression_child(expr, cb),
    }
}

fn for_each_statements<'a, T>(
    stmts: &'a [Statement],
    cb: &mut dyn FnMut(Node<'a>) -> Option<T>,
) -> Option<T> {
    stmts.iter().find_map(|stmt| cb(Node::Statement(stmt)))
}

fn for_each_statement_child<'a, T>(
    stmt: &'a Statement,
    cb: &mut dyn FnMut(Node<'a>) -> Option<T>,
) -> Option<T> {
    match stmt {
        Statement::Variable(var) => cb(Node::Expression(&var.name))
            .or_else(|| var.initializer.as_ref().and_then(|init| cb(Node::Expression(init)))),
        Statement::Function(func) => func
            .body
            .as_deref()
            .and_then(|body| for_each_statements(body, cb)),
        Statement::Method(method) => method
            .body
            .as_deref()
            .and_then(|body| for_each_statements(body, cb)),
        Statement::Expression(expr) => cb(Node::Expression(expr)),
        Statement::If {
            condition,
            then_statement,
        } => cb(Node::Expression(condition)).or_else(|| cb(Node::Statement(then_statement))),
        Statement::Block(stmts) => for_each_statements(stmts, cb),
        Statement::Return(expr) => expr.as_ref().and_then(|e| cb(Node::Expression(e))),
    }
}

fn for_each_expression_child<'a, T>(
    expr: &'a Expression,
    cb: &mut dyn FnMut(Node<'a>) -> Option<T>,
) -> Option<T> {
    match &expr.kind {
        ExpressionKind::Identifier(_)
        | ExpressionKind::StringLiteral(_)
        | ExpressionKind::NumericLiteral(_)
        | ExpressionKind::BooleanLiteral(_)
        | ExpressionKind::Null => None,
        ExpressionKind::PropertyAccess { expression, .. }
        | ExpressionKind::Parenthesized(expression)
        | ExpressionKind::NonNull(expression)
        | ExpressionKind::As { expression, .. } => cb(Node::Expression(expression)),
        ExpressionKind::Prefix { operand, .. } => cb(Node::Expression(operand)),
        ExpressionKind::ElementAccess {
            expression,
            argument,
        } => cb(Node::Expression(expression)).or_else(|| cb(Node::Expression(argument))),
        ExpressionKind::Call {
            expression,
            arguments,
        } => cb(Node::Expression(expression))
            .or_else(|| arguments.iter().find_map(|arg| cb(Node::Expression(arg)))),
        ExpressionKind::Binary { left, right, .. } => {
            cb(Node::Expression(left)).or_else(|| cb(Node::Expression(right)))
        }
        ExpressionKind::Conditional {
            condition,
            when_true,
            when_false,
        } => cb(Node::Expression(condition))
            .or_else(|| cb(Node::Expression(when_true)))
            .or_else(|| cb(Node::Expression(when_false))),
        ExpressionKind::ArrayLiteral(elements) | ExpressionKind::CommaList(elements) => {
            elements.iter().find_map(|e| cb(Node::Expression(e)))
        }
        ExpressionKind::ObjectLiteral(properties) => properties
            .iter()
            .find_map(|p| cb(Node::Expression(&p.initializer))),
        ExpressionKind::Function { body, .. } => for_each_statements(body, cb),
    }
}

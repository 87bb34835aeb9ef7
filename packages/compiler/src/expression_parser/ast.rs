/**
 * Expression AST
 *
 * Template expressions after parsing. The node set is closed: consumers dispatch with an
 * exhaustive `match`, so adding a variant is a compile error everywhere a case is missing.
 */
use serde::{Deserialize, Serialize};

/// Span relative to the start of the expression source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Span relative to the start of the template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

/// Identity of an expression node within one template: node kind plus its absolute span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstKey {
    pub kind: &'static str,
    pub span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    ThisReceiver(ThisReceiver),
    Chain(Chain),
    Conditional(Conditional),
    PropertyRead(PropertyRead),
    PropertyWrite(PropertyWrite),
    SafePropertyRead(SafePropertyRead),
    KeyedRead(KeyedRead),
    KeyedWrite(KeyedWrite),
    SafeKeyedRead(SafeKeyedRead),
    BindingPipe(BindingPipe),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Interpolation(Interpolation),
    Binary(Binary),
    Unary(Unary),
    PrefixNot(PrefixNot),
    NonNullAssert(NonNullAssert),
    FunctionCall(FunctionCall),
    MethodCall(MethodCall),
    SafeMethodCall(SafeMethodCall),
    Quote(Quote),
    ASTWithSource(ASTWithSource),
}

impl AST {
    pub fn span(&self) -> ParseSpan {
        match self {
            AST::EmptyExpr(e) => e.span,
            AST::ImplicitReceiver(e) => e.span,
            AST::ThisReceiver(e) => e.span,
            AST::Chain(e) => e.span,
            AST::Conditional(e) => e.span,
            AST::PropertyRead(e) => e.span,
            AST::PropertyWrite(e) => e.span,
            AST::SafePropertyRead(e) => e.span,
            AST::KeyedRead(e) => e.span,
            AST::KeyedWrite(e) => e.span,
            AST::SafeKeyedRead(e) => e.span,
            AST::BindingPipe(e) => e.span,
            AST::LiteralPrimitive(e) => e.span,
            AST::LiteralArray(e) => e.span,
            AST::LiteralMap(e) => e.span,
            AST::Interpolation(e) => e.span,
            AST::Binary(e) => e.span,
            AST::Unary(e) => e.span,
            AST::PrefixNot(e) => e.span,
            AST::NonNullAssert(e) => e.span,
            AST::FunctionCall(e) => e.span,
            AST::MethodCall(e) => e.span,
            AST::SafeMethodCall(e) => e.span,
            AST::Quote(e) => e.span,
            AST::ASTWithSource(e) => e.ast.span(),
        }
    }

    pub fn source_span(&self) -> AbsoluteSourceSpan {
        match self {
            AST::EmptyExpr(e) => e.source_span,
            AST::ImplicitReceiver(e) => e.source_span,
            AST::ThisReceiver(e) => e.source_span,
            AST::Chain(e) => e.source_span,
            AST::Conditional(e) => e.source_span,
            AST::PropertyRead(e) => e.source_span,
            AST::PropertyWrite(e) => e.source_span,
            AST::SafePropertyRead(e) => e.source_span,
            AST::KeyedRead(e) => e.source_span,
            AST::KeyedWrite(e) => e.source_span,
            AST::SafeKeyedRead(e) => e.source_span,
            AST::BindingPipe(e) => e.source_span,
            AST::LiteralPrimitive(e) => e.source_span,
            AST::LiteralArray(e) => e.source_span,
            AST::LiteralMap(e) => e.source_span,
            AST::Interpolation(e) => e.source_span,
            AST::Binary(e) => e.source_span,
            AST::Unary(e) => e.source_span,
            AST::PrefixNot(e) => e.source_span,
            AST::NonNullAssert(e) => e.source_span,
            AST::FunctionCall(e) => e.source_span,
            AST::MethodCall(e) => e.source_span,
            AST::SafeMethodCall(e) => e.source_span,
            AST::Quote(e) => e.source_span,
            AST::ASTWithSource(e) => e.ast.source_span(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AST::EmptyExpr(_) => "EmptyExpr",
            AST::ImplicitReceiver(_) => "ImplicitReceiver",
            AST::ThisReceiver(_) => "ThisReceiver",
            AST::Chain(_) => "Chain",
            AST::Conditional(_) => "Conditional",
            AST::PropertyRead(_) => "PropertyRead",
            AST::PropertyWrite(_) => "PropertyWrite",
            AST::SafePropertyRead(_) => "SafePropertyRead",
            AST::KeyedRead(_) => "KeyedRead",
            AST::KeyedWrite(_) => "KeyedWrite",
            AST::SafeKeyedRead(_) => "SafeKeyedRead",
            AST::BindingPipe(_) => "BindingPipe",
            AST::LiteralPrimitive(_) => "LiteralPrimitive",
            AST::LiteralArray(_) => "LiteralArray",
            AST::LiteralMap(_) => "LiteralMap",
            AST::Interpolation(_) => "Interpolation",
            AST::Binary(_) => "Binary",
            AST::Unary(_) => "Unary",
            AST::PrefixNot(_) => "PrefixNot",
            AST::NonNullAssert(_) => "NonNullAssert",
            AST::FunctionCall(_) => "FunctionCall",
            AST::MethodCall(_) => "MethodCall",
            AST::SafeMethodCall(_) => "SafeMethodCall",
            AST::Quote(_) => "Quote",
            AST::ASTWithSource(_) => "ASTWithSource",
        }
    }

    pub fn key(&self) -> AstKey {
        AstKey {
            kind: self.kind_name(),
            span: self.source_span(),
        }
    }

    /// Strips any `ASTWithSource` wrappers.
    pub fn unwrap_source(&self) -> &AST {
        match self {
            AST::ASTWithSource(with_source) => with_source.ast.unwrap_source(),
            other => other,
        }
    }

    pub fn is_implicit_receiver(&self) -> bool {
        // `this.foo` reads through the same receiver as `foo`.
        matches!(self, AST::ImplicitReceiver(_) | AST::ThisReceiver(_))
    }

    /// Calls `f` for every direct child expression, in source order.
    pub fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a AST)) {
        match self {
            AST::EmptyExpr(_)
            | AST::ImplicitReceiver(_)
            | AST::ThisReceiver(_)
            | AST::LiteralPrimitive(_)
            | AST::Quote(_) => {}
            AST::Chain(e) => e.expressions.iter().for_each(|x| f(x)),
            AST::Conditional(e) => {
                f(&e.condition);
                f(&e.true_exp);
                f(&e.false_exp);
            }
            AST::PropertyRead(e) => f(&e.receiver),
            AST::SafePropertyRead(e) => f(&e.receiver),
            AST::PropertyWrite(e) => {
                f(&e.receiver);
                f(&e.value);
            }
            AST::KeyedRead(e) => {
                f(&e.receiver);
                f(&e.key);
            }
            AST::SafeKeyedRead(e) => {
                f(&e.receiver);
                f(&e.key);
            }
            AST::KeyedWrite(e) => {
                f(&e.receiver);
                f(&e.key);
                f(&e.value);
            }
            AST::BindingPipe(e) => {
                f(&e.exp);
                e.args.iter().for_each(|x| f(x));
            }
            AST::LiteralArray(e) => e.expressions.iter().for_each(|x| f(x)),
            AST::LiteralMap(e) => e.values.iter().for_each(|x| f(x)),
            AST::Interpolation(e) => e.expressions.iter().for_each(|x| f(x)),
            AST::Binary(e) => {
                f(&e.left);
                f(&e.right);
            }
            AST::Unary(e) => f(&e.expr),
            AST::PrefixNot(e) => f(&e.expression),
            AST::NonNullAssert(e) => f(&e.expression),
            AST::FunctionCall(e) => {
                f(&e.target);
                e.args.iter().for_each(|x| f(x));
            }
            AST::MethodCall(e) => {
                f(&e.receiver);
                e.args.iter().for_each(|x| f(x));
            }
            AST::SafeMethodCall(e) => {
                f(&e.receiver);
                e.args.iter().for_each(|x| f(x));
            }
            AST::ASTWithSource(e) => f(&e.ast),
        }
    }
}

/// Placeholder for an unset binding or an incomplete expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyExpr {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThisReceiver {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
}

/// Multiple expressions separated by a semicolon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyWrite {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePropertyRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedWrite {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeKeyedRead {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPipe {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub exp: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub keys: Vec<LiteralMapKey>,
    pub values: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub strings: Vec<String>,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

/// `+x` and `-x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub operator: String,
    pub expr: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonNullAssert {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub expression: Box<AST>,
}

/// Call of an arbitrary expression, e.g. `fns[0](x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub target: Box<AST>,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeMethodCall {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub name_span: AbsoluteSourceSpan,
    pub receiver: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

/// A prefixed, uninterpreted expression such as `javascript:foo()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub prefix: String,
    pub uninterpreted_expression: String,
    pub location: String,
}

/// Top-level wrapper carrying the original expression text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ASTWithSource {
    pub ast: Box<AST>,
    pub source: Option<String>,
    pub location: String,
    pub absolute_offset: usize,
}

/// Kind of a bound attribute on an element or template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingType {
    /// `[prop]="expr"`
    Property,
    /// `[attr.name]="expr"`
    Attribute,
    /// `[class.name]="expr"`
    Class,
    /// `[style.name]="expr"`
    Style,
    /// `[@trigger]="expr"`
    Animation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParsedEventType {
    /// DOM or directive event.
    Regular,
    /// Animation-specific event.
    Animation,
}

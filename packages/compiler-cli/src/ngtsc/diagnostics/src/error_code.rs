/// Error codes raised by template type-checking.
///
/// The numeric values match the `NG` codes users see, see [`ng_error_code`].
///
/// [`ng_error_code`]: super::util::ng_error_code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Raised when the compiler cannot parse a component's template.
    TemplateParseError = 5002,

    /// An element name failed validation against the DOM schema.
    SchemaInvalidElement = 8001,

    /// An element's attribute name failed validation against the DOM schema.
    SchemaInvalidAttribute = 8002,

    /// No matching directive was found for a `#ref="target"` expression.
    MissingReferenceTarget = 8003,

    /// No matching pipe was found for a pipe expression.
    MissingPipe = 8004,

    /// The left-hand side of an assignment expression was a template variable. Effectively, the
    /// template looked like `<ng-template let-something><button (click)="something = ...">`.
    WriteToReadOnlyVariable = 8005,

    /// A template variable was declared twice, e.g. `<div *ngFor="let i of items; let i = index">`.
    DuplicateVariableDeclaration = 8006,

    /// The template type-checking engine would need to generate an inline type check block for a
    /// component, but the current type-checking environment doesn't support it.
    InlineTcbRequired = 8900,

    /// The template type-checking engine would need to generate an inline type constructor for a
    /// directive or component, but the current type-checking environment doesn't support it.
    InlineTypeCtorRequired = 8901,

    /// A structural directive offers better type inference than the current configuration lets
    /// the template use.
    SuggestSuboptimalTypeInference = 10001,
}

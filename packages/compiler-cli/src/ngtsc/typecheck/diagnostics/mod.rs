//! Diagnostics positioned in component templates.

pub mod src {
    pub mod diagnostic;
}

pub use src::diagnostic::{make_template_diagnostic, RelatedMessage, TemplateDiagnostic};

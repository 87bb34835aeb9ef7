//! Template type-checking.
//!
//! Turns component templates into type-check blocks: TypeScript functions whose type errors are
//! the template's type errors. The blocks are written into per-file shims, or spliced into the
//! component's own file when they can't live anywhere else.

pub mod api;
pub mod diagnostics;

pub mod src {
    pub mod comments;
    pub mod completion;
    pub mod context;
    pub mod diagnostics;
    pub mod dom;
    pub mod environment;
    pub mod expression;
    pub mod oob;
    pub mod shim;
    pub mod source;
    pub mod tcb_util;
    pub mod template_semantics;
    pub mod ts_util;
    pub mod type_check_block;
    pub mod type_check_file;
    pub mod type_constructor;
    pub mod type_emitter;
    pub mod type_parameter_emitter;
}

pub use src::completion::CompletionEngine;
pub use src::context::TypeCheckContextImpl;
pub use src::dom::{DomSchemaChecker, RegistryDomSchemaChecker};
pub use src::environment::Environment;
pub use src::expression::ast_to_typescript;
pub use src::oob::{OutOfBandDiagnosticRecorder, OutOfBandDiagnosticRecorderImpl};
pub use src::shim::{is_shim_path, type_check_shim_path};
pub use src::source::{TemplateSource, TemplateSourceManager};
pub use src::type_check_block::{generate_type_check_block, TcbGenericContextBehavior};
pub use src::type_check_file::TypeCheckFile;

#[cfg(test)]
pub mod testing;

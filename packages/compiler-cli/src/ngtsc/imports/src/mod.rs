// Imports Source Module

pub mod core;
pub mod emitter;
pub mod references;

// Re-exports
pub use core::{ImportRewriter, NoopImportRewriter};
pub use emitter::{
    AbsoluteModuleStrategy, EmittedReference, FailedEmitResult, ImportFlags, ImportedFile,
    LocalIdentifierStrategy, OutputExpr, ReferenceEmitResult, ReferenceEmitStrategy,
    ReferenceEmitter, RelativePathStrategy,
};
pub use references::{OwningModule, Reference};

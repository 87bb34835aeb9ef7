// TypeCheck API Module

pub mod api;
pub mod completion;
pub mod context;

// Re-exports
pub use api::{
    InliningMode, Result, TemplateGuardMeta, TemplateGuardType, TemplateId,
    TemplateSourceMapping, TypeCheckBlockMetadata, TypeCheckError, TypeCheckableDirectiveMeta,
    TypeCheckingConfig, TypeCtorFields, TypeCtorMetadata,
};
pub use completion::{CompletionKind, GlobalCompletion, ShimLocation, TemplateContextCompletion};
pub use context::{RenderedTcb, ShimTypeCheckingData, TemplateData, TypeCheckingHost};

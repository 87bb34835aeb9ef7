// Reference Emitter - Generates expressions for references
//
// The ReferenceEmitter uses strategies to produce expressions that
// refer to References in the context of a particular file.

use std::path::{Component, Path};

use bitflags::bitflags;
use ts::SourceFile;

use super::references::Reference;

bitflags! {
    /// Flags which alter how imports are generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ImportFlags: u8 {
        /// Force the generation of a new import even if an identifier exists.
        const FORCE_NEW_IMPORT = 0x01;

        /// Don't make use of any aliasing information when emitting a reference.
        const NO_ALIASING = 0x02;

        /// Allow emitting references to type-only declarations.
        const ALLOW_TYPE_IMPORTS = 0x04;
    }
}

/// An output-level expression naming a declaration, before it is translated into TypeScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputExpr {
    /// A name that is in scope in the context file.
    Local(String),
    /// A named export of another module.
    External { module_name: String, name: String },
}

/// Represents the import source of a generated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedFile {
    /// Known source file path.
    Known(String),
    /// Unknown source (computation would be required to determine).
    Unknown,
    /// Not an import at all.
    NotAnImport,
}

/// Represents a successfully emitted reference.
#[derive(Debug, Clone)]
pub struct EmittedReference {
    pub expression: OutputExpr,
    pub imported_file: ImportedFile,
}

/// Represents a failure to emit a reference.
#[derive(Debug, Clone)]
pub struct FailedEmitResult {
    /// The reference that failed to emit.
    pub ref_name: String,
    /// The context file where emission was attempted.
    pub context: String,
    /// Reason for the failure.
    pub reason: String,
}

impl FailedEmitResult {
    pub fn new(
        ref_name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            ref_name: ref_name.into(),
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Result of emitting a reference.
#[derive(Debug, Clone)]
pub enum ReferenceEmitResult {
    Success(EmittedReference),
    Failed(FailedEmitResult),
}

impl ReferenceEmitResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Strategy for generating expressions that refer to References.
pub trait ReferenceEmitStrategy {
    /// Emit an expression which refers to the given Reference, or `None` if this strategy does
    /// not apply.
    fn emit(
        &self,
        reference: &Reference,
        context: &SourceFile,
        import_flags: ImportFlags,
    ) -> Option<ReferenceEmitResult>;
}

/// Generates expressions which refer to References in a given context.
#[derive(Default)]
pub struct ReferenceEmitter {
    strategies: Vec<Box<dyn ReferenceEmitStrategy>>,
}

impl ReferenceEmitter {
    pub fn new(strategies: Vec<Box<dyn ReferenceEmitStrategy>>) -> Self {
        Self { strategies }
    }

    /// Emit a reference expression using the registered strategies, in order.
    pub fn emit(
        &self,
        reference: &Reference,
        context: &SourceFile,
        import_flags: ImportFlags,
    ) -> ReferenceEmitResult {
        for strategy in &self.strategies {
            if let Some(result) = strategy.emit(reference, context, import_flags) {
                return result;
            }
        }

        ReferenceEmitResult::Failed(FailedEmitResult::new(
            reference.debug_name(),
            context.file_name.as_str(),
            format!(
                "Unable to write a reference to {} in {} from {}",
                reference.debug_name(),
                reference.node.source_file,
                context.file_name
            ),
        ))
    }
}

/// Strategy: refer to the declaration by name when it lives in the context file.
#[derive(Debug, Default)]
pub struct LocalIdentifierStrategy;

impl LocalIdentifierStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceEmitStrategy for LocalIdentifierStrategy {
    fn emit(
        &self,
        reference: &Reference,
        context: &SourceFile,
        import_flags: ImportFlags,
    ) -> Option<ReferenceEmitResult> {
        if import_flags.contains(ImportFlags::FORCE_NEW_IMPORT) {
            return None;
        }
        if reference.node.source_file != context.file_name {
            return None;
        }
        Some(ReferenceEmitResult::Success(EmittedReference {
            expression: OutputExpr::Local(reference.debug_name().to_string()),
            imported_file: ImportedFile::NotAnImport,
        }))
    }
}

/// Strategy: import the declaration from the module that is believed to own it.
#[derive(Debug, Default)]
pub struct AbsoluteModuleStrategy;

impl AbsoluteModuleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceEmitStrategy for AbsoluteModuleStrategy {
    fn emit(
        &self,
        reference: &Reference,
        _context: &SourceFile,
        _import_flags: ImportFlags,
    ) -> Option<ReferenceEmitResult> {
        let owning_module = reference.owned_by_module_guess()?;
        Some(ReferenceEmitResult::Success(EmittedReference {
            expression: OutputExpr::External {
                module_name: owning_module.to_string(),
                name: reference.debug_name().to_string(),
            },
            imported_file: ImportedFile::Unknown,
        }))
    }
}

/// Strategy: import the declaration from its file through a relative path.
#[derive(Debug, Default)]
pub struct RelativePathStrategy;

impl RelativePathStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceEmitStrategy for RelativePathStrategy {
    fn emit(
        &self,
        reference: &Reference,
        context: &SourceFile,
        _import_flags: ImportFlags,
    ) -> Option<ReferenceEmitResult> {
        let dest = &reference.node.source_file;
        if !reference.node.exported || !reference.node.is_top_level() {
            return Some(ReferenceEmitResult::Failed(FailedEmitResult::new(
                reference.debug_name(),
                context.file_name.as_str(),
                format!("Symbol {} is not exported from {}", reference.debug_name(), dest),
            )));
        }
        Some(ReferenceEmitResult::Success(EmittedReference {
            expression: OutputExpr::External {
                module_name: module_specifier(&context.file_name, dest),
                name: reference.debug_name().to_string(),
            },
            imported_file: ImportedFile::Known(dest.clone()),
        }))
    }
}

/// The relative module specifier by which `to` is imported from `from`, without extension.
pub fn module_specifier(from: &str, to: &str) -> String {
    let relative = calculate_relative_path(from, strip_extension(to));
    if relative.starts_with('.') {
        relative
    } else {
        format!("./{}", relative)
    }
}

fn strip_extension(path: &str) -> &str {
    for ext in [".d.ts", ".tsx", ".ts", ".js"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

/// Calculate the relative path from the directory of `from` to `to`.
fn calculate_relative_path(from: &str, to: &str) -> String {
    let from_dir = Path::new(from).parent().unwrap_or(Path::new(""));
    let to_path = Path::new(to);

    let from_parts: Vec<Component> = from_dir.components().collect();
    let to_parts: Vec<Component> = to_path.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &to_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }
    segments.join("/")
}

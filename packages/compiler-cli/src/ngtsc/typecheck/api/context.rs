// TypeCheck Host API
//
// The callback surface a type-checking context reports to, and the per-shim data it hands over
// at finalize time.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use ngtcb_compiler::render3::r3_ast::R3Node;
use ngtcb_compiler::render3::view::t2_api::BoundTarget;
use ts::{SourceFile, Statement};

use super::api::{TemplateId, TypeCheckableDirectiveMeta};
use crate::ngtsc::reflection::ClassDeclaration;
use crate::ngtsc::typecheck::diagnostics::TemplateDiagnostic;
use crate::ngtsc::typecheck::src::source::TemplateSourceManager;

/// A template registered with the context.
#[derive(Clone)]
pub struct TemplateData {
    pub template: Vec<R3Node>,
    pub bound_target: Rc<dyn BoundTarget<TypeCheckableDirectiveMeta>>,
    /// Errors found while parsing the template, already mapped back to template source.
    pub template_diagnostics: Vec<TemplateDiagnostic>,
}

impl fmt::Debug for TemplateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateData")
            .field("nodes", &self.template.len())
            .field("template_diagnostics", &self.template_diagnostics)
            .finish()
    }
}

/// A type-check block as it was written into a shim file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTcb {
    pub block: Statement,
    /// Offset of the printed block within the shim file text.
    pub offset: usize,
}

/// Everything recorded for one type-checking shim.
#[derive(Debug, Clone)]
pub struct ShimTypeCheckingData {
    /// Path of the shim file.
    pub path: String,

    /// Diagnostics produced while generating the shim (DOM schema and out-of-band), as opposed
    /// to the ones the host type-checker later reports against it.
    pub genesis_diagnostics: Vec<TemplateDiagnostic>,

    /// Whether any code was inlined into the original file the shim belongs to.
    pub has_inlines: bool,

    pub templates: IndexMap<TemplateId, TemplateData>,

    /// The type-check blocks generated into the shim, for mapping positions back.
    pub blocks: IndexMap<TemplateId, RenderedTcb>,
}

/// Adapts the type-checking context to whoever drives it.
pub trait TypeCheckingHost {
    /// The source manager of the given input file, shared for the whole program.
    fn get_source_manager(&mut self, sf_path: &str) -> Rc<RefCell<TemplateSourceManager>>;

    /// The current text of an input file, for splicing inline code into it.
    fn get_source_file(&self, sf_path: &str) -> Option<SourceFile>;

    /// Whether the component should have its template checked in this pass.
    fn should_check_component(&self, node: &ClassDeclaration) -> bool;

    /// Receives the data of one shim of `sf_path` at finalize time.
    fn record_shim_data(&mut self, sf_path: &str, data: ShimTypeCheckingData);

    /// Called once every shim of `sf_path` has been recorded.
    fn record_complete(&mut self, sf_path: &str);
}

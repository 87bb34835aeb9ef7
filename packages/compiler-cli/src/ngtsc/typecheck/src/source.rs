// Template Source Manager
//
// Keeps track of the templates registered for type-checking in one input file, so template
// spans found in generated code can be turned back into template locations.

use std::collections::HashMap;

use ngtcb_compiler::expression_parser::ast::AbsoluteSourceSpan;
use ngtcb_compiler::parse_util::{ParseSourceFile, ParseSourceSpan};
use ts::DeclarationId;

use crate::ngtsc::reflection::ClassDeclaration;
use crate::ngtsc::typecheck::api::{Result, TemplateId, TemplateSourceMapping, TypeCheckError};

/// A template's text together with where it came from.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    pub mapping: TemplateSourceMapping,
    pub file: ParseSourceFile,
}

impl TemplateSource {
    pub fn new(mapping: TemplateSourceMapping, file: ParseSourceFile) -> Self {
        Self { mapping, file }
    }

    pub fn to_parse_source_span(&self, start: usize, end: usize) -> ParseSourceSpan {
        self.file.span(start, end)
    }
}

/// Assigns template ids for one input file and remembers each template's source.
#[derive(Debug)]
pub struct TemplateSourceManager {
    template_ids: HashMap<DeclarationId, TemplateId>,
    next_template_id: usize,
    template_sources: HashMap<TemplateId, TemplateSource>,
}

impl TemplateSourceManager {
    pub fn new() -> Self {
        Self {
            template_ids: HashMap::new(),
            next_template_id: 1,
            template_sources: HashMap::new(),
        }
    }

    /// The id of the component's template, `tcb1`, `tcb2`, ... in first-request order.
    pub fn get_template_id(&mut self, node: &ClassDeclaration) -> TemplateId {
        if let Some(id) = self.template_ids.get(&node.id) {
            return id.clone();
        }
        let id = TemplateId(format!("tcb{}", self.next_template_id));
        self.next_template_id += 1;
        self.template_ids.insert(node.id, id.clone());
        id
    }

    /// Registers the source of `node`'s template and returns its id.
    pub fn capture_source(
        &mut self,
        node: &ClassDeclaration,
        mapping: TemplateSourceMapping,
        file: ParseSourceFile,
    ) -> TemplateId {
        let id = self.get_template_id(node);
        self.template_sources
            .insert(id.clone(), TemplateSource::new(mapping, file));
        id
    }

    pub fn get_source_mapping(&self, id: &TemplateId) -> Result<&TemplateSourceMapping> {
        self.template_sources
            .get(id)
            .map(|source| &source.mapping)
            .ok_or_else(|| TypeCheckError::UnknownTemplateId(id.clone()))
    }

    /// Converts an absolute span within template `id` into a template location.
    pub fn to_parse_source_span(
        &self,
        id: &TemplateId,
        span: AbsoluteSourceSpan,
    ) -> Option<ParseSourceSpan> {
        self.template_sources
            .get(id)
            .map(|source| source.to_parse_source_span(span.start, span.end))
    }
}

impl Default for TemplateSourceManager {
    fn default() -> Self {
        Self::new()
    }
}

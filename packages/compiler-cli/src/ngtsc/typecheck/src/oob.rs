// Out-of-band Diagnostics
//
// Problems found while generating type-check code that the host type-checker would never see,
// such as a pipe that isn't in scope.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ngtcb_compiler::expression_parser::ast::{AstKey, BindingPipe, PropertyWrite};
use ngtcb_compiler::parse_util::ParseSourceSpan;
use ngtcb_compiler::render3::r3_ast::{Reference, Variable};
use ts::{DiagnosticCategory, DiagnosticMessageChain};

use super::source::TemplateSourceManager;
use crate::ngtsc::diagnostics::{make_diagnostic, DiagnosticLocation, ErrorCode};
use crate::ngtsc::reflection::ClassDeclaration;
use crate::ngtsc::typecheck::api::{Result, TemplateId, TypeCheckError};
use crate::ngtsc::typecheck::diagnostics::{
    make_template_diagnostic, RelatedMessage, TemplateDiagnostic,
};

/// Collects diagnostics for template problems discovered during type-check block generation.
pub trait OutOfBandDiagnosticRecorder {
    fn diagnostics(&self) -> &[TemplateDiagnostic];

    /// A `#ref="exportAs"` reference whose name isn't exported by any directive on its node.
    fn missing_reference_target(&mut self, id: &TemplateId, reference: &Reference) -> Result<()>;

    /// A pipe used in the template but not available to it. Reported once per usage.
    fn missing_pipe(&mut self, id: &TemplateId, ast: &BindingPipe) -> Result<()>;

    /// An event handler that assigns to a template variable.
    fn illegal_assignment_to_template_var(
        &mut self,
        id: &TemplateId,
        assignment: &PropertyWrite,
        target: &Variable,
    ) -> Result<()>;

    /// A template variable declared twice on the same `<ng-template>`.
    fn duplicate_template_var(
        &mut self,
        id: &TemplateId,
        variable: &Variable,
        first_decl: &Variable,
    ) -> Result<()>;

    /// The component's type-check block has to be inlined, which the environment can't do.
    fn requires_inline_tcb(&mut self, id: &TemplateId, node: &ClassDeclaration);

    /// Template variables that end up typed as `any` because the configuration disables the
    /// directive's context guard.
    fn suboptimal_type_inference(&mut self, id: &TemplateId, variables: &[Variable]) -> Result<()>;
}

pub struct OutOfBandDiagnosticRecorderImpl {
    resolver: Rc<RefCell<TemplateSourceManager>>,
    diagnostics: Vec<TemplateDiagnostic>,
    /// Pipe usages already reported, so a binding visited twice isn't reported twice.
    recorded_pipes: HashSet<AstKey>,
}

impl OutOfBandDiagnosticRecorderImpl {
    pub fn new(resolver: Rc<RefCell<TemplateSourceManager>>) -> Self {
        Self {
            resolver,
            diagnostics: Vec::new(),
            recorded_pipes: HashSet::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<TemplateDiagnostic> {
        self.diagnostics
    }

    fn push(
        &mut self,
        id: &TemplateId,
        span: &ParseSourceSpan,
        category: DiagnosticCategory,
        code: ErrorCode,
        message: impl Into<DiagnosticMessageChain>,
        related: Option<RelatedMessage>,
    ) -> Result<()> {
        let resolver = self.resolver.borrow();
        let mapping = resolver.get_source_mapping(id)?;
        self.diagnostics.push(make_template_diagnostic(
            id.clone(),
            mapping,
            span,
            category,
            code,
            message,
            related,
        ));
        Ok(())
    }
}

impl OutOfBandDiagnosticRecorder for OutOfBandDiagnosticRecorderImpl {
    fn diagnostics(&self) -> &[TemplateDiagnostic] {
        &self.diagnostics
    }

    fn missing_reference_target(&mut self, id: &TemplateId, reference: &Reference) -> Result<()> {
        let message = format!(
            "No directive found with exportAs '{}'.",
            reference.value.trim()
        );
        let span = reference.value_span.as_ref().unwrap_or(&reference.source_span);
        self.push(
            id,
            span,
            DiagnosticCategory::Error,
            ErrorCode::MissingReferenceTarget,
            message,
            None,
        )
    }

    fn missing_pipe(&mut self, id: &TemplateId, ast: &BindingPipe) -> Result<()> {
        let key = AstKey {
            kind: "BindingPipe",
            span: ast.source_span,
        };
        if !self.recorded_pipes.insert(key) {
            return Ok(());
        }

        let span = self
            .resolver
            .borrow()
            .to_parse_source_span(id, ast.name_span)
            .ok_or_else(|| TypeCheckError::MissingPipeSpan(ast.name.clone()))?;
        let message = format!("No pipe found with name '{}'.", ast.name);
        self.push(
            id,
            &span,
            DiagnosticCategory::Error,
            ErrorCode::MissingPipe,
            message,
            None,
        )
    }

    fn illegal_assignment_to_template_var(
        &mut self,
        id: &TemplateId,
        assignment: &PropertyWrite,
        target: &Variable,
    ) -> Result<()> {
        let span = self
            .resolver
            .borrow()
            .to_parse_source_span(id, assignment.source_span)
            .ok_or(TypeCheckError::MissingBindingSpan)?;
        let message = format!(
            "Cannot use variable '{}' as the target of an assignment expression. Template variables are read-only.",
            assignment.name
        );
        let related = RelatedMessage::new(
            format!("The variable {} is declared here.", assignment.name),
            target
                .value_span
                .clone()
                .unwrap_or_else(|| target.source_span.clone()),
        );
        self.push(
            id,
            &span,
            DiagnosticCategory::Error,
            ErrorCode::WriteToReadOnlyVariable,
            message,
            Some(related),
        )
    }

    fn duplicate_template_var(
        &mut self,
        id: &TemplateId,
        variable: &Variable,
        first_decl: &Variable,
    ) -> Result<()> {
        let message = format!(
            "Cannot redeclare variable '{}' as it was previously declared elsewhere for the same template.",
            variable.name
        );
        // The first declaration is the one that wins, so it's the one worth pointing at.
        let related = RelatedMessage::new(
            format!("The variable '{}' was first declared here.", first_decl.name),
            first_decl.source_span.clone(),
        );
        self.push(
            id,
            &variable.source_span,
            DiagnosticCategory::Error,
            ErrorCode::DuplicateVariableDeclaration,
            message,
            Some(related),
        )
    }

    fn requires_inline_tcb(&mut self, id: &TemplateId, node: &ClassDeclaration) {
        let message = "This component requires inline template type-checking, which is not supported by the current environment.";
        let location = DiagnosticLocation::new(node.source_file.clone(), node.name_pos, node.name.len());
        self.diagnostics.push(TemplateDiagnostic {
            diagnostic: make_diagnostic(
                ErrorCode::InlineTcbRequired,
                &location,
                message,
                None,
                DiagnosticCategory::Error,
            ),
            component_file: node.source_file.clone(),
            template_id: id.clone(),
        });
    }

    fn suboptimal_type_inference(&mut self, id: &TemplateId, variables: &[Variable]) -> Result<()> {
        // Any variable will do; prefer the one bound to the context's `$implicit`.
        let Some(diagnostic_var) = variables
            .iter()
            .rev()
            .find(|variable| variable.value.is_empty() || variable.value == "$implicit")
            .or_else(|| variables.first())
        else {
            return Ok(());
        };

        let mut identification = format!("'{}'", diagnostic_var.name);
        match variables.len() {
            2 => identification.push_str(" (and 1 other)"),
            n if n > 2 => identification.push_str(&format!(" (and {} others)", n - 1)),
            _ => {}
        }
        let message = format!(
            "This structural directive supports advanced type inference, but the current compiler configuration prevents its usage. The variable {} will have type 'any' as a result.\n\nConsider enabling the 'strictTemplates' option in your tsconfig.json for better type inference within this template.",
            identification
        );
        let span = diagnostic_var.key_span.clone();
        self.push(
            id,
            &span,
            DiagnosticCategory::Suggestion,
            ErrorCode::SuggestSuboptimalTypeInference,
            message,
            None,
        )
    }
}

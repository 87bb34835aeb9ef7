use std::ops::Deref;

use ngtcb_compiler::parse_util::ParseSourceSpan;
use ts::{Diagnostic, DiagnosticCategory, DiagnosticMessageChain, DiagnosticRelatedInformation};

use crate::ngtsc::diagnostics::{ng_error_code, ErrorCode};
use crate::ngtsc::typecheck::api::{TemplateId, TemplateSourceMapping};

/// A diagnostic positioned in a component template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDiagnostic {
    pub diagnostic: Diagnostic,

    /// The file declaring the component whose template the diagnostic belongs to.
    pub component_file: String,

    pub template_id: TemplateId,
}

impl Deref for TemplateDiagnostic {
    type Target = Diagnostic;

    fn deref(&self) -> &Diagnostic {
        &self.diagnostic
    }
}

/// A secondary message attached to a template diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedMessage {
    pub text: String,
    pub span: ParseSourceSpan,
}

impl RelatedMessage {
    pub fn new(text: impl Into<String>, span: ParseSourceSpan) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

fn related_information(
    file: &str,
    start: usize,
    end: usize,
    message_text: impl Into<String>,
) -> DiagnosticRelatedInformation {
    DiagnosticRelatedInformation {
        category: DiagnosticCategory::Message,
        code: 0,
        file: Some(file.to_string()),
        start: Some(start),
        length: Some(end.saturating_sub(start)),
        message_text: message_text.into(),
    }
}

/// Constructs a diagnostic for a span of a template, using `mapping` to decide which file the
/// diagnostic is reported against.
pub fn make_template_diagnostic(
    template_id: TemplateId,
    mapping: &TemplateSourceMapping,
    span: &ParseSourceSpan,
    category: DiagnosticCategory,
    code: ErrorCode,
    message_text: impl Into<DiagnosticMessageChain>,
    related_message: Option<RelatedMessage>,
) -> TemplateDiagnostic {
    let start = span.start.offset;
    let length = span.end.offset.saturating_sub(start);

    match mapping {
        TemplateSourceMapping::Direct { node } => {
            // Inline template spans are positions in the component file already.
            let related_information = related_message.map(|related| {
                vec![related_information(
                    &node.file,
                    related.span.start.offset,
                    related.span.end.offset,
                    related.text,
                )]
            });
            TemplateDiagnostic {
                diagnostic: Diagnostic {
                    category,
                    code: ng_error_code(code),
                    file: Some(node.file.clone()),
                    start,
                    length,
                    message_text: message_text.into(),
                    related_information,
                },
                component_file: node.file.clone(),
                template_id,
            }
        }
        TemplateSourceMapping::Indirect {
            component_class,
            node,
            ..
        }
        | TemplateSourceMapping::External {
            component_class,
            node,
            ..
        } => {
            let component_file = component_class.source_file.clone();
            let component_name = &component_class.name;
            let file_name = match mapping {
                TemplateSourceMapping::External { template_url, .. } => template_url.clone(),
                _ => format!("{} ({} template)", component_file, component_name),
            };

            let mut related = Vec::new();
            if let Some(message) = related_message {
                related.push(related_information(
                    &file_name,
                    message.span.start.offset,
                    message.span.end.offset,
                    message.text,
                ));
            }
            related.push(related_information(
                &component_file,
                node.start,
                node.start + node.length,
                format!("Error occurs in the template of component {}.", component_name),
            ));

            TemplateDiagnostic {
                diagnostic: Diagnostic {
                    category,
                    code: ng_error_code(code),
                    file: Some(file_name),
                    start,
                    length,
                    message_text: message_text.into(),
                    related_information: Some(related),
                },
                component_file,
                template_id,
            }
        }
    }
}

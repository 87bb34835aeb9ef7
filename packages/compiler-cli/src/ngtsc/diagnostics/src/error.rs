use super::error_code::ErrorCode;
use super::util::ng_error_code;
use ts::{
    make_diagnostic_chain as ts_make_diagnostic_chain, Diagnostic, DiagnosticCategory,
    DiagnosticMessageChain, DiagnosticRelatedInformation,
};

/// A region of a source file that a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub file: String,
    pub start: usize,
    pub length: usize,
}

impl DiagnosticLocation {
    pub fn new(file: impl Into<String>, start: usize, length: usize) -> Self {
        Self {
            file: file.into(),
            start,
            length,
        }
    }
}

pub fn make_diagnostic(
    code: ErrorCode,
    location: &DiagnosticLocation,
    message_text: impl Into<DiagnosticMessageChain>,
    related_information: Option<Vec<DiagnosticRelatedInformation>>,
    category: DiagnosticCategory,
) -> Diagnostic {
    Diagnostic {
        category,
        code: ng_error_code(code),
        file: Some(location.file.clone()),
        start: location.start,
        length: location.length,
        message_text: message_text.into(),
        related_information,
    }
}

pub fn make_related_information(
    location: &DiagnosticLocation,
    message_text: impl Into<String>,
) -> DiagnosticRelatedInformation {
    DiagnosticRelatedInformation {
        category: DiagnosticCategory::Message,
        code: 0,
        file: Some(location.file.clone()),
        start: Some(location.start),
        length: Some(location.length),
        message_text: message_text.into(),
    }
}

pub fn make_diagnostic_chain(
    message_text: String,
    next: Option<Vec<DiagnosticMessageChain>>,
) -> DiagnosticMessageChain {
    ts_make_diagnostic_chain(message_text, next)
}

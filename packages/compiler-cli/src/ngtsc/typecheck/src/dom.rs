// DOM Schema Checker
//
// Validation of elements and property bindings against the DOM schema.
//
// The host type-checker knows nothing about which elements exist or which properties they
// have, so those checks happen while type-check blocks are generated and their diagnostics are
// kept on the side.

use std::cell::RefCell;
use std::rc::Rc;

use ngtcb_compiler::core::SchemaMetadata;
use ngtcb_compiler::parse_util::ParseSourceSpan;
use ngtcb_compiler::render3::r3_ast::Element;
use ngtcb_compiler::schema::{DomElementSchemaRegistry, ElementSchemaRegistry};
use once_cell::sync::Lazy;
use regex::Regex;
use ts::DiagnosticCategory;

use super::source::TemplateSourceManager;
use crate::ngtsc::diagnostics::ErrorCode;
use crate::ngtsc::typecheck::api::{Result, TemplateId};
use crate::ngtsc::typecheck::diagnostics::{make_template_diagnostic, TemplateDiagnostic};

static REGISTRY: Lazy<DomElementSchemaRegistry> = Lazy::new(DomElementSchemaRegistry::new);

static REMOVE_XHTML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:xhtml:").expect("static pattern is valid"));

/// Checks elements and property bindings of a template against the DOM schema, collecting
/// diagnostics for anything unknown.
pub trait DomSchemaChecker {
    /// Diagnostics produced so far.
    fn diagnostics(&self) -> &[TemplateDiagnostic];

    /// Reports `element` if it is neither a known DOM element nor allowed by `schemas`.
    fn check_element(
        &mut self,
        id: &TemplateId,
        element: &Element,
        schemas: &[SchemaMetadata],
    ) -> Result<()>;

    /// Reports a binding to `name` on `element` that the DOM schema doesn't know about.
    fn check_property(
        &mut self,
        id: &TemplateId,
        element: &Element,
        name: &str,
        span: &ParseSourceSpan,
        schemas: &[SchemaMetadata],
    ) -> Result<()>;
}

/// [`DomSchemaChecker`] backed by the DOM element schema registry.
pub struct RegistryDomSchemaChecker {
    resolver: Rc<RefCell<TemplateSourceManager>>,
    diagnostics: Vec<TemplateDiagnostic>,
}

impl RegistryDomSchemaChecker {
    pub fn new(resolver: Rc<RefCell<TemplateSourceManager>>) -> Self {
        Self {
            resolver,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<TemplateDiagnostic> {
        self.diagnostics
    }

    fn report(
        &mut self,
        id: &TemplateId,
        span: &ParseSourceSpan,
        code: ErrorCode,
        message: String,
    ) -> Result<()> {
        let resolver = self.resolver.borrow();
        let mapping = resolver.get_source_mapping(id)?;
        self.diagnostics.push(make_template_diagnostic(
            id.clone(),
            mapping,
            span,
            DiagnosticCategory::Error,
            code,
            message,
            None,
        ));
        Ok(())
    }
}

impl DomSchemaChecker for RegistryDomSchemaChecker {
    fn diagnostics(&self) -> &[TemplateDiagnostic] {
        &self.diagnostics
    }

    fn check_element(
        &mut self,
        id: &TemplateId,
        element: &Element,
        schemas: &[SchemaMetadata],
    ) -> Result<()> {
        // Elements in an `svg` or `math` namespace are known without their prefix.
        let name = REMOVE_XHTML.replace(&element.name, "");
        if REGISTRY.has_element(&name, schemas) {
            return Ok(());
        }

        let mut message = format!(
            "'{name}' is not a known element:\n1. If '{name}' is an Angular component, then verify that it is part of this module.\n",
            name = name
        );
        if name.contains('-') {
            message.push_str(&format!(
                "2. If '{}' is a Web Component then add 'CUSTOM_ELEMENTS_SCHEMA' to the '@NgModule.schemas' of this component to suppress this message.",
                name
            ));
        } else {
            message.push_str(
                "2. To allow any element add 'NO_ERRORS_SCHEMA' to the '@NgModule.schemas' of this component.",
            );
        }

        self.report(id, &element.start_source_span, ErrorCode::SchemaInvalidElement, message)
    }

    fn check_property(
        &mut self,
        id: &TemplateId,
        element: &Element,
        name: &str,
        span: &ParseSourceSpan,
        schemas: &[SchemaMetadata],
    ) -> Result<()> {
        if REGISTRY.has_property(&element.name, name, schemas) {
            return Ok(());
        }

        let mut message = format!(
            "Can't bind to '{}' since it isn't a known property of '{}'.",
            name, element.name
        );
        if element.name.starts_with("ng-") {
            message.push_str(&format!(
                "\n1. If '{}' is an Angular directive, then add 'CommonModule' to the '@NgModule.imports' of this component.\n2. To allow any property add 'NO_ERRORS_SCHEMA' to the '@NgModule.schemas' of this component.",
                name
            ));
        } else if element.name.contains('-') {
            message.push_str(&format!(
                "\n1. If '{el}' is an Angular component and it has '{name}' input, then verify that it is part of this module.\n2. If '{el}' is a Web Component then add 'CUSTOM_ELEMENTS_SCHEMA' to the '@NgModule.schemas' of this component to suppress this message.\n3. To allow any property add 'NO_ERRORS_SCHEMA' to the '@NgModule.schemas' of this component.",
                el = element.name,
                name = name
            ));
        }

        self.report(id, span, ErrorCode::SchemaInvalidAttribute, message)
    }
}

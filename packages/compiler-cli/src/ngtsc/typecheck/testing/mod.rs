//! Fixtures for type-checking tests.
//!
//! There is no template parser in this crate, so templates are assembled by hand from their
//! text: every node is located by searching for a needle, which gives it the spans a parser
//! would have produced.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;
use ngtcb_compiler::core::SchemaMetadata;
use ngtcb_compiler::expression_parser::ast::*;
use ngtcb_compiler::parse_util::{ParseSourceFile, ParseSourceSpan};
use ngtcb_compiler::render3::r3_ast as t;
use ngtcb_compiler::render3::view::t2_api::{BoundTarget, Target, TargetBinder};
use ngtcb_compiler::render3::view::t2_binder::R3TargetBinder;
use ts::{Printer, SourceFile, Statement};

use super::api::{
    Result, ShimTypeCheckingData, TemplateSourceMapping, TypeCheckBlockMetadata,
    TypeCheckableDirectiveMeta, TypeCheckingConfig, TypeCheckingHost,
};
use super::diagnostics::TemplateDiagnostic;
use super::{
    generate_type_check_block, Environment, OutOfBandDiagnosticRecorderImpl,
    RegistryDomSchemaChecker, TcbGenericContextBehavior, TemplateSourceManager,
};
use crate::ngtsc::diagnostics::DiagnosticLocation;
use crate::ngtsc::imports::{
    AbsoluteModuleStrategy, LocalIdentifierStrategy, Reference, ReferenceEmitter,
    RelativePathStrategy,
};
use crate::ngtsc::metadata::ClassPropertyMapping;
use crate::ngtsc::reflection::{ClassDeclaration, DeclarationNode, ReflectionHost};
use crate::ngtsc::testing::{ClassBuilder, TestReflectionHost};
use crate::ngtsc::translator::ImportManager;

/// File declaring the component under test.
pub const COMPONENT_FILE: &str = "/app/test.ts";

/// Shim the component's type-check block is generated for.
pub const SHIM_FILE: &str = "/app/test.ngtypecheck.ts";

/// Template text that nodes are built against.
pub struct TestTemplate {
    pub file: ParseSourceFile,
}

impl TestTemplate {
    pub fn new(text: &str) -> Self {
        TestTemplate {
            file: ParseSourceFile::new(text, COMPONENT_FILE),
        }
    }

    pub fn len(&self) -> usize {
        self.file.content.len()
    }

    /// Start of the `nth` (0-based) occurrence of `needle`.
    pub fn at(&self, needle: &str, nth: usize) -> usize {
        self.file
            .content
            .match_indices(needle)
            .nth(nth)
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| panic!("{:?} (#{}) not in {:?}", needle, nth, self.file.content))
    }

    /// Start of the first `needle` at or after `from`.
    fn after(&self, needle: &str, from: usize) -> usize {
        self.file.content[from..]
            .find(needle)
            .map(|idx| from + idx)
            .unwrap_or_else(|| panic!("{:?} not after {} in {:?}", needle, from, self.file.content))
    }

    pub fn abs(&self, needle: &str, nth: usize) -> AbsoluteSourceSpan {
        let start = self.at(needle, nth);
        AbsoluteSourceSpan::new(start, start + needle.len())
    }

    pub fn span(&self, needle: &str, nth: usize) -> ParseSourceSpan {
        let span = self.abs(needle, nth);
        self.file.span(span.start, span.end)
    }

    fn parse_span(&self, span: AbsoluteSourceSpan) -> ParseSourceSpan {
        self.file.span(span.start, span.end)
    }

    fn implicit_receiver(at: usize) -> AST {
        AST::ImplicitReceiver(ImplicitReceiver {
            span: ParseSpan::new(0, 0),
            source_span: AbsoluteSourceSpan::new(at, at),
        })
    }

    /// `name`, read through the implicit receiver.
    pub fn read(&self, name: &str, nth: usize) -> AST {
        let span = self.abs(name, nth);
        AST::PropertyRead(PropertyRead {
            span: ParseSpan::new(0, name.len()),
            source_span: span,
            name_span: span,
            receiver: Box::new(Self::implicit_receiver(span.start)),
            name: name.to_string(),
        })
    }

    /// `receiver.name`, with `name` being the first occurrence after the receiver.
    pub fn member(&self, receiver: AST, name: &str) -> AST {
        let start = receiver.source_span().start;
        let name_start = self.after(name, receiver.source_span().end);
        let end = name_start + name.len();
        AST::PropertyRead(PropertyRead {
            span: ParseSpan::new(0, end - start),
            source_span: AbsoluteSourceSpan::new(start, end),
            name_span: AbsoluteSourceSpan::new(name_start, end),
            receiver: Box::new(receiver),
            name: name.to_string(),
        })
    }

    /// `receiver?.name`
    pub fn safe_member(&self, receiver: AST, name: &str) -> AST {
        let start = receiver.source_span().start;
        let name_start = self.after(name, receiver.source_span().end);
        let end = name_start + name.len();
        AST::SafePropertyRead(SafePropertyRead {
            span: ParseSpan::new(0, end - start),
            source_span: AbsoluteSourceSpan::new(start, end),
            name_span: AbsoluteSourceSpan::new(name_start, end),
            receiver: Box::new(receiver),
            name: name.to_string(),
        })
    }

    /// `this.name`
    pub fn this_read(&self, name: &str, nth: usize) -> AST {
        let start = self.at(&format!("this.{}", name), nth);
        let this = AST::ThisReceiver(ThisReceiver {
            span: ParseSpan::new(0, 4),
            source_span: AbsoluteSourceSpan::new(start, start + 4),
        });
        self.member(this, name)
    }

    /// `name = value`, assigning through the implicit receiver.
    pub fn write(&self, name: &str, nth: usize, value: AST) -> AST {
        let name_span = self.abs(name, nth);
        let end = value.source_span().end;
        AST::PropertyWrite(PropertyWrite {
            span: ParseSpan::new(0, end - name_span.start),
            source_span: AbsoluteSourceSpan::new(name_span.start, end),
            name_span,
            receiver: Box::new(Self::implicit_receiver(name_span.start)),
            name: name.to_string(),
            value: Box::new(value),
        })
    }

    /// `name(args)` on the implicit receiver, ending at the first `)` after the arguments.
    pub fn call(&self, name: &str, nth: usize, args: Vec<AST>) -> AST {
        let name_span = self.abs(name, nth);
        let args_end = args.last().map_or(name_span.end, |arg| arg.source_span().end);
        let end = self.after(")", args_end) + 1;
        AST::MethodCall(MethodCall {
            span: ParseSpan::new(0, end - name_span.start),
            source_span: AbsoluteSourceSpan::new(name_span.start, end),
            name_span,
            receiver: Box::new(Self::implicit_receiver(name_span.start)),
            name: name.to_string(),
            args,
        })
    }

    /// `exp | name:args`
    pub fn pipe(&self, exp: AST, name: &str, args: Vec<AST>) -> AST {
        let start = exp.source_span().start;
        let name_start = self.after(name, exp.source_span().end);
        let name_span = AbsoluteSourceSpan::new(name_start, name_start + name.len());
        let end = args.last().map_or(name_span.end, |arg| arg.source_span().end);
        AST::BindingPipe(BindingPipe {
            span: ParseSpan::new(0, end - start),
            source_span: AbsoluteSourceSpan::new(start, end),
            name_span,
            exp: Box::new(exp),
            name: name.to_string(),
            args,
        })
    }

    /// `left op right`
    pub fn binary(&self, left: AST, operation: &str, right: AST) -> AST {
        let span = AbsoluteSourceSpan::new(left.source_span().start, right.source_span().end);
        AST::Binary(Binary {
            span: ParseSpan::new(0, span.end - span.start),
            source_span: span,
            operation: operation.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// A literal written as `text` in the template.
    pub fn literal(&self, text: &str, nth: usize, value: LiteralValue) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span: ParseSpan::new(0, text.len()),
            source_span: self.abs(text, nth),
            value,
        })
    }

    /// An empty expression at the start of `needle`, as left behind by an incomplete binding.
    pub fn empty(&self, needle: &str, nth: usize) -> AST {
        let at = self.at(needle, nth);
        AST::EmptyExpr(EmptyExpr {
            span: ParseSpan::new(0, 0),
            source_span: AbsoluteSourceSpan::new(at, at),
        })
    }

    pub fn text_attr(&self, name: &str, value: &str) -> t::TextAttribute {
        let key = self.span(name, 0);
        let value_span = (!value.is_empty()).then(|| {
            let start = self.after(value, key.end.offset);
            self.file.span(start, start + value.len())
        });
        t::TextAttribute {
            name: name.to_string(),
            value: value.to_string(),
            source_span: key.clone(),
            key_span: Some(key),
            value_span,
        }
    }

    /// `[name]="value"`
    pub fn input(&self, name: &str, value: AST) -> t::BoundAttribute {
        let key_start = self.at(&format!("[{}]", name), 0) + 1;
        self.bound_attribute(name, key_start, value)
    }

    /// A binding of a structural directive, e.g. the `ngIf` of `*ngIf="cond"`.
    pub fn template_input(&self, name: &str, value: AST) -> t::TemplateAttr {
        let key_start = self.at(name, 0);
        t::TemplateAttr::Bound(self.bound_attribute(name, key_start, value))
    }

    fn bound_attribute(&self, name: &str, key_start: usize, value: AST) -> t::BoundAttribute {
        let value_span = value.source_span();
        let end = value_span.end.max(key_start + name.len());
        t::BoundAttribute {
            name: name.to_string(),
            type_: BindingType::Property,
            value,
            unit: None,
            source_span: self.file.span(key_start.saturating_sub(1), end + 1),
            key_span: self.file.span(key_start, key_start + name.len()),
            value_span: Some(self.parse_span(value_span)),
        }
    }

    /// `(name)="handler"`
    pub fn output(&self, name: &str, handler: AST) -> t::BoundEvent {
        let key_start = self.at(&format!("({})", name), 0) + 1;
        let handler_span = self.parse_span(handler.source_span());
        t::BoundEvent {
            name: name.to_string(),
            type_: ParsedEventType::Regular,
            handler,
            target: None,
            phase: None,
            source_span: self.file.span(key_start - 1, handler_span.end.offset + 1),
            handler_span,
            key_span: self.file.span(key_start, key_start + name.len()),
        }
    }

    /// `(@name)="handler"`
    pub fn animation_output(&self, name: &str, handler: AST) -> t::BoundEvent {
        let key_start = self.at(&format!("(@{})", name), 0) + 2;
        let handler_span = self.parse_span(handler.source_span());
        t::BoundEvent {
            name: name.to_string(),
            type_: ParsedEventType::Animation,
            handler,
            target: None,
            phase: Some("done".to_string()),
            source_span: self.file.span(key_start - 2, handler_span.end.offset + 1),
            handler_span,
            key_span: self.file.span(key_start, key_start + name.len()),
        }
    }

    /// `#name` or `#name="value"`
    pub fn reference(&self, name: &str, value: &str) -> t::Reference {
        let start = self.at(&format!("#{}", name), 0);
        let key_span = self.file.span(start + 1, start + 1 + name.len());
        let (end, value_span) = if value.is_empty() {
            (start + 1 + name.len(), None)
        } else {
            let value_start = self.after(value, start);
            (
                value_start + value.len() + 1,
                Some(self.file.span(value_start, value_start + value.len())),
            )
        };
        t::Reference {
            name: name.to_string(),
            value: value.to_string(),
            source_span: self.file.span(start, end),
            key_span,
            value_span,
        }
    }

    /// `let-name` or `let-name="value"`
    pub fn variable(&self, name: &str, value: &str) -> t::Variable {
        self.variable_at(name, 0, value)
    }

    /// The `nth` `let-name` declaration.
    pub fn variable_at(&self, name: &str, nth: usize, value: &str) -> t::Variable {
        let start = self.at(&format!("let-{}", name), nth);
        let key_span = self.file.span(start + 4, start + 4 + name.len());
        let (end, value_span) = if value.is_empty() {
            (start + 4 + name.len(), None)
        } else {
            let value_start = self.after(value, start + 4 + name.len());
            (
                value_start + value.len() + 1,
                Some(self.file.span(value_start, value_start + value.len())),
            )
        };
        t::Variable {
            name: name.to_string(),
            value: value.to_string(),
            source_span: self.file.span(start, end),
            key_span,
            value_span,
        }
    }

    pub fn bound_text(&self, value: AST) -> t::R3Node {
        let span = self.parse_span(value.source_span());
        t::R3Node::BoundText(t::BoundText {
            value,
            source_span: span,
        })
    }

    /// The `nth` `<name>` element, up to its closing tag (or the end of the text).
    pub fn element(&self, name: &str, nth: usize) -> t::Element {
        let start = self.at(&format!("<{}", name), nth);
        let close = format!("</{}>", name);
        let end = self.file.content[start..]
            .find(&close)
            .map_or(self.len(), |idx| start + idx + close.len());
        let open_end = self.after(">", start) + 1;
        t::Element {
            name: name.to_string(),
            attributes: vec![],
            inputs: vec![],
            outputs: vec![],
            children: vec![],
            references: vec![],
            source_span: self.file.span(start, end),
            start_source_span: self.file.span(start, open_end),
            end_source_span: None,
        }
    }

    /// The `nth` explicit `<ng-template>`.
    pub fn ng_template(&self, nth: usize) -> t::Template {
        self.template_like("ng-template", nth, true)
    }

    /// The implicit template a structural directive creates around the `nth` `<tag>`.
    pub fn structural(&self, tag: &str, nth: usize) -> t::Template {
        self.template_like(tag, nth, false)
    }

    fn template_like(&self, tag: &str, nth: usize, explicit: bool) -> t::Template {
        let el = self.element(tag, nth);
        t::Template {
            tag_name: Some(if explicit { "ng-template" } else { tag }.to_string()),
            attributes: vec![],
            inputs: vec![],
            outputs: vec![],
            template_attrs: vec![],
            children: vec![],
            references: vec![],
            variables: vec![],
            source_span: el.source_span,
            start_source_span: el.start_source_span,
            end_source_span: None,
        }
    }
}

/// A class declared in `/app/{file}.ts`.
pub fn class(id: u32, name: &str, file: &str) -> ClassBuilder {
    ClassBuilder::new(id, name, &format!("/app/{}.ts", file))
}

/// The component every template in these tests belongs to.
pub fn component() -> Rc<ClassDeclaration> {
    ClassBuilder::new(1, "Test", COMPONENT_FILE).build()
}

/// A plain directive matched by `selector`, declared in `/app/{lowercased name}.ts`.
pub fn directive(id: u32, name: &str, selector: &str) -> TypeCheckableDirectiveMeta {
    directive_of(class(id, name, &name.to_lowercase()).build(), selector)
}

pub fn directive_of(node: Rc<DeclarationNode>, selector: &str) -> TypeCheckableDirectiveMeta {
    TypeCheckableDirectiveMeta::new(Reference::new(node), selector)
}

/// Inputs or outputs bound under their own name.
pub fn mapping(names: &[&str]) -> ClassPropertyMapping {
    ClassPropertyMapping::from_pairs(names.iter().map(|name| (*name, *name)))
}

pub fn pipe(id: u32, name: &str) -> Reference {
    Reference::new(class(id, name, &name.to_lowercase()).build())
}

pub fn ref_emitter() -> Rc<ReferenceEmitter> {
    Rc::new(ReferenceEmitter::new(vec![
        Box::new(LocalIdentifierStrategy::new()),
        Box::new(AbsoluteModuleStrategy::new()),
        Box::new(RelativePathStrategy::new()),
    ]))
}

/// Where the test template is found, for diagnostics.
pub fn direct_mapping(template: &TestTemplate) -> TemplateSourceMapping {
    TemplateSourceMapping::Direct {
        node: DiagnosticLocation::new(COMPONENT_FILE, 0, template.len()),
    }
}

/// A generated type-check block.
pub struct TcbResult {
    pub block: Statement,
    /// The block printed without span comments.
    pub text: String,
    pub dom_diagnostics: Vec<TemplateDiagnostic>,
    pub oob_diagnostics: Vec<TemplateDiagnostic>,
}

impl TcbResult {
    /// The block printed with its span comments.
    pub fn annotated(&self) -> String {
        Printer::new(false).print_statement(&self.block)
    }

    pub fn diagnostic_codes(&self) -> Vec<i32> {
        self.dom_diagnostics
            .iter()
            .chain(&self.oob_diagnostics)
            .map(|diag| diag.code)
            .collect()
    }
}

/// Generates the type-check block of one template as `_tcb1`, in the shim of
/// [`COMPONENT_FILE`].
pub struct TcbBuilder {
    config: TypeCheckingConfig,
    component: Rc<ClassDeclaration>,
    directives: Vec<TypeCheckableDirectiveMeta>,
    pipes: IndexMap<String, Reference>,
    schemas: Vec<SchemaMetadata>,
    reflector: TestReflectionHost,
    behavior: TcbGenericContextBehavior,
}

impl TcbBuilder {
    pub fn new() -> Self {
        TcbBuilder {
            config: TypeCheckingConfig::default(),
            component: component(),
            directives: Vec::new(),
            pipes: IndexMap::new(),
            schemas: Vec::new(),
            reflector: TestReflectionHost::new(),
            behavior: TcbGenericContextBehavior::UseEmitter,
        }
    }

    pub fn config(mut self, config: TypeCheckingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn component(mut self, component: Rc<ClassDeclaration>) -> Self {
        self.component = component;
        self
    }

    pub fn directive(mut self, directive: TypeCheckableDirectiveMeta) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn pipe(mut self, name: &str, reference: Reference) -> Self {
        self.pipes.insert(name.to_string(), reference);
        self
    }

    pub fn schema(mut self, schema: SchemaMetadata) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn reflector(mut self, reflector: TestReflectionHost) -> Self {
        self.reflector = reflector;
        self
    }

    pub fn behavior(mut self, behavior: TcbGenericContextBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn generate(self, template: &TestTemplate, nodes: Vec<t::R3Node>) -> Result<TcbResult> {
        let reference = Reference::new(Rc::clone(&self.component));
        let binder = R3TargetBinder::from_directives(self.directives);
        let bound_target: Rc<dyn BoundTarget<TypeCheckableDirectiveMeta>> =
            Rc::from(binder.bind(Target {
                template: Some(nodes),
            }));

        let source_manager = Rc::new(RefCell::new(TemplateSourceManager::new()));
        let id = source_manager.borrow_mut().capture_source(
            &reference.node,
            direct_mapping(template),
            template.file.clone(),
        );
        let meta = TypeCheckBlockMetadata {
            id,
            bound_target,
            pipes: self.pipes,
            schemas: self.schemas,
        };

        let reflector: Rc<dyn ReflectionHost> = Rc::new(self.reflector);
        let mut env = Environment::new(
            self.config,
            ImportManager::default(),
            ref_emitter(),
            reflector,
            SourceFile::new(SHIM_FILE, ""),
        );
        let mut dom = RegistryDomSchemaChecker::new(Rc::clone(&source_manager));
        let mut oob = OutOfBandDiagnosticRecorderImpl::new(Rc::clone(&source_manager));
        let block = generate_type_check_block(
            &mut env,
            &reference,
            "_tcb1",
            &meta,
            &mut dom,
            &mut oob,
            self.behavior,
        )?;

        Ok(TcbResult {
            text: Printer::new(true).print_statement(&block),
            block,
            dom_diagnostics: dom.into_diagnostics(),
            oob_diagnostics: oob.into_diagnostics(),
        })
    }
}

impl Default for TcbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The type-check block of `nodes` with the default configuration and `directives` in scope.
pub fn tcb(
    template: &TestTemplate,
    nodes: Vec<t::R3Node>,
    directives: Vec<TypeCheckableDirectiveMeta>,
) -> String {
    let builder = directives
        .into_iter()
        .fold(TcbBuilder::new(), |builder, dir| builder.directive(dir));
    match builder.generate(template, nodes) {
        Ok(result) => result.text,
        Err(err) => panic!("type-check block generation failed: {}", err),
    }
}

/// A host over an in-memory set of input files that records everything it's told.
#[derive(Default)]
pub struct TestTypeCheckingHost {
    files: HashMap<String, SourceFile>,
    source_managers: HashMap<String, Rc<RefCell<TemplateSourceManager>>>,
    /// Names of components that are not checked.
    pub skipped: HashSet<String>,
    pub shims: Vec<(String, ShimTypeCheckingData)>,
    pub completed: Vec<String>,
}

impl TestTypeCheckingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files
            .insert(path.to_string(), SourceFile::new(path, text));
        self
    }

    pub fn skip(mut self, component: &str) -> Self {
        self.skipped.insert(component.to_string());
        self
    }

    pub fn source_manager(&self, sf_path: &str) -> Option<Rc<RefCell<TemplateSourceManager>>> {
        self.source_managers.get(sf_path).map(Rc::clone)
    }
}

impl TypeCheckingHost for TestTypeCheckingHost {
    fn get_source_manager(&mut self, sf_path: &str) -> Rc<RefCell<TemplateSourceManager>> {
        Rc::clone(
            self.source_managers
                .entry(sf_path.to_string())
                .or_insert_with(|| Rc::new(RefCell::new(TemplateSourceManager::new()))),
        )
    }

    fn get_source_file(&self, sf_path: &str) -> Option<SourceFile> {
        self.files.get(sf_path).cloned()
    }

    fn should_check_component(&self, node: &ClassDeclaration) -> bool {
        !self.skipped.contains(&node.name)
    }

    fn record_shim_data(&mut self, sf_path: &str, data: ShimTypeCheckingData) {
        self.shims.push((sf_path.to_string(), data));
    }

    fn record_complete(&mut self, sf_path: &str) {
        self.completed.push(sf_path.to_string());
    }
}

/// Binds `nodes` without any directives, for tests that only need scopes.
pub fn bind_plain(nodes: Vec<t::R3Node>) -> Rc<dyn BoundTarget<TypeCheckableDirectiveMeta>> {
    let binder = R3TargetBinder::<TypeCheckableDirectiveMeta>::from_directives(Vec::new());
    Rc::from(binder.bind(Target {
        template: Some(nodes),
    }))
}


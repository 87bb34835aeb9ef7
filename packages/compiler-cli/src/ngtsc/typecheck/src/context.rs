// TypeCheck Context Implementation
//
// The type-checking context of a compilation pass.
//
// Components are registered one template at a time. Each template's type-check block either
// goes into the type-checking shim of the component's file or, when it can't be written
// outside the component's own file, is queued as an operation that splices it into that file.
// Generic directives that need a type constructor on the class itself are handled the same
// way. `finalize` applies the queued operations and renders the shims.

use std::cell::RefCell;
use std::collections::HashSet;
use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;
use ngtcb_compiler::core::SchemaMetadata;
use ngtcb_compiler::parse_util::{ParseError, ParseSourceFile};
use ngtcb_compiler::render3::r3_ast::R3Node;
use ngtcb_compiler::render3::view::t2_api::{BoundTarget, Target, TargetBinder};
use ts::{DeclarationId, DiagnosticCategory, Printer, SourceFile};

use super::dom::{DomSchemaChecker, RegistryDomSchemaChecker};
use super::environment::Environment;
use super::oob::{OutOfBandDiagnosticRecorder, OutOfBandDiagnosticRecorderImpl};
use super::shim::type_check_shim_path;
use super::source::TemplateSourceManager;
use super::tcb_util::{requires_inline_type_check_block, TcbInliningRequirement};
use super::type_check_block::{generate_type_check_block, TcbGenericContextBehavior};
use super::type_check_file::TypeCheckFile;
use super::type_constructor::{generate_inline_type_ctor, requires_inline_type_ctor};
use crate::ngtsc::diagnostics::ErrorCode;
use crate::ngtsc::imports::{NoopImportRewriter, Reference, ReferenceEmitter};
use crate::ngtsc::reflection::{ClassDeclaration, ReflectionHost};
use crate::ngtsc::translator::ImportManager;
use crate::ngtsc::typecheck::api::{
    InliningMode, Result, ShimTypeCheckingData, TemplateData, TemplateId, TemplateSourceMapping,
    TypeCheckBlockMetadata, TypeCheckError, TypeCheckableDirectiveMeta, TypeCheckingConfig,
    TypeCheckingHost, TypeCtorFields, TypeCtorMetadata,
};
use crate::ngtsc::typecheck::diagnostics::{make_template_diagnostic, TemplateDiagnostic};

/// Type-checking state of one input file.
struct PendingFileTypeCheckingData {
    /// Whether any code has to be inlined into the file.
    has_inlines: bool,
    source_manager: Rc<RefCell<TemplateSourceManager>>,
    /// Shims of the file, by shim path.
    shim_data: IndexMap<String, PendingShimData>,
}

/// A type-checking shim being built.
struct PendingShimData {
    /// Shared with the inline operations of the shim's templates.
    dom_schema_checker: Rc<RefCell<RegistryDomSchemaChecker>>,
    oob_recorder: Rc<RefCell<OutOfBandDiagnosticRecorderImpl>>,
    file: TypeCheckFile,
    templates: IndexMap<TemplateId, TemplateData>,
}

/// A template type-checking context for a program.
///
/// Not reusable: create one per compilation pass.
pub struct TypeCheckContextImpl<H: TypeCheckingHost> {
    config: TypeCheckingConfig,
    ref_emitter: Rc<ReferenceEmitter>,
    reflector: Rc<dyn ReflectionHost>,
    host: H,
    inlining: InliningMode,

    /// Input files with registered templates, by path.
    file_map: IndexMap<String, PendingFileTypeCheckingData>,

    /// Operations to perform on input files, by path, in the order they were queued.
    op_map: IndexMap<String, Vec<Op>>,

    /// Classes with a type constructor operation queued already.
    type_ctor_pending: HashSet<DeclarationId>,
}

impl<H: TypeCheckingHost> TypeCheckContextImpl<H> {
    pub fn new(
        config: TypeCheckingConfig,
        ref_emitter: Rc<ReferenceEmitter>,
        reflector: Rc<dyn ReflectionHost>,
        host: H,
        inlining: InliningMode,
    ) -> Result<Self> {
        if inlining == InliningMode::Error && config.use_inline_type_constructors {
            // The configuration asks for inline type constructors the environment can't write.
            return Err(TypeCheckError::InvalidInliningConfiguration);
        }
        Ok(Self {
            config,
            ref_emitter,
            reflector,
            host,
            inlining,
            file_map: IndexMap::new(),
            op_map: IndexMap::new(),
            type_ctor_pending: HashSet::new(),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Registers the template of the component `reference` to be type-checked.
    ///
    /// `template` is bound with `binder`. Errors from parsing the template are turned into
    /// diagnostics of the template right away.
    #[allow(clippy::too_many_arguments)]
    pub fn add_template(
        &mut self,
        reference: &Reference,
        binder: &dyn TargetBinder<TypeCheckableDirectiveMeta>,
        template: Vec<R3Node>,
        pipes: IndexMap<String, Reference>,
        schemas: Vec<SchemaMetadata>,
        source_mapping: TemplateSourceMapping,
        file: ParseSourceFile,
        parse_errors: Option<Vec<ParseError>>,
    ) -> Result<()> {
        let node = &reference.node;
        if !self.host.should_check_component(node) {
            tracing::trace!(component = %reference.debug_name(), "component is not checked in this pass");
            return Ok(());
        }

        let inlining = self.inlining;
        let sf_path = node.source_file.clone();
        let source_manager = Rc::clone(&self.data_for_file(&sf_path).source_manager);
        self.pending_shim_for_component(node);
        let template_id = source_manager.borrow_mut().get_template_id(node);
        tracing::debug!(template = %template_id, component = %reference.debug_name(), file = %sf_path, "registering template");

        let template_diagnostics = match &parse_errors {
            Some(errors) => get_template_diagnostics(errors, &template_id, &source_mapping),
            None => Vec::new(),
        };

        let bound_target: Rc<dyn BoundTarget<TypeCheckableDirectiveMeta>> =
            Rc::from(binder.bind(Target {
                template: Some(template.clone()),
            }));

        if inlining == InliningMode::InlineOps {
            for dir in bound_target.get_used_directives() {
                let dir_node = &dir.reference.node;
                if !dir.is_generic || !requires_inline_type_ctor(dir_node, self.reflector.as_ref()) {
                    continue;
                }
                let ctor_meta = TypeCtorMetadata {
                    fn_name: "ngTypeCtor".to_string(),
                    // Declaration files can't hold a body.
                    body: !dir_node.is_declaration_file,
                    fields: TypeCtorFields {
                        inputs: dir.inputs.class_property_names().map(String::from).collect(),
                        outputs: dir.outputs.class_property_names().map(String::from).collect(),
                        queries: dir.queries.clone(),
                    },
                    coerced_input_fields: dir.coerced_input_fields.clone(),
                };
                self.add_inline_type_ctor(&sf_path, &dir.reference, ctor_meta);
            }
        }

        let inlining_requirement =
            requires_inline_type_check_block(node, &pipes, self.reflector.as_ref());

        let shim_data = self.pending_shim_for_component(node);
        shim_data.templates.insert(
            template_id.clone(),
            TemplateData {
                template,
                bound_target: Rc::clone(&bound_target),
                template_diagnostics,
            },
        );

        if inlining == InliningMode::Error
            && inlining_requirement == TcbInliningRequirement::MustInline
        {
            // Checking the template would need inlining, which isn't available.
            shim_data
                .oob_recorder
                .borrow_mut()
                .requires_inline_tcb(&template_id, node);
            tracing::warn!(template = %template_id, component = %reference.debug_name(), "skipping template that requires an inline type-check block");
            return Ok(());
        }

        let meta = TypeCheckBlockMetadata {
            id: source_manager
                .borrow_mut()
                .capture_source(node, source_mapping, file),
            bound_target,
            pipes,
            schemas,
        };

        if inlining_requirement != TcbInliningRequirement::None
            && inlining == InliningMode::InlineOps
        {
            let dom_schema_checker = Rc::clone(&shim_data.dom_schema_checker);
            let oob_recorder = Rc::clone(&shim_data.oob_recorder);
            self.add_inline_type_check_block(
                &sf_path,
                reference,
                meta,
                dom_schema_checker,
                oob_recorder,
            );
            return Ok(());
        }

        // A shim can't name the component's generic bounds, so they become `any` when they
        // aren't context free.
        let generic_context_behavior =
            if inlining_requirement == TcbInliningRequirement::ShouldInlineForGenericBounds {
                TcbGenericContextBehavior::FallbackToAny
            } else {
                TcbGenericContextBehavior::UseEmitter
            };
        let mut dom_schema_checker = shim_data.dom_schema_checker.borrow_mut();
        let mut oob_recorder = shim_data.oob_recorder.borrow_mut();
        shim_data.file.add_type_check_block(
            reference,
            &meta,
            &mut *dom_schema_checker,
            &mut *oob_recorder,
            generic_context_behavior,
        )
    }

    /// Queues a type constructor for the directive `reference`, once per class.
    fn add_inline_type_ctor(
        &mut self,
        sf_path: &str,
        reference: &Reference,
        ctor_meta: TypeCtorMetadata,
    ) {
        if !self.type_ctor_pending.insert(reference.id()) {
            return;
        }
        tracing::trace!(directive = %reference.debug_name(), "queueing inline type constructor");
        self.op_map
            .entry(reference.node.source_file.clone())
            .or_default()
            .push(Op::TypeCtor(TypeCtorOp {
                reference: reference.clone(),
                meta: ctor_meta,
            }));
        self.data_for_file(sf_path).has_inlines = true;
    }

    fn add_inline_type_check_block(
        &mut self,
        sf_path: &str,
        reference: &Reference,
        meta: TypeCheckBlockMetadata,
        dom_schema_checker: Rc<RefCell<RegistryDomSchemaChecker>>,
        oob_recorder: Rc<RefCell<OutOfBandDiagnosticRecorderImpl>>,
    ) {
        tracing::trace!(template = %meta.id, component = %reference.debug_name(), "queueing inline type-check block");
        self.op_map
            .entry(reference.node.source_file.clone())
            .or_default()
            .push(Op::InlineTcb(InlineTcbOp {
                reference: reference.clone(),
                meta,
                config: self.config.clone(),
                reflector: Rc::clone(&self.reflector),
                dom_schema_checker,
                oob_recorder,
            }));
        self.data_for_file(sf_path).has_inlines = true;
    }

    /// The text of `sf` with the operations queued for it spliced in, or `None` when there are
    /// none.
    pub fn transform(&self, sf: &SourceFile) -> Result<Option<String>> {
        let Some(ops) = self.op_map.get(&sf.file_name) else {
            return Ok(None);
        };

        // A stable sort keeps operations at the same split point in the order they were queued.
        let mut ops: Vec<&Op> = ops.iter().collect();
        ops.sort_by_key(|op| op.split_point());

        let split_points: Vec<usize> = ops.iter().map(|op| op.split_point()).collect();
        let text_parts = split_string_at_points(&sf.text, &split_points);

        // Authored files may already declare `i0`, so imports spliced into them use `_i`.
        let mut import_manager = ImportManager::new(Box::new(NoopImportRewriter::new()), "_i");
        let printer = Printer::default();

        let mut code = text_parts[0].to_string();
        for (op, text_part) in ops.iter().zip(&text_parts[1..]) {
            let text = op.execute(&mut import_manager, sf, &self.ref_emitter, &printer)?;
            code.push_str("\n\n");
            code.push_str(&text);
            code.push_str(text_part);
        }

        let imports = import_manager
            .get_all_imports(&sf.file_name)
            .iter()
            .map(|import| format!("import * as {} from '{}';", import.qualifier, import.specifier))
            .collect::<Vec<_>>();
        if !imports.is_empty() {
            code = format!("{}\n{}", imports.join("\n"), code);
        }
        Ok(Some(code))
    }

    /// Applies every queued operation and renders every shim. Returns the new text of each
    /// changed input file and of each shim, by path, and reports each shim to the host.
    pub fn finalize(&mut self) -> Result<IndexMap<String, String>> {
        let mut updates = IndexMap::new();

        for sf_path in self.op_map.keys() {
            let sf = self
                .host
                .get_source_file(sf_path)
                .ok_or_else(|| TypeCheckError::MissingSourceFile(sf_path.clone()))?;
            if let Some(new_text) = self.transform(&sf)? {
                updates.insert(sf_path.clone(), new_text);
            }
        }
        let inlined_files = updates.len();

        let mut shims = 0;
        for (sf_path, file_data) in mem::take(&mut self.file_map) {
            for (shim_path, shim_data) in file_data.shim_data {
                let mut genesis_diagnostics =
                    shim_data.dom_schema_checker.borrow().diagnostics().to_vec();
                genesis_diagnostics.extend_from_slice(shim_data.oob_recorder.borrow().diagnostics());

                let (text, blocks) = shim_data.file.render(false);
                self.host.record_shim_data(
                    &sf_path,
                    ShimTypeCheckingData {
                        path: shim_path.clone(),
                        genesis_diagnostics,
                        has_inlines: file_data.has_inlines,
                        templates: shim_data.templates,
                        blocks,
                    },
                );
                updates.insert(shim_path, text);
                shims += 1;
            }
            self.host.record_complete(&sf_path);
        }
        self.op_map.clear();

        tracing::info!(inlined_files, shims, "finalized type-checking context");
        Ok(updates)
    }

    fn data_for_file(&mut self, sf_path: &str) -> &mut PendingFileTypeCheckingData {
        let host = &mut self.host;
        self.file_map
            .entry(sf_path.to_string())
            .or_insert_with(|| PendingFileTypeCheckingData {
                has_inlines: false,
                source_manager: host.get_source_manager(sf_path),
                shim_data: IndexMap::new(),
            })
    }

    fn pending_shim_for_component(&mut self, node: &ClassDeclaration) -> &mut PendingShimData {
        let shim_path = type_check_shim_path(&node.source_file);
        let config = &self.config;
        let ref_emitter = &self.ref_emitter;
        let reflector = &self.reflector;
        let host = &mut self.host;

        let file_data = self
            .file_map
            .entry(node.source_file.clone())
            .or_insert_with(|| PendingFileTypeCheckingData {
                has_inlines: false,
                source_manager: host.get_source_manager(&node.source_file),
                shim_data: IndexMap::new(),
            });
        let source_manager = &file_data.source_manager;
        file_data
            .shim_data
            .entry(shim_path.clone())
            .or_insert_with(|| PendingShimData {
                dom_schema_checker: Rc::new(RefCell::new(RegistryDomSchemaChecker::new(
                    Rc::clone(source_manager),
                ))),
                oob_recorder: Rc::new(RefCell::new(OutOfBandDiagnosticRecorderImpl::new(
                    Rc::clone(source_manager),
                ))),
                file: TypeCheckFile::new(
                    shim_path,
                    config.clone(),
                    Rc::clone(ref_emitter),
                    Rc::clone(reflector),
                ),
                templates: IndexMap::new(),
            })
    }
}

/// Diagnostics for the errors found while parsing a template.
fn get_template_diagnostics(
    parse_errors: &[ParseError],
    template_id: &TemplateId,
    mapping: &TemplateSourceMapping,
) -> Vec<TemplateDiagnostic> {
    parse_errors
        .iter()
        .map(|error| {
            let mut span = error.span.clone();
            if span.start.offset == span.end.offset {
                // A zero-length span wouldn't show up anywhere, so make it cover one character.
                span.end.offset += 1;
            }
            make_template_diagnostic(
                template_id.clone(),
                mapping,
                &span,
                DiagnosticCategory::Error,
                ErrorCode::TemplateParseError,
                error.msg.clone(),
                None,
            )
        })
        .collect()
}

/// Cuts `text` at each of `points`, which must be in ascending order. Points past the end of
/// the text cut at its end.
fn split_string_at_points<'t>(text: &'t str, points: &[usize]) -> Vec<&'t str> {
    let mut splits = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for &point in points {
        let mut point = point.clamp(start, text.len());
        while !text.is_char_boundary(point) {
            point -= 1;
        }
        splits.push(&text[start..point]);
        start = point;
    }
    splits.push(&text[start..]);
    splits
}

/// Code to splice into an input file.
enum Op {
    InlineTcb(InlineTcbOp),
    TypeCtor(TypeCtorOp),
}

impl Op {
    /// Offset in the original text of the file where the code goes.
    fn split_point(&self) -> usize {
        match self {
            // Right after the end of the component class.
            Op::InlineTcb(op) => op.reference.node.end + 1,
            // Right before the closing brace of the directive class.
            Op::TypeCtor(op) => op.reference.node.end.saturating_sub(1),
        }
    }

    fn execute(
        &self,
        import_manager: &mut ImportManager,
        sf: &SourceFile,
        ref_emitter: &Rc<ReferenceEmitter>,
        printer: &Printer,
    ) -> Result<String> {
        match self {
            Op::InlineTcb(op) => op.execute(import_manager, sf, ref_emitter, printer),
            Op::TypeCtor(op) => Ok(printer.print_statement(&generate_inline_type_ctor(
                &op.reference.node,
                &op.meta,
            ))),
        }
    }
}

/// A type-check block to write next to its component.
struct InlineTcbOp {
    reference: Reference,
    meta: TypeCheckBlockMetadata,
    config: TypeCheckingConfig,
    reflector: Rc<dyn ReflectionHost>,
    dom_schema_checker: Rc<RefCell<RegistryDomSchemaChecker>>,
    oob_recorder: Rc<RefCell<OutOfBandDiagnosticRecorderImpl>>,
}

impl InlineTcbOp {
    fn execute(
        &self,
        import_manager: &mut ImportManager,
        sf: &SourceFile,
        ref_emitter: &Rc<ReferenceEmitter>,
        printer: &Printer,
    ) -> Result<String> {
        // Every operation on the file shares its imports.
        let mut env = Environment::new(
            self.config.clone(),
            mem::take(import_manager),
            Rc::clone(ref_emitter),
            Rc::clone(&self.reflector),
            sf.clone(),
        );
        let fn_name = format!("_tcb_{}", self.reference.node.pos);
        let mut dom_schema_checker = self.dom_schema_checker.borrow_mut();
        let mut oob_recorder = self.oob_recorder.borrow_mut();

        // Inlined next to the class, the block can use the class's type parameters as they are.
        let result = generate_type_check_block(
            &mut env,
            &self.reference,
            &fn_name,
            &self.meta,
            &mut *dom_schema_checker,
            &mut *oob_recorder,
            TcbGenericContextBehavior::CopyClassNodes,
        );
        *import_manager = env.import_manager;
        Ok(printer.print_statement(&result?))
    }
}

/// A static `ngTypeCtor` to add to a generic directive's class.
struct TypeCtorOp {
    reference: Reference,
    meta: TypeCtorMetadata,
}

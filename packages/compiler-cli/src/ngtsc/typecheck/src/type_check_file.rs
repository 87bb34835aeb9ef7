// TypeCheck File
//
// A type-checking shim file: the type-check blocks of every component of one input file that
// don't need to live next to their class.

use std::rc::Rc;

use indexmap::IndexMap;
use ts::{Printer, SourceFile, Statement};

use super::dom::DomSchemaChecker;
use super::environment::Environment;
use super::oob::OutOfBandDiagnosticRecorder;
use super::type_check_block::{generate_type_check_block, TcbGenericContextBehavior};
use crate::ngtsc::imports::{Reference, ReferenceEmitter};
use crate::ngtsc::reflection::ReflectionHost;
use crate::ngtsc::translator::ImportManager;
use crate::ngtsc::typecheck::api::{
    RenderedTcb, Result, TemplateId, TypeCheckBlockMetadata, TypeCheckingConfig,
};

/// Collects type-check blocks for a shim file and renders it.
///
/// The shim shares one prelude of type constructors and pipe instances between all its blocks,
/// written at the top of the file.
pub struct TypeCheckFile {
    env: Environment,
    file_name: String,
    next_tcb_id: usize,
    tcb_statements: IndexMap<TemplateId, Statement>,
}

impl TypeCheckFile {
    pub fn new(
        file_name: impl Into<String>,
        config: TypeCheckingConfig,
        ref_emitter: Rc<ReferenceEmitter>,
        reflector: Rc<dyn ReflectionHost>,
    ) -> Self {
        let file_name = file_name.into();
        let env = Environment::new(
            config,
            ImportManager::default(),
            ref_emitter,
            reflector,
            SourceFile::new(file_name.clone(), ""),
        )
        .with_hoisted_prelude();
        Self {
            env,
            file_name,
            next_tcb_id: 1,
            tcb_statements: IndexMap::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Generates the type-check block of `reference` into the shim, as `_tcbN`.
    pub fn add_type_check_block(
        &mut self,
        reference: &Reference,
        meta: &TypeCheckBlockMetadata,
        dom_schema_checker: &mut dyn DomSchemaChecker,
        oob_recorder: &mut dyn OutOfBandDiagnosticRecorder,
        generic_context_behavior: TcbGenericContextBehavior,
    ) -> Result<()> {
        let name = format!("_tcb{}", self.next_tcb_id);
        self.next_tcb_id += 1;
        let block = generate_type_check_block(
            &mut self.env,
            reference,
            &name,
            meta,
            dom_schema_checker,
            oob_recorder,
            generic_context_behavior,
        )?;
        tracing::debug!(shim = %self.file_name, template = %meta.id, name = %name, "added type-check block to shim");
        self.tcb_statements.insert(meta.id.clone(), block);
        Ok(())
    }

    /// The type-check block generated for `id`.
    pub fn type_check_block(&self, id: &TemplateId) -> Option<&Statement> {
        self.tcb_statements.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.tcb_statements.is_empty()
    }

    /// Renders the shim: imports, the shared prelude, then every type-check block. Also returns
    /// where each block ended up in the text.
    pub fn render(&self, remove_comments: bool) -> (String, IndexMap<TemplateId, RenderedTcb>) {
        let printer = Printer::new(remove_comments);

        let mut source = self
            .env
            .import_manager
            .get_all_imports(&self.file_name)
            .iter()
            .map(|import| format!("import * as {} from '{}';", import.qualifier, import.specifier))
            .collect::<Vec<_>>()
            .join("\n");
        source.push_str("\n\n");

        for stmt in self
            .env
            .pipe_inst_statements()
            .iter()
            .chain(self.env.type_ctor_statements())
        {
            source.push_str(&printer.print_statement(stmt));
            source.push('\n');
        }
        source.push('\n');

        let mut blocks = IndexMap::new();
        for (id, stmt) in &self.tcb_statements {
            blocks.insert(
                id.clone(),
                RenderedTcb {
                    block: stmt.clone(),
                    offset: source.len(),
                },
            );
            source.push_str(&printer.print_statement(stmt));
            source.push('\n');
        }

        // Makes the shim a module even when it has no imports.
        source.push_str("\nexport const IS_A_MODULE = true;\n");
        (source, blocks)
    }
}

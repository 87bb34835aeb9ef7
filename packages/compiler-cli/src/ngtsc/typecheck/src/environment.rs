// TypeCheck Environment
//
// Per-file registry of the declarations type-check blocks depend on.
//
// Type-check blocks refer to directive type constructors and pipe instances. Those are
// declared once per target file and shared by every block written into it; the environment
// hands out references to them and collects the declarations. It also knows how to reference
// any declaration of the program from the target file, adding imports as needed.

use std::collections::HashMap;
use std::rc::Rc;

use ts::factory::{create_identifier, create_property_access};
use ts::{DeclarationId, Expression, SourceFile, Statement, TypeNode, TypeParameterDeclaration};

use super::ts_util::ts_declare_variable;
use super::type_constructor::{generate_type_ctor_declaration_fn, requires_inline_type_ctor};
use super::type_parameter_emitter::TypeParameterEmitter;
use crate::ngtsc::imports::{ImportFlags, OutputExpr, Reference, ReferenceEmitResult, ReferenceEmitter};
use crate::ngtsc::reflection::{DeclarationNode, ReflectionHost};
use crate::ngtsc::translator::{translate_expression, translate_type, ExpressionType, ImportManager};
use crate::ngtsc::typecheck::api::{
    Result, TypeCheckError, TypeCheckableDirectiveMeta, TypeCheckingConfig, TypeCtorFields,
    TypeCtorMetadata,
};

#[derive(Debug, Clone, Copy)]
struct NextIds {
    pipe_inst: usize,
    type_ctor: usize,
}

pub struct Environment {
    pub config: TypeCheckingConfig,
    pub import_manager: ImportManager,
    ref_emitter: Rc<ReferenceEmitter>,
    pub reflector: Rc<dyn ReflectionHost>,
    context_file: SourceFile,

    next_ids: NextIds,
    type_ctors: HashMap<DeclarationId, Expression>,
    type_ctor_statements: Vec<Statement>,
    pipe_insts: HashMap<DeclarationId, Expression>,
    pipe_inst_statements: Vec<Statement>,

    /// Set when the owner writes the prelude at file level itself, so blocks don't repeat it.
    hoisted_prelude: bool,
}

impl Environment {
    pub fn new(
        config: TypeCheckingConfig,
        import_manager: ImportManager,
        ref_emitter: Rc<ReferenceEmitter>,
        reflector: Rc<dyn ReflectionHost>,
        context_file: SourceFile,
    ) -> Self {
        Self {
            config,
            import_manager,
            ref_emitter,
            reflector,
            context_file,
            next_ids: NextIds {
                pipe_inst: 1,
                type_ctor: 1,
            },
            type_ctors: HashMap::new(),
            type_ctor_statements: Vec::new(),
            pipe_insts: HashMap::new(),
            pipe_inst_statements: Vec::new(),
            hoisted_prelude: false,
        }
    }

    /// An environment whose prelude is written once at the top of the file instead of inside
    /// every type-check block.
    pub fn with_hoisted_prelude(mut self) -> Self {
        self.hoisted_prelude = true;
        self
    }

    pub fn context_file(&self) -> &SourceFile {
        &self.context_file
    }

    /// The type constructor of a directive: either its inline `ngTypeCtor` or a `_ctorN`
    /// declared in this environment.
    pub fn type_ctor_for(&mut self, dir: &TypeCheckableDirectiveMeta) -> Result<Expression> {
        let dir_ref = &dir.reference;
        let node = Rc::clone(&dir_ref.node);
        if let Some(existing) = self.type_ctors.get(&node.id) {
            return Ok(existing.clone());
        }

        if requires_inline_type_ctor(&node, self.reflector.as_ref()) {
            // The constructor lives on the class itself.
            let reference = self.reference(dir_ref)?;
            let type_ctor_expr = create_property_access(reference, "ngTypeCtor");
            self.type_ctors.insert(node.id, type_ctor_expr.clone());
            return Ok(type_ctor_expr);
        }

        let fn_name = format!("_ctor{}", self.next_ids.type_ctor);
        self.next_ids.type_ctor += 1;

        let node_type_ref = match self.reference_type(dir_ref)? {
            TypeNode::Reference(reference) => reference.type_name,
            _ => {
                return Err(TypeCheckError::ExpectedTypeReference(format!(
                    "from reference to {}",
                    dir_ref.debug_name()
                )))
            }
        };

        let meta = TypeCtorMetadata {
            fn_name: fn_name.clone(),
            body: true,
            fields: TypeCtorFields {
                inputs: dir.inputs.class_property_names().map(String::from).collect(),
                outputs: dir.outputs.class_property_names().map(String::from).collect(),
                queries: dir.queries.clone(),
            },
            coerced_input_fields: dir.coerced_input_fields.clone(),
        };
        let type_params = self.emit_type_parameters(&node)?;
        let type_ctor = generate_type_ctor_declaration_fn(
            &node,
            &meta,
            &node_type_ref,
            type_params,
            self.reflector.as_ref(),
        )?;
        tracing::trace!(directive = %dir_ref.debug_name(), fn_name = %fn_name, "declared type constructor");
        self.type_ctor_statements.push(type_ctor);

        let fn_id = create_identifier(fn_name);
        self.type_ctors.insert(node.id, fn_id.clone());
        Ok(fn_id)
    }

    /// A placeholder instance of the pipe, `_pipeN`, typed as the pipe class.
    pub fn pipe_inst(&mut self, reference: &Reference) -> Result<Expression> {
        if let Some(existing) = self.pipe_insts.get(&reference.node.id) {
            return Ok(existing.clone());
        }

        let pipe_type = self.reference_type(reference)?;
        let pipe_inst_id = create_identifier(format!("_pipe{}", self.next_ids.pipe_inst));
        self.next_ids.pipe_inst += 1;

        self.pipe_inst_statements
            .push(ts_declare_variable(pipe_inst_id.clone(), pipe_type));
        self.pipe_insts.insert(reference.node.id, pipe_inst_id.clone());
        Ok(pipe_inst_id)
    }

    /// An expression referring to `reference` from the context file.
    ///
    /// Aliases are never used: the generated code isn't part of any public API.
    pub fn reference(&mut self, reference: &Reference) -> Result<Expression> {
        let expression = self.emit(reference, ImportFlags::NO_ALIASING)?;
        Ok(translate_expression(&expression, &mut self.import_manager))
    }

    /// A type referring to `reference` from the context file.
    pub fn reference_type(&mut self, reference: &Reference) -> Result<TypeNode> {
        let expression = self.emit(reference, ImportFlags::NO_ALIASING | ImportFlags::ALLOW_TYPE_IMPORTS)?;
        Ok(translate_type(
            &ExpressionType::new(expression, None),
            &mut self.import_manager,
        ))
    }

    fn emit(&self, reference: &Reference, flags: ImportFlags) -> Result<OutputExpr> {
        match self.ref_emitter.emit(reference, &self.context_file, flags) {
            ReferenceEmitResult::Success(emitted) => Ok(emitted.expression),
            ReferenceEmitResult::Failed(failed) => Err(TypeCheckError::ReferenceEmitFailed {
                ref_name: failed.ref_name,
                context: failed.context,
                reason: failed.reason,
            }),
        }
    }

    /// Re-emits the type parameters of `declaration` so they're valid in the context file.
    pub fn emit_type_parameters(
        &mut self,
        declaration: &DeclarationNode,
    ) -> Result<Option<Vec<TypeParameterDeclaration>>> {
        let reflector = Rc::clone(&self.reflector);
        let emitter = TypeParameterEmitter::new(declaration, reflector.as_ref());
        emitter.emit(&mut |reference| self.reference_type(reference))
    }

    /// A type naming an export of an arbitrary module, e.g. `i0.TemplateRef<any>`.
    pub fn reference_external_type(
        &mut self,
        module_name: &str,
        name: &str,
        type_params: Option<Vec<TypeNode>>,
    ) -> TypeNode {
        let external = OutputExpr::External {
            module_name: module_name.to_string(),
            name: name.to_string(),
        };
        translate_type(&ExpressionType::new(external, type_params), &mut self.import_manager)
    }

    /// Statements every block of this environment relies on: pipe instances, then type
    /// constructors. Empty when the owner writes them at file level.
    pub fn get_prelude_statements(&self) -> Vec<Statement> {
        if self.hoisted_prelude {
            return Vec::new();
        }
        self.pipe_inst_statements
            .iter()
            .chain(&self.type_ctor_statements)
            .cloned()
            .collect()
    }

    pub fn pipe_inst_statements(&self) -> &[Statement] {
        &self.pipe_inst_statements
    }

    pub fn type_ctor_statements(&self) -> &[Statement] {
        &self.type_ctor_statements
    }
}

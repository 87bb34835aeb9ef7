// Template Semantics Checker
//
// Semantic checks of template expressions that the host type-checker can't perform, because
// the generated code is allowed to do things the template isn't.

use ngtcb_compiler::expression_parser::ast::AST;
use ngtcb_compiler::render3::view::t2_api::{BoundTarget, TemplateEntity};

use super::oob::OutOfBandDiagnosticRecorder;
use crate::ngtsc::typecheck::api::{Result, TemplateId, TypeCheckableDirectiveMeta};

/// Reports assignments to template variables within an event handler. Template variables are
/// declared with `var` in the type-check block, so the host would accept the assignment.
pub struct ExpressionSemanticVisitor<'a> {
    template_id: &'a TemplateId,
    bound_target: &'a dyn BoundTarget<TypeCheckableDirectiveMeta>,
    oob: &'a mut dyn OutOfBandDiagnosticRecorder,
}

impl<'a> ExpressionSemanticVisitor<'a> {
    pub fn visit(
        ast: &AST,
        template_id: &'a TemplateId,
        bound_target: &'a dyn BoundTarget<TypeCheckableDirectiveMeta>,
        oob: &'a mut dyn OutOfBandDiagnosticRecorder,
    ) -> Result<()> {
        let mut visitor = ExpressionSemanticVisitor {
            template_id,
            bound_target,
            oob,
        };
        visitor.visit_ast(ast)
    }

    fn visit_ast(&mut self, ast: &AST) -> Result<()> {
        if let AST::PropertyWrite(write) = ast {
            if matches!(*write.receiver, AST::ImplicitReceiver(_)) {
                if let Some(TemplateEntity::Variable(target)) =
                    self.bound_target.get_expression_target(ast)
                {
                    self.oob
                        .illegal_assignment_to_template_var(self.template_id, write, &target)?;
                }
            }
        }

        let mut result = Ok(());
        ast.for_each_child(&mut |child| {
            if result.is_ok() {
                result = self.visit_ast(child);
            }
        });
        result
    }
}

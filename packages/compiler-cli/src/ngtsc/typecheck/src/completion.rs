// Completion Engine
//
// Autocompletion support for one component.

use std::collections::HashMap;

use indexmap::IndexMap;
use ngtcb_compiler::expression_parser::ast::{AbsoluteSourceSpan, AstKey, AST};
use ngtcb_compiler::render3::r3_ast::{NodeKey, Template};
use ngtcb_compiler::render3::view::t2_api::TemplateEntity;
use ts::{Expression, ExpressionKind, Printer, Statement};

use super::comments::{find_first_matching_node, ExpressionIdentifier, FindOptions};
use crate::ngtsc::typecheck::api::{
    CompletionKind, GlobalCompletion, ShimLocation, TemplateContextCompletion, TemplateData,
};

/// Powers autocompletion for a specific component.
///
/// Results are cached, so the engine has to be discarded whenever the component's template or
/// the surrounding program changes.
pub struct CompletionEngine {
    tcb: Statement,
    /// Offset of the printed type-check block within the shim file.
    tcb_offset: usize,
    data: TemplateData,
    shim_path: String,
    printer: Printer,

    component_context: Option<ShimLocation>,

    /// Scope entities per template, `None` being the root template.
    template_context_cache: HashMap<Option<NodeKey>, IndexMap<String, TemplateContextCompletion>>,
    expression_completion_cache: HashMap<AstKey, ShimLocation>,
}

impl CompletionEngine {
    pub fn new(
        tcb: Statement,
        tcb_offset: usize,
        data: TemplateData,
        shim_path: impl Into<String>,
    ) -> Self {
        let mut engine = Self {
            tcb,
            tcb_offset,
            data,
            shim_path: shim_path.into(),
            printer: Printer::new(false),
            component_context: None,
            template_context_cache: HashMap::new(),
            expression_completion_cache: HashMap::new(),
        };

        // The component completion anchor looks like `ctx. /*T:COMPCOMP*/;`. Its name is empty,
        // so the name's position is right after the `.`.
        let opts = FindOptions::new(Expression::is_property_access)
            .with_expression_identifier(ExpressionIdentifier::ComponentCompletion);
        engine.component_context = find_first_matching_node(&engine.tcb, &opts)
            .and_then(|global_read| engine.printer.locate(&engine.tcb, global_read))
            .and_then(|position| position.name_span)
            .map(|(name_start, _)| engine.shim_location(name_start));
        engine
    }

    /// Completions for `node` within `context`, an `<ng-template>` or `None` for the root of
    /// the template.
    ///
    /// `None` when the type-check block has no component completion anchor, in which case no
    /// completion can be offered for the component at all.
    pub fn get_global_completions(
        &mut self,
        context: Option<&Template>,
        node: &AST,
    ) -> Option<GlobalCompletion> {
        let component_context = self.component_context.clone()?;
        let template_context = self.get_template_context_completions(context);

        let node_context = match node {
            AST::EmptyExpr(empty) => {
                let opts = FindOptions::new(Expression::is_identifier).with_span(empty.source_span);
                find_first_matching_node(&self.tcb, &opts)
                    .and_then(|location| self.printer.locate(&self.tcb, location))
                    .map(|position| self.shim_location(position.start))
            }
            _ => None,
        };

        Some(GlobalCompletion {
            component_context,
            template_context,
            node_context,
        })
    }

    /// Where to complete the member accessed by `expr`: right after the member's name in the
    /// type-check block.
    pub fn get_expression_completion_location(&mut self, expr: &AST) -> Option<ShimLocation> {
        let key = expr.key();
        if let Some(cached) = self.expression_completion_cache.get(&key) {
            return Some(cached.clone());
        }

        let ts_expr = match expr {
            AST::PropertyRead(read) => self.find_property_access(read.name_span),
            AST::PropertyWrite(write) => self.find_property_access(write.name_span),
            AST::MethodCall(call) => self.find_property_access(call.name_span),
            AST::SafePropertyRead(_) | AST::SafeMethodCall(_) => {
                // Safe navigation becomes a conditional. Only its "true" branch holds a typed
                // access to complete on.
                let opts =
                    FindOptions::new(Expression::is_parenthesized).with_span(expr.source_span());
                let ternary = find_first_matching_node(&self.tcb, &opts)?;
                let ExpressionKind::Parenthesized(inner) = &ternary.kind else {
                    return None;
                };
                let ExpressionKind::Conditional { when_true, .. } = &inner.kind else {
                    return None;
                };
                match (expr, &when_true.kind) {
                    (AST::SafePropertyRead(_), ExpressionKind::PropertyAccess { .. }) => {
                        Some(when_true.as_ref())
                    }
                    (AST::SafeMethodCall(_), ExpressionKind::Call { expression, .. })
                        if expression.is_property_access() =>
                    {
                        Some(expression.as_ref())
                    }
                    _ => None,
                }
            }
            _ => None,
        }?;

        let (_, name_end) = self.printer.locate(&self.tcb, ts_expr)?.name_span?;
        let location = self.shim_location(name_end);
        self.expression_completion_cache.insert(key, location.clone());
        Some(location)
    }

    fn find_property_access(&self, name_span: AbsoluteSourceSpan) -> Option<&Expression> {
        let opts = FindOptions::new(Expression::is_property_access).with_span(name_span);
        find_first_matching_node(&self.tcb, &opts)
    }

    /// The references and variables in scope of `context`, by name.
    fn get_template_context_completions(
        &mut self,
        context: Option<&Template>,
    ) -> IndexMap<String, TemplateContextCompletion> {
        let key = context.map(Template::key);
        if let Some(cached) = self.template_context_cache.get(&key) {
            return cached.clone();
        }

        let template_context: IndexMap<_, _> = self
            .data
            .bound_target
            .get_entities_in_template_scope(context)
            .into_iter()
            .map(|node| {
                let kind = match node {
                    TemplateEntity::Reference(_) => CompletionKind::Reference,
                    TemplateEntity::Variable(_) => CompletionKind::Variable,
                };
                (node.name().to_string(), TemplateContextCompletion { kind, node })
            })
            .collect();

        self.template_context_cache
            .insert(key, template_context.clone());
        template_context
    }

    fn shim_location(&self, position_in_tcb: usize) -> ShimLocation {
        ShimLocation {
            shim_path: self.shim_path.clone(),
            position_in_shim_file: self.tcb_offset + position_in_tcb,
        }
    }
}

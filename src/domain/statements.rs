//! Statement graph construction: one store object per statement node, child
//! links for nested bodies and branches, dependency edges from the
//! Expression Analyzer, and LocalVariable nodes for declarations found in
//! bodies.
//!
//! One builder is constructed per method or initializer body; the owner node
//! and the owner kind are fixed at construction and decide where local
//! variables attach.

use crate::domain::ast::{
    CatchClause, Expr, MethodBinding, Statement, Stmt, TypeBinding, VarFragment, VariableBinding,
};
use crate::domain::context::AnalysisContext;
use crate::domain::expr::{SymbolRef, complexity, dependencies};
use crate::domain::ports::{AttrValue, ModelStore, ObjectHandle};
use crate::domain::registry::mangle;
use crate::domain::schema::{assoc, attr, class};
use crate::domain::sig;
use anyhow::{Context, Result};
use std::collections::HashSet;
use tracing::debug;

/// What kind of declaration owns the body being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOwner {
    Method,
    Initializer,
}

pub struct StatementGraphBuilder {
    owner: Option<ObjectHandle>,
    owner_kind: BodyOwner,
}

impl StatementGraphBuilder {
    pub fn new(owner: Option<ObjectHandle>, owner_kind: BodyOwner) -> Self {
        Self { owner, owner_kind }
    }

    /// Allocates the store object for a statement: `<kind><n>` where `n` is
    /// one plus the number of instances of that kind already in the store.
    pub fn create_node<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        stmt: &Statement,
    ) -> Result<ObjectHandle> {
        let class_name = stmt.kind_name();
        let ordinal = ctx.store.count_instances(class_name) + 1;
        let node = ctx
            .store
            .create_object(Some(&format!("{class_name}{ordinal}")), class_name)?;
        ctx.store.set_attribute(
            node,
            attr::START_POSITION,
            AttrValue::Int(stmt.span.start as i64),
        )?;
        ctx.store
            .set_attribute(node, attr::LENGTH, AttrValue::Int(stmt.span.length as i64))?;
        Ok(node)
    }

    /// Inspects a statement whose node has already been created, dispatching
    /// on its kind.
    pub fn inspect<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        stmt: &Statement,
        node: ObjectHandle,
    ) -> Result<()> {
        match &stmt.kind {
            Stmt::Assert { condition } => self.inspect_assert(ctx, node, condition),
            Stmt::Block { statements } => {
                for child in statements {
                    let child_node = self.create_node(ctx, child)?;
                    ctx.store
                        .create_link(assoc::BLOCK_HAS_STATEMENT, [node, child_node])?;
                    self.inspect(ctx, child, child_node)?;
                }
                Ok(())
            }
            Stmt::Break { label } | Stmt::Continue { label } => {
                if let Some(label) = label {
                    ctx.store.set_attribute(
                        node,
                        attr::OPTIONAL_LABEL,
                        AttrValue::Str(label.clone()),
                    )?;
                }
                Ok(())
            }
            Stmt::ConstructorInvocation {
                constructor,
                args,
                type_args,
            } => self.inspect_constructor_invocation(ctx, node, constructor, args, type_args),
            Stmt::SuperConstructorInvocation {
                receiver,
                constructor,
                args,
                type_args,
            } => {
                self.analyze_statement_expression(ctx, node, receiver.as_ref())?;
                self.inspect_constructor_invocation(ctx, node, constructor, args, type_args)
            }
            Stmt::Do { body, .. } => {
                // The loop condition is not analyzed here.
                self.child(ctx, node, assoc::STATEMENT_HAS_BODY, body)?;
                Ok(())
            }
            Stmt::EnhancedFor {
                parameter,
                iterable,
                body,
            } => {
                let body_node = self.create_body_node(ctx, node, body)?;
                if let Some(parameter) = parameter {
                    self.create_local_variable(ctx, parameter)?;
                } else {
                    debug!("enhanced-for parameter has no resolved binding");
                }
                self.analyze_statement_expression(ctx, node, Some(iterable))?;
                self.inspect(ctx, body, body_node)
            }
            Stmt::ExpressionStmt { expr } => {
                self.analyze_statement_expression(ctx, node, Some(expr))
            }
            Stmt::For {
                initializers,
                condition,
                updaters,
                body,
            } => {
                let body_node = self.create_body_node(ctx, node, body)?;

                let mut deps = HashSet::new();
                let mut count = 0;
                if let Some(condition) = condition {
                    deps.extend(dependencies(condition));
                    count += complexity(condition);
                }
                for initializer in initializers {
                    deps.extend(dependencies(initializer));
                    count += complexity(initializer);
                }
                for updater in updaters {
                    deps.extend(dependencies(updater));
                    count += complexity(updater);
                }
                ctx.store.set_attribute(
                    node,
                    attr::CONDITIONAL_OPERATOR_COUNT,
                    AttrValue::Int(count as i64),
                )?;
                self.link_dependencies(ctx, node, &deps)?;

                self.inspect(ctx, body, body_node)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.analyze_statement_expression(ctx, node, Some(condition))?;
                self.child(ctx, node, assoc::IF_HAS_THEN_BRANCH, then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.child(ctx, node, assoc::IF_HAS_ELSE_BRANCH, else_branch)?;
                }
                Ok(())
            }
            Stmt::Labeled { body, .. } => {
                self.child(ctx, node, assoc::STATEMENT_HAS_BODY, body)?;
                Ok(())
            }
            Stmt::Return { expr } => self.analyze_statement_expression(ctx, node, expr.as_ref()),
            Stmt::Switch {
                selector,
                statements,
            } => {
                self.analyze_statement_expression(ctx, node, Some(selector))?;
                for child in statements {
                    let child_node = self.create_node(ctx, child)?;
                    ctx.store
                        .create_link(assoc::SWITCH_HAS_STATEMENT, [node, child_node])?;
                    self.inspect(ctx, child, child_node)?;
                }
                Ok(())
            }
            Stmt::SwitchCase { expr, is_default } => {
                self.analyze_statement_expression(ctx, node, expr.as_ref())?;
                ctx.store
                    .set_attribute(node, attr::IS_DEFAULT, AttrValue::Bool(*is_default))?;
                Ok(())
            }
            Stmt::Synchronized { monitor, body } => {
                let body_node = self.create_body_node(ctx, node, body)?;
                self.analyze_statement_expression(ctx, node, Some(monitor))?;
                self.inspect(ctx, body, body_node)
            }
            Stmt::Throw { expr } => self.analyze_statement_expression(ctx, node, Some(expr)),
            Stmt::Try {
                body,
                catch_clauses,
                finally,
            } => {
                self.child(ctx, node, assoc::STATEMENT_HAS_BODY, body)?;
                if let Some(finally) = finally {
                    self.child(ctx, node, assoc::TRY_HAS_FINALLY, finally)?;
                }
                for clause in catch_clauses {
                    let clause_node = self.create_catch_clause_node(ctx, clause)?;
                    ctx.store
                        .create_link(assoc::TRY_HAS_CATCH_CLAUSE, [node, clause_node])?;
                    self.inspect_catch_clause(ctx, clause, clause_node)?;
                }
                Ok(())
            }
            Stmt::TypeDeclaration { type_handle } => {
                if let Some(handle) = type_handle
                    && let Some(type_node) = ctx.store.object_by_name(&mangle(handle))
                {
                    ctx.store
                        .create_link(assoc::STATEMENT_DEPENDS_ON_TYPE, [node, type_node])?;
                    ctx.store
                        .create_link(assoc::STATEMENT_DECLARES_TYPE, [node, type_node])?;
                }
                Ok(())
            }
            Stmt::VariableDeclaration {
                fragments,
                declared_type,
            } => self.inspect_variable_declaration(ctx, node, fragments, declared_type),
            Stmt::While { condition, body } => {
                let body_node = self.create_body_node(ctx, node, body)?;
                self.analyze_statement_expression(ctx, node, Some(condition))?;
                self.inspect(ctx, body, body_node)
            }
            Stmt::Empty | Stmt::Other => Ok(()),
        }
    }

    /// Create + link + inspect a nested statement in one go.
    fn child<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        parent: ObjectHandle,
        association: &str,
        stmt: &Statement,
    ) -> Result<ObjectHandle> {
        let node = self.create_node(ctx, stmt)?;
        ctx.store.create_link(association, [parent, node])?;
        self.inspect(ctx, stmt, node)?;
        Ok(node)
    }

    /// Create + link a loop body, leaving inspection to the caller (loops
    /// analyze their expressions between the two steps).
    fn create_body_node<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        parent: ObjectHandle,
        body: &Statement,
    ) -> Result<ObjectHandle> {
        let node = self.create_node(ctx, body)?;
        ctx.store
            .create_link(assoc::STATEMENT_HAS_BODY, [parent, node])?;
        Ok(node)
    }

    fn inspect_assert<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        node: ObjectHandle,
        condition: &Expr,
    ) -> Result<()> {
        self.analyze_statement_expression(ctx, node, Some(condition))?;
        // The count is recomputed and assigned a second time; both writes
        // carry the same value.
        let count = complexity(condition);
        ctx.store.set_attribute(
            node,
            attr::CONDITIONAL_OPERATOR_COUNT,
            AttrValue::Int(count as i64),
        )?;
        Ok(())
    }

    fn inspect_constructor_invocation<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        node: ObjectHandle,
        constructor: &Option<MethodBinding>,
        args: &[Expr],
        type_args: &[TypeBinding],
    ) -> Result<()> {
        let mut deps = HashSet::new();
        let mut count = 0;

        if let Some(constructor) = constructor {
            deps.insert(SymbolRef::Type(constructor.declaring.clone()));
            deps.insert(SymbolRef::Method(constructor.clone()));
        }
        for arg in args {
            deps.extend(dependencies(arg));
            count += complexity(arg);
        }
        ctx.store.set_attribute(
            node,
            attr::CONDITIONAL_OPERATOR_COUNT,
            AttrValue::Int(count as i64),
        )?;
        for type_arg in type_args {
            deps.insert(SymbolRef::Type(type_arg.clone()));
        }
        self.link_dependencies(ctx, node, &deps)
    }

    fn inspect_variable_declaration<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        node: ObjectHandle,
        fragments: &[VarFragment],
        declared_type: &Option<TypeBinding>,
    ) -> Result<()> {
        for fragment in fragments {
            let variable = fragment
                .variable
                .as_ref()
                .context("variable declaration fragment has no resolved binding")?;
            let local = self.create_local_variable(ctx, variable)?;
            ctx.store
                .create_link(assoc::STATEMENT_DECLARES_LOCAL_VARIABLE, [node, local])?;
            if let Some(initializer) = &fragment.initializer {
                self.analyze_statement_expression(ctx, node, Some(initializer))?;
            }
        }
        // The declared statement type is linked through its own call site,
        // without generic-argument expansion.
        if let Some(declared_type) = declared_type
            && let Some(type_node) = ctx.resolve_type(declared_type)?
        {
            ctx.store
                .create_link(assoc::STATEMENT_DEPENDS_ON_TYPE, [node, type_node])?;
        }
        Ok(())
    }

    /// Allocates the store object for a catch clause. Catch clauses are not
    /// statements, but follow the same span and counter conventions.
    pub fn create_catch_clause_node<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        clause: &CatchClause,
    ) -> Result<ObjectHandle> {
        let ordinal = ctx.store.count_instances(class::CATCH_CLAUSE) + 1;
        let node = ctx.store.create_object(
            Some(&format!("{}{ordinal}", class::CATCH_CLAUSE)),
            class::CATCH_CLAUSE,
        )?;
        ctx.store.set_attribute(
            node,
            attr::START_POSITION,
            AttrValue::Int(clause.span.start as i64),
        )?;
        ctx.store.set_attribute(
            node,
            attr::LENGTH,
            AttrValue::Int(clause.span.length as i64),
        )?;
        Ok(node)
    }

    /// Inspects a catch clause: body link and recursion, plus the exception
    /// variable when it resolved.
    pub fn inspect_catch_clause<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        clause: &CatchClause,
        node: ObjectHandle,
    ) -> Result<()> {
        let body_node = self.create_body_node(ctx, node, &clause.body)?;
        if let Some(exception) = &clause.exception {
            let local = self.create_local_variable(ctx, exception)?;
            ctx.store
                .create_link(assoc::CATCH_CLAUSE_HAS_LOCAL_VARIABLE, [node, local])?;
        }
        self.inspect(ctx, &clause.body, body_node)
    }

    /// Creates a LocalVariable node for a variable declared inside the body
    /// and attaches it to the owning method or initializer.
    pub fn create_local_variable<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        variable: &VariableBinding,
    ) -> Result<ObjectHandle> {
        let node = ctx
            .store
            .create_object(Some(&mangle(&variable.handle)), class::LOCAL_VARIABLE)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(variable.name.clone()))?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(variable.handle.clone()))?;
        ctx.store.set_attribute(
            node,
            attr::ARRAY_DIMENSIONS,
            AttrValue::Int(sig::array_count(&variable.type_signature) as i64),
        )?;

        if let Some(var_type) = &variable.var_type
            && let Some(type_node) = ctx.resolve_type(var_type)?
        {
            ctx.store
                .create_link(assoc::LOCAL_VARIABLE_HAS_TYPE, [node, type_node])?;
        }

        if let Some(owner) = self.owner {
            let association = match self.owner_kind {
                BodyOwner::Method => assoc::METHOD_HAS_LOCAL_VARIABLE,
                BodyOwner::Initializer => assoc::INITIALIZER_HAS_LOCAL_VARIABLE,
            };
            ctx.store.create_link(association, [owner, node])?;
        }
        Ok(node)
    }

    /// Shared helper for expression-bearing statements: links every
    /// discovered reference and sets `conditionalOperatorCount` (zero when
    /// there is no expression).
    fn analyze_statement_expression<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        node: ObjectHandle,
        expression: Option<&Expr>,
    ) -> Result<()> {
        let mut count = 0;
        if let Some(expression) = expression {
            let deps = dependencies(expression);
            self.link_dependencies(ctx, node, &deps)?;
            count = complexity(expression);
        }
        ctx.store.set_attribute(
            node,
            attr::CONDITIONAL_OPERATOR_COUNT,
            AttrValue::Int(count as i64),
        )?;
        Ok(())
    }

    /// Turns a dependency set into edges. Type references additionally expand
    /// to their generic type arguments. Every insertion tolerates duplicates.
    fn link_dependencies<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        node: ObjectHandle,
        deps: &HashSet<SymbolRef>,
    ) -> Result<()> {
        for dep in deps {
            match dep {
                SymbolRef::Type(binding) => {
                    if let Some(type_node) = ctx.resolve_type(binding)? {
                        ctx.store
                            .create_link(assoc::STATEMENT_DEPENDS_ON_TYPE, [node, type_node])?;
                    }
                    for argument in &binding.type_arguments {
                        if let Some(arg_node) = ctx.resolve_type(argument)? {
                            ctx.store
                                .create_link(assoc::STATEMENT_DEPENDS_ON_TYPE, [node, arg_node])?;
                        }
                    }
                }
                SymbolRef::Method(binding) => {
                    if let Some(method_node) = ctx.resolve_method(binding)? {
                        ctx.store
                            .create_link(assoc::STATEMENT_DEPENDS_ON_METHOD, [node, method_node])?;
                    }
                }
                SymbolRef::Field(binding) => {
                    if let Some(field_node) = ctx.resolve_field(binding)? {
                        ctx.store
                            .create_link(assoc::STATEMENT_DEPENDS_ON_FIELD, [node, field_node])?;
                    }
                }
            }
        }
        Ok(())
    }
}

//! Two-phase construction of the declaration graph.
//!
//! The declaration pass walks the whole program hierarchy and creates a node
//! for every declaration, registering every canonical key it will later be
//! looked up under. Only when the declaration pass has finished for the
//! entire program does the resolution pass start: cross references
//! (inheritance, member types, annotations) and every method and initializer
//! body. A body may therefore reference a type declared later, in another
//! type or in another translation unit, and the reference still resolves.

use crate::domain::ast::{
    AnnotationUse, FieldDecl, HasAnonymousTypes, InitializerDecl, MethodDecl, Modifiers, Package,
    Program, SourceRoot, TranslationUnit, TypeDecl, VisibilityKind,
};
use crate::domain::context::AnalysisContext;
use crate::domain::ports::{AttrValue, ModelStore, ObjectHandle};
use crate::domain::registry::{FIELD_PREFIX, METHOD_PREFIX, mangle};
use crate::domain::schema::{assoc, attr, class, enums};
use crate::domain::sig;
use crate::domain::statements::{BodyOwner, StatementGraphBuilder};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Which flag attributes apply to a member.
#[derive(Clone, Copy)]
enum MemberKind {
    Type,
    Method,
    Field,
}

#[derive(Debug, Default)]
pub struct DeclarationGraphBuilder;

impl DeclarationGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Runs both passes over the program. The declaration pass completes for
    /// every translation unit before the resolution pass starts for any.
    pub fn build<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        program: &Program,
    ) -> Result<()> {
        info!(program = %program.name, "declaration pass");
        let program_node = ctx
            .store
            .create_object(Some(&mangle(&program.handle)), class::PROGRAM)?;
        ctx.store
            .set_attribute(program_node, attr::NAME, AttrValue::Str(program.name.clone()))?;
        ctx.store
            .set_attribute(program_node, attr::HANDLE, AttrValue::Str(program.handle.clone()))?;
        for root in &program.source_roots {
            self.declare_source_root(ctx, root, program_node)?;
        }

        info!("resolution pass");
        for unit in program.translation_units() {
            self.resolve_unit(ctx, unit)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declaration pass
    // ------------------------------------------------------------------

    fn declare_source_root<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        root: &SourceRoot,
        program_node: ObjectHandle,
    ) -> Result<()> {
        let node = ctx
            .store
            .create_object(Some(&mangle(&root.handle)), class::SOURCE_ROOT)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(root.name.clone()))?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(root.handle.clone()))?;
        ctx.store.set_attribute(
            node,
            attr::ROOT_KIND,
            AttrValue::EnumLit(enums::ROOT_KIND, root.kind.as_str().into()),
        )?;
        ctx.store
            .create_link(assoc::PROGRAM_HAS_SOURCE_ROOT, [program_node, node])?;

        for package in &root.packages {
            self.declare_package(ctx, package, node)?;
        }
        Ok(())
    }

    fn declare_package<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        package: &Package,
        root_node: ObjectHandle,
    ) -> Result<()> {
        let mangled = mangle(&package.handle);
        let name = if mangled.is_empty() { None } else { Some(mangled) };
        let node = ctx.store.create_object(name.as_deref(), class::PACKAGE)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(package.name.clone()))?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(package.handle.clone()))?;
        ctx.store
            .create_link(assoc::SOURCE_ROOT_HAS_PACKAGE, [root_node, node])?;

        for unit in &package.units {
            let unit_node = ctx
                .store
                .create_object(Some(&mangle(&unit.handle)), class::TRANSLATION_UNIT)?;
            ctx.store
                .set_attribute(unit_node, attr::NAME, AttrValue::Str(unit.name.clone()))?;
            ctx.store
                .set_attribute(unit_node, attr::HANDLE, AttrValue::Str(unit.handle.clone()))?;
            ctx.store
                .create_link(assoc::PACKAGE_HAS_TRANSLATION_UNIT, [node, unit_node])?;
            for type_decl in &unit.types {
                self.declare_type(ctx, type_decl, unit_node)?;
            }
        }
        Ok(())
    }

    fn declare_type<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        type_decl: &TypeDecl,
        unit_node: ObjectHandle,
    ) -> Result<()> {
        let node = ctx
            .store
            .create_object(Some(&type_store_name(type_decl)), class::TYPE)?;
        ctx.store.set_attribute(
            node,
            attr::NAME,
            AttrValue::Str(type_display_name(type_decl)),
        )?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(type_decl.handle.clone()))?;
        ctx.store
            .create_link(assoc::TRANSLATION_UNIT_HAS_TYPE, [unit_node, node])?;

        // Redundant keys are required: later lookups arrive in different
        // shapes depending on where the reference was found.
        ctx.registry.register_type(type_decl.qualified_name.clone(), node);
        ctx.registry
            .register_type(type_decl.parameterized_name.clone(), node);
        ctx.registry.register_type(type_decl.dotted_name.clone(), node);
        ctx.registry.register_type(type_decl.name.clone(), node);
        ctx.registry
            .register_type(sig::simple_name(&type_decl.qualified_name).to_string(), node);
        ctx.registry
            .register_type(sig::simple_name(&type_decl.dotted_name).to_string(), node);

        for field in &type_decl.fields {
            self.declare_field(ctx, field, node, unit_node)?;
        }
        for method in &type_decl.methods {
            self.declare_method(ctx, method, node, unit_node)?;
        }
        for initializer in &type_decl.initializers {
            self.declare_initializer(ctx, initializer, type_decl, node)?;
        }

        self.set_member_flags(
            ctx,
            node,
            type_decl.visibility,
            &type_decl.modifiers,
            MemberKind::Type,
        )?;
        ctx.store.set_attribute(
            node,
            attr::TYPE_KIND,
            AttrValue::EnumLit(enums::TYPE_KIND, type_decl.kind.as_str().into()),
        )?;

        self.declare_anonymous_types(ctx, type_decl, unit_node)?;
        for member in &type_decl.member_types {
            self.declare_type(ctx, member, unit_node)?;
        }
        Ok(())
    }

    fn declare_field<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        field: &FieldDecl,
        type_node: ObjectHandle,
        unit_node: ObjectHandle,
    ) -> Result<()> {
        let store_name = format!("{FIELD_PREFIX}{}", mangle(&field.handle));
        let node = ctx.store.create_object(Some(&store_name), class::FIELD)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(field.name.clone()))?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(field.handle.clone()))?;
        if let Some(key) = &field.key {
            ctx.store
                .set_attribute(node, attr::KEY, AttrValue::Str(key.clone()))?;
        }
        ctx.store
            .create_link(assoc::TYPE_HAS_FIELD, [type_node, node])?;
        ctx.registry.register_field(type_node, &field.name, node);

        self.set_member_flags(ctx, node, field.visibility, &field.modifiers, MemberKind::Field)?;
        self.declare_anonymous_types(ctx, field, unit_node)?;
        Ok(())
    }

    fn declare_method<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        method: &MethodDecl,
        type_node: ObjectHandle,
        unit_node: ObjectHandle,
    ) -> Result<()> {
        let store_name = format!("{METHOD_PREFIX}{}", mangle(&method.handle));
        let node = ctx.store.create_object(Some(&store_name), class::METHOD)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(method.name.clone()))?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(method.handle.clone()))?;
        if let Some(key) = &method.key {
            ctx.store
                .set_attribute(node, attr::KEY, AttrValue::Str(key.clone()))?;
            let short = key.rsplit('.').next().unwrap_or(key);
            ctx.store
                .set_attribute(node, attr::SHORT_KEY, AttrValue::Str(short.to_string()))?;
        }
        ctx.store
            .create_link(assoc::TYPE_HAS_METHOD, [type_node, node])?;
        ctx.store.set_attribute(
            node,
            attr::IS_CONSTRUCTOR,
            AttrValue::Bool(method.is_constructor),
        )?;

        self.set_member_flags(ctx, node, method.visibility, &method.modifiers, MemberKind::Method)?;
        self.declare_anonymous_types(ctx, method, unit_node)?;
        Ok(())
    }

    fn declare_initializer<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        initializer: &InitializerDecl,
        type_decl: &TypeDecl,
        type_node: ObjectHandle,
    ) -> Result<()> {
        let store_name = initializer_store_name(type_decl, initializer.occurrence);
        let node = ctx
            .store
            .create_object(Some(&store_name), class::INITIALIZER)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(initializer.name.clone()))?;
        ctx.store.set_attribute(
            node,
            attr::HANDLE,
            AttrValue::Str(initializer.handle.clone()),
        )?;
        ctx.store
            .create_link(assoc::TYPE_HAS_INITIALIZER, [type_node, node])?;
        Ok(())
    }

    /// Anonymous types nested under a member, discovered by probing
    /// occurrence 1, 2, 3, … until the first absent index.
    fn declare_anonymous_types<S: ModelStore, M: HasAnonymousTypes>(
        &self,
        ctx: &mut AnalysisContext<S>,
        member: &M,
        unit_node: ObjectHandle,
    ) -> Result<()> {
        let mut occurrence = 1;
        while let Some(anonymous) = member.anonymous_type(occurrence) {
            self.declare_type(ctx, anonymous, unit_node)?;
            occurrence += 1;
        }
        Ok(())
    }

    fn set_member_flags<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        node: ObjectHandle,
        visibility: VisibilityKind,
        modifiers: &Modifiers,
        kind: MemberKind,
    ) -> Result<()> {
        let store = &mut ctx.store;
        store.set_attribute(
            node,
            attr::VISIBILITY,
            AttrValue::EnumLit(enums::VISIBILITY, visibility.as_str().into()),
        )?;
        store.set_attribute(node, attr::IS_FINAL, AttrValue::Bool(modifiers.is_final))?;
        store.set_attribute(node, attr::IS_SYNTHETIC, AttrValue::Bool(modifiers.is_synthetic))?;
        store.set_attribute(
            node,
            attr::IS_DEPRECATED,
            AttrValue::Bool(modifiers.is_deprecated),
        )?;

        match kind {
            MemberKind::Type => {
                store.set_attribute(node, attr::IS_ABSTRACT, AttrValue::Bool(modifiers.is_abstract))?;
                store.set_attribute(node, attr::IS_STRICTFP, AttrValue::Bool(modifiers.is_strictfp))?;
            }
            MemberKind::Method => {
                store.set_attribute(node, attr::IS_STATIC, AttrValue::Bool(modifiers.is_static))?;
                store.set_attribute(
                    node,
                    attr::IS_SYNCHRONIZED,
                    AttrValue::Bool(modifiers.is_synchronized),
                )?;
                store.set_attribute(node, attr::IS_NATIVE, AttrValue::Bool(modifiers.is_native))?;
                store.set_attribute(node, attr::IS_BRIDGE, AttrValue::Bool(modifiers.is_bridge))?;
                store.set_attribute(node, attr::HAS_VARARGS, AttrValue::Bool(modifiers.has_varargs))?;
            }
            MemberKind::Field => {
                store.set_attribute(node, attr::IS_STATIC, AttrValue::Bool(modifiers.is_static))?;
                store.set_attribute(node, attr::IS_VOLATILE, AttrValue::Bool(modifiers.is_volatile))?;
                store.set_attribute(
                    node,
                    attr::IS_TRANSIENT,
                    AttrValue::Bool(modifiers.is_transient),
                )?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Resolution pass
    // ------------------------------------------------------------------

    fn resolve_unit<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        unit: &TranslationUnit,
    ) -> Result<()> {
        debug!(unit = %unit.name, "resolving translation unit");
        let unit_node = ctx
            .store
            .object_by_name(&mangle(&unit.handle))
            .with_context(|| format!("translation unit {} missing from store", unit.name))?;

        for annotation in &unit.package_annotations {
            self.apply_annotation(ctx, unit_node, annotation)?;
        }
        for type_decl in &unit.types {
            self.resolve_type_decl(ctx, type_decl, None)?;
        }

        // One pass over every body; initializers are guarded so a body seen
        // through a prior sibling pass is not processed twice.
        let mut last_initializer_start = 0u32;
        for type_decl in &unit.types {
            self.walk_bodies(ctx, type_decl, &mut last_initializer_start)?;
        }

        for comment in &unit.comments {
            let node = ctx.store.create_object(None, class::COMMENT)?;
            ctx.store.set_attribute(
                node,
                attr::KIND,
                AttrValue::EnumLit(enums::COMMENT_KIND, comment.kind.as_str().into()),
            )?;
            ctx.store.set_attribute(
                node,
                attr::START_POSITION,
                AttrValue::Int(comment.span.start as i64),
            )?;
            ctx.store.set_attribute(
                node,
                attr::LENGTH,
                AttrValue::Int(comment.span.length as i64),
            )?;
            ctx.store
                .create_link(assoc::TRANSLATION_UNIT_HAS_COMMENT, [unit_node, node])?;
        }
        Ok(())
    }

    fn resolve_type_decl<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        type_decl: &TypeDecl,
        declaring: Option<ObjectHandle>,
    ) -> Result<()> {
        let type_node = ctx
            .store
            .object_by_name(&type_store_name(type_decl))
            .with_context(|| format!("type {} missing from store", type_decl.qualified_name))?;

        for type_parameter in &type_decl.type_parameters {
            let tp_name = format!("{}_{}", type_display_name(type_decl), type_parameter.name);
            let tp_node = ctx
                .store
                .create_object(Some(&mangle(&tp_name)), class::TYPE_PARAMETER)?;
            ctx.store.set_attribute(
                tp_node,
                attr::NAME,
                AttrValue::Str(type_parameter.name.clone()),
            )?;
            ctx.store.set_attribute(
                tp_node,
                attr::HANDLE,
                AttrValue::Str(type_parameter.handle.clone()),
            )?;
            ctx.store
                .create_link(assoc::TYPE_HAS_TYPE_PARAMETER, [type_node, tp_node])?;
            for bound in &type_parameter.bound_signatures {
                let bound_node = ctx.resolve_signature(bound)?;
                ctx.store
                    .create_link(assoc::TYPE_PARAMETER_BOUNDED_BY_TYPE, [tp_node, bound_node])?;
            }
        }

        for interface in &type_decl.interface_signatures {
            let interface_node = ctx.resolve_signature(interface)?;
            ctx.store
                .create_link(assoc::TYPE_IMPLEMENTS_TYPE, [type_node, interface_node])?;
        }
        if let Some(superclass) = &type_decl.superclass_signature {
            let super_node = ctx.resolve_signature(superclass)?;
            ctx.store
                .create_link(assoc::TYPE_EXTENDS_TYPE, [type_node, super_node])?;
        }
        if let Some(declaring) = declaring {
            ctx.store
                .create_link(assoc::TYPE_NESTED_IN_TYPE, [type_node, declaring])?;
        }

        for annotation in &type_decl.annotations {
            self.apply_annotation(ctx, type_node, annotation)?;
        }

        for method in &type_decl.methods {
            let method_node = ctx
                .store
                .object_by_name(&format!("{METHOD_PREFIX}{}", mangle(&method.handle)))
                .with_context(|| format!("method {} missing from store", method.name))?;

            for parameter in &method.parameters {
                let param_node = ctx
                    .store
                    .create_object(Some(&mangle(&parameter.handle)), class::LOCAL_VARIABLE)?;
                ctx.store.set_attribute(
                    param_node,
                    attr::NAME,
                    AttrValue::Str(parameter.name.clone()),
                )?;
                ctx.store.set_attribute(
                    param_node,
                    attr::HANDLE,
                    AttrValue::Str(parameter.handle.clone()),
                )?;
                ctx.store.set_attribute(
                    param_node,
                    attr::ARRAY_DIMENSIONS,
                    AttrValue::Int(sig::array_count(&parameter.type_signature) as i64),
                )?;
                ctx.store
                    .create_link(assoc::METHOD_HAS_PARAMETER, [method_node, param_node])?;

                let param_type = ctx.resolve_signature(&parameter.type_signature)?;
                ctx.store
                    .create_link(assoc::LOCAL_VARIABLE_HAS_TYPE, [param_node, param_type])?;
            }

            let return_node = ctx.resolve_signature(&method.return_type_signature)?;
            ctx.store.set_attribute(
                method_node,
                attr::RETURN_TYPE_ARRAY_DIMENSIONS,
                AttrValue::Int(sig::array_count(&method.return_type_signature) as i64),
            )?;
            ctx.store
                .create_link(assoc::METHOD_HAS_RETURN_TYPE, [method_node, return_node])?;

            for exception in &method.exception_signatures {
                let exception_node = ctx.resolve_signature(exception)?;
                ctx.store
                    .create_link(assoc::METHOD_THROWS_TYPE, [method_node, exception_node])?;
            }

            for annotation in &method.annotations {
                self.apply_annotation(ctx, method_node, annotation)?;
            }
        }

        for field in &type_decl.fields {
            let field_node = ctx
                .store
                .object_by_name(&format!("{FIELD_PREFIX}{}", mangle(&field.handle)))
                .with_context(|| format!("field {} missing from store", field.name))?;
            let field_type = ctx.resolve_signature(&field.type_signature)?;
            ctx.store
                .create_link(assoc::FIELD_HAS_TYPE, [field_node, field_type])?;
            ctx.store.set_attribute(
                field_node,
                attr::ARRAY_DIMENSIONS,
                AttrValue::Int(sig::array_count(&field.type_signature) as i64),
            )?;
            for annotation in &field.annotations {
                self.apply_annotation(ctx, field_node, annotation)?;
            }
        }

        for member in &type_decl.member_types {
            self.resolve_type_decl(ctx, member, Some(type_node))?;
        }
        Ok(())
    }

    /// Annotation plus its member values. A value resolves to the declaring
    /// annotation type's field; when that type was never analyzed as program
    /// source, the field is synthesized.
    fn apply_annotation<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        element_node: ObjectHandle,
        annotation: &AnnotationUse,
    ) -> Result<()> {
        let node = ctx
            .store
            .create_object(Some(&mangle(&annotation.handle)), class::ANNOTATION)?;
        ctx.store
            .set_attribute(node, attr::NAME, AttrValue::Str(annotation.name.clone()))?;
        ctx.store
            .set_attribute(node, attr::HANDLE, AttrValue::Str(annotation.handle.clone()))?;
        ctx.store
            .create_link(assoc::ELEMENT_HAS_ANNOTATION, [element_node, node])?;

        let annotation_type = match ctx.registry.lookup(&annotation.name) {
            Some(existing) => existing,
            None => ctx.synthesize_external(&annotation.name)?,
        };
        ctx.store
            .create_link(assoc::ANNOTATION_HAS_TYPE, [node, annotation_type])?;

        for pair in &annotation.values {
            let value_name = mangle(&format!("{}_{}", annotation.handle, pair.member_name));
            let value_node = ctx
                .store
                .create_object(Some(&value_name), class::ANNOTATION_VALUE)?;
            ctx.store
                .set_attribute(value_node, attr::VALUE, AttrValue::Str(pair.value.clone()))?;
            ctx.store
                .create_link(assoc::ANNOTATION_HAS_VALUE, [node, value_node])?;

            let field_node = match ctx.registry.field_of(annotation_type, &pair.member_name) {
                Some(existing) => existing,
                None => {
                    let field = ctx.store.create_object(None, class::FIELD)?;
                    ctx.store.set_attribute(
                        field,
                        attr::NAME,
                        AttrValue::Str(pair.member_name.clone()),
                    )?;
                    ctx.store
                        .create_link(assoc::TYPE_HAS_FIELD, [annotation_type, field])?;
                    ctx.registry
                        .register_field(annotation_type, &pair.member_name, field);
                    field
                }
            };
            ctx.store
                .create_link(assoc::ANNOTATION_VALUE_FOR_FIELD, [value_node, field_node])?;
        }
        Ok(())
    }

    /// Walks every method body and initializer body under a type, including
    /// bodies inside anonymous and member types.
    fn walk_bodies<S: ModelStore>(
        &self,
        ctx: &mut AnalysisContext<S>,
        type_decl: &TypeDecl,
        last_initializer_start: &mut u32,
    ) -> Result<()> {
        for method in &type_decl.methods {
            if let Some(body) = &method.body {
                let method_node = ctx
                    .store
                    .object_by_name(&format!("{METHOD_PREFIX}{}", mangle(&method.handle)))
                    .with_context(|| format!("method {} missing from store", method.name))?;
                let builder = StatementGraphBuilder::new(Some(method_node), BodyOwner::Method);
                let body_node = builder.create_node(ctx, body)?;
                ctx.store
                    .create_link(assoc::METHOD_HAS_BODY, [method_node, body_node])?;
                builder.inspect(ctx, body, body_node)?;
            }
            for anonymous in &method.anonymous_types {
                self.walk_bodies(ctx, anonymous, last_initializer_start)?;
            }
        }

        for initializer in &type_decl.initializers {
            if initializer.start_position > *last_initializer_start {
                *last_initializer_start = initializer.start_position;
                let initializer_node = ctx
                    .store
                    .object_by_name(&initializer_store_name(type_decl, initializer.occurrence));
                let builder = StatementGraphBuilder::new(initializer_node, BodyOwner::Initializer);
                let body_node = builder.create_node(ctx, &initializer.body)?;
                if let Some(initializer_node) = initializer_node {
                    ctx.store
                        .create_link(assoc::INITIALIZER_HAS_BODY, [initializer_node, body_node])?;
                }
                builder.inspect(ctx, &initializer.body, body_node)?;
            }
        }

        for field in &type_decl.fields {
            for anonymous in &field.anonymous_types {
                self.walk_bodies(ctx, anonymous, last_initializer_start)?;
            }
        }
        for anonymous in &type_decl.anonymous_types {
            self.walk_bodies(ctx, anonymous, last_initializer_start)?;
        }
        for member in &type_decl.member_types {
            self.walk_bodies(ctx, member, last_initializer_start)?;
        }
        Ok(())
    }
}

fn type_display_name(type_decl: &TypeDecl) -> String {
    if type_decl.name.is_empty() {
        sig::simple_name(&type_decl.qualified_name).to_string()
    } else {
        type_decl.name.clone()
    }
}

fn type_store_name(type_decl: &TypeDecl) -> String {
    let mut name = mangle(&type_decl.handle);
    if type_decl.name.is_empty() {
        name.push_str(&mangle(sig::simple_name(&type_decl.qualified_name)));
    }
    name
}

fn initializer_store_name(type_decl: &TypeDecl, occurrence: u32) -> String {
    format!("{}_Initializer{}", mangle(&type_decl.handle), occurrence)
}

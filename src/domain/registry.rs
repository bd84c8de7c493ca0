//! Symbol Registry: canonical-name index over declaration nodes.
//!
//! Every declared type is registered under all its name forms during the
//! declaration pass, so later lookups succeed no matter which shape a
//! reference arrives in. Symbols outside the analyzed program get exactly one
//! placeholder node each, rooted under a reserved external container. The
//! registry is single-writer: one run, one logical thread.

use crate::domain::ast::{FieldBinding, MethodBinding, TypeBinding};
use crate::domain::ports::{AttrValue, ModelStore, ObjectHandle};
use crate::domain::schema::{assoc, attr, class, enums};
use crate::domain::sig;
use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use tracing::debug;

/// Store-name prefix for method nodes.
pub const METHOD_PREFIX: &str = "METHOD_";
/// Store-name prefix for field nodes.
pub const FIELD_PREFIX: &str = "FIELD_";

const ARRAY_MARKER: &str = "ARRAY_PARAM";

const BUILTIN_PACKAGE: &str = "BuiltinTypes";
const EXTERNAL_PACKAGE: &str = "ExternalTypes";
const BUILTIN_UNIT: &str = "BuiltinTypesUnit";
const EXTERNAL_UNIT: &str = "ExternalTypesUnit";

const PRIMITIVES: &[&str] = &[
    "int", "boolean", "long", "double", "float", "byte", "short", "char", "void",
];

/// Store object naming: keep alphanumerics and `_`, map `$` to `_`, map an
/// array marker `[` to `ARRAY_PARAM`, drop everything else.
pub fn mangle(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if c == '$' {
            out.push('_');
        } else if c == '[' {
            out.push_str(ARRAY_MARKER);
        }
    }
    out
}

fn is_builtin(simple: &str) -> bool {
    simple == "String" || PRIMITIVES.contains(&simple)
}

/// Canonical-name index plus external-symbol synthesis.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    /// Canonical key → Type node. Several keys map to one node; never the
    /// other way around.
    types: HashMap<String, ObjectHandle>,
    /// (declaring type node, field name) → Field node, for annotation member
    /// value resolution.
    fields_by_owner: HashMap<(ObjectHandle, String), ObjectHandle>,
    external_unit: Option<ObjectHandle>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the reserved builtin/external containers and pre-registers
    /// primitive types and the base string type. Called once per run, before
    /// any declaration is processed.
    pub fn install_defaults(&mut self, store: &mut dyn ModelStore) -> Result<()> {
        let builtin_pkg = store.create_object(Some(BUILTIN_PACKAGE), class::PACKAGE)?;
        store.set_attribute(builtin_pkg, attr::NAME, AttrValue::Str(BUILTIN_PACKAGE.into()))?;
        let external_pkg = store.create_object(Some(EXTERNAL_PACKAGE), class::PACKAGE)?;
        store.set_attribute(
            external_pkg,
            attr::NAME,
            AttrValue::Str(EXTERNAL_PACKAGE.into()),
        )?;

        let builtin_unit = store.create_object(Some(BUILTIN_UNIT), class::TRANSLATION_UNIT)?;
        store.set_attribute(builtin_unit, attr::NAME, AttrValue::Str(BUILTIN_UNIT.into()))?;
        let external_unit = store.create_object(Some(EXTERNAL_UNIT), class::TRANSLATION_UNIT)?;
        store.set_attribute(
            external_unit,
            attr::NAME,
            AttrValue::Str(EXTERNAL_UNIT.into()),
        )?;

        store.create_link(
            assoc::PACKAGE_HAS_TRANSLATION_UNIT,
            [builtin_pkg, builtin_unit],
        )?;
        store.create_link(
            assoc::PACKAGE_HAS_TRANSLATION_UNIT,
            [external_pkg, external_unit],
        )?;

        for &primitive in PRIMITIVES {
            let node = store.create_object(Some(primitive), class::TYPE)?;
            store.set_attribute(node, attr::NAME, AttrValue::Str(primitive.into()))?;
            store.set_attribute(node, attr::HANDLE, AttrValue::Str(primitive.into()))?;
            store.set_attribute(
                node,
                attr::TYPE_KIND,
                AttrValue::EnumLit(enums::TYPE_KIND, "Primitive".into()),
            )?;
            store.create_link(assoc::TRANSLATION_UNIT_HAS_TYPE, [builtin_unit, node])?;
            self.types.insert(primitive.into(), node);
        }

        let string_node = store.create_object(Some("String"), class::TYPE)?;
        store.set_attribute(string_node, attr::NAME, AttrValue::Str("String".into()))?;
        store.set_attribute(
            string_node,
            attr::TYPE_KIND,
            AttrValue::EnumLit(enums::TYPE_KIND, "ClassType".into()),
        )?;
        store.create_link(assoc::TRANSLATION_UNIT_HAS_TYPE, [builtin_unit, string_node])?;
        self.types.insert("String".into(), string_node);

        self.external_unit = Some(external_unit);
        Ok(())
    }

    /// Register one more canonical key for a declared type node.
    pub fn register_type(&mut self, key: impl Into<String>, node: ObjectHandle) {
        let key = key.into();
        if !key.is_empty() {
            self.types.insert(key, node);
        }
    }

    pub fn register_field(&mut self, owner: ObjectHandle, name: &str, node: ObjectHandle) {
        self.fields_by_owner.insert((owner, name.to_string()), node);
    }

    pub fn field_of(&self, owner: ObjectHandle, name: &str) -> Option<ObjectHandle> {
        self.fields_by_owner.get(&(owner, name.to_string())).copied()
    }

    pub fn lookup(&self, key: &str) -> Option<ObjectHandle> {
        self.types.get(key).copied()
    }

    /// General resolution entry point over any canonical key shape: exact
    /// declaration-handle match first, then the signature fallback chain.
    pub fn resolve(&mut self, store: &mut dyn ModelStore, key: &str) -> Result<ObjectHandle> {
        if let Some(handle) = store.object_by_name(&mangle(key)) {
            return Ok(handle);
        }
        self.resolve_signature(store, key)
    }

    /// Resolves a type signature to its node, synthesizing an external
    /// placeholder when nothing matches. Total over non-empty signatures.
    pub fn resolve_signature(
        &mut self,
        store: &mut dyn ModelStore,
        signature: &str,
    ) -> Result<ObjectHandle> {
        let element = sig::element_type(signature);
        let simple = sig::simple_name(element);
        if is_builtin(simple) {
            return store
                .object_by_name(simple)
                .ok_or_else(|| anyhow!("builtin type {simple} missing from store"));
        }

        if let Some(handle) = self.types.get(signature) {
            return Ok(*handle);
        }
        if let Some(handle) = self.types.get(element) {
            return Ok(*handle);
        }
        let qualifier = sig::qualifier(element);
        let qualified = if qualifier.is_empty() {
            simple.to_string()
        } else {
            format!("{qualifier}.{simple}")
        };
        if let Some(handle) = self.types.get(&qualified) {
            return Ok(*handle);
        }
        if let Some(handle) = self.types.get(simple) {
            return Ok(*handle);
        }
        self.synthesize_external(store, &qualified)
    }

    /// Resolves a type binding to its node. Type variables resolve to
    /// nothing; wildcards resolve through their bound; anonymous types
    /// resolve through their superclass or first interface.
    pub fn resolve_type(
        &mut self,
        store: &mut dyn ModelStore,
        binding: &TypeBinding,
    ) -> Result<Option<ObjectHandle>> {
        if binding.is_type_variable {
            return Ok(None);
        }
        if binding.is_wildcard {
            return match &binding.wildcard_bound {
                Some(bound) => self.resolve_type(store, bound),
                None => Ok(None),
            };
        }

        // Only the base type is resolved; generic arguments are the caller's
        // concern.
        let simple = sig::erasure(&binding.name);
        let qualified = sig::erasure(&binding.qualified_name);

        if binding.is_anonymous || qualified.is_empty() {
            if let Some(superclass) = &binding.superclass {
                return self.resolve_type(store, superclass);
            }
            let first = binding.interfaces.first().ok_or_else(|| {
                anyhow!("anonymous type {:?} has neither superclass nor interfaces", binding.name)
            })?;
            return self.resolve_type(store, first);
        }

        let mut object = binding
            .handle
            .as_ref()
            .and_then(|h| store.object_by_name(&mangle(h)));

        if object.is_none() && !simple.is_empty() {
            object = store
                .object_by_name(&mangle(simple))
                .or_else(|| self.types.get(simple).copied());
            if object.is_none() {
                object = store
                    .object_by_name(&mangle(qualified))
                    .or_else(|| self.types.get(qualified).copied());
            }
            if object.is_none() {
                object = Some(self.synthesize_external(store, qualified)?);
            }
        }
        Ok(object)
    }

    /// Resolves a method binding to its node, creating a placeholder when the
    /// method was never analyzed as program source.
    pub fn resolve_method(
        &mut self,
        store: &mut dyn ModelStore,
        binding: &MethodBinding,
    ) -> Result<Option<ObjectHandle>> {
        let Some(handle) = &binding.handle else {
            return Ok(None);
        };
        let id = format!("{METHOD_PREFIX}{}", mangle(handle));
        if let Some(existing) = store.object_by_name(&id) {
            return Ok(Some(existing));
        }

        let node = store.create_object(Some(&id), class::METHOD)?;
        store.set_attribute(node, attr::NAME, AttrValue::Str(binding.name.clone()))?;
        store.set_attribute(node, attr::HANDLE, AttrValue::Str(handle.clone()))?;
        if let Some(key) = &binding.key {
            store.set_attribute(node, attr::KEY, AttrValue::Str(key.clone()))?;
            let short = key.rsplit('.').next().unwrap_or(key);
            store.set_attribute(node, attr::SHORT_KEY, AttrValue::Str(short.to_string()))?;
        }
        store.set_attribute(
            node,
            attr::IS_CONSTRUCTOR,
            AttrValue::Bool(binding.is_constructor),
        )?;
        store.set_attribute(
            node,
            attr::RETURN_TYPE_ARRAY_DIMENSIONS,
            AttrValue::Int(binding.return_type.array_dimensions as i64),
        )?;

        if let Some(declaring) = self.resolve_type(store, &binding.declaring)? {
            store.create_link(assoc::TYPE_HAS_METHOD, [declaring, node])?;
        }
        if let Some(return_type) = self.resolve_type(store, &binding.return_type)? {
            store.create_link(assoc::METHOD_HAS_RETURN_TYPE, [node, return_type])?;
        }
        debug!(method = %binding.name, "synthesized method placeholder");
        Ok(Some(node))
    }

    /// Resolves a field binding to its node, creating a placeholder when the
    /// field was never analyzed as program source.
    pub fn resolve_field(
        &mut self,
        store: &mut dyn ModelStore,
        binding: &FieldBinding,
    ) -> Result<Option<ObjectHandle>> {
        let Some(handle) = &binding.handle else {
            return Ok(None);
        };
        let id = format!("{FIELD_PREFIX}{}", mangle(handle));
        if let Some(existing) = store.object_by_name(&id) {
            return Ok(Some(existing));
        }

        let node = store.create_object(Some(&id), class::FIELD)?;
        store.set_attribute(node, attr::NAME, AttrValue::Str(binding.name.clone()))?;
        store.set_attribute(node, attr::HANDLE, AttrValue::Str(handle.clone()))?;
        if let Some(key) = &binding.key {
            store.set_attribute(node, attr::KEY, AttrValue::Str(key.clone()))?;
        }
        store.set_attribute(
            node,
            attr::ARRAY_DIMENSIONS,
            AttrValue::Int(binding.field_type.array_dimensions as i64),
        )?;

        if let Some(declaring) = &binding.declaring
            && let Some(owner) = self.resolve_type(store, declaring)?
        {
            store.create_link(assoc::TYPE_HAS_FIELD, [owner, node])?;
            self.register_field(owner, &binding.name, node);
        }
        if let Some(field_type) = self.resolve_type(store, &binding.field_type)? {
            store.create_link(assoc::FIELD_HAS_TYPE, [node, field_type])?;
        }
        debug!(field = %binding.name, "synthesized field placeholder");
        Ok(Some(node))
    }

    /// Creates (or returns) the external placeholder for a type name. Checked
    /// against the canonical index before creation: N calls with one name
    /// yield one node.
    pub fn synthesize_external(
        &mut self,
        store: &mut dyn ModelStore,
        name: &str,
    ) -> Result<ObjectHandle> {
        let key = sig::erasure(sig::element_type(name)).to_string();
        let simple = sig::simple_name(&key).to_string();

        if let Some(existing) = self.types.get(&key) {
            return Ok(*existing);
        }
        if let Some(existing) = store.object_by_name(&mangle(&key)) {
            self.register_type(key, existing);
            return Ok(existing);
        }

        let external_unit = self
            .external_unit
            .context("external container missing; registry defaults not installed")?;
        let node = store.create_object(Some(&mangle(&key)), class::TYPE)?;
        store.set_attribute(node, attr::NAME, AttrValue::Str(simple))?;
        store.create_link(assoc::TRANSLATION_UNIT_HAS_TYPE, [external_unit, node])?;
        debug!(name = %key, "synthesized external type");
        self.register_type(key, node);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_keeps_word_characters_and_maps_the_rest() {
        assert_eq!(mangle("com.example.Foo"), "comexampleFoo");
        assert_eq!(mangle("Outer$Inner"), "Outer_Inner");
        assert_eq!(mangle("p/Foo.java[x"), "pFoojavaARRAY_PARAMx");
    }

    #[test]
    fn mangle_is_total_over_arbitrary_strings() {
        assert_eq!(mangle(""), "");
        assert_eq!(mangle("<()>;"), "");
    }
}

//! Per-run analysis context: the store being written and the symbol registry
//! over it. One context is created per run and passed by reference through
//! every component; no state survives across runs.

use crate::domain::ast::{FieldBinding, MethodBinding, TypeBinding};
use crate::domain::ports::{ModelStore, ObjectHandle};
use crate::domain::registry::SymbolRegistry;
use anyhow::Result;

pub struct AnalysisContext<S: ModelStore> {
    pub store: S,
    pub registry: SymbolRegistry,
}

impl<S: ModelStore> AnalysisContext<S> {
    /// Creates the context and installs the reserved containers and builtin
    /// types into the store.
    pub fn new(store: S) -> Result<Self> {
        let mut ctx = Self {
            store,
            registry: SymbolRegistry::new(),
        };
        let Self { store, registry } = &mut ctx;
        registry.install_defaults(store)?;
        Ok(ctx)
    }

    pub fn resolve(&mut self, key: &str) -> Result<ObjectHandle> {
        let Self { store, registry } = self;
        registry.resolve(store, key)
    }

    pub fn resolve_signature(&mut self, signature: &str) -> Result<ObjectHandle> {
        let Self { store, registry } = self;
        registry.resolve_signature(store, signature)
    }

    pub fn resolve_type(&mut self, binding: &TypeBinding) -> Result<Option<ObjectHandle>> {
        let Self { store, registry } = self;
        registry.resolve_type(store, binding)
    }

    pub fn resolve_method(&mut self, binding: &MethodBinding) -> Result<Option<ObjectHandle>> {
        let Self { store, registry } = self;
        registry.resolve_method(store, binding)
    }

    pub fn resolve_field(&mut self, binding: &FieldBinding) -> Result<Option<ObjectHandle>> {
        let Self { store, registry } = self;
        registry.resolve_field(store, binding)
    }

    pub fn synthesize_external(&mut self, name: &str) -> Result<ObjectHandle> {
        let Self { store, registry } = self;
        registry.synthesize_external(store, name)
    }
}

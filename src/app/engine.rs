//! Composition root: wires the adapters to the domain and runs one analysis.
//!
//! A run either completes or aborts on the first structural violation; the
//! error is reported once here and never retried. Skipping a broken input
//! and continuing is the caller's decision.

use crate::adapters::source::JsonProgramSource;
use crate::adapters::store::InMemoryModelStore;
use crate::domain::ast::Program;
use crate::domain::builder::DeclarationGraphBuilder;
use crate::domain::context::AnalysisContext;
use crate::domain::ports::ProgramSource;
use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::error;

pub struct AnalysisEngine;

impl AnalysisEngine {
    /// Analyzes an already-loaded program against a fresh in-memory store.
    pub fn analyze(program: &Program) -> Result<AnalysisContext<InMemoryModelStore>> {
        let store = InMemoryModelStore::with_metamodel();
        let mut ctx = AnalysisContext::new(store)?;
        let builder = DeclarationGraphBuilder::new();
        if let Err(e) = builder.build(&mut ctx, program) {
            error!(program = %program.name, "analysis aborted: {e:#}");
            return Err(e);
        }
        Ok(ctx)
    }

    /// Loads a serialized program from JSON and analyzes it.
    pub fn analyze_file(path: &Path) -> Result<AnalysisContext<InMemoryModelStore>> {
        let program = JsonProgramSource::new(path)
            .load()
            .context("Failed to load program")?;
        Self::analyze(&program)
    }
}

//! JSON program source: loads a serialized resolved program produced by an
//! external parser/binder front end.

use crate::domain::ast::Program;
use crate::domain::ports::ProgramSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct JsonProgramSource {
    path: PathBuf,
}

impl JsonProgramSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProgramSource for JsonProgramSource {
    fn load(&self) -> Result<Program> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read program file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse program JSON: {}", self.path.display()))
    }
}

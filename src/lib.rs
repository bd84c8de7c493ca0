//! semgraph library: semantic graph construction from resolved syntax trees.

pub mod adapters;
pub mod app;
pub mod domain;

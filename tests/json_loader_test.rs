//! Round trip through the JSON program source: serialize a program, load it
//! back, and run a full analysis.

mod common;

use common::fixtures::{method_decl, program_of, span, type_decl};
use semgraph::adapters::source::JsonProgramSource;
use semgraph::app::engine::AnalysisEngine;
use semgraph::domain::ast::{Statement, Stmt};
use semgraph::domain::ports::{ModelStore, ProgramSource};
use semgraph::domain::schema::class;
use std::io::Write;

#[test]
fn loads_a_serialized_program_and_analyzes_it() {
    let mut a = type_decl("uA", "A", "p.A");
    a.methods.push(method_decl(
        "uA.m",
        "m",
        Some(Statement::new(
            span(0, 20),
            Stmt::Block {
                statements: vec![Statement::new(span(4, 8), Stmt::Return { expr: None })],
            },
        )),
    ));
    let program = program_of(vec![a]);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&program).unwrap().as_bytes())
        .unwrap();

    let loaded = JsonProgramSource::new(file.path()).load().unwrap();
    assert_eq!(loaded, program);

    let ctx = AnalysisEngine::analyze_file(file.path()).unwrap();
    assert_eq!(ctx.store.count_instances(class::PROGRAM), 1);
    assert_eq!(ctx.store.count_instances(class::TRANSLATION_UNIT), 3); // unit + builtin/external containers
    assert_eq!(ctx.store.count_instances(class::METHOD), 1);
    assert_eq!(ctx.store.count_instances("Block"), 1);
    assert_eq!(ctx.store.count_instances("ReturnStatement"), 1);
}

#[test]
fn missing_file_is_a_load_error() {
    let source = JsonProgramSource::new("/nonexistent/program.json");
    assert!(source.load().is_err());
}

#[test]
fn malformed_json_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    assert!(JsonProgramSource::new(file.path()).load().is_err());
}

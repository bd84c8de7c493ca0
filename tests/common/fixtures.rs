//! Shared fixture builders for integration tests.
#![allow(dead_code)]

use semgraph::adapters::store::InMemoryModelStore;
use semgraph::domain::ast::*;
use semgraph::domain::context::AnalysisContext;

/// Fresh analysis context over an in-memory store with the metamodel schema
/// and default objects installed.
pub fn fresh_context() -> AnalysisContext<InMemoryModelStore> {
    AnalysisContext::new(InMemoryModelStore::with_metamodel()).unwrap()
}

pub fn span(start: u32, length: u32) -> Span {
    Span { start, length }
}

pub fn stmt(start: u32, kind: Stmt) -> Statement {
    Statement::new(span(start, 10), kind)
}

/// Name expression resolving to a declared program type.
pub fn name_of(type_name: &str, qualified: &str, handle: &str) -> Expr {
    Expr::Name {
        resolved_type: Some(TypeBinding::declared(type_name, qualified, handle)),
    }
}

/// Name expression resolving to an out-of-program type.
pub fn name_of_external(type_name: &str, qualified: &str) -> Expr {
    Expr::Name {
        resolved_type: Some(TypeBinding::named(type_name, qualified)),
    }
}

pub fn unresolved_name() -> Expr {
    Expr::Name { resolved_type: None }
}

pub fn variable(handle: &str, name: &str, type_signature: &str) -> VariableBinding {
    VariableBinding {
        handle: handle.into(),
        name: name.into(),
        type_signature: type_signature.into(),
        var_type: {
            let element = semgraph::domain::sig::element_type(type_signature);
            Some(TypeBinding::named(
                semgraph::domain::sig::simple_name(element),
                element,
            ))
        },
    }
}

pub fn method_decl(handle: &str, name: &str, body: Option<Statement>) -> MethodDecl {
    MethodDecl {
        handle: handle.into(),
        name: name.into(),
        key: Some(format!("{handle}.key")),
        is_constructor: false,
        visibility: VisibilityKind::Public,
        modifiers: Modifiers::default(),
        parameters: vec![],
        return_type_signature: "void".into(),
        exception_signatures: vec![],
        annotations: vec![],
        body,
        anonymous_types: vec![],
    }
}

pub fn type_decl(handle: &str, name: &str, qualified: &str) -> TypeDecl {
    TypeDecl {
        handle: handle.into(),
        name: name.into(),
        qualified_name: qualified.into(),
        dotted_name: qualified.into(),
        parameterized_name: qualified.into(),
        kind: TypeDeclKind::Class,
        visibility: VisibilityKind::Public,
        modifiers: Modifiers::default(),
        type_parameters: vec![],
        annotations: vec![],
        superclass_signature: None,
        interface_signatures: vec![],
        fields: vec![],
        methods: vec![],
        initializers: vec![],
        member_types: vec![],
        anonymous_types: vec![],
    }
}

/// One-unit program wrapping the given types.
pub fn program_of(types: Vec<TypeDecl>) -> Program {
    Program {
        handle: "proj".into(),
        name: "proj".into(),
        source_roots: vec![SourceRoot {
            handle: "proj/src".into(),
            name: "src".into(),
            kind: SourceRootKind::Folder,
            packages: vec![Package {
                handle: "proj/src/p".into(),
                name: "p".into(),
                units: vec![TranslationUnit {
                    handle: "proj/src/p/Unit.x".into(),
                    name: "Unit.x".into(),
                    package_annotations: vec![],
                    types,
                    comments: vec![],
                }],
            }],
        }],
    }
}

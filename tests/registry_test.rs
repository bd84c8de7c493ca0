//! Symbol Registry integration tests: canonical keys, the fallback chain,
//! and external synthesis.

mod common;

use common::fixtures::{fresh_context, method_decl, program_of, stmt, type_decl};
use semgraph::domain::ast::{Statement, Stmt, TypeBinding};
use semgraph::domain::builder::DeclarationGraphBuilder;
use semgraph::domain::ports::ModelStore;
use semgraph::domain::registry::mangle;
use semgraph::domain::schema::class;

#[test]
fn primitives_and_string_are_preregistered() {
    let mut ctx = fresh_context();
    let int_node = ctx.resolve_signature("int").unwrap();
    assert_eq!(ctx.store.object_name(int_node), Some("int"));
    let string_node = ctx.resolve_signature("java.lang.String").unwrap();
    assert_eq!(ctx.store.object_name(string_node), Some("String"));
    // Array and generic decorations resolve to the same element type.
    assert_eq!(ctx.resolve_signature("int[][]").unwrap(), int_node);
}

#[test]
fn every_canonical_key_resolves_to_the_same_node() {
    let mut ctx = fresh_context();
    let mut decl = type_decl("u[Box", "Box", "p.Box");
    decl.qualified_name = "p.Box".into();
    decl.dotted_name = "p.Box".into();
    decl.parameterized_name = "p.Box<T>".into();
    let program = program_of(vec![decl]);
    DeclarationGraphBuilder::new().build(&mut ctx, &program).unwrap();

    let by_handle = ctx.resolve("u[Box").unwrap();
    let by_qualified = ctx.resolve("p.Box").unwrap();
    let by_parameterized = ctx.resolve("p.Box<T>").unwrap();
    let by_simple = ctx.resolve("Box").unwrap();
    assert_eq!(by_handle, by_qualified);
    assert_eq!(by_qualified, by_parameterized);
    assert_eq!(by_qualified, by_simple);
    assert_eq!(ctx.store.object_name(by_handle), Some(mangle("u[Box").as_str()));
}

#[test]
fn external_synthesis_deduplicates() {
    let mut ctx = fresh_context();
    let first = ctx.synthesize_external("ext.Foo").unwrap();
    for _ in 0..5 {
        assert_eq!(ctx.synthesize_external("ext.Foo").unwrap(), first);
    }
    let foos: Vec<_> = ctx
        .store
        .objects_of(class::TYPE)
        .into_iter()
        .filter(|&h| ctx.store.object_name(h) == Some("extFoo"))
        .collect();
    assert_eq!(foos.len(), 1);
}

#[test]
fn unknown_signature_synthesizes_under_the_external_container() {
    let mut ctx = fresh_context();
    let node = ctx
        .resolve_signature("java.util.List<java.lang.String>[]")
        .unwrap();
    let unit = ctx.store.object_by_name("ExternalTypesUnit").unwrap();
    assert!(ctx.store.has_link(unit, node, "translation-unit-has-type"));
    // Same element type through a different decoration: same node.
    assert_eq!(ctx.resolve_signature("java.util.List").unwrap(), node);
}

#[test]
fn type_variables_and_unbounded_wildcards_resolve_to_nothing() {
    let mut ctx = fresh_context();
    let type_var = TypeBinding {
        is_type_variable: true,
        ..TypeBinding::named("T", "")
    };
    assert_eq!(ctx.resolve_type(&type_var).unwrap(), None);

    let unbounded = TypeBinding {
        is_wildcard: true,
        ..TypeBinding::named("?", "")
    };
    assert_eq!(ctx.resolve_type(&unbounded).unwrap(), None);

    let bounded = TypeBinding {
        is_wildcard: true,
        wildcard_bound: Some(Box::new(TypeBinding::named("Foo", "p.Foo"))),
        ..TypeBinding::named("? extends Foo", "")
    };
    let node = ctx.resolve_type(&bounded).unwrap().unwrap();
    assert_eq!(ctx.store.object_name(node), Some("pFoo"));
}

#[test]
fn anonymous_types_resolve_through_their_superclass() {
    let mut ctx = fresh_context();
    let anonymous = TypeBinding {
        is_anonymous: true,
        superclass: Some(Box::new(TypeBinding::named("Base", "p.Base"))),
        ..TypeBinding::named("", "")
    };
    let node = ctx.resolve_type(&anonymous).unwrap().unwrap();
    assert_eq!(ctx.store.object_name(node), Some("pBase"));
}

#[test]
fn method_placeholder_is_created_once() {
    let mut ctx = fresh_context();
    let binding = semgraph::domain::ast::MethodBinding {
        handle: Some("lib.Foo.bar()".into()),
        name: "bar".into(),
        key: Some("lib.Foo.bar".into()),
        declaring: TypeBinding::named("Foo", "lib.Foo"),
        return_type: TypeBinding::named("int", "int"),
        is_constructor: false,
    };
    let first = ctx.resolve_method(&binding).unwrap().unwrap();
    let second = ctx.resolve_method(&binding).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(ctx.store.count_instances(class::METHOD), 1);

    // The placeholder carries its declaring type and return type.
    let declaring = ctx.resolve("lib.Foo").unwrap();
    assert!(ctx.store.has_link(declaring, first, "type-has-method"));
    let int_node = ctx.resolve_signature("int").unwrap();
    assert!(ctx.store.has_link(first, int_node, "method-has-return-type"));
}

#[test]
fn declared_method_is_found_not_resynthesized() {
    let mut ctx = fresh_context();
    let mut decl = type_decl("uA", "A", "p.A");
    decl.methods.push(method_decl(
        "uA.m",
        "m",
        Some(stmt(0, Stmt::Block { statements: vec![] })),
    ));
    let program = program_of(vec![decl]);
    DeclarationGraphBuilder::new().build(&mut ctx, &program).unwrap();

    let binding = semgraph::domain::ast::MethodBinding {
        handle: Some("uA.m".into()),
        name: "m".into(),
        key: None,
        declaring: TypeBinding::declared("A", "p.A", "uA"),
        return_type: TypeBinding::named("void", "void"),
        is_constructor: false,
    };
    let resolved = ctx.resolve_method(&binding).unwrap().unwrap();
    assert_eq!(
        ctx.store.object_name(resolved),
        Some(format!("METHOD_{}", mangle("uA.m")).as_str())
    );
    assert_eq!(ctx.store.count_instances(class::METHOD), 1);
}

#[test]
fn statement_lookup_ignores_declaration_order() {
    // A Name in a body can reference a type declared later; nothing about
    // resolution depends on order once the declaration pass has run.
    let mut ctx = fresh_context();
    let mut a = type_decl("uA", "A", "p.A");
    a.methods.push(method_decl(
        "uA.m",
        "m",
        Some(stmt(
            0,
            Stmt::Block {
                statements: vec![Statement::new(
                    semgraph::domain::ast::Span { start: 2, length: 5 },
                    Stmt::ExpressionStmt {
                        expr: semgraph::domain::ast::Expr::Name {
                            resolved_type: Some(TypeBinding::declared("B", "p.B", "uB")),
                        },
                    },
                )],
            },
        )),
    ));
    let b = type_decl("uB", "B", "p.B");
    let program = program_of(vec![a, b]);
    DeclarationGraphBuilder::new().build(&mut ctx, &program).unwrap();

    let declared_b = ctx.store.object_by_name(&mangle("uB")).unwrap();
    assert_eq!(ctx.resolve("p.B").unwrap(), declared_b);
}

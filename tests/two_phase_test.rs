//! Two-phase construction tests: forward references, cross-reference wiring
//! and body processing over whole programs.

mod common;

use common::fixtures::{method_decl, program_of, span, stmt, type_decl};
use semgraph::app::engine::AnalysisEngine;
use semgraph::domain::ast::*;
use semgraph::domain::ports::ModelStore;
use semgraph::domain::registry::mangle;
use semgraph::domain::schema::{assoc, attr, class};

fn block(statements: Vec<Statement>) -> Statement {
    Statement::new(span(0, 100), Stmt::Block { statements })
}

#[test]
fn forward_reference_resolves_to_the_declared_node() {
    // A's body references B; B is declared after A.
    let mut a = type_decl("uA", "A", "p.A");
    a.methods.push(method_decl(
        "uA.m",
        "m",
        Some(block(vec![Statement::new(
            span(10, 8),
            Stmt::ExpressionStmt {
                expr: Expr::Name {
                    resolved_type: Some(TypeBinding::declared("B", "p.B", "uB")),
                },
            },
        )])),
    ));
    let b = type_decl("uB", "B", "p.B");
    let ctx = AnalysisEngine::analyze(&program_of(vec![a, b])).unwrap();

    let declared_b = ctx.store.object_by_name(&mangle("uB")).unwrap();
    let statements = ctx.store.objects_of("ExpressionStatement");
    assert_eq!(statements.len(), 1);
    assert!(
        ctx.store
            .has_link(statements[0], declared_b, assoc::STATEMENT_DEPENDS_ON_TYPE)
    );
    // No external placeholder was synthesized for B.
    let bs: Vec<_> = ctx
        .store
        .objects_of(class::TYPE)
        .into_iter()
        .filter(|&h| {
            ctx.store.attribute(h, attr::NAME) == Some(&semgraph::domain::ports::AttrValue::Str("B".into()))
        })
        .collect();
    assert_eq!(bs.len(), 1);
}

#[test]
fn supertype_and_interface_edges_ignore_declaration_order() {
    let mut a = type_decl("uA", "A", "p.A");
    a.superclass_signature = Some("p.B".into());
    a.interface_signatures = vec!["p.I".into()];
    let b = type_decl("uB", "B", "p.B");
    let i = {
        let mut t = type_decl("uI", "I", "p.I");
        t.kind = TypeDeclKind::Interface;
        t
    };
    let ctx = AnalysisEngine::analyze(&program_of(vec![a, b, i])).unwrap();

    let node_a = ctx.store.object_by_name(&mangle("uA")).unwrap();
    let node_b = ctx.store.object_by_name(&mangle("uB")).unwrap();
    let node_i = ctx.store.object_by_name(&mangle("uI")).unwrap();
    assert!(ctx.store.has_link(node_a, node_b, assoc::TYPE_EXTENDS_TYPE));
    assert!(ctx.store.has_link(node_a, node_i, assoc::TYPE_IMPLEMENTS_TYPE));
}

#[test]
fn method_resolution_wires_parameters_return_and_exceptions() {
    let mut a = type_decl("uA", "A", "p.A");
    let mut m = method_decl("uA.m", "m", None);
    m.parameters = vec![ParameterDecl {
        handle: "uA.m.arg".into(),
        name: "arg".into(),
        type_signature: "java.lang.String[]".into(),
    }];
    m.return_type_signature = "int[]".into();
    m.exception_signatures = vec!["ext.Failure".into()];
    a.methods.push(m);
    let ctx = AnalysisEngine::analyze(&program_of(vec![a])).unwrap();

    let method = ctx
        .store
        .object_by_name(&format!("METHOD_{}", mangle("uA.m")))
        .unwrap();
    let params = ctx.store.linked(method, assoc::METHOD_HAS_PARAMETER);
    assert_eq!(params.len(), 1);
    assert_eq!(
        ctx.store.attribute(params[0], attr::ARRAY_DIMENSIONS),
        Some(&semgraph::domain::ports::AttrValue::Int(1))
    );
    let string_node = ctx.store.object_by_name("String").unwrap();
    assert!(ctx.store.has_link(params[0], string_node, assoc::LOCAL_VARIABLE_HAS_TYPE));

    let int_node = ctx.store.object_by_name("int").unwrap();
    assert!(ctx.store.has_link(method, int_node, assoc::METHOD_HAS_RETURN_TYPE));
    assert_eq!(
        ctx.store.attribute(method, attr::RETURN_TYPE_ARRAY_DIMENSIONS),
        Some(&semgraph::domain::ports::AttrValue::Int(1))
    );
    assert_eq!(ctx.store.linked(method, assoc::METHOD_THROWS_TYPE).len(), 1);
}

#[test]
fn method_bodies_and_initializers_are_walked_once() {
    let mut a = type_decl("uA", "A", "p.A");
    a.methods.push(method_decl(
        "uA.m",
        "m",
        Some(block(vec![Statement::new(
            span(5, 4),
            Stmt::Return { expr: None },
        )])),
    ));
    a.initializers = vec![
        InitializerDecl {
            occurrence: 1,
            handle: "uA!init1".into(),
            name: "init".into(),
            start_position: 40,
            body: Statement::new(span(40, 10), Stmt::Block { statements: vec![] }),
        },
        InitializerDecl {
            occurrence: 2,
            handle: "uA!init2".into(),
            name: "init".into(),
            start_position: 60,
            body: Statement::new(span(60, 10), Stmt::Block { statements: vec![] }),
        },
    ];
    let ctx = AnalysisEngine::analyze(&program_of(vec![a])).unwrap();

    let method = ctx
        .store
        .object_by_name(&format!("METHOD_{}", mangle("uA.m")))
        .unwrap();
    assert_eq!(ctx.store.linked(method, assoc::METHOD_HAS_BODY).len(), 1);

    assert_eq!(ctx.store.count_instances(class::INITIALIZER), 2);
    for handle in ctx.store.objects_of(class::INITIALIZER) {
        assert_eq!(
            ctx.store.linked(handle, assoc::INITIALIZER_HAS_BODY).len(),
            1,
            "each initializer gets exactly one body"
        );
    }
    // Method body block + two initializer blocks.
    assert_eq!(ctx.store.count_instances("Block"), 3);
    assert_eq!(ctx.store.count_instances("ReturnStatement"), 1);
}

#[test]
fn external_references_share_one_placeholder() {
    // Two bodies referencing the same out-of-program type and method.
    let call = |start| {
        Statement::new(
            span(start, 10),
            Stmt::ExpressionStmt {
                expr: Expr::Call {
                    method: Some(MethodBinding {
                        handle: Some("lib.Util.log()".into()),
                        name: "log".into(),
                        key: Some("lib.Util.log".into()),
                        declaring: TypeBinding::named("Util", "lib.Util"),
                        return_type: TypeBinding::named("void", "void"),
                        is_constructor: false,
                    }),
                    args: vec![],
                    receiver: None,
                },
            },
        )
    };
    let mut a = type_decl("uA", "A", "p.A");
    a.methods.push(method_decl("uA.m", "m", Some(block(vec![call(10)]))));
    let mut b = type_decl("uB", "B", "p.B");
    b.methods.push(method_decl("uB.n", "n", Some(block(vec![call(80)]))));
    let ctx = AnalysisEngine::analyze(&program_of(vec![a, b])).unwrap();

    let utils: Vec<_> = ctx
        .store
        .objects_of(class::TYPE)
        .into_iter()
        .filter(|&h| ctx.store.object_name(h) == Some("libUtil"))
        .collect();
    assert_eq!(utils.len(), 1);

    // Declared methods m and n, plus exactly one placeholder for log.
    assert_eq!(ctx.store.count_instances(class::METHOD), 3);
}

#[test]
fn nested_and_anonymous_types_are_declared_and_resolved() {
    let mut outer = type_decl("uOuter", "Outer", "p.Outer");
    let inner = type_decl("uOuter$Inner", "Inner", "p.Outer$Inner");
    outer.member_types.push(inner);

    let mut anon = type_decl("uOuter$1", "", "p.Outer$1");
    anon.qualified_name = "Outer$1".into();
    let mut m = method_decl("uOuter.m", "m", Some(block(vec![])));
    m.anonymous_types.push(anon);
    outer.methods.push(m);

    let ctx = AnalysisEngine::analyze(&program_of(vec![outer])).unwrap();

    let outer_node = ctx.store.object_by_name(&mangle("uOuter")).unwrap();
    let inner_node = ctx.store.object_by_name(&mangle("uOuter$Inner")).unwrap();
    assert!(ctx.store.has_link(inner_node, outer_node, assoc::TYPE_NESTED_IN_TYPE));

    // The anonymous type landed in the store under its probe name.
    let anon_name = format!("{}{}", mangle("uOuter$1"), mangle("Outer$1"));
    assert!(ctx.store.object_by_name(&anon_name).is_some());
}

#[test]
fn annotations_and_their_values_reach_the_annotation_type_fields() {
    let mut a = type_decl("uA", "A", "p.A");
    let mut m = method_decl("uA.m", "m", None);
    m.annotations = vec![AnnotationUse {
        handle: "uA.m!ann1".into(),
        name: "Tagged".into(),
        values: vec![AnnotationValuePair {
            member_name: "label".into(),
            value: "core".into(),
        }],
    }];
    a.methods.push(m);
    let ctx = AnalysisEngine::analyze(&program_of(vec![a])).unwrap();

    let method = ctx
        .store
        .object_by_name(&format!("METHOD_{}", mangle("uA.m")))
        .unwrap();
    let annotations = ctx.store.linked(method, assoc::ELEMENT_HAS_ANNOTATION);
    assert_eq!(annotations.len(), 1);
    let annotation = annotations[0];

    let types = ctx.store.linked(annotation, assoc::ANNOTATION_HAS_TYPE);
    assert_eq!(types.len(), 1);
    let annotation_type = types[0];
    assert_eq!(ctx.store.object_name(annotation_type), Some("Tagged"));

    let values = ctx.store.linked(annotation, assoc::ANNOTATION_HAS_VALUE);
    assert_eq!(values.len(), 1);
    let fields = ctx.store.linked(values[0], assoc::ANNOTATION_VALUE_FOR_FIELD);
    assert_eq!(fields.len(), 1);
    // The annotation type was never program source, so its field was
    // synthesized and attached to it.
    assert!(ctx.store.has_link(annotation_type, fields[0], assoc::TYPE_HAS_FIELD));
}

#[test]
fn comments_attach_to_their_translation_unit() {
    let mut program = program_of(vec![type_decl("uA", "A", "p.A")]);
    program.source_roots[0].packages[0].units[0].comments = vec![
        Comment {
            kind: CommentKind::Line,
            span: span(0, 20),
        },
        Comment {
            kind: CommentKind::Doc,
            span: span(30, 50),
        },
    ];
    let ctx = AnalysisEngine::analyze(&program).unwrap();

    let unit = ctx
        .store
        .object_by_name(&mangle("proj/src/p/Unit.x"))
        .unwrap();
    assert_eq!(
        ctx.store.linked(unit, assoc::TRANSLATION_UNIT_HAS_COMMENT).len(),
        2
    );
    assert_eq!(ctx.store.count_instances(class::COMMENT), 2);
}

#[test]
fn type_parameters_get_nodes_and_bounds() {
    let mut a = type_decl("uA", "A", "p.A");
    a.type_parameters = vec![TypeParameterDecl {
        handle: "uA!tpT".into(),
        name: "T".into(),
        bound_signatures: vec!["ext.Comparable".into()],
    }];
    let ctx = AnalysisEngine::analyze(&program_of(vec![a])).unwrap();

    let node_a = ctx.store.object_by_name(&mangle("uA")).unwrap();
    let tps = ctx.store.linked(node_a, assoc::TYPE_HAS_TYPE_PARAMETER);
    assert_eq!(tps.len(), 1);
    assert_eq!(
        ctx.store.linked(tps[0], assoc::TYPE_PARAMETER_BOUNDED_BY_TYPE).len(),
        1
    );
}

#[test]
fn structural_violations_abort_the_run() {
    // A fragment without a resolved variable binding is a contract violation.
    let mut a = type_decl("uA", "A", "p.A");
    a.methods.push(method_decl(
        "uA.m",
        "m",
        Some(block(vec![stmt(
            4,
            Stmt::VariableDeclaration {
                fragments: vec![VarFragment {
                    variable: None,
                    initializer: None,
                }],
                declared_type: None,
            },
        )])),
    ));
    assert!(AnalysisEngine::analyze(&program_of(vec![a])).is_err());
}

//! Tests for variable indexing.
//!
//! These cover the simplest end-to-end path: a global variable gets a
//! variable node bound to its lookup name, a definition range over its
//! name token, and a type edge to its spelled type.

use weft_ast::ast::Ast;
use weft_ast::builder::AstBuilder;
use weft_ast::loc::{Loc, SourceRange};
use weft_ast::nodes::{DeclKind, DeclName, QualType, VarDecl};
use weft_indexer::observer::{Completeness, NodeId, Range};
use weft_indexer::recorder::{GraphEntry, GraphRecorder};
use weft_indexer::walk::{IndexOptions, index_translation_unit};

fn index(ast: &Ast) -> GraphRecorder {
    let mut recorder = GraphRecorder::new();
    let report = index_translation_unit(ast, &mut recorder, IndexOptions::new())
        .expect("indexing should succeed");
    assert!(report.unimplemented.is_empty(), "nothing here is unimplemented");
    recorder
}

fn find_variable(recorder: &GraphRecorder, wanted: &str) -> (NodeId, Completeness) {
    recorder
        .entries()
        .iter()
        .find_map(|entry| match entry {
            GraphEntry::Variable { name, id, completeness } if name == wanted => {
                Some((id.clone(), *completeness))
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("a variable node named {wanted} should be recorded"))
}

#[test]
fn global_variable_gets_node_name_and_builtin_type() {
    // int x;
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int x;\n");
    let int_ty = builder.builtin_type("int");
    let int_loc =
        builder.leaf_type_loc(QualType::unqualified(int_ty), SourceRange::in_file(file, 0, 3));
    let x = builder.decl(
        DeclName::Ident("x".to_string()),
        Loc::file(file, 4),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(int_ty),
            type_loc: Some(int_loc),
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(x);
    let ast = builder.finish();

    let recorder = index(&ast);
    let (id, completeness) = find_variable(&recorder, "x#n");

    assert_eq!(completeness, Completeness::Definition);
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::TypeEdge { term, ty }
                if *term == id && ty.as_str() == "int#builtin"
        )),
        "x should be typed as the builtin int"
    );
}

#[test]
fn definition_range_covers_the_name_token() {
    // int x;
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int x;\n");
    let int_ty = builder.builtin_type("int");
    let x = builder.decl(
        DeclName::Ident("x".to_string()),
        Loc::file(file, 4),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(int_ty),
            type_loc: None,
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(x);
    let ast = builder.finish();

    let recorder = index(&ast);
    let (id, _) = find_variable(&recorder, "x#n");
    let expected = Range::Physical(SourceRange::in_file(file, 4, 5));

    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::DefinitionRange { range, node } if *range == expected && *node == id
        )),
        "the definition range should cover exactly the token `x`"
    );
}

#[test]
fn declaration_only_variable_is_incomplete() {
    // extern int x;
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "extern int x;\n");
    let int_ty = builder.builtin_type("int");
    let x = builder.decl(
        DeclName::Ident("x".to_string()),
        Loc::file(file, 11),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(int_ty),
            type_loc: None,
            parameter: false,
            is_definition: false,
        }),
    );
    builder.add_top_level(x);
    let ast = builder.finish();

    let recorder = index(&ast);
    let (id, completeness) = find_variable(&recorder, "x#n");

    assert_eq!(completeness, Completeness::Incomplete);
    assert!(
        !id.as_str().contains("#D"),
        "a declaration-only variable must not carry a definition marker, got {id}"
    );
}

#[test]
fn spelled_type_occurrence_is_recorded() {
    // int x;  -- the spelling of `int` gets a type-spelling anchor
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int x;\n");
    let int_ty = builder.builtin_type("int");
    let int_loc =
        builder.leaf_type_loc(QualType::unqualified(int_ty), SourceRange::in_file(file, 0, 3));
    let x = builder.decl(
        DeclName::Ident("x".to_string()),
        Loc::file(file, 4),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(int_ty),
            type_loc: Some(int_loc),
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(x);
    let ast = builder.finish();

    let recorder = index(&ast);
    let expected = Range::Physical(SourceRange::in_file(file, 0, 3));

    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::TypeSpelling { range, ty }
                if *range == expected && ty.as_str() == "int#builtin"
        )),
        "the spelling of `int` should be anchored"
    );
}

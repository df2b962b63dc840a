//! Tests for enum indexing: enumerators, scope, underlying types, and
//! completion edges.

use weft_ast::ast::Ast;
use weft_ast::builder::AstBuilder;
use weft_ast::loc::{Loc, SourceRange};
use weft_ast::nodes::{DeclKind, DeclName, EnumConstantDecl, EnumDecl, QualType};
use weft_indexer::hash::{hash_to_string, string_hash};
use weft_indexer::observer::{Completeness, EnumKind, Specificity};
use weft_indexer::recorder::{GraphEntry, GraphRecorder};
use weft_indexer::walk::{IndexOptions, index_translation_unit};

fn index(ast: &Ast) -> GraphRecorder {
    let mut recorder = GraphRecorder::new();
    let _ = index_translation_unit(ast, &mut recorder, IndexOptions::new())
        .expect("indexing should succeed");
    recorder
}

#[test]
fn enum_definition_records_enumerators_as_children() {
    // enum E { X, Y };
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "enum E { X, Y };\n");
    let x = builder.decl(
        DeclName::Ident("X".to_string()),
        Loc::file(file, 9),
        DeclKind::EnumConstant(EnumConstantDecl { value: 0 }),
    );
    let y = builder.decl(
        DeclName::Ident("Y".to_string()),
        Loc::file(file, 12),
        DeclKind::EnumConstant(EnumConstantDecl { value: 1 }),
    );
    let e = builder.decl(
        DeclName::Ident("E".to_string()),
        Loc::file(file, 5),
        DeclKind::Enum(EnumDecl {
            scoped: false,
            underlying: None,
            enumerators: vec![x, y],
            redecls: Vec::new(),
            is_definition: true,
        }),
    );
    builder.add_top_level(e);
    let ast = builder.finish();

    let recorder = index(&ast);

    // An enum definition's id is the XOR fold of its enumerator names.
    let enum_id = format!("E#n#{}", hash_to_string(string_hash("X") ^ string_hash("Y")));
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Enum { id, completeness, kind }
                if id.as_str() == enum_id
                    && *completeness == Completeness::Definition
                    && *kind == EnumKind::Unscoped
        )),
        "the enum node should be a definition keyed by its body hash"
    );

    let x_id = "E:X#n@file:1@9";
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::IntegerConstant { id, value } if id.as_str() == x_id && *value == 0
        )),
        "X should carry its value"
    );
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::ChildOf { child, parent }
                if child.as_str() == x_id && parent.as_str() == enum_id
        )),
        "X should be a child of its enum"
    );
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::IntegerConstant { id, value }
                if id.as_str() == "E:Y#n@file:1@12" && *value == 1
        )),
        "Y should carry its value"
    );
}

#[test]
fn opaque_enum_with_underlying_type_is_complete_and_scoped() {
    // enum class F : short;
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "enum class F : short;\n");
    let short_ty = builder.builtin_type("short");
    let short_loc = builder
        .leaf_type_loc(QualType::unqualified(short_ty), SourceRange::in_file(file, 15, 20));
    let f = builder.decl(
        DeclName::Ident("F".to_string()),
        Loc::file(file, 11),
        DeclKind::Enum(EnumDecl {
            scoped: true,
            underlying: Some(short_loc),
            enumerators: Vec::new(),
            redecls: Vec::new(),
            is_definition: false,
        }),
    );
    builder.add_top_level(f);
    let ast = builder.finish();

    let recorder = index(&ast);

    let f_id = "F#n@file:1@11";
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Enum { id, completeness, kind }
                if id.as_str() == f_id
                    && *completeness == Completeness::Complete
                    && *kind == EnumKind::Scoped
        )),
        "a spelled underlying type makes the declaration complete without defining it"
    );
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::TypeEdge { term, ty }
                if term.as_str() == f_id && ty.as_str() == "short#builtin"
        )),
        "the underlying type should be ascribed"
    );
}

#[test]
fn enum_definition_completes_earlier_declaration() {
    // enum E : int; enum E : int { X };
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "enum E : int; enum E : int { X };\n");
    let int_ty = builder.builtin_type("int");
    let fwd_underlying =
        builder.leaf_type_loc(QualType::unqualified(int_ty), SourceRange::in_file(file, 9, 12));
    let fwd = builder.decl(
        DeclName::Ident("E".to_string()),
        Loc::file(file, 5),
        DeclKind::Enum(EnumDecl {
            scoped: false,
            underlying: Some(fwd_underlying),
            enumerators: Vec::new(),
            redecls: Vec::new(),
            is_definition: false,
        }),
    );
    let x = builder.decl(
        DeclName::Ident("X".to_string()),
        Loc::file(file, 29),
        DeclKind::EnumConstant(EnumConstantDecl { value: 0 }),
    );
    let def_underlying =
        builder.leaf_type_loc(QualType::unqualified(int_ty), SourceRange::in_file(file, 23, 26));
    let def = builder.decl(
        DeclName::Ident("E".to_string()),
        Loc::file(file, 19),
        DeclKind::Enum(EnumDecl {
            scoped: false,
            underlying: Some(def_underlying),
            enumerators: vec![x],
            redecls: Vec::new(),
            is_definition: true,
        }),
    );
    builder.set_redecl_chain(&[fwd, def]);
    builder.add_top_level(fwd);
    builder.add_top_level(def);
    let ast = builder.finish();

    let recorder = index(&ast);

    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::CompletionRange { node, specificity, .. }
                if node.as_str() == "E#n@file:1@5"
                    && *specificity == Specificity::UniquelyCompletes
        )),
        "the definition should uniquely complete the opaque declaration"
    );
}

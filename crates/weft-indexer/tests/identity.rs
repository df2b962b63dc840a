//! Tests for identity stability, determinism, the type-node cache, the
//! unimplemented policy, and cancellation.

use weft_ast::ast::Ast;
use weft_ast::builder::AstBuilder;
use weft_ast::loc::{Loc, SourceRange};
use weft_ast::nodes::{
    DeclKind,
    DeclName,
    QualType,
    RecordDecl,
    RecordKeyword,
    RecordSpecialization,
    TemplateArg,
    TemplateDecl,
    TemplateParmDecl,
    TypeKind,
    UnsupportedType,
    VarDecl,
};
use weft_indexer::cancel::CancelToken;
use weft_indexer::error::IndexError;
use weft_indexer::recorder::{GraphEntry, GraphRecorder};
use weft_indexer::walk::{IndexOptions, index_translation_unit};

fn index(ast: &Ast) -> GraphRecorder {
    let mut recorder = GraphRecorder::new();
    let _ = index_translation_unit(ast, &mut recorder, IndexOptions::new())
        .expect("indexing should succeed");
    recorder
}

fn int_var(
    builder: &mut AstBuilder,
    file: weft_source::types::FileId,
    name: &str,
    offset: usize,
    with_pointer: bool,
) {
    let file_loc = Loc::file(file, offset);
    let int_ty = builder.builtin_type("int");
    let ty = if with_pointer {
        builder.intern_type(TypeKind::Pointer(QualType::unqualified(int_ty)))
    } else {
        int_ty
    };
    let var = builder.decl(
        DeclName::Ident(name.to_string()),
        file_loc,
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(ty),
            type_loc: None,
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(var);
}

#[test]
fn two_runs_over_one_tree_emit_identical_sequences() {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int a; int* b;\n");
    int_var(&mut builder, file, "a", 4, false);
    int_var(&mut builder, file, "b", 12, true);
    let ast = builder.finish();

    let first = index(&ast);
    let second = index(&ast);

    assert_eq!(
        first.entries(),
        second.entries(),
        "indexing must be deterministic call-for-call"
    );
}

#[test]
fn type_cache_hands_out_one_id_no_matter_the_occurrence() {
    // int* b; int* c;  -- one pointer type, two spellings
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int* b; int* c;\n");
    int_var(&mut builder, file, "b", 5, true);
    int_var(&mut builder, file, "c", 13, true);
    let ast = builder.finish();

    let recorder = index(&ast);

    let pointer_type = "ptr#builtin(int#builtin)#tapp";
    let type_edges = recorder
        .entries()
        .iter()
        .filter(|entry| {
            matches!(entry, GraphEntry::TypeEdge { ty, .. } if ty.as_str() == pointer_type)
        })
        .count();
    assert_eq!(type_edges, 2, "both variables type-link to the one pointer type");

    let tapp_nodes = recorder
        .entries()
        .iter()
        .filter(|entry| {
            matches!(entry, GraphEntry::Tapp { id, .. } if id.as_str() == pointer_type)
        })
        .count();
    assert_eq!(tapp_nodes, 1, "the cached type is not re-recorded on later occurrences");
}

#[test]
fn unrelated_declarations_do_not_change_an_id() {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int x;\nstruct Unrelated {};\n");
    int_var(&mut builder, file, "x", 4, false);
    let small = builder.finish();

    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int x;\nstruct Unrelated {};\n");
    int_var(&mut builder, file, "x", 4, false);
    let unrelated = builder.decl(
        DeclName::Ident("Unrelated".to_string()),
        Loc::file(file, 14),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Struct,
            members: Vec::new(),
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: None,
            partial_params: None,
        }),
    );
    builder.add_top_level(unrelated);
    let large = builder.finish();

    let id_of_x = |recorder: &GraphRecorder| {
        recorder
            .entries()
            .iter()
            .find_map(|entry| match entry {
                GraphEntry::Variable { name, id, .. } if name == "x#n" => Some(id.clone()),
                _ => None,
            })
            .expect("x should be recorded")
    };

    assert_eq!(
        id_of_x(&index(&small)),
        id_of_x(&index(&large)),
        "adding unrelated code must not perturb existing ids"
    );
}

#[test]
fn unsupported_types_are_counted_and_skipped_by_default() {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "float4 v;\n");
    let vector_ty = builder.intern_type(TypeKind::Unsupported(UnsupportedType::Vector));
    let vector_loc =
        builder.leaf_type_loc(QualType::unqualified(vector_ty), SourceRange::in_file(file, 0, 6));
    let v = builder.decl(
        DeclName::Ident("v".to_string()),
        Loc::file(file, 7),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(vector_ty),
            type_loc: Some(vector_loc),
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(v);
    let ast = builder.finish();

    let mut recorder = GraphRecorder::new();
    let report = index_translation_unit(&ast, &mut recorder, IndexOptions::new())
        .expect("the default policy skips unimplemented constructs");

    assert_eq!(report.unimplemented.get("Type::Vector"), Some(&1));
    let var_id = recorder
        .entries()
        .iter()
        .find_map(|entry| match entry {
            GraphEntry::Variable { name, id, .. } if name == "v#n" => Some(id.clone()),
            _ => None,
        })
        .expect("the variable node is still emitted");
    assert!(
        !recorder
            .entries()
            .iter()
            .any(|entry| matches!(entry, GraphEntry::TypeEdge { term, .. } if *term == var_id)),
        "no type edge can be drawn for an unlowered type"
    );
}

#[test]
fn unsupported_types_fail_the_run_when_the_policy_is_off() {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "float4 v;\n");
    let vector_ty = builder.intern_type(TypeKind::Unsupported(UnsupportedType::Vector));
    let vector_loc =
        builder.leaf_type_loc(QualType::unqualified(vector_ty), SourceRange::in_file(file, 0, 6));
    let v = builder.decl(
        DeclName::Ident("v".to_string()),
        Loc::file(file, 7),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(vector_ty),
            type_loc: Some(vector_loc),
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(v);
    let ast = builder.finish();

    let mut recorder = GraphRecorder::new();
    let options = IndexOptions { ignore_unimplemented: false, cancel: None };
    let error = index_translation_unit(&ast, &mut recorder, options)
        .expect_err("a strict run should refuse unimplemented constructs");
    assert_eq!(error, IndexError::Unimplemented { construct: "Type::Vector" });
}

/// Builds: template<int N> struct Array {}; plus an implicit Array<3>.
///
/// Integral template arguments have no semantic hash yet, so the
/// instantiation's identity exercises the unimplemented policy inside
/// hashing, where there is no error channel.
fn integral_specialization_ast() -> Ast {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "template<int N> struct Array {};\n");
    let n_parm = builder.decl(
        DeclName::Ident("N".to_string()),
        Loc::file(file, 13),
        DeclKind::NonTypeTemplateParm(TemplateParmDecl { depth: 0, index: 0 }),
    );
    let pattern = builder.decl(
        DeclName::Ident("Array".to_string()),
        Loc::file(file, 23),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Struct,
            members: Vec::new(),
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: None,
            partial_params: None,
        }),
    );
    let template = builder.decl(
        DeclName::Ident("Array".to_string()),
        Loc::file(file, 23),
        DeclKind::ClassTemplate(TemplateDecl {
            params: vec![n_parm],
            templated: pattern,
            specializations: Vec::new(),
        }),
    );
    builder.set_described_template(pattern, template);
    let instantiation = builder.implicit_decl(
        DeclName::Ident("Array".to_string()),
        Loc::file(file, 23),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Struct,
            members: Vec::new(),
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: Some(RecordSpecialization {
                template,
                args: vec![TemplateArg::Integral(3)],
                args_as_written: None,
                implicit: true,
            }),
            partial_params: None,
        }),
    );
    builder.add_specialization(template, instantiation);
    builder.add_top_level(template);
    builder.finish()
}

#[test]
fn integral_template_arguments_are_counted_and_skipped_by_default() {
    let ast = integral_specialization_ast();

    let mut recorder = GraphRecorder::new();
    let report = index_translation_unit(&ast, &mut recorder, IndexOptions::new())
        .expect("the default policy skips unimplemented constructs");

    assert!(
        report.unimplemented.contains_key("TemplateArgument::Integral"),
        "the integral argument should be counted, got {:?}",
        report.unimplemented
    );
    assert!(
        !recorder.entries().iter().any(|entry| matches!(entry, GraphEntry::SpecEdge { .. })),
        "no specializes edge can be drawn when an argument fails to lower"
    );
}

#[test]
#[should_panic(expected = "no semantic hash for TemplateArgument::Integral")]
fn integral_template_arguments_are_fatal_in_strict_mode() {
    let ast = integral_specialization_ast();

    let mut recorder = GraphRecorder::new();
    let options = IndexOptions { ignore_unimplemented: false, cancel: None };
    let _ = index_translation_unit(&ast, &mut recorder, options);
}

#[test]
fn a_cancelled_token_aborts_the_traversal() {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "int x;\n");
    int_var(&mut builder, file, "x", 4, false);
    let ast = builder.finish();

    let token = CancelToken::new();
    token.cancel();
    let mut recorder = GraphRecorder::new();
    let options = IndexOptions { ignore_unimplemented: true, cancel: Some(token) };
    let error = index_translation_unit(&ast, &mut recorder, options)
        .expect_err("a pre-cancelled run should abort");
    assert_eq!(error, IndexError::Cancelled);
}

//! Tests for function indexing: callables, call edges, parameters,
//! completion edges, destructors, and methods.

use weft_ast::ast::Ast;
use weft_ast::builder::AstBuilder;
use weft_ast::loc::{Loc, SourceRange};
use weft_ast::nodes::{
    CallExpr,
    DeclKind,
    DeclName,
    DeclRefExpr,
    ExprId,
    ExprKind,
    FunctionDecl,
    FunctionTemplateInfo,
    OperatorKind,
    QualType,
    RecordDecl,
    RecordKeyword,
    TypeKind,
    VarDecl,
};
use weft_indexer::hash::string_hash;
use weft_indexer::observer::{Completeness, Range, Specificity};
use weft_indexer::recorder::{GraphEntry, GraphRecorder};
use weft_indexer::walk::{IndexOptions, index_translation_unit};

fn index(ast: &Ast) -> GraphRecorder {
    let mut recorder = GraphRecorder::new();
    let _ = index_translation_unit(ast, &mut recorder, IndexOptions::new())
        .expect("indexing should succeed");
    recorder
}

fn nullary_void_fn_type(builder: &mut AstBuilder) -> QualType {
    let void_ty = builder.builtin_type("void");
    let fn_ty = builder.intern_type(TypeKind::FunctionProto {
        result: QualType::unqualified(void_ty),
        params: Vec::new(),
        variadic: false,
    });
    QualType::unqualified(fn_ty)
}

fn function_decl(ty: QualType, is_definition: bool, body: Vec<ExprId>) -> FunctionDecl {
    FunctionDecl {
        params: Vec::new(),
        locals: Vec::new(),
        body,
        ty,
        type_loc: None,
        member_of: None,
        redecls: Vec::new(),
        is_definition,
        template: FunctionTemplateInfo::Plain,
    }
}

#[test]
fn recursive_call_blames_the_definition_and_targets_the_shared_callable() {
    // void f(); void f() { f(); }
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "void f();\nvoid f() { f(); }\n");
    let fn_ty = nullary_void_fn_type(&mut builder);
    let d1 = builder.decl(
        DeclName::Ident("f".to_string()),
        Loc::file(file, 5),
        DeclKind::Function(function_decl(fn_ty, false, Vec::new())),
    );
    let callee_ref = builder.expr(
        ExprKind::DeclRef(DeclRefExpr { decl: d1, loc: Loc::file(file, 21) }),
        SourceRange::in_file(file, 21, 22),
    );
    let call = builder.expr(
        ExprKind::Call(CallExpr {
            callee_decl: Some(d1),
            callee: Some(callee_ref),
            args: Vec::new(),
            rparen_loc: Loc::file(file, 23),
        }),
        SourceRange::in_file(file, 21, 23),
    );
    let d2 = builder.decl(
        DeclName::Ident("f".to_string()),
        Loc::file(file, 15),
        DeclKind::Function(function_decl(fn_ty, true, vec![call])),
    );
    builder.set_redecl_chain(&[d1, d2]);
    builder.add_top_level(d1);
    builder.add_top_level(d2);
    let ast = builder.finish();

    let recorder = index(&ast);

    // Every declaration of f shares one callable node, emitted exactly
    // once, on the first declaration.
    let callable_id = format!("f#n#{}#callable", string_hash("void ()"));
    let callables: Vec<_> = recorder
        .entries()
        .iter()
        .filter(|entry| matches!(entry, GraphEntry::Callable { .. }))
        .collect();
    assert_eq!(callables.len(), 1, "the callable node is emitted once");
    assert!(
        matches!(callables[0], GraphEntry::Callable { id } if id.as_str() == callable_id),
        "unexpected callable id in {callables:?}"
    );

    // The call edge blames the definition and spans `f()`, closing paren
    // included.
    let caller_id = "f#n#D@file:1@15";
    let expected_range = Range::Physical(SourceRange::in_file(file, 21, 24));
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Call { range, caller, callee }
                if *range == expected_range
                    && caller.as_str() == caller_id
                    && callee.as_str() == callable_id
        )),
        "the call should be blamed on the enclosing definition"
    );

    // The definition completes the declaration, uniquely (same file).
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::CompletionRange { node, specificity, .. }
                if node.as_str() == "f#n@file:1@5"
                    && *specificity == Specificity::UniquelyCompletes
        )),
        "the definition should uniquely complete the declaration"
    );

    // One incomplete node for the declaration, one definition node.
    assert!(recorder.entries().iter().any(|entry| matches!(
        entry,
        GraphEntry::Function { id, completeness }
            if id.as_str() == "f#n@file:1@5" && *completeness == Completeness::Incomplete
    )));
    assert!(recorder.entries().iter().any(|entry| matches!(
        entry,
        GraphEntry::Function { id, completeness }
            if id.as_str() == caller_id && *completeness == Completeness::Definition
    )));

    // The reference to f inside the body is a use site.
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::DeclUse { range, node }
                if *range == Range::Physical(SourceRange::in_file(file, 21, 22))
                    && node.as_str() == "f#n@file:1@5"
        )),
        "the callee spelling should be recorded as a use of f"
    );
}

#[test]
fn destructor_definition_range_spans_tilde_and_class_name() {
    // class A { public: ~A(); }; A::~A() {}
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "class A { public: ~A(); }; A::~A() {}\n");
    let fn_ty = nullary_void_fn_type(&mut builder);
    let dtor_decl = builder.decl(
        DeclName::Destructor("A".to_string()),
        Loc::file(file, 18),
        DeclKind::Function(function_decl(fn_ty, false, Vec::new())),
    );
    let a = builder.decl(
        DeclName::Ident("A".to_string()),
        Loc::file(file, 6),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Class,
            members: vec![dtor_decl],
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: None,
            partial_params: None,
        }),
    );
    let dtor_def = builder.decl(
        DeclName::Destructor("A".to_string()),
        Loc::file(file, 30),
        DeclKind::Function(function_decl(fn_ty, true, Vec::new())),
    );
    builder.set_member_of(dtor_decl, a);
    builder.set_member_of(dtor_def, a);
    builder.set_redecl_chain(&[dtor_decl, dtor_def]);
    builder.add_top_level(a);
    builder.add_top_level(dtor_def);
    let ast = builder.finish();

    let recorder = index(&ast);

    // The out-of-line definition is the second top-level child; its name
    // is ordinal-based because destructor names are not identifiers.
    let def_id = "1#n#D@file:1@30";
    let expected_range = Range::Physical(SourceRange::in_file(file, 30, 32));
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::DefinitionRange { range, node }
                if *range == expected_range && node.as_str() == def_id
        )),
        "the destructor's definition range should span `~A`"
    );
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Function { id, completeness }
                if id.as_str() == def_id && *completeness == Completeness::Definition
        )),
        "the out-of-line body is the definition"
    );

    // The in-class declaration hangs off the record.
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::ChildOf { child, parent }
                if child.as_str() == "A:0#n@file:1@18" && parent.as_str().starts_with("A#c")
        )),
        "the destructor should be a child of class A"
    );
}

#[test]
fn parameters_get_variable_nodes_and_param_edges() {
    // void g(int a);
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "void g(int a);\n");
    let void_ty = builder.builtin_type("void");
    let int_ty = builder.builtin_type("int");
    let fn_ty = builder.intern_type(TypeKind::FunctionProto {
        result: QualType::unqualified(void_ty),
        params: vec![QualType::unqualified(int_ty)],
        variadic: false,
    });
    let a = builder.decl(
        DeclName::Ident("a".to_string()),
        Loc::file(file, 11),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(int_ty),
            type_loc: None,
            parameter: true,
            is_definition: false,
        }),
    );
    let mut g_decl = function_decl(QualType::unqualified(fn_ty), false, Vec::new());
    g_decl.params = vec![a];
    let g = builder.decl(
        DeclName::Ident("g".to_string()),
        Loc::file(file, 5),
        DeclKind::Function(g_decl),
    );
    builder.add_top_level(g);
    let ast = builder.finish();

    let recorder = index(&ast);

    let g_id = "g#n@file:1@5";
    let a_id = "g:a#n@file:1@11";
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Variable { name, id, completeness }
                if name == "g:a#n"
                    && id.as_str() == a_id
                    && *completeness == Completeness::Incomplete
        )),
        "the parameter should be an incomplete variable on a declaration"
    );
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Param { param_of, ordinal, param }
                if param_of.as_str() == g_id && *ordinal == 0 && param.as_str() == a_id
        )),
        "the parameter should be the function's parameter 0"
    );
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::TypeEdge { term, ty }
                if term.as_str() == a_id && ty.as_str() == "int#builtin"
        )),
        "the parameter should be typed"
    );
    // The function itself is typed with the fn type constructor.
    let fn_type_id = "fn#builtin(void#builtin,int#builtin)#tapp";
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::TypeEdge { term, ty }
                if term.as_str() == g_id && ty.as_str() == fn_type_id
        )),
        "the function should be typed as fn<void, int>"
    );
}

#[test]
fn call_operator_makes_the_record_callable() {
    // struct F { void operator()(); };
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "struct F { void operator()(); };\n");
    let fn_ty = nullary_void_fn_type(&mut builder);
    let call_op = builder.decl(
        DeclName::Operator(OperatorKind::Call),
        Loc::file(file, 16),
        DeclKind::Function(function_decl(fn_ty, false, Vec::new())),
    );
    let f = builder.decl(
        DeclName::Ident("F".to_string()),
        Loc::file(file, 7),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Struct,
            members: vec![call_op],
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: None,
            partial_params: None,
        }),
    );
    builder.set_member_of(call_op, f);
    builder.add_top_level(f);
    let ast = builder.finish();

    let recorder = index(&ast);

    let callable_id = format!("F:OO#Call#n#{}#callable", string_hash("void ()"));
    let record_callable_as = recorder
        .entries()
        .iter()
        .filter(|entry| matches!(
            entry,
            GraphEntry::CallableAs { to_call, callable_as }
                if to_call.as_str().starts_with("F#c") && callable_as.as_str() == callable_id
        ))
        .count();
    assert_eq!(
        record_callable_as, 1,
        "a record with operator() should be callable as its operator"
    );
}

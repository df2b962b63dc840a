//! Tests for template indexing: abstraction nodes, specialization edges,
//! instantiation contexts, and wraith ranges.

use weft_ast::ast::Ast;
use weft_ast::builder::AstBuilder;
use weft_ast::loc::{Loc, SourceRange};
use weft_ast::nodes::{
    DeclKind,
    DeclName,
    FieldDecl,
    QualType,
    RecordDecl,
    RecordKeyword,
    RecordSpecialization,
    TemplateArg,
    TemplateDecl,
    TemplateParmDecl,
    TypeKind,
    VarDecl,
};
use weft_indexer::hash::{hash_to_string, string_hash};
use weft_indexer::observer::Range;
use weft_indexer::recorder::{GraphEntry, GraphRecorder};
use weft_indexer::walk::{IndexOptions, index_translation_unit};

fn index(ast: &Ast) -> GraphRecorder {
    let mut recorder = GraphRecorder::new();
    let _ = index_translation_unit(ast, &mut recorder, IndexOptions::new())
        .expect("indexing should succeed");
    recorder
}

/// Builds: template<class T> class C { T m; }; C<int> c;
fn class_template_fixture() -> Ast {
    let mut builder = AstBuilder::new();
    let file = builder.add_file("test.cc", "template<class T> class C { T m; }; C<int> c;\n");

    let t_parm = builder.decl(
        DeclName::Ident("T".to_string()),
        Loc::file(file, 15),
        DeclKind::TemplateTypeParm(TemplateParmDecl { depth: 0, index: 0 }),
    );
    let t_ty = builder.intern_type(TypeKind::TemplateTypeParm {
        depth: 0,
        index: 0,
        decl: Some(t_parm),
    });
    let m_loc =
        builder.leaf_type_loc(QualType::unqualified(t_ty), SourceRange::in_file(file, 28, 29));
    let m = builder.decl(
        DeclName::Ident("m".to_string()),
        Loc::file(file, 30),
        DeclKind::Field(FieldDecl { ty: QualType::unqualified(t_ty), type_loc: Some(m_loc) }),
    );
    let pattern = builder.decl(
        DeclName::Ident("C".to_string()),
        Loc::file(file, 24),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Class,
            members: vec![m],
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: None,
            partial_params: None,
        }),
    );
    let template = builder.decl(
        DeclName::Ident("C".to_string()),
        Loc::file(file, 24),
        DeclKind::ClassTemplate(TemplateDecl {
            params: vec![t_parm],
            templated: pattern,
            specializations: Vec::new(),
        }),
    );
    builder.set_described_template(pattern, template);

    let int_ty = builder.builtin_type("int");
    let instantiation = builder.implicit_decl(
        DeclName::Ident("C".to_string()),
        Loc::file(file, 24),
        DeclKind::Record(RecordDecl {
            keyword: RecordKeyword::Class,
            members: Vec::new(),
            redecls: Vec::new(),
            is_definition: true,
            described_template: None,
            injected_class_name: false,
            specialization: Some(RecordSpecialization {
                template,
                args: vec![TemplateArg::Type(QualType::unqualified(int_ty))],
                args_as_written: None,
                implicit: true,
            }),
            partial_params: None,
        }),
    );
    builder.add_specialization(template, instantiation);

    let inst_ty = builder.intern_type(TypeKind::Record(instantiation));
    let c_loc =
        builder.leaf_type_loc(QualType::unqualified(inst_ty), SourceRange::in_file(file, 36, 42));
    let c = builder.decl(
        DeclName::Ident("c".to_string()),
        Loc::file(file, 43),
        DeclKind::Var(VarDecl {
            ty: QualType::unqualified(inst_ty),
            type_loc: Some(c_loc),
            parameter: false,
            is_definition: true,
        }),
    );
    builder.add_top_level(template);
    builder.add_top_level(c);

    builder.finish()
}

const TEMPLATE_ID: &str = "C#c@file:1@24";
const TAPP_ID: &str = "C#c@file:1@24(int#builtin)#tapp";

fn instantiation_id() -> String {
    let args_hash = hash_to_string(string_hash("int"));
    let body_hash = hash_to_string(string_hash("C<int>"));
    format!("C#c#{args_hash}##{body_hash}")
}

#[test]
fn class_template_becomes_an_abstraction_with_one_parameter() {
    let ast = class_template_fixture();
    let recorder = index(&ast);

    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Abs { id } if id.as_str() == TEMPLATE_ID
        )),
        "the class template should be an abstraction node"
    );
    let abs_vars: Vec<_> = recorder
        .entries()
        .iter()
        .filter(|entry| matches!(entry, GraphEntry::AbsVar { .. }))
        .collect();
    assert_eq!(abs_vars.len(), 1, "one template parameter, one abstraction variable");
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Param { param_of, ordinal, param }
                if param_of.as_str() == TEMPLATE_ID
                    && *ordinal == 0
                    && param.as_str() == "T#n#@file:1@15"
        )),
        "T should be parameter 0 of the abstraction"
    );
    // The templated record's body hangs off the abstraction.
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::ChildOf { child, parent }
                if child.as_str().ends_with(".0") && parent.as_str() == TEMPLATE_ID
        )),
        "the record body should be a child of the abstraction"
    );
}

#[test]
fn instantiation_specializes_the_template_application() {
    let ast = class_template_fixture();
    let recorder = index(&ast);

    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::Tapp { tycon, params, .. }
                if tycon.as_str() == TEMPLATE_ID
                    && params.len() == 1
                    && params[0].as_str() == "int#builtin"
        )),
        "the specialized type should be tapp(C, int)"
    );
    let inst_id = instantiation_id();
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::SpecEdge { term, ty }
                if term.as_str() == inst_id && ty.as_str() == TAPP_ID
        )),
        "the instantiation should specialize tapp(C, int)"
    );
}

#[test]
fn variable_of_instantiated_type_points_at_the_application() {
    let ast = class_template_fixture();
    let recorder = index(&ast);

    let c_id = recorder
        .entries()
        .iter()
        .find_map(|entry| match entry {
            GraphEntry::Variable { name, id, .. } if name == "c#n" => Some(id.clone()),
            _ => None,
        })
        .expect("the variable c should be recorded");
    assert!(
        recorder.entries().iter().any(|entry| matches!(
            entry,
            GraphEntry::TypeEdge { term, ty } if *term == c_id && ty.as_str() == TAPP_ID
        )),
        "c should be typed by the template application"
    );
}

#[test]
fn ranges_inside_an_implicit_instantiation_are_wraiths() {
    let ast = class_template_fixture();
    let recorder = index(&ast);

    let inst_id = instantiation_id();
    let wraith = recorder.entries().iter().find_map(|entry| match entry {
        GraphEntry::DefinitionRange { range: Range::Wraith(physical, context), node }
            if node.as_str() == inst_id =>
        {
            Some((*physical, context.clone()))
        }
        _ => None,
    });
    let (physical, context) =
        wraith.expect("the instantiation's definition range should be a wraith");
    assert_eq!(
        context.as_str(),
        inst_id,
        "a wraith range's context is the enclosing instantiation"
    );
    assert!(physical.is_valid(), "the wraith still carries the primary template's text");
}

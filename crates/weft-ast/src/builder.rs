//! Construction of frozen [`Ast`] values.
//!
//! `AstBuilder` is the only way to create an [`Ast`]. It interns structural
//! types so identical structures share one [`TypeId`], computes canonical
//! types as it goes, and offers the handful of back-link mutators
//! (redeclaration chains, described templates, member-of links,
//! specialization lists) that a bottom-up construction cannot express
//! directly.
//!
//! Misusing the builder (wrong declaration kind for a mutator, spelling a
//! composite type with [`AstBuilder::leaf_type_loc`]) is a programming
//! error and panics; a front end that produces such calls is broken.

use rustc_hash::FxHashMap;
use weft_source::types::{FileId, SourceManager};

use crate::ast::Ast;
use crate::loc::{FileLoc, Loc, MacroId, MacroLoc, SourceRange};
use crate::nodes::{
    Decl,
    DeclId,
    DeclKind,
    DeclName,
    Expr,
    ExprId,
    ExprKind,
    NestedNameLoc,
    NnsId,
    QualType,
    TranslationUnitDecl,
    Type,
    TypeId,
    TypeKind,
    TypeLoc,
    TypeLocId,
    TypeLocKind,
};

/// Builder for one translation unit's [`Ast`].
#[derive(Debug)]
pub struct AstBuilder {
    source: SourceManager,
    decls: Vec<Decl>,
    types: Vec<Type>,
    type_locs: Vec<TypeLoc>,
    exprs: Vec<Expr>,
    nested_names: Vec<NestedNameLoc>,
    macro_locs: Vec<MacroLoc>,
    type_interner: FxHashMap<TypeKind, TypeId>,
    root: DeclId,
}

impl AstBuilder {
    /// Creates a new builder with an empty translation-unit root.
    #[must_use]
    pub fn new() -> Self {
        let root = Decl {
            name: DeclName::Anonymous,
            loc: Loc::Invalid,
            implicit: true,
            kind: DeclKind::TranslationUnit(TranslationUnitDecl::default()),
        };
        Self {
            source: SourceManager::new(),
            decls: vec![root],
            types: Vec::new(),
            type_locs: Vec::new(),
            exprs: Vec::new(),
            nested_names: Vec::new(),
            macro_locs: Vec::new(),
            type_interner: FxHashMap::default(),
            root: DeclId::new(0),
        }
    }

    /// Returns the translation-unit root declaration id.
    #[must_use]
    pub const fn root(&self) -> DeclId { self.root }

    /// Registers a source file and returns its id.
    pub fn add_file(&mut self, name: &str, content: &str) -> FileId {
        self.source.add_file(name.to_string(), content.to_string())
    }

    /// Records a macro-expansion location.
    pub fn macro_loc(&mut self, expansion: FileLoc, caller: Loc, from_macro_arg: bool) -> Loc {
        let id = MacroId::new(u32::try_from(self.macro_locs.len()).unwrap_or(u32::MAX));
        self.macro_locs.push(MacroLoc { expansion, caller, from_macro_arg });
        Loc::Macro(id)
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Interns a structural type, computing its canonical type.
    ///
    /// Structurally identical kinds always return the same id.
    pub fn intern_type(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.type_interner.get(&kind) {
            return id;
        }
        let id = TypeId::new(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        drop(self.type_interner.insert(kind.clone(), id));
        self.types.push(Type { kind: kind.clone(), canonical: id });
        let canonical = self.compute_canonical(&kind, id);
        self.types[id.index()].canonical = canonical;
        id
    }

    /// Interns a structural type with an explicitly provided canonical type.
    ///
    /// Front ends use this for template-specialization sugar they have
    /// already resolved to a record, so alias chains collapse exactly where
    /// the compiler collapsed them.
    pub fn intern_type_as(&mut self, kind: TypeKind, canonical: TypeId) -> TypeId {
        if let Some(&id) = self.type_interner.get(&kind) {
            return id;
        }
        let id = TypeId::new(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        drop(self.type_interner.insert(kind.clone(), id));
        self.types.push(Type { kind, canonical });
        id
    }

    /// Interns a builtin type by spelling.
    pub fn builtin_type(&mut self, spelling: &str) -> TypeId {
        self.intern_type(TypeKind::Builtin(spelling.to_string()))
    }

    fn canonical_qual(&self, qt: QualType) -> QualType {
        QualType::new(self.types[qt.ty.index()].canonical, qt.quals)
    }

    fn compute_canonical(&mut self, kind: &TypeKind, self_id: TypeId) -> TypeId {
        match kind {
            TypeKind::Builtin(_)
            | TypeKind::FunctionNoProto
            | TypeKind::Record(_)
            | TypeKind::Enum(_)
            | TypeKind::TemplateTypeParm { .. }
            | TypeKind::TemplateSpecialization { .. }
            | TypeKind::DependentName { .. }
            | TypeKind::Unsupported(_) => self_id,
            TypeKind::Pointer(inner) => {
                let canonical = self.canonical_qual(*inner);
                if canonical == *inner {
                    self_id
                } else {
                    self.intern_type(TypeKind::Pointer(canonical))
                }
            }
            TypeKind::LValueReference(inner) => {
                let canonical = self.canonical_qual(*inner);
                if canonical == *inner {
                    self_id
                } else {
                    self.intern_type(TypeKind::LValueReference(canonical))
                }
            }
            TypeKind::RValueReference(inner) => {
                let canonical = self.canonical_qual(*inner);
                if canonical == *inner {
                    self_id
                } else {
                    self.intern_type(TypeKind::RValueReference(canonical))
                }
            }
            TypeKind::ConstantArray { element, size } => {
                let canonical = self.canonical_qual(*element);
                if canonical == *element {
                    self_id
                } else {
                    self.intern_type(TypeKind::ConstantArray { element: canonical, size: *size })
                }
            }
            TypeKind::FunctionProto { result, params, variadic } => {
                let canonical_result = self.canonical_qual(*result);
                let canonical_params: Vec<QualType> =
                    params.iter().map(|&p| self.canonical_qual(p)).collect();
                if canonical_result == *result && canonical_params == *params {
                    self_id
                } else {
                    self.intern_type(TypeKind::FunctionProto {
                        result: canonical_result,
                        params: canonical_params,
                        variadic: *variadic,
                    })
                }
            }
            TypeKind::Paren(inner)
            | TypeKind::Elaborated(inner)
            | TypeKind::SubstTemplateTypeParm { replacement: inner } => {
                self.types[inner.ty.index()].canonical
            }
            TypeKind::Typedef(decl) => {
                let underlying = match &self.decls[decl.index()].kind {
                    DeclKind::Typedef(td) => self.type_locs[td.underlying.index()].ty,
                    _ => panic!("typedef type must reference a typedef declaration"),
                };
                self.types[underlying.ty.index()].canonical
            }
            TypeKind::InjectedClassName(decl) => self.intern_type(TypeKind::Record(*decl)),
        }
    }

    /// Records a type spelling.
    pub fn type_loc(&mut self, ty: QualType, range: SourceRange, kind: TypeLocKind) -> TypeLocId {
        let id = TypeLocId::new(u32::try_from(self.type_locs.len()).unwrap_or(u32::MAX));
        self.type_locs.push(TypeLoc { ty, range, kind });
        id
    }

    /// Records a leaf type spelling, deriving the spelling kind from the
    /// type's structure.
    ///
    /// ## Panics
    ///
    /// Panics if the type is not a leaf in the spelling tree (pointers,
    /// functions and other composites need explicit child spellings).
    pub fn leaf_type_loc(&mut self, ty: QualType, range: SourceRange) -> TypeLocId {
        let kind = match &self.types[ty.ty.index()].kind {
            TypeKind::Builtin(_) => TypeLocKind::Builtin,
            TypeKind::Typedef(_) => TypeLocKind::Typedef,
            TypeKind::Record(_) => TypeLocKind::Record,
            TypeKind::Enum(_) => TypeLocKind::Enum,
            TypeKind::InjectedClassName(_) => TypeLocKind::InjectedClassName,
            TypeKind::TemplateTypeParm { .. } => TypeLocKind::TemplateTypeParm,
            TypeKind::SubstTemplateTypeParm { .. } => TypeLocKind::SubstTemplateTypeParm,
            TypeKind::FunctionNoProto => TypeLocKind::FunctionNoProto,
            TypeKind::Unsupported(_) => TypeLocKind::Unsupported,
            other => panic!("leaf_type_loc cannot spell composite type {other:?}"),
        };
        self.type_loc(ty, range, kind)
    }

    // ------------------------------------------------------------------
    // Expressions and nested names
    // ------------------------------------------------------------------

    /// Records an expression.
    pub fn expr(&mut self, kind: ExprKind, range: SourceRange) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(Expr { kind, range });
        id
    }

    /// Records a nested-name-specifier chain.
    pub fn nested_name(&mut self, chain: NestedNameLoc) -> NnsId {
        let id = NnsId::new(u32::try_from(self.nested_names.len()).unwrap_or(u32::MAX));
        self.nested_names.push(chain);
        id
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Records a declaration written in source.
    pub fn decl(&mut self, name: DeclName, loc: Loc, kind: DeclKind) -> DeclId {
        self.push_decl(Decl { name, loc, implicit: false, kind })
    }

    /// Records a compiler-produced declaration.
    pub fn implicit_decl(&mut self, name: DeclName, loc: Loc, kind: DeclKind) -> DeclId {
        self.push_decl(Decl { name, loc, implicit: true, kind })
    }

    fn push_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(u32::try_from(self.decls.len()).unwrap_or(u32::MAX));
        self.decls.push(decl);
        id
    }

    /// Appends a declaration to the translation unit's top level.
    pub fn add_top_level(&mut self, decl: DeclId) {
        match &mut self.decls[self.root.index()].kind {
            DeclKind::TranslationUnit(tu) => tu.decls.push(decl),
            _ => unreachable!("root declaration is always a translation unit"),
        }
    }

    /// Sets the redeclaration chain on every member of the chain.
    ///
    /// ## Panics
    ///
    /// Panics if a member of the chain cannot carry a redeclaration chain.
    pub fn set_redecl_chain(&mut self, chain: &[DeclId]) {
        for &decl in chain {
            match &mut self.decls[decl.index()].kind {
                DeclKind::Record(record) => record.redecls = chain.to_vec(),
                DeclKind::Enum(e) => e.redecls = chain.to_vec(),
                DeclKind::Function(func) => func.redecls = chain.to_vec(),
                other => panic!("declaration kind {other:?} has no redeclaration chain"),
            }
        }
    }

    /// Links a record to the class template it is the pattern of.
    ///
    /// ## Panics
    ///
    /// Panics if `record` is not a record declaration.
    pub fn set_described_template(&mut self, record: DeclId, template: DeclId) {
        match &mut self.decls[record.index()].kind {
            DeclKind::Record(r) => r.described_template = Some(template),
            other => panic!("set_described_template requires a record, got {other:?}"),
        }
    }

    /// Links a method to the record it is a member of.
    ///
    /// ## Panics
    ///
    /// Panics if `func` is not a function declaration.
    pub fn set_member_of(&mut self, func: DeclId, record: DeclId) {
        match &mut self.decls[func.index()].kind {
            DeclKind::Function(f) => f.member_of = Some(record),
            other => panic!("set_member_of requires a function, got {other:?}"),
        }
    }

    /// Appends a specialization to a template's specialization list.
    ///
    /// ## Panics
    ///
    /// Panics if `template` is not a template declaration.
    pub fn add_specialization(&mut self, template: DeclId, specialization: DeclId) {
        match &mut self.decls[template.index()].kind {
            DeclKind::ClassTemplate(t)
            | DeclKind::FunctionTemplate(t)
            | DeclKind::VarTemplate(t) => t.specializations.push(specialization),
            other => panic!("add_specialization requires a template, got {other:?}"),
        }
    }

    /// Freezes the builder into an [`Ast`].
    ///
    /// Tag types for every record and enum are interned here so the indexer
    /// can lower template names without mutating the tree.
    #[must_use]
    pub fn finish(mut self) -> Ast {
        let mut tag_types = FxHashMap::default();
        for index in 0..self.decls.len() {
            let id = DeclId::new(u32::try_from(index).unwrap_or(u32::MAX));
            let ty = match &self.decls[index].kind {
                DeclKind::Record(_) => Some(self.intern_type(TypeKind::Record(id))),
                DeclKind::Enum(_) => Some(self.intern_type(TypeKind::Enum(id))),
                _ => None,
            };
            if let Some(ty) = ty {
                drop(tag_types.insert(id, ty));
            }
        }
        Ast {
            source: self.source,
            decls: self.decls,
            types: self.types,
            type_locs: self.type_locs,
            exprs: self.exprs,
            nested_names: self.nested_names,
            macro_locs: self.macro_locs,
            tag_types,
            root: self.root,
        }
    }
}

impl Default for AstBuilder {
    fn default() -> Self { Self::new() }
}

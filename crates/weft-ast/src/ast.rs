//! The frozen AST for one translation unit.
//!
//! An [`Ast`] owns every arena plus the [`SourceManager`] for the files the
//! translation unit was compiled from. It is immutable once built; the
//! indexer holds a shared borrow for the duration of one traversal.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use weft_source::types::SourceManager;

use crate::lexer::{self, RawToken, TokenKind};
use crate::loc::{FileLoc, Loc, MacroId, MacroLoc};
use crate::nodes::{
    Decl,
    DeclId,
    DeclKind,
    Expr,
    ExprId,
    NestedNameLoc,
    NnsId,
    QualType,
    TemplateArg,
    TemplateName,
    Type,
    TypeId,
    TypeKind,
    TypeLoc,
    TypeLocId,
};

/// The frozen, fully-resolved AST of one translation unit.
#[derive(Debug)]
pub struct Ast {
    pub(crate) source: SourceManager,
    pub(crate) decls: Vec<Decl>,
    pub(crate) types: Vec<Type>,
    pub(crate) type_locs: Vec<TypeLoc>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) nested_names: Vec<NestedNameLoc>,
    pub(crate) macro_locs: Vec<MacroLoc>,
    pub(crate) tag_types: FxHashMap<DeclId, TypeId>,
    pub(crate) root: DeclId,
}

impl Ast {
    /// Returns the translation-unit root declaration.
    #[must_use]
    pub const fn root(&self) -> DeclId { self.root }

    /// Returns the source manager for this translation unit.
    #[must_use]
    pub const fn source_manager(&self) -> &SourceManager { &self.source }

    /// Returns the declaration with the given id.
    ///
    /// ## Panics
    ///
    /// Panics if the id does not belong to this AST.
    #[must_use]
    pub fn decl(&self, id: DeclId) -> &Decl { &self.decls[id.index()] }

    /// Returns the type with the given id.
    ///
    /// ## Panics
    ///
    /// Panics if the id does not belong to this AST.
    #[must_use]
    pub fn ty(&self, id: TypeId) -> &Type { &self.types[id.index()] }

    /// Returns the type spelling with the given id.
    ///
    /// ## Panics
    ///
    /// Panics if the id does not belong to this AST.
    #[must_use]
    pub fn type_loc(&self, id: TypeLocId) -> &TypeLoc { &self.type_locs[id.index()] }

    /// Returns the expression with the given id.
    ///
    /// ## Panics
    ///
    /// Panics if the id does not belong to this AST.
    #[must_use]
    pub fn expr(&self, id: ExprId) -> &Expr { &self.exprs[id.index()] }

    /// Returns the nested-name-specifier chain with the given id.
    ///
    /// ## Panics
    ///
    /// Panics if the id does not belong to this AST.
    #[must_use]
    pub fn nested_name(&self, id: NnsId) -> &NestedNameLoc { &self.nested_names[id.index()] }

    /// Returns the macro-expansion record with the given id.
    ///
    /// ## Panics
    ///
    /// Panics if the id does not belong to this AST.
    #[must_use]
    pub fn macro_loc(&self, id: MacroId) -> &MacroLoc { &self.macro_locs[id.index()] }

    /// Returns the number of declarations in this AST.
    #[must_use]
    pub const fn decl_count(&self) -> usize { self.decls.len() }

    // ------------------------------------------------------------------
    // Declaration queries
    // ------------------------------------------------------------------

    /// Returns the children of a declaration, in traversal order.
    ///
    /// This is the order the parent index assigns child ordinals in, so it
    /// must stay stable for a given tree.
    #[must_use]
    pub fn decl_children(&self, id: DeclId) -> Vec<DeclId> {
        match &self.decl(id).kind {
            DeclKind::TranslationUnit(tu) => tu.decls.clone(),
            DeclKind::Namespace(ns) => ns.decls.clone(),
            DeclKind::Record(record) => {
                let mut children = Vec::new();
                if let Some(params) = &record.partial_params {
                    children.extend_from_slice(params);
                }
                children.extend_from_slice(&record.members);
                children
            }
            DeclKind::Enum(decl) => decl.enumerators.clone(),
            DeclKind::Function(func) => {
                let mut children = func.params.clone();
                children.extend_from_slice(&func.locals);
                children
            }
            DeclKind::ClassTemplate(t) | DeclKind::FunctionTemplate(t) => {
                let mut children = t.params.clone();
                children.push(t.templated);
                children.extend_from_slice(&t.specializations);
                children
            }
            DeclKind::VarTemplate(t) => {
                let mut children = t.params.clone();
                children.push(t.templated);
                children
            }
            DeclKind::TemplateTemplateParm(parm) => parm.params.clone(),
            DeclKind::EnumConstant(_)
            | DeclKind::Field(_)
            | DeclKind::Var(_)
            | DeclKind::Typedef(_)
            | DeclKind::TemplateTypeParm(_)
            | DeclKind::NonTypeTemplateParm(_) => Vec::new(),
        }
    }

    /// Returns the redeclaration chain of a declaration, in declaration
    /// order. Empty for declarations without a recorded chain.
    #[must_use]
    pub fn redecls(&self, id: DeclId) -> &[DeclId] {
        match &self.decl(id).kind {
            DeclKind::Record(record) => &record.redecls,
            DeclKind::Enum(decl) => &decl.redecls,
            DeclKind::Function(func) => &func.redecls,
            _ => &[],
        }
    }

    /// Returns true if the given declaration is a definition.
    #[must_use]
    pub fn is_definition(&self, id: DeclId) -> bool {
        match &self.decl(id).kind {
            DeclKind::Record(record) => record.is_definition,
            DeclKind::Enum(decl) => decl.is_definition,
            DeclKind::Function(func) => func.is_definition,
            DeclKind::Var(var) => var.is_definition,
            _ => false,
        }
    }

    /// Returns the defining declaration in `id`'s redeclaration chain, if
    /// one exists.
    #[must_use]
    pub fn definition_of(&self, id: DeclId) -> Option<DeclId> {
        let chain = self.redecls(id);
        if chain.is_empty() {
            return self.is_definition(id).then_some(id);
        }
        chain.iter().copied().find(|&redecl| self.is_definition(redecl))
    }

    /// Returns true if `id` is the first declaration in its chain.
    #[must_use]
    pub fn is_first_decl(&self, id: DeclId) -> bool {
        self.redecls(id).first().is_none_or(|&first| first == id)
    }

    /// Returns the class template described by this record, if any.
    #[must_use]
    pub fn described_template(&self, id: DeclId) -> Option<DeclId> {
        match &self.decl(id).kind {
            DeclKind::Record(record) => record.described_template,
            DeclKind::Function(func) => match &func.template {
                crate::nodes::FunctionTemplateInfo::DescribedTemplate(t) => Some(*t),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the template parameter list of a template-like declaration.
    #[must_use]
    pub fn template_params(&self, id: DeclId) -> Option<&[DeclId]> {
        match &self.decl(id).kind {
            DeclKind::ClassTemplate(t) | DeclKind::FunctionTemplate(t) | DeclKind::VarTemplate(t) => {
                Some(&t.params)
            }
            DeclKind::TemplateTemplateParm(parm) => Some(&parm.params),
            _ => None,
        }
    }

    /// Returns the interned tag type for a record or enum declaration.
    #[must_use]
    pub fn tag_type(&self, id: DeclId) -> Option<QualType> {
        self.tag_types.get(&id).map(|&ty| QualType::unqualified(ty))
    }

    // ------------------------------------------------------------------
    // Location queries
    // ------------------------------------------------------------------

    /// Returns the caller-visible file location for `loc`.
    ///
    /// File locations are their own answer; macro locations answer with the
    /// location of the expansion point in the file.
    #[must_use]
    pub fn file_loc(&self, loc: Loc) -> Option<FileLoc> {
        match loc {
            Loc::Invalid => None,
            Loc::File(fl) => Some(fl),
            Loc::Macro(id) => Some(self.macro_loc(id).expansion),
        }
    }

    /// Returns true if `loc` is a macro-argument expansion.
    #[must_use]
    pub fn is_macro_arg_expansion(&self, loc: Loc) -> bool {
        match loc {
            Loc::Macro(id) => self.macro_loc(id).from_macro_arg,
            _ => false,
        }
    }

    /// Returns the immediate macro caller of a macro location.
    #[must_use]
    pub fn immediate_macro_caller(&self, loc: Loc) -> Loc {
        match loc {
            Loc::Macro(id) => self.macro_loc(id).caller,
            _ => loc,
        }
    }

    /// Returns true if `loc` is a top-level macro argument that is not
    /// itself expanded from a macro.
    ///
    /// Climbs the macro-argument-expansion chain; if the terminal location
    /// is a file location, the argument itself was plain source text and
    /// can be anchored to it.
    #[must_use]
    pub fn is_top_level_non_macro_macro_arg(&self, loc: Loc) -> bool {
        if !loc.is_macro() {
            return false;
        }
        let mut current = loc;
        while self.is_macro_arg_expansion(current) {
            current = self.immediate_macro_caller(current);
        }
        !current.is_macro()
    }

    // ------------------------------------------------------------------
    // Raw lexing
    // ------------------------------------------------------------------

    /// Lexes the raw token at a file location.
    #[must_use]
    pub fn raw_token_at(&self, loc: FileLoc) -> Option<RawToken> {
        let file = self.source.get_file(loc.file)?;
        lexer::raw_token_at(&file.content, loc.offset)
    }

    /// Returns the spelling of a raw token lexed from the given file.
    #[must_use]
    pub fn token_spelling(&self, loc: FileLoc, token: &RawToken) -> Option<&str> {
        let file = self.source.get_file(loc.file)?;
        Some(token.spelling(&file.content))
    }

    /// Returns the canonical kind of a raw token, resolving alternate
    /// spellings through the identifier table.
    #[must_use]
    pub fn canonical_token_kind(&self, loc: FileLoc, token: &RawToken) -> TokenKind {
        match self.source.get_file(loc.file) {
            Some(file) => lexer::canonical_kind(token, &file.content),
            None => token.kind,
        }
    }

    /// Returns the end location of the token starting at `loc`, or
    /// [`Loc::Invalid`] if nothing could be lexed there.
    #[must_use]
    pub fn end_of_token(&self, loc: Loc) -> Loc {
        let Some(fl) = loc.as_file() else { return Loc::Invalid };
        match self.source.get_file(fl.file).and_then(|f| lexer::end_of_token(&f.content, fl.offset))
        {
            Some(end) => Loc::file(fl.file, end),
            None => Loc::Invalid,
        }
    }

    /// Renders the printable form of a location for identity signatures.
    ///
    /// Macro locations render as their caller-visible file location;
    /// invalid locations render as `invalid`.
    #[must_use]
    pub fn display_location(&self, loc: Loc) -> String {
        match self.file_loc(loc) {
            Some(fl) => self.source.display_location(fl.file, fl.offset),
            None => "invalid".to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Canonical type spelling
    // ------------------------------------------------------------------

    /// Returns the canonical spelling of a type.
    ///
    /// The spelling fully desugars aliases, parens, elaboration and
    /// substituted parameters. It is deterministic for a given AST and is
    /// the input to the semantic type hash, so its exact shape matters less
    /// than its stability.
    #[must_use]
    pub fn type_spelling(&self, qt: QualType) -> String {
        let mut out = String::new();
        self.spell_type(qt, &mut out);
        out
    }

    fn spell_type(&self, qt: QualType, out: &mut String) {
        use crate::nodes::Qualifiers;

        if qt.quals.contains(Qualifiers::CONST) {
            out.push_str("const ");
        }
        if qt.quals.contains(Qualifiers::VOLATILE) {
            out.push_str("volatile ");
        }
        if qt.quals.contains(Qualifiers::RESTRICT) {
            out.push_str("restrict ");
        }
        match &self.ty(qt.ty).kind {
            TypeKind::Builtin(spelling) => out.push_str(spelling),
            TypeKind::Pointer(inner) => {
                self.spell_type(*inner, out);
                out.push('*');
            }
            TypeKind::LValueReference(inner) => {
                self.spell_type(*inner, out);
                out.push('&');
            }
            TypeKind::RValueReference(inner) => {
                self.spell_type(*inner, out);
                out.push_str("&&");
            }
            TypeKind::ConstantArray { element, size } => {
                self.spell_type(*element, out);
                let _ = write!(out, "[{size}]");
            }
            TypeKind::FunctionProto { result, params, variadic } => {
                self.spell_type(*result, out);
                out.push_str(" (");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.spell_type(*param, out);
                }
                if *variadic {
                    if !params.is_empty() {
                        out.push_str(", ");
                    }
                    out.push_str("...");
                }
                out.push(')');
            }
            TypeKind::FunctionNoProto => out.push_str("()"),
            TypeKind::Paren(inner) | TypeKind::Elaborated(inner) => self.spell_type(*inner, out),
            TypeKind::Typedef(decl) => match &self.decl(*decl).kind {
                DeclKind::Typedef(td) => {
                    self.spell_type(self.type_loc(td.underlying).ty, out);
                }
                _ => out.push_str("<malformed alias>"),
            },
            TypeKind::Record(decl) | TypeKind::InjectedClassName(decl) => {
                self.spell_tag(*decl, out);
            }
            TypeKind::Enum(decl) => self.spell_tag(*decl, out),
            TypeKind::TemplateTypeParm { depth, index, .. } => {
                let _ = write!(out, "type-parameter-{depth}-{index}");
            }
            TypeKind::SubstTemplateTypeParm { replacement } => self.spell_type(*replacement, out),
            TypeKind::TemplateSpecialization { template, args } => {
                self.spell_template_name(*template, out);
                self.spell_template_args(args, out);
            }
            TypeKind::DependentName { ident, .. } => {
                let _ = write!(out, "typename {ident}");
            }
            TypeKind::Unsupported(kind) => out.push_str(kind.name()),
        }
    }

    fn spell_tag(&self, decl: DeclId, out: &mut String) {
        out.push_str(&self.decl(decl).name.as_string());
        if let DeclKind::Record(record) = &self.decl(decl).kind
            && let Some(spec) = &record.specialization
        {
            self.spell_template_args(&spec.args, out);
        }
    }

    fn spell_template_name(&self, name: TemplateName, out: &mut String) {
        match name {
            TemplateName::Template(decl) => out.push_str(&self.decl(decl).name.as_string()),
            other => out.push_str(other.kind_name()),
        }
    }

    fn spell_template_args(&self, args: &[TemplateArg], out: &mut String) {
        out.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match arg {
                TemplateArg::Type(qt) => self.spell_type(*qt, out),
                TemplateArg::Integral(value) => {
                    let _ = write!(out, "{value}");
                }
                TemplateArg::Template(name) => self.spell_template_name(*name, out),
                other => out.push_str(other.kind_name()),
            }
        }
        out.push('>');
    }
}

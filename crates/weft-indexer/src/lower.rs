//! Type lowering: from type occurrences to graph type nodes.
//!
//! Lowering is a memoised recursion over the structure of a type, walked in
//! lockstep with the spelling tree of the occurrence when one exists. The
//! result of each lowering is cached under a [`TypeKey`]; a cache hit
//! replays only the spelling-location emission for the new occurrence, so
//! the id handed back for a type never depends on where in the traversal it
//! was first reached.
//!
//! A lowering can produce nothing: under the ignore-unimplemented policy
//! an unsupported construct yields [`MaybeFew::None`] and the caller
//! proceeds without the type edge. The graph stays well-formed, just
//! partial.

use weft_ast::loc::{Loc, SourceRange};
use weft_ast::nodes::{
    DeclKind,
    NnsId,
    NnsSegmentKind,
    QualType,
    Qualifiers,
    TemplateArg,
    TemplateArgLoc,
    TemplateName,
    TypeId,
    TypeKind,
    TypeLocId,
    TypeLocKind,
};

use crate::error::IndexError;
use crate::observer::{GraphObserver, NodeId};
use crate::walk::Indexer;

/// Whether a lowering should emit spelling-location edges for the ranges
/// it walks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitRanges {
    /// Emit spelling locations.
    Yes,
    /// Lower silently.
    No,
}

/// Cache key for a lowered type.
///
/// The key is the interned type id plus the occurrence's local CVR bits;
/// template-specialization sugar keys on its canonical type so alias
/// chains collapse exactly where the AST canonicalised them. Keys are
/// meaningful only for the AST that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    ty: TypeId,
    quals: u8,
}

/// Zero, one, or several ids, with a distinguished primary.
///
/// A lowering may want to say "this type is its alias form, and also its
/// canonical form". Only the primary participates in structural
/// composition; alternates ride along and surface as additional edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaybeFew<T> {
    /// No result.
    None,
    /// Exactly one result.
    One(T),
    /// A primary result plus alternates.
    Few(T, Vec<T>),
}

impl<T> MaybeFew<T> {
    /// Returns the primary result, if any.
    #[must_use]
    pub const fn primary(&self) -> Option<&T> {
        match self {
            Self::None => None,
            Self::One(primary) | Self::Few(primary, _) => Some(primary),
        }
    }

    /// Returns true if there is no result.
    #[must_use]
    pub const fn is_none(&self) -> bool { matches!(self, Self::None) }

    /// Maps every contained value, preserving the alternates list.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> MaybeFew<U> {
        match self {
            Self::None => MaybeFew::None,
            Self::One(primary) => MaybeFew::One(f(primary)),
            Self::Few(primary, alternates) => {
                MaybeFew::Few(f(primary), alternates.into_iter().map(f).collect())
            }
        }
    }

    /// Calls `f` on every contained value, primary first.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        match self {
            Self::None => {}
            Self::One(primary) => f(primary),
            Self::Few(primary, alternates) => {
                f(primary);
                for alternate in alternates {
                    f(alternate);
                }
            }
        }
    }
}

impl<O: GraphObserver> Indexer<'_, '_, O> {
    /// Lowers a spelled type occurrence.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::Unimplemented`] only when the
    /// ignore-unimplemented policy is off.
    pub fn build_node_id_for_type_loc(
        &mut self,
        type_loc: TypeLocId,
        emit_ranges: EmitRanges,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        let ty = self.ast.type_loc(type_loc).ty;
        self.lower_type(ty, Some(type_loc), emit_ranges)
    }

    /// Lowers a type with no spelling, emitting no ranges.
    ///
    /// ## Errors
    ///
    /// See [`Self::build_node_id_for_type_loc`].
    pub fn build_node_id_for_qual_type(
        &mut self,
        ty: QualType,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        self.lower_type(ty, None, EmitRanges::No)
    }

    fn type_key(&self, ty: QualType) -> TypeKey {
        // Don't collapse aliases if we can help it; template-specialization
        // sugar is the exception, keyed canonically.
        let key_ty = match &self.ast.ty(ty.ty).kind {
            TypeKind::TemplateSpecialization { .. } => self.ast.ty(ty.ty).canonical,
            _ => ty.ty,
        };
        TypeKey { ty: key_ty, quals: ty.quals.bits() }
    }

    /// Widens an empty span to the token at its start, then emits one
    /// spelling location per produced id.
    fn emit_spelling(
        &mut self,
        range: &mut SourceRange,
        emit_ranges: EmitRanges,
        ids: &MaybeFew<NodeId>,
    ) {
        if !range.is_valid() || !range.begin.is_file() {
            return;
        }
        if range.is_empty() {
            *range = self.resolver.range_for_entity_at(range.begin);
        }
        if emit_ranges == EmitRanges::Yes {
            let context_range = self.range_in_current_context(*range);
            let mut spelled = Vec::new();
            ids.for_each(|id| spelled.push(id.clone()));
            for id in spelled {
                self.observer.record_type_spelling_location(&context_range, &id);
            }
        }
    }

    /// Extends a file range through the token at `token_loc`.
    fn extend_through_token(&self, range: &mut SourceRange, token_loc: Loc) {
        if range.is_valid()
            && range.begin.is_file()
            && let end @ Loc::File(_) = self.ast.end_of_token(token_loc)
        {
            range.end = end;
        }
    }

    /// Wraps every id in `param` in an application of a builtin type
    /// constructor.
    fn apply_builtin_type_constructor(
        &mut self,
        constructor: &str,
        param: MaybeFew<NodeId>,
    ) -> MaybeFew<NodeId> {
        let tycon = self.observer.node_id_for_builtin_type(constructor);
        param.map(|id| self.observer.record_tapp_node(&tycon, std::slice::from_ref(&id)))
    }

    fn lower_type(
        &mut self,
        ty: QualType,
        loc: Option<TypeLocId>,
        emit_ranges: EmitRanges,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        let ast = self.ast;
        let mut emit_ranges = emit_ranges;
        let mut range = loc.map_or_else(SourceRange::invalid, |l| ast.type_loc(l).range);

        let key = self.type_key(ty);
        if let Some(cached) = self.type_nodes.get(&key) {
            // The type node exists already; only the new occurrence's
            // spelling is still missing.
            let cached = cached.clone();
            self.emit_spelling(&mut range, emit_ranges, &cached);
            return Ok(cached);
        }

        let loc_kind = loc.map(|l| &ast.type_loc(l).kind);

        let ids: MaybeFew<NodeId> = if !ty.quals.is_empty() {
            // Lower the unqualified type, then wrap one constructor per
            // local qualifier bit.
            let mut ids = self.lower_type(ty.without_quals(), loc, emit_ranges)?;
            if ty.quals.contains(Qualifiers::CONST) {
                ids = self.apply_builtin_type_constructor("const", ids);
            }
            if ty.quals.contains(Qualifiers::RESTRICT) {
                ids = self.apply_builtin_type_constructor("restrict", ids);
            }
            if ty.quals.contains(Qualifiers::VOLATILE) {
                ids = self.apply_builtin_type_constructor("volatile", ids);
            }
            ids
        } else {
            match &ast.ty(ty.ty).kind {
                TypeKind::Builtin(spelling) => {
                    MaybeFew::One(self.observer.node_id_for_builtin_type(spelling))
                }
                TypeKind::Pointer(pointee) => {
                    let (child, star_loc) = match loc_kind {
                        Some(TypeLocKind::Pointer { pointee, star_loc }) => {
                            (Some(*pointee), *star_loc)
                        }
                        _ => (None, Loc::Invalid),
                    };
                    let pointee_ids = self.lower_type(*pointee, child, emit_ranges)?;
                    if pointee_ids.is_none() {
                        return Ok(pointee_ids);
                    }
                    self.extend_through_token(&mut range, star_loc);
                    self.apply_builtin_type_constructor("ptr", pointee_ids)
                }
                TypeKind::LValueReference(referent) => {
                    let (child, amp_loc) = match loc_kind {
                        Some(TypeLocKind::LValueReference { referent, amp_loc }) => {
                            (Some(*referent), *amp_loc)
                        }
                        _ => (None, Loc::Invalid),
                    };
                    let referent_ids = self.lower_type(*referent, child, emit_ranges)?;
                    if referent_ids.is_none() {
                        return Ok(referent_ids);
                    }
                    self.extend_through_token(&mut range, amp_loc);
                    self.apply_builtin_type_constructor("lvr", referent_ids)
                }
                TypeKind::RValueReference(referent) => {
                    let (child, amp_loc) = match loc_kind {
                        Some(TypeLocKind::RValueReference { referent, amp_loc }) => {
                            (Some(*referent), *amp_loc)
                        }
                        _ => (None, Loc::Invalid),
                    };
                    let referent_ids = self.lower_type(*referent, child, emit_ranges)?;
                    if referent_ids.is_none() {
                        return Ok(referent_ids);
                    }
                    self.extend_through_token(&mut range, amp_loc);
                    self.apply_builtin_type_constructor("rvr", referent_ids)
                }
                TypeKind::ConstantArray { element, .. } => {
                    // The size expression is not part of the type identity.
                    let child = match loc_kind {
                        Some(TypeLocKind::ConstantArray { element }) => Some(*element),
                        _ => None,
                    };
                    let element_ids = self.lower_type(*element, child, emit_ranges)?;
                    if element_ids.is_none() {
                        return Ok(element_ids);
                    }
                    self.apply_builtin_type_constructor("carr", element_ids)
                }
                TypeKind::FunctionProto { result, params, variadic } => {
                    let (result_loc, param_locs) = match loc_kind {
                        Some(TypeLocKind::FunctionProto { result, params }) => {
                            (Some(*result), Some(params))
                        }
                        _ => (None, None),
                    };
                    let result_ids = self.lower_type(*result, result_loc, emit_ranges)?;
                    let Some(result_id) = result_ids.primary() else {
                        return Ok(MaybeFew::None);
                    };
                    let mut operand_ids = vec![result_id.clone()];
                    for (ordinal, param) in params.iter().enumerate() {
                        let child = param_locs.and_then(|locs| locs.get(ordinal).copied());
                        let param_ids = self.lower_type(*param, child, emit_ranges)?;
                        let Some(param_id) = param_ids.primary() else {
                            return Ok(MaybeFew::None);
                        };
                        operand_ids.push(param_id.clone());
                    }
                    let constructor = if *variadic { "fnvararg" } else { "fn" };
                    let tycon = self.observer.node_id_for_builtin_type(constructor);
                    MaybeFew::One(self.observer.record_tapp_node(&tycon, &operand_ids))
                }
                TypeKind::FunctionNoProto => {
                    MaybeFew::One(self.observer.node_id_for_builtin_type("knrfn"))
                }
                TypeKind::Paren(inner) => {
                    let child = match loc_kind {
                        Some(TypeLocKind::Paren { inner }) => Some(*inner),
                        _ => None,
                    };
                    let ids = self.lower_type(*inner, child, emit_ranges)?;
                    // The inner occurrence has spelled itself; a second
                    // spelling for the parens would be a duplicate.
                    emit_ranges = EmitRanges::No;
                    ids
                }
                TypeKind::Typedef(decl) => {
                    let underlying = match &ast.decl(*decl).kind {
                        DeclKind::Typedef(td) => td.underlying,
                        other => unreachable!("typedef type names non-typedef {other:?}"),
                    };
                    let aliased =
                        self.build_node_id_for_type_loc(underlying, EmitRanges::No)?;
                    let Some(aliased_id) = aliased.primary() else {
                        return Ok(MaybeFew::None);
                    };
                    let aliased_id = aliased_id.clone();
                    let name = self.build_name_id_for_decl(*decl);
                    MaybeFew::One(self.observer.record_type_alias_node(&name, &aliased_id))
                }
                TypeKind::Record(decl) => {
                    let record = match &ast.decl(*decl).kind {
                        DeclKind::Record(record) => record,
                        other => unreachable!("record type names non-record {other:?}"),
                    };
                    if let Some(spec) = &record.specialization {
                        // Non-dependent specializations appear as these
                        // declarations directly, not as specialization
                        // sugar.
                        let Some(args) =
                            self.lower_template_args(&spec.args, ast.decl(*decl).loc)?
                        else {
                            return Ok(MaybeFew::None);
                        };
                        match self.node_id_for_specialized_template(spec.template)? {
                            Some(template_name) => MaybeFew::One(
                                self.observer.record_tapp_node(&template_name, &args),
                            ),
                            None => return Ok(MaybeFew::None),
                        }
                    } else if let Some(definition) = ast.definition_of(*decl) {
                        // Link to the definition in place of a nominal
                        // node; for a templated record, to the binder.
                        match ast.described_template(definition) {
                            Some(template) => {
                                MaybeFew::One(self.build_node_id_for_decl(template))
                            }
                            None => MaybeFew::One(self.build_node_id_for_decl(definition)),
                        }
                    } else {
                        let name = self.build_name_id_for_decl(*decl);
                        MaybeFew::One(self.observer.record_nominal_type_node(&name))
                    }
                }
                TypeKind::Enum(decl) => match ast.definition_of(*decl) {
                    Some(definition) => MaybeFew::One(self.build_node_id_for_decl(definition)),
                    None => {
                        let name = self.build_name_id_for_decl(*decl);
                        MaybeFew::One(self.observer.record_nominal_type_node(&name))
                    }
                },
                TypeKind::Elaborated(named) => {
                    // The elaboration is transparent; the surrounding span
                    // still covers the whole `struct S` / `N::T` spelling.
                    let child = match loc_kind {
                        Some(TypeLocKind::Elaborated { named }) => Some(*named),
                        _ => None,
                    };
                    self.lower_type(*named, child, emit_ranges)?
                }
                TypeKind::TemplateTypeParm { depth, index, decl } => {
                    // Either the parameter links straight to its
                    // declaration or (after canonicalisation) we find it
                    // in the type context by depth and index.
                    let context_entry = self
                        .type_context
                        .get(*depth as usize)
                        .and_then(|params| params.get(*index as usize))
                        .copied();
                    if self.options.ignore_unimplemented {
                        match decl.or(context_entry) {
                            Some(parm) => MaybeFew::One(self.build_node_id_for_decl(parm)),
                            None => {
                                return self
                                    .unimplemented_none("TemplateTypeParm without declaration");
                            }
                        }
                    } else {
                        // A parameter missing from the context is a broken
                        // tree, not an unimplemented construct.
                        let Some(parm) = context_entry else {
                            unreachable!(
                                "declaration for type parameter {depth}/{index} missing from the type context"
                            )
                        };
                        debug_assert!(
                            decl.is_none() || *decl == Some(parm),
                            "type context disagrees with the parameter's declaration"
                        );
                        MaybeFew::One(self.build_node_id_for_decl(parm))
                    }
                }
                TypeKind::SubstTemplateTypeParm { replacement } => {
                    self.lower_type(*replacement, None, EmitRanges::No)?
                }
                TypeKind::TemplateSpecialization { template, args } => {
                    let template_ids =
                        self.build_node_id_for_template_name(*template, range.begin)?;
                    let Some(template_id) = template_ids.primary() else {
                        return Ok(MaybeFew::None);
                    };
                    let template_id = template_id.clone();
                    let lowered = match loc_kind {
                        Some(TypeLocKind::TemplateSpecialization { args: arg_locs }) => {
                            self.lower_template_arg_locs(arg_locs, emit_ranges)?
                        }
                        _ => self.lower_template_args(args, Loc::Invalid)?,
                    };
                    let Some(arg_ids) = lowered else {
                        return Ok(MaybeFew::None);
                    };
                    MaybeFew::One(self.observer.record_tapp_node(&template_id, &arg_ids))
                }
                TypeKind::InjectedClassName(decl) => match ast.definition_of(*decl) {
                    Some(definition) => match ast.described_template(definition) {
                        Some(template) => MaybeFew::One(self.build_node_id_for_decl(template)),
                        None => MaybeFew::One(self.build_node_id_for_decl(definition)),
                    },
                    None => {
                        let name = self.build_name_id_for_decl(*decl);
                        MaybeFew::One(self.observer.record_nominal_type_node(&name))
                    }
                },
                TypeKind::DependentName { qualifier, ident } => {
                    let name_loc = match loc_kind {
                        Some(TypeLocKind::DependentName { name_loc }) => *name_loc,
                        _ => Loc::Invalid,
                    };
                    let chain_len = ast.nested_name(*qualifier).segments.len();
                    self.build_node_id_for_dependent_name(
                        *qualifier,
                        chain_len,
                        ident,
                        name_loc,
                        emit_ranges,
                    )?
                }
                TypeKind::Unsupported(kind) => return self.unimplemented_none(kind.name()),
            }
        };

        self.emit_spelling(&mut range, emit_ranges, &ids);
        drop(self.type_nodes.insert(key, ids.clone()));
        Ok(ids)
    }

    /// Lowers a template name to the node standing for the template.
    ///
    /// Class templates lower through their templated record's tag type, so
    /// a template with a visible definition resolves to its binder and one
    /// without resolves to a nominal node. Function templates and template
    /// template parameters resolve to their declarations directly.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::Unimplemented`] for the unresolved
    /// template-name kinds when the ignore-unimplemented policy is off.
    pub(crate) fn build_node_id_for_template_name(
        &mut self,
        name: TemplateName,
        _name_loc: Loc,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        let ast = self.ast;
        match name {
            TemplateName::Template(template) => match &ast.decl(template).kind {
                DeclKind::ClassTemplate(t) => match ast.tag_type(t.templated) {
                    Some(tag) => self.lower_type(tag, None, EmitRanges::No),
                    None => Ok(MaybeFew::One(self.build_node_id_for_decl(template))),
                },
                // Direct references to function templates go to the outer
                // template shell.
                DeclKind::FunctionTemplate(_) | DeclKind::VarTemplate(_) => {
                    Ok(MaybeFew::One(self.build_node_id_for_decl(template)))
                }
                DeclKind::TemplateTemplateParm(_) => {
                    Ok(MaybeFew::One(self.build_node_id_for_decl(template)))
                }
                other => unreachable!("template name names non-template {other:?}"),
            },
            other => self.unimplemented_none(other.kind_name()),
        }
    }

    /// Lowers one resolved template argument.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::Unimplemented`] for argument kinds the
    /// lowering does not support, when the policy is off.
    pub(crate) fn build_node_id_for_template_arg(
        &mut self,
        arg: &TemplateArg,
        loc: Loc,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        match arg {
            TemplateArg::Type(ty) => self.lower_type(*ty, None, EmitRanges::No),
            TemplateArg::Template(name) => self.build_node_id_for_template_name(*name, loc),
            other => self.unimplemented_none(other.kind_name()),
        }
    }

    /// Lowers one template argument as written.
    ///
    /// ## Errors
    ///
    /// See [`Self::build_node_id_for_template_arg`].
    pub(crate) fn build_node_id_for_template_arg_loc(
        &mut self,
        arg: &TemplateArgLoc,
        emit_ranges: EmitRanges,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        match arg {
            TemplateArgLoc::Type(type_loc) => {
                self.build_node_id_for_type_loc(*type_loc, emit_ranges)
            }
            TemplateArgLoc::Template(name, loc) => {
                self.build_node_id_for_template_name(*name, *loc)
            }
            TemplateArgLoc::Other(arg) => self.unimplemented_none(arg.kind_name()),
        }
    }

    /// Lowers a dependent qualified name to a synthetic lookup node.
    ///
    /// The node's signature encodes the qualifier chain's source extent.
    /// Prefix components get ordinal `param` edges, innermost first: a
    /// dependent-identifier component recurses on its own prefix, a type
    /// component lowers its spelling, and the remaining component kinds go
    /// through the unimplemented policy.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::Unimplemented`] for unsupported qualifier
    /// components when the policy is off.
    pub(crate) fn build_node_id_for_dependent_name(
        &mut self,
        qualifier: NnsId,
        prefix_len: usize,
        ident: &str,
        ident_loc: Loc,
        emit_ranges: EmitRanges,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        let ast = self.ast;
        let chain = ast.nested_name(qualifier);

        let mut signature = String::from("#nns");
        let end = if prefix_len == chain.segments.len() {
            chain.end
        } else {
            chain.segments[prefix_len - 1].loc
        };
        signature.push('@');
        signature.push_str(&ast.display_location(chain.begin));
        signature.push('@');
        signature.push_str(&ast.display_location(end));
        let lookup_node = NodeId::new(signature);

        let mut ordinal = 0u32;
        let mut index = prefix_len;
        while index > 0 {
            let segment = &chain.segments[index - 1];
            let (component_id, recursed) = match &segment.kind {
                NnsSegmentKind::Identifier(name) => {
                    if index == 1 {
                        return self.unimplemented_none("NestedNameSpecifier::Identifier");
                    }
                    let prefix_ids = self.build_node_id_for_dependent_name(
                        qualifier,
                        index - 1,
                        name,
                        segment.loc,
                        emit_ranges,
                    )?;
                    match prefix_ids.primary() {
                        Some(id) => (id.clone(), true),
                        None => {
                            return self.unimplemented_none("NestedNameSpecifier::Identifier");
                        }
                    }
                }
                NnsSegmentKind::TypeSpec(type_loc) => {
                    let ids = self.build_node_id_for_type_loc(*type_loc, emit_ranges)?;
                    match ids.primary() {
                        Some(id) => (id.clone(), false),
                        None => return Ok(MaybeFew::None),
                    }
                }
                other => return self.unimplemented_none(other.kind_name()),
            };
            self.observer.record_param_edge(&lookup_node, ordinal, &component_id);
            ordinal += 1;
            if recursed {
                break;
            }
            index -= 1;
        }

        self.observer.record_lookup_node(&lookup_node, ident);
        if emit_ranges == EmitRanges::Yes {
            let range = self.resolver.range_for_entity_at(ident_loc);
            if range.is_valid() {
                let context_range = self.range_in_current_context(range);
                self.observer.record_decl_use_location(&context_range, &lookup_node);
            }
        }
        Ok(MaybeFew::One(lookup_node))
    }
}

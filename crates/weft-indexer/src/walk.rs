//! The traversal driver.
//!
//! [`Indexer`] performs one depth-first pass over a translation unit. Per
//! declaration it asks the identity module for ids, the range resolver for
//! spans, and the lowering module for types, and pushes the resulting nodes
//! and edges to the observer.
//!
//! Three stacks attribute what gets emitted:
//!
//! - the *range context* holds the ids of enclosing implicit template
//!   instantiations; while it is non-empty every range is emitted as a
//!   wraith wrapping the top,
//! - the *type context* holds the template parameter lists in scope, which
//!   resolves type parameters that lost their declaration pointer,
//! - the *blame stack* holds the ids of enclosing functions; its top is the
//!   caller for every emitted call edge.
//!
//! The driver pushes and pops all three at fixed traversal events; visit
//! methods never touch them.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use weft_ast::ast::Ast;
use weft_ast::loc::Loc;
use weft_ast::nodes::{
    DeclId,
    DeclKind,
    DeclName,
    ExprId,
    ExprKind,
    FunctionDecl,
    FunctionTemplateInfo,
    OperatorKind,
    RecordKeyword,
    TemplateName,
    TypeLocId,
};

use crate::cancel::CancelToken;
use crate::error::IndexError;
use crate::lower::{EmitRanges, MaybeFew, TypeKey};
use crate::observer::{Completeness, EnumKind, GraphObserver, NodeId, Range, RecordKind, Specificity};
use crate::parents::ParentMap;
use crate::ranges::RangeResolver;

/// Options controlling one indexing run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Whether constructs the lowering does not handle are skipped (the
    /// default) or surfaced as [`IndexError::Unimplemented`].
    pub ignore_unimplemented: bool,
    /// Optional cancellation token, polled between sibling declarations.
    pub cancel: Option<CancelToken>,
}

impl IndexOptions {
    /// Creates the default options: unimplemented constructs are skipped,
    /// no cancellation.
    #[must_use]
    pub const fn new() -> Self { Self { ignore_unimplemented: true, cancel: None } }
}

impl Default for IndexOptions {
    fn default() -> Self { Self::new() }
}

/// What one indexing run wants to report back besides the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Skipped unimplemented constructs, keyed by construct name.
    ///
    /// Test suites alarm on regressions by watching these counters.
    pub unimplemented: BTreeMap<&'static str, u64>,
}

/// Indexes one translation unit against an observer.
///
/// This is a convenience wrapper over [`Indexer`]; most callers want
/// nothing else.
///
/// ## Errors
///
/// Returns [`IndexError::Cancelled`] when the cancellation token fires and
/// [`IndexError::Unimplemented`] when an unhandled construct is reached
/// with `ignore_unimplemented` off.
pub fn index_translation_unit<O: GraphObserver>(
    ast: &Ast,
    observer: &mut O,
    options: IndexOptions,
) -> Result<IndexReport, IndexError> {
    Indexer::new(ast, observer, options).index()
}

/// The traversal state for one translation unit.
#[derive(Debug)]
pub struct Indexer<'ast, 'obs, O> {
    pub(crate) ast: &'ast Ast,
    pub(crate) observer: &'obs mut O,
    pub(crate) options: IndexOptions,
    pub(crate) resolver: RangeResolver<'ast>,
    pub(crate) parents: Option<ParentMap>,
    pub(crate) type_nodes: FxHashMap<TypeKey, MaybeFew<NodeId>>,
    pub(crate) range_context: Vec<NodeId>,
    pub(crate) type_context: Vec<&'ast [DeclId]>,
    pub(crate) blame_stack: Vec<NodeId>,
    pub(crate) unimplemented_counts: BTreeMap<&'static str, u64>,
}

impl<'ast, 'obs, O: GraphObserver> Indexer<'ast, 'obs, O> {
    /// Creates an indexer over one AST and observer.
    #[must_use]
    pub fn new(ast: &'ast Ast, observer: &'obs mut O, options: IndexOptions) -> Self {
        Self {
            ast,
            observer,
            options,
            resolver: RangeResolver::new(ast),
            parents: None,
            type_nodes: FxHashMap::default(),
            range_context: Vec::new(),
            type_context: Vec::new(),
            blame_stack: Vec::new(),
            unimplemented_counts: BTreeMap::new(),
        }
    }

    /// Runs the traversal to completion.
    ///
    /// ## Errors
    ///
    /// See [`index_translation_unit`].
    pub fn index(mut self) -> Result<IndexReport, IndexError> {
        self.traverse_decl(self.ast.root())?;
        Ok(IndexReport { unimplemented: self.unimplemented_counts })
    }

    // ------------------------------------------------------------------
    // Shared plumbing
    // ------------------------------------------------------------------

    /// Returns the parent index, building it on first use.
    pub(crate) fn parent_map(&mut self) -> &ParentMap {
        if self.parents.is_none() {
            self.parents = Some(ParentMap::build(self.ast));
        }
        match &self.parents {
            Some(map) => map,
            None => unreachable!("parent map was just built"),
        }
    }

    /// Wraps a span in the current range context.
    pub(crate) fn range_in_current_context(
        &self,
        range: weft_ast::loc::SourceRange,
    ) -> Range {
        match self.range_context.last() {
            Some(context) => Range::Wraith(range, context.clone()),
            None => Range::Physical(range),
        }
    }

    pub(crate) fn maybe_record_definition_range(&mut self, range: &Range, id: &NodeId) {
        if range.physical().is_valid() {
            self.observer.record_definition_range(range, id);
        }
    }

    /// Counts one sighting of an unimplemented construct.
    pub(crate) fn count_unimplemented(&mut self, construct: &'static str) {
        log::debug!("skipping unimplemented construct: {construct}");
        *self.unimplemented_counts.entry(construct).or_insert(0) += 1;
    }

    /// Applies the unimplemented policy: counts and continues, or fails the
    /// run.
    pub(crate) fn handle_unimplemented(
        &mut self,
        construct: &'static str,
    ) -> Result<(), IndexError> {
        self.count_unimplemented(construct);
        if self.options.ignore_unimplemented {
            Ok(())
        } else {
            Err(IndexError::Unimplemented { construct })
        }
    }

    /// Policy-checked "this lowering produced nothing".
    pub(crate) fn unimplemented_none(
        &mut self,
        construct: &'static str,
    ) -> Result<MaybeFew<NodeId>, IndexError> {
        self.handle_unimplemented(construct)?;
        Ok(MaybeFew::None)
    }

    fn check_cancelled(&self) -> Result<(), IndexError> {
        match &self.options.cancel {
            Some(token) if token.is_cancelled() => Err(IndexError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Lowers a spelled type and draws a type edge from `node` to it,
    /// recording the spelling against `range`.
    fn ascribe_spelled_type(
        &mut self,
        range: weft_ast::loc::SourceRange,
        type_loc: TypeLocId,
        node: &NodeId,
    ) -> Result<(), IndexError> {
        if let Some(ty) = self.build_node_id_for_type_loc(type_loc, EmitRanges::Yes)?.primary() {
            let ty = ty.clone();
            let context_range = self.range_in_current_context(range);
            self.observer.record_type_spelling_location(&context_range, &ty);
            self.observer.record_type_edge(node, &ty);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    fn traverse_decls(&mut self, decls: &[DeclId]) -> Result<(), IndexError> {
        for &decl in decls {
            self.check_cancelled()?;
            self.traverse_decl(decl)?;
        }
        Ok(())
    }

    /// Traverses one declaration: pushes the contexts its kind demands,
    /// visits it, and recurses into its children.
    pub fn traverse_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        match &ast.decl(decl).kind {
            DeclKind::TranslationUnit(tu) => self.traverse_decls(&tu.decls),
            DeclKind::Namespace(ns) => self.traverse_decls(&ns.decls),
            DeclKind::Record(record) => {
                if record.injected_class_name {
                    return Ok(());
                }
                let pushed_types = match &record.partial_params {
                    Some(params) => {
                        self.type_context.push(params);
                        true
                    }
                    None => false,
                };
                // Explicit specializations were spelled out in the file and
                // keep physical ranges; implicit ones live in the context
                // of their own instantiation.
                let pushed_range = match &record.specialization {
                    Some(spec) if spec.implicit => {
                        let context = self.build_node_id_for_decl(decl);
                        self.range_context.push(context);
                        true
                    }
                    _ => false,
                };
                let result = self
                    .visit_record_decl(decl)
                    .and_then(|()| self.traverse_decls(&record.members));
                if pushed_range {
                    drop(self.range_context.pop());
                }
                if pushed_types {
                    drop(self.type_context.pop());
                }
                result
            }
            DeclKind::Enum(decl_data) => {
                self.visit_enum_decl(decl)?;
                self.traverse_decls(&decl_data.enumerators)
            }
            DeclKind::EnumConstant(_) => self.visit_enum_constant_decl(decl),
            DeclKind::Function(func) => self.traverse_function_decl(decl, func),
            DeclKind::Var(_) => self.visit_var_decl(decl),
            DeclKind::Typedef(_) => self.visit_typedef_decl(decl),
            DeclKind::ClassTemplate(template) => {
                self.type_context.push(&template.params);
                let result = self
                    .traverse_decl(template.templated)
                    .and_then(|()| self.traverse_decls(&template.specializations));
                drop(self.type_context.pop());
                result
            }
            DeclKind::FunctionTemplate(template) => {
                self.type_context.push(&template.params);
                let result = self.traverse_decl(template.templated);
                drop(self.type_context.pop());
                result?;
                // Implicit instantiations are traversed outside the
                // primary's parameter scope; explicit specializations show
                // up in lexical order elsewhere.
                for &spec in &template.specializations {
                    if let DeclKind::Function(f) = &ast.decl(spec).kind
                        && let FunctionTemplateInfo::Specialization(info) = &f.template
                        && !info.implicit
                    {
                        continue;
                    }
                    self.check_cancelled()?;
                    self.traverse_decl(spec)?;
                }
                Ok(())
            }
            DeclKind::VarTemplate(template) => {
                self.type_context.push(&template.params);
                let result = self.traverse_decl(template.templated);
                drop(self.type_context.pop());
                result
            }
            // Data members and template parameters are reported by their
            // owners, not visited on their own.
            DeclKind::Field(_)
            | DeclKind::TemplateTypeParm(_)
            | DeclKind::NonTypeTemplateParm(_)
            | DeclKind::TemplateTemplateParm(_) => Ok(()),
        }
    }

    /// Blame calls on actual functions, not on callables: this keeps calls
    /// from different functions that alias one callable apart.
    fn traverse_function_decl(
        &mut self,
        decl: DeclId,
        func: &'ast FunctionDecl,
    ) -> Result<(), IndexError> {
        let pushed_range = match &func.template {
            FunctionTemplateInfo::Specialization(info) if info.implicit => {
                let context = self.build_node_id_for_decl(decl);
                self.range_context.push(context);
                true
            }
            _ => false,
        };
        let blame_node_id = self.build_node_id_for_decl(decl);
        self.blame_stack.push(blame_node_id);

        let result = self
            .visit_function_decl(decl)
            .and_then(|()| self.traverse_decls(&func.params))
            .and_then(|()| self.traverse_decls(&func.locals))
            .and_then(|()| self.traverse_exprs(&func.body));

        drop(self.blame_stack.pop());
        if pushed_range {
            drop(self.range_context.pop());
        }
        result
    }

    fn traverse_exprs(&mut self, exprs: &[ExprId]) -> Result<(), IndexError> {
        for &expr in exprs {
            self.traverse_expr(expr)?;
        }
        Ok(())
    }

    fn traverse_expr(&mut self, expr: ExprId) -> Result<(), IndexError> {
        let ast = self.ast;
        match &ast.expr(expr).kind {
            ExprKind::Call(call) => {
                self.visit_call_expr(expr)?;
                if let Some(callee) = call.callee {
                    self.traverse_expr(callee)?;
                }
                self.traverse_exprs(&call.args)
            }
            ExprKind::DeclRef(_) => self.visit_decl_ref_expr(expr),
        }
    }

    // ------------------------------------------------------------------
    // Expression visits
    // ------------------------------------------------------------------

    fn visit_call_expr(&mut self, expr: ExprId) -> Result<(), IndexError> {
        let ast = self.ast;
        let ExprKind::Call(call) = &ast.expr(expr).kind else { return Ok(()) };
        let Some(callee_decl) = call.callee_decl else { return Ok(()) };
        if self.blame_stack.is_empty() {
            return Ok(());
        }
        let mut range = ast.expr(expr).range;
        // The expression's end location points at the right paren token;
        // advance one byte so the paren itself is covered.
        if let Some(rparen) = ast.file_loc(call.rparen_loc) {
            range.end = Loc::File(rparen.with_offset(1));
        }
        let context_range = self.range_in_current_context(range);
        let callee_id = self.build_node_id_for_callable_decl(callee_decl);
        let caller = match self.blame_stack.last() {
            Some(caller) => caller.clone(),
            None => unreachable!("blame stack checked non-empty above"),
        };
        self.observer.record_call_edge(&context_range, &caller, &callee_id);
        Ok(())
    }

    fn visit_decl_ref_expr(&mut self, expr: ExprId) -> Result<(), IndexError> {
        let ast = self.ast;
        let ExprKind::DeclRef(decl_ref) = &ast.expr(expr).kind else { return Ok(()) };
        // Bail on non-type template parameters for now.
        if matches!(ast.decl(decl_ref.decl).kind, DeclKind::NonTypeTemplateParm(_)) {
            return Ok(());
        }
        if decl_ref.loc.is_valid() {
            let range = self.resolver.range_for_entity_at(decl_ref.loc);
            let context_range = self.range_in_current_context(range);
            let target = self.build_node_id_for_decl(decl_ref.decl);
            self.observer.record_decl_use_location(&context_range, &target);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declaration visits
    // ------------------------------------------------------------------

    fn visit_var_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        let DeclKind::Var(var) = &ast.decl(decl).kind else { return Ok(()) };
        // Parameters are added to the graph by their enclosing function.
        if var.parameter {
            return Ok(());
        }
        let node = self.build_node_id_for_decl(decl);
        let name = self.build_name_id_for_decl(decl);
        let range = self.resolver.range_for_name_of_declaration(decl);
        let completeness =
            if var.is_definition { Completeness::Definition } else { Completeness::Incomplete };
        self.observer.record_variable_node(&name, &node, completeness);
        let context_range = self.range_in_current_context(range);
        self.maybe_record_definition_range(&context_range, &node);
        if let Some(type_loc) = var.type_loc
            && let Some(ty) = self.build_node_id_for_type_loc(type_loc, EmitRanges::Yes)?.primary()
        {
            let ty = ty.clone();
            self.observer.record_type_edge(&node, &ty);
        }
        Ok(())
    }

    fn visit_enum_constant_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        let DeclKind::EnumConstant(constant) = &ast.decl(decl).kind else { return Ok(()) };
        let value = constant.value;
        let name = self.build_name_id_for_decl(decl);
        let node = self.build_node_id_for_decl(decl);
        let range = self.resolver.range_for_name_of_declaration(decl);
        let context_range = self.range_in_current_context(range);
        self.maybe_record_definition_range(&context_range, &node);
        self.observer.record_named_edge(&node, &name);
        self.observer.record_integer_constant_node(&node, value);
        if let Some(parent) = self.parent_map().first_parent(decl) {
            let enum_node = self.build_node_id_for_decl(parent.parent);
            self.observer.record_child_of_edge(&node, &enum_node);
        }
        Ok(())
    }

    fn visit_enum_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        let DeclKind::Enum(enum_decl) = &ast.decl(decl).kind else { return Ok(()) };
        let name = self.build_name_id_for_decl(decl);
        let node = self.build_node_id_for_decl(decl);
        let range = self.resolver.range_for_name_of_declaration(decl);
        let context_range = self.range_in_current_context(range);
        self.maybe_record_definition_range(&context_range, &node);
        self.observer.record_named_edge(&node, &name);
        let kind = if enum_decl.scoped { EnumKind::Scoped } else { EnumKind::Unscoped };
        let has_storage_type = enum_decl.underlying.is_some();
        if let Some(underlying) = enum_decl.underlying {
            self.ascribe_spelled_type(range, underlying, &node)?;
        }
        if ast.definition_of(decl) != Some(decl) {
            let completeness =
                if has_storage_type { Completeness::Complete } else { Completeness::Incomplete };
            self.observer.record_enum_node(&node, completeness, kind);
            return Ok(());
        }
        self.record_completion_ranges(decl, &context_range, false)?;
        self.observer.record_enum_node(&node, Completeness::Definition, kind);
        Ok(())
    }

    fn visit_record_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        let DeclKind::Record(record) = &ast.decl(decl).kind else { return Ok(()) };
        let range = self.resolver.range_for_name_of_declaration(decl);

        let (body_node, decl_node) = if record.partial_params.is_some() {
            // A partial specialization binds fresh parameters, so it gets
            // its own abstraction wrapped around the inner body.
            let body = self.build_node_id_for_decl_with_index(decl, 0);
            let outer = self.record_template_for_partial(decl, &body)?;
            (body, outer)
        } else if let Some(template) = record.described_template {
            let body = self.build_node_id_for_decl_with_index(decl, 0);
            let outer = self.record_template(template, &body)?;
            (body, outer)
        } else {
            let body = self.build_node_id_for_decl(decl);
            (body.clone(), body)
        };

        if let Some(spec) = &record.specialization {
            let lowered_args = match &spec.args_as_written {
                Some(written) => self.lower_template_arg_locs(written, EmitRanges::No)?,
                None => self.lower_template_args(&spec.args, ast.decl(decl).loc)?,
            };
            if let Some(args) = lowered_args {
                let template_name = self.node_id_for_specialized_template(spec.template)?;
                if let Some(template_name) = template_name {
                    let tapp = self.observer.record_tapp_node(&template_name, &args);
                    self.observer.record_spec_edge(&decl_node, &tapp);
                }
            }
        }

        let context_range = self.range_in_current_context(range);
        self.maybe_record_definition_range(&context_range, &decl_node);
        let name = self.build_name_id_for_decl(decl);
        self.observer.record_named_edge(&decl_node, &name);
        let kind = match record.keyword {
            RecordKeyword::Struct => RecordKind::Struct,
            RecordKeyword::Class => RecordKind::Class,
            RecordKeyword::Union => RecordKind::Union,
        };
        if ast.definition_of(decl) != Some(decl) {
            self.observer.record_record_node(&body_node, kind, Completeness::Incomplete);
            return Ok(());
        }
        self.record_completion_ranges(decl, &context_range, true)?;
        self.observer.record_record_node(&body_node, kind, Completeness::Definition);
        Ok(())
    }

    /// Emits completion edges from a defining declaration's name range to
    /// every other declaration in its chain.
    ///
    /// A completion in the same file as the completed declaration is the
    /// only possible one there, hence uniquely-completing. Implicit
    /// redeclarations are skipped when asked (records), and completions
    /// target the redeclaration's describing template rather than the
    /// abstracted body.
    fn record_completion_ranges(
        &mut self,
        decl: DeclId,
        context_range: &Range,
        skip_implicit: bool,
    ) -> Result<(), IndexError> {
        let ast = self.ast;
        let decl_file = ast.file_loc(ast.decl(decl).loc).map(|fl| fl.file);
        let redecls: Vec<DeclId> = ast.redecls(decl).to_vec();
        for redecl in redecls {
            if redecl == decl || (skip_implicit && ast.decl(redecl).implicit) {
                continue;
            }
            let target_decl = ast.described_template(redecl).unwrap_or(redecl);
            let target = self.build_node_id_for_decl(target_decl);
            let redecl_file = ast.file_loc(ast.decl(redecl).loc).map(|fl| fl.file);
            let specificity = if redecl_file == decl_file {
                Specificity::UniquelyCompletes
            } else {
                Specificity::Completes
            };
            self.observer.record_completion_range(context_range, &target, specificity);
        }
        Ok(())
    }

    fn visit_typedef_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        let DeclKind::Typedef(typedef) = &ast.decl(decl).kind else { return Ok(()) };
        // The compiler-provided aliases are noise, not user code.
        if typedef.builtin {
            return Ok(());
        }
        let range = self.resolver.range_for_name_of_declaration(decl);
        if let Some(aliased) =
            self.build_node_id_for_type_loc(typedef.underlying, EmitRanges::Yes)?.primary()
        {
            let aliased = aliased.clone();
            let name = self.build_name_id_for_decl(decl);
            let alias_node = self.observer.record_type_alias_node(&name, &aliased);
            let context_range = self.range_in_current_context(range);
            self.maybe_record_definition_range(&context_range, &alias_node);
        }
        Ok(())
    }

    fn visit_function_decl(&mut self, decl: DeclId) -> Result<(), IndexError> {
        let ast = self.ast;
        let DeclKind::Function(func) = &ast.decl(decl).kind else { return Ok(()) };

        // There are five flavors of function: plain, described by a
        // template, member specialization, template specialization, and
        // dependent specialization.
        let mut spec_info = None;
        let (inner_node, outer_node) = match &func.template {
            FunctionTemplateInfo::DescribedTemplate(template) => {
                let inner = self.build_node_id_for_decl_with_index(decl, 0);
                let outer = self.record_template(*template, &inner)?;
                (inner, outer)
            }
            FunctionTemplateInfo::Specialization(info) => {
                spec_info = Some(info);
                let node = self.build_node_id_for_decl(decl);
                (node.clone(), node)
            }
            FunctionTemplateInfo::Plain
            | FunctionTemplateInfo::MemberSpecialization
            | FunctionTemplateInfo::DependentSpecialization => {
                let node = self.build_node_id_for_decl(decl);
                (node.clone(), node)
            }
        };

        if let Some(info) = spec_info {
            let lowered_args = match &info.args_as_written {
                Some(written) => self.lower_template_arg_locs(written, EmitRanges::Yes)?,
                None => self.lower_template_args(&info.args, info.point_of_instantiation)?,
            };
            if let Some(args) = lowered_args
                && let Some(template_name) = self
                    .build_node_id_for_template_name(
                        TemplateName::Template(info.template),
                        info.point_of_instantiation,
                    )?
                    .primary()
            {
                let template_name = template_name.clone();
                let tapp = self.observer.record_tapp_node(&template_name, &args);
                self.observer.record_spec_edge(&outer_node, &tapp);
            }
        }

        let name = self.build_name_id_for_decl(decl);
        let callable = self.build_node_id_for_callable_decl(decl);
        let range = self.resolver.range_for_name_of_declaration(decl);
        let context_range = self.range_in_current_context(range);
        self.maybe_record_definition_range(&context_range, &outer_node);
        self.observer.record_named_edge(&outer_node, &name);
        self.observer.record_callable_as_edge(&outer_node, &callable);

        let is_definition = func.is_definition;
        for (ordinal, &param) in func.params.iter().enumerate() {
            let param_node = self.build_node_id_for_decl(param);
            let param_name = self.build_name_id_for_decl(param);
            let param_range = self.resolver.range_for_name_of_declaration(param);
            let completeness =
                if is_definition { Completeness::Definition } else { Completeness::Incomplete };
            self.observer.record_variable_node(&param_name, &param_node, completeness);
            let param_context_range = self.range_in_current_context(param_range);
            self.maybe_record_definition_range(&param_context_range, &param_node);
            self.observer.record_param_edge(
                &inner_node,
                u32::try_from(ordinal).unwrap_or(u32::MAX),
                &param_node,
            );
            let param_type = match &ast.decl(param).kind {
                DeclKind::Var(var) => match var.type_loc {
                    Some(type_loc) => {
                        self.build_node_id_for_type_loc(type_loc, EmitRanges::No)?
                    }
                    None => self.build_node_id_for_qual_type(var.ty)?,
                },
                _ => MaybeFew::None,
            };
            if let Some(param_type) = param_type.primary() {
                let param_type = param_type.clone();
                self.observer.record_type_edge(&param_node, &param_type);
            }
        }

        let function_type = match func.type_loc {
            Some(type_loc) => self.build_node_id_for_type_loc(type_loc, EmitRanges::Yes)?,
            None => self.build_node_id_for_qual_type(func.ty)?,
        };
        if let Some(function_type) = function_type.primary() {
            let function_type = function_type.clone();
            self.observer.record_type_edge(&inner_node, &function_type);
        }

        if ast.is_first_decl(decl) {
            self.observer.record_callable_node(&callable);
            if let Some(callable_type) = self.build_node_id_for_qual_type(func.ty)?.primary() {
                let callable_type = callable_type.clone();
                self.observer.record_type_edge(&callable, &callable_type);
            }
            if let Some(parent) = func.member_of {
                let parent_node = self.build_node_id_for_decl(parent);
                self.observer.record_child_of_edge(&outer_node, &parent_node);
                // operator() must be a member function, so only methods
                // can make their record callable.
                if ast.decl(decl).name == DeclName::Operator(OperatorKind::Call) {
                    self.observer.record_callable_as_edge(&parent_node, &callable);
                }
            }
        }

        if !is_definition {
            self.observer.record_function_node(&inner_node, Completeness::Incomplete);
            return Ok(());
        }
        self.record_completion_ranges(decl, &context_range, false)?;
        self.observer.record_function_node(&inner_node, Completeness::Definition);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// Emits the abstraction node for a template declaration and binds its
    /// parameters, answering the abstraction's id.
    pub(crate) fn record_template(
        &mut self,
        template: DeclId,
        body_node: &NodeId,
    ) -> Result<NodeId, IndexError> {
        let params: Vec<DeclId> = match self.ast.template_params(template) {
            Some(params) => params.to_vec(),
            None => Vec::new(),
        };
        let decl_node = self.build_node_id_for_decl(template);
        self.record_template_with(&params, &decl_node, body_node)?;
        Ok(decl_node)
    }

    fn record_template_for_partial(
        &mut self,
        partial: DeclId,
        body_node: &NodeId,
    ) -> Result<NodeId, IndexError> {
        let params: Vec<DeclId> = match &self.ast.decl(partial).kind {
            DeclKind::Record(record) => record.partial_params.clone().unwrap_or_default(),
            _ => Vec::new(),
        };
        let decl_node = self.build_node_id_for_decl(partial);
        self.record_template_with(&params, &decl_node, body_node)?;
        Ok(decl_node)
    }

    fn record_template_with(
        &mut self,
        params: &[DeclId],
        decl_node: &NodeId,
        body_node: &NodeId,
    ) -> Result<(), IndexError> {
        let ast = self.ast;
        self.observer.record_child_of_edge(body_node, decl_node);
        self.observer.record_abs_node(decl_node);
        for &param in params {
            let (param_node, param_index) = match &ast.decl(param).kind {
                DeclKind::TemplateTypeParm(parm) | DeclKind::NonTypeTemplateParm(parm) => {
                    let node = self.build_node_id_for_decl(param);
                    self.observer.record_abs_var_node(&node);
                    (node, parm.index)
                }
                DeclKind::TemplateTemplateParm(parm) => {
                    // The outer abstraction is the primary node here so
                    // later uses point at it rather than the wrapped
                    // abstraction variable.
                    let body = self.build_node_id_for_decl_with_index(param, 0);
                    self.observer.record_abs_var_node(&body);
                    let node = self.record_template(param, &body)?;
                    (node, parm.index)
                }
                other => unreachable!("unknown entry in template parameter list: {other:?}"),
            };
            let range = self.resolver.range_for_name_of_declaration(param);
            let context_range = self.range_in_current_context(range);
            self.maybe_record_definition_range(&context_range, &param_node);
            let param_name = self.build_name_id_for_decl(param);
            self.observer.record_named_edge(&param_node, &param_name);
            self.observer.record_param_edge(decl_node, param_index, &param_node);
        }
        Ok(())
    }

    /// Lowers a template-name operand for a specialization edge: the
    /// template declaration's id when its pattern has a visible
    /// definition, a nominal node otherwise.
    pub(crate) fn node_id_for_specialized_template(
        &mut self,
        template: DeclId,
    ) -> Result<Option<NodeId>, IndexError> {
        let ast = self.ast;
        let templated = match &ast.decl(template).kind {
            DeclKind::ClassTemplate(t) | DeclKind::FunctionTemplate(t) | DeclKind::VarTemplate(t) => {
                t.templated
            }
            _ => return Ok(Some(self.build_node_id_for_decl(template))),
        };
        if ast.definition_of(templated).is_some() {
            Ok(Some(self.build_node_id_for_decl(template)))
        } else {
            let name = self.build_name_id_for_decl(template);
            Ok(Some(self.observer.record_nominal_type_node(&name)))
        }
    }

    /// Lowers every argument in a written argument list; `None` when any
    /// of them fails to lower.
    pub(crate) fn lower_template_arg_locs(
        &mut self,
        args: &[weft_ast::nodes::TemplateArgLoc],
        emit_ranges: EmitRanges,
    ) -> Result<Option<Vec<NodeId>>, IndexError> {
        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            match self.build_node_id_for_template_arg_loc(arg, emit_ranges)?.primary() {
                Some(id) => lowered.push(id.clone()),
                None => return Ok(None),
            }
        }
        Ok(Some(lowered))
    }

    /// Lowers every argument in a resolved argument list; `None` when any
    /// of them fails to lower.
    pub(crate) fn lower_template_args(
        &mut self,
        args: &[weft_ast::nodes::TemplateArg],
        loc: Loc,
    ) -> Result<Option<Vec<NodeId>>, IndexError> {
        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            match self.build_node_id_for_template_arg(arg, loc)?.primary() {
                Some(id) => lowered.push(id.clone()),
                None => return Ok(None),
            }
        }
        Ok(Some(lowered))
    }
}

//! The graph observer: the indexer's sole output surface.
//!
//! The traversal never writes a graph itself; it narrates what it finds to
//! a [`GraphObserver`]. Observers may persist, forward, or discard what
//! they hear, must accept calls in any order, and must tolerate duplicate
//! calls — downstream graph stores treat edges as a set.
//!
//! Identity allocation is split off from recording: the `node_id_for_*`
//! operations are pure and have deterministic default bodies shared by
//! every implementation, so two observers handed the same inputs always
//! agree about ids. The `record_*` operations default to doing nothing,
//! which makes [`NullObserver`] the empty impl.

use std::fmt;

use weft_ast::loc::SourceRange;

/// An opaque node identity in the emitted graph.
///
/// The signature string is stable across translation units for entities the
/// one-definition rule identifies, and distinct for distinct entities.
/// Observers must not parse it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from its signature.
    #[must_use]
    pub fn new(signature: impl Into<String>) -> Self { Self(signature.into()) }

    /// Returns the signature string.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// The equivalence class of a lookup name.
///
/// The language distinguishes several equivalence classes of names; the
/// graph keeps the ones that matter for lookup: `struct` and `class`
/// collapse into one class, unions form their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameEqClass {
    /// Not a member of a significant class.
    None,
    /// Names a struct or class.
    Class,
    /// Names a union.
    Union,
}

/// An abstract lookup name for a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameId {
    /// The path from the translation-unit root down to the declaration,
    /// tokens joined with `:`.
    pub path: String,
    /// The name's equivalence class.
    pub eq_class: NameEqClass,
}

impl NameId {
    /// Creates a name id.
    #[must_use]
    pub const fn new(path: String, eq_class: NameEqClass) -> Self { Self { path, eq_class } }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.eq_class {
            NameEqClass::None => "n",
            NameEqClass::Class => "c",
            NameEqClass::Union => "u",
        };
        write!(f, "{}#{tag}", self.path)
    }
}

/// A source range, possibly reinterpreted into a semantic context.
///
/// A `Physical` range is a run of bytes in a source file. A `Wraith` range
/// has the same physical text but lives in an imaginary context: a member
/// declared inside an implicit template instantiation keeps the primary
/// template's physical range while its context names the instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    /// A plain run of bytes in a source file.
    Physical(SourceRange),
    /// A physical range reinterpreted into the context of a semantic node.
    Wraith(SourceRange, NodeId),
}

impl Range {
    /// Returns the physical extent of this range.
    #[must_use]
    pub const fn physical(&self) -> &SourceRange {
        match self {
            Self::Physical(range) | Self::Wraith(range, _) => range,
        }
    }

    /// Returns the semantic context, if this is a wraith range.
    #[must_use]
    pub const fn context(&self) -> Option<&NodeId> {
        match self {
            Self::Physical(_) => None,
            Self::Wraith(_, context) => Some(context),
        }
    }
}

/// How complete a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completeness {
    /// A definition (`class C {};`), hence necessarily complete.
    Definition,
    /// Complete but not a definition (`enum class E : short;`).
    Complete,
    /// An incomplete declaration (`class C;`).
    Incomplete,
}

/// Whether a record is a struct, class, or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Declared with `struct`.
    Struct,
    /// Declared with `class`.
    Class,
    /// Declared with `union`.
    Union,
}

/// Whether an enum is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// An `enum class`.
    Scoped,
    /// A plain `enum`.
    Unscoped,
}

/// How specific a completion relationship is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specificity {
    /// The only possible relationship in context: a definition completing a
    /// forward declaration in the same source file.
    UniquelyCompletes,
    /// One of many possible relationships: a header's forward declaration
    /// may be completed by definitions in many source files.
    Completes,
}

/// The sink for everything the indexer discovers.
///
/// The `node_id_for_*` family is referentially transparent: equal inputs
/// produce equal outputs and nothing is emitted. The `record_*` family
/// reports nodes and edges; implementations may drop any call.
pub trait GraphObserver {
    /// Returns the id for a builtin type or type constructor.
    ///
    /// Type constructors that the surface language spells as operators are
    /// given invented names: `ptr` for `*`, `lvr` for `&`, `rvr` for `&&`,
    /// `carr` for constant arrays, `fn`/`fnvararg`/`knrfn` for function
    /// types, plus `const`, `restrict` and `volatile`.
    fn node_id_for_builtin_type(&self, spelling: &str) -> NodeId {
        NodeId::new(format!("{spelling}#builtin"))
    }

    /// Returns the id for a nominal type node: a type known only by name.
    fn node_id_for_nominal_type_node(&self, name: &NameId) -> NodeId {
        NodeId::new(format!("{name}#tnominal"))
    }

    /// Returns the id for a type node aliasing another type node.
    fn node_id_for_type_alias_node(&self, name: &NameId, aliased: &NodeId) -> NodeId {
        NodeId::new(format!("{name}#{aliased}#talias"))
    }

    /// Returns the id for a type application.
    fn node_id_for_tapp_node(&self, tycon: &NodeId, params: &[NodeId]) -> NodeId {
        let mut signature = String::new();
        signature.push_str(tycon.as_str());
        signature.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                signature.push(',');
            }
            signature.push_str(param.as_str());
        }
        signature.push_str(")#tapp");
        NodeId::new(signature)
    }

    /// Records a nominal type node, returning its id.
    fn record_nominal_type_node(&mut self, name: &NameId) -> NodeId {
        self.node_id_for_nominal_type_node(name)
    }

    /// Records a type alias node (a `typedef` or `using` alias), returning
    /// its id.
    fn record_type_alias_node(&mut self, name: &NameId, aliased: &NodeId) -> NodeId {
        self.node_id_for_type_alias_node(name, aliased)
    }

    /// Records a type application node, returning its id.
    fn record_tapp_node(&mut self, tycon: &NodeId, params: &[NodeId]) -> NodeId {
        self.node_id_for_tapp_node(tycon, params)
    }

    /// Records a record type node (a class, struct, or union).
    fn record_record_node(&mut self, node: &NodeId, kind: RecordKind, completeness: Completeness) {
        let _ = (node, kind, completeness);
    }

    /// Records a function node.
    fn record_function_node(&mut self, node: &NodeId, completeness: Completeness) {
        let _ = (node, completeness);
    }

    /// Records an enumeration node.
    fn record_enum_node(&mut self, node: &NodeId, completeness: Completeness, kind: EnumKind) {
        let _ = (node, completeness, kind);
    }

    /// Records a variable node bound to a name.
    fn record_variable_node(&mut self, name: &NameId, node: &NodeId, completeness: Completeness) {
        let _ = (name, node, completeness);
    }

    /// Records a node for a constant with an integer-representable value,
    /// such as an enumerator.
    fn record_integer_constant_node(&mut self, node: &NodeId, value: i128) {
        let _ = (node, value);
    }

    /// Records an abstraction node: the binding site of compile-time
    /// variables, such as a template.
    fn record_abs_node(&mut self, node: &NodeId) { let _ = node; }

    /// Records a variable bound by an abstraction node.
    fn record_abs_var_node(&mut self, node: &NodeId) { let _ = node; }

    /// Records a deferred-lookup node carrying the name whose resolution
    /// was deferred.
    fn record_lookup_node(&mut self, node: &NodeId, name: &str) { let _ = (node, name); }

    /// Records a callable node: something a call expression can target.
    fn record_callable_node(&mut self, node: &NodeId) { let _ = node; }

    /// Records that a node is known by a name.
    fn record_named_edge(&mut self, node: &NodeId, name: &NameId) { let _ = (node, name); }

    /// Records the type of a node.
    fn record_type_edge(&mut self, term: &NodeId, ty: &NodeId) { let _ = (term, ty); }

    /// Records that a term specializes a type.
    fn record_spec_edge(&mut self, term: &NodeId, ty: &NodeId) { let _ = (term, ty); }

    /// Records that a node participates in the call graph as a callable.
    fn record_callable_as_edge(&mut self, to_call: &NodeId, callable_as: &NodeId) {
        let _ = (to_call, callable_as);
    }

    /// Records a call made by `caller` to `callee` at `range`.
    fn record_call_edge(&mut self, range: &Range, caller: &NodeId, callee: &NodeId) {
        let _ = (range, caller, callee);
    }

    /// Records a child-to-parent relationship.
    fn record_child_of_edge(&mut self, child: &NodeId, parent: &NodeId) {
        let _ = (child, parent);
    }

    /// Records a parameter relationship; ordinal 0 is the first parameter.
    fn record_param_edge(&mut self, param_of: &NodeId, ordinal: u32, param: &NodeId) {
        let _ = (param_of, ordinal, param);
    }

    /// Records that `range` contains the definition of the given node.
    ///
    /// The range is usually only the part of the declaration that binds a
    /// name: for `class C`, the range of `C`.
    fn record_definition_range(&mut self, range: &Range, node: &NodeId) {
        let _ = (range, node);
    }

    /// Records that `range` contains a completion for the given node.
    fn record_completion_range(&mut self, range: &Range, node: &NodeId, specificity: Specificity) {
        let _ = (range, node, specificity);
    }

    /// Records a use site for a declaration.
    fn record_decl_use_location(&mut self, range: &Range, node: &NodeId) {
        let _ = (range, node);
    }

    /// Records that a type was spelled out at a location.
    fn record_type_spelling_location(&mut self, range: &Range, ty: &NodeId) {
        let _ = (range, ty);
    }
}

/// A graph observer that discards everything.
///
/// Identity allocation still works (the defaults are pure), which makes
/// this useful for measuring traversal cost and for tests that only care
/// about errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl GraphObserver for NullObserver {}

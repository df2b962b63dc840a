//! The persisting observer: an in-memory, append-only graph.
//!
//! `GraphRecorder` keeps every call it hears as a [`GraphEntry`], in call
//! order. Tests assert directly on the entries; downstream consumers can
//! render them to JSON lines and merge per-translation-unit graphs
//! elsewhere. Duplicate entries are kept as-is — deduplication is the
//! downstream store's job.
//!
//! Per the error-handling policy, definition-range and use-location entries
//! whose range is invalid or zero-width are silently dropped: they carry no
//! anchorable text.

use serde_json::{Value, json};
use weft_ast::loc::SourceRange;

use crate::observer::{
    Completeness,
    EnumKind,
    GraphObserver,
    NameId,
    NodeId,
    Range,
    RecordKind,
    Specificity,
};

/// One observed node or edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEntry {
    /// A nominal type node.
    NominalType {
        /// The node's id.
        id: NodeId,
        /// The printable name the node stands for.
        name: String,
    },
    /// A type alias node.
    TypeAlias {
        /// The node's id.
        id: NodeId,
        /// The printable alias name.
        name: String,
        /// The aliased type.
        aliased: NodeId,
    },
    /// A type application node.
    Tapp {
        /// The node's id.
        id: NodeId,
        /// The type constructor.
        tycon: NodeId,
        /// The applied arguments, in order.
        params: Vec<NodeId>,
    },
    /// A record node.
    Record {
        /// The node's id.
        id: NodeId,
        /// Struct, class, or union.
        kind: RecordKind,
        /// How complete the declaration is.
        completeness: Completeness,
    },
    /// A function node.
    Function {
        /// The node's id.
        id: NodeId,
        /// How complete the declaration is.
        completeness: Completeness,
    },
    /// An enumeration node.
    Enum {
        /// The node's id.
        id: NodeId,
        /// How complete the declaration is.
        completeness: Completeness,
        /// Scoped or unscoped.
        kind: EnumKind,
    },
    /// A variable node.
    Variable {
        /// The printable lookup name.
        name: String,
        /// The node's id.
        id: NodeId,
        /// How complete the declaration is.
        completeness: Completeness,
    },
    /// An integer-constant node.
    IntegerConstant {
        /// The node's id.
        id: NodeId,
        /// The constant's value.
        value: i128,
    },
    /// An abstraction node.
    Abs {
        /// The node's id.
        id: NodeId,
    },
    /// An abstraction-variable node.
    AbsVar {
        /// The node's id.
        id: NodeId,
    },
    /// A deferred-lookup node.
    Lookup {
        /// The node's id.
        id: NodeId,
        /// The deferred name.
        name: String,
    },
    /// A callable node.
    Callable {
        /// The node's id.
        id: NodeId,
    },
    /// A named edge.
    Named {
        /// The named node.
        node: NodeId,
        /// The printable name.
        name: String,
    },
    /// A type edge.
    TypeEdge {
        /// The typed term.
        term: NodeId,
        /// The term's type.
        ty: NodeId,
    },
    /// A specializes edge.
    SpecEdge {
        /// The specializing term.
        term: NodeId,
        /// The specialized type.
        ty: NodeId,
    },
    /// A callable-as edge.
    CallableAs {
        /// The node that may be called.
        to_call: NodeId,
        /// Its representative in the call graph.
        callable_as: NodeId,
    },
    /// A call edge.
    Call {
        /// The range responsible for the call.
        range: Range,
        /// The caller.
        caller: NodeId,
        /// The callee's callable node.
        callee: NodeId,
    },
    /// A child-of edge.
    ChildOf {
        /// The child node.
        child: NodeId,
        /// The parent node.
        parent: NodeId,
    },
    /// A parameter edge.
    Param {
        /// The parameterized node.
        param_of: NodeId,
        /// The parameter's ordinal; 0 is first.
        ordinal: u32,
        /// The parameter node.
        param: NodeId,
    },
    /// A definition range.
    DefinitionRange {
        /// The range binding the name.
        range: Range,
        /// The defined node.
        node: NodeId,
    },
    /// A completion range.
    CompletionRange {
        /// The completing range.
        range: Range,
        /// The completed node.
        node: NodeId,
        /// How specific the completion is.
        specificity: Specificity,
    },
    /// A declaration use location.
    DeclUse {
        /// The referencing range.
        range: Range,
        /// The used node.
        node: NodeId,
    },
    /// A type spelling location.
    TypeSpelling {
        /// The range covering the spelling.
        range: Range,
        /// The spelled type.
        ty: NodeId,
    },
}

/// The persisting graph observer.
#[derive(Debug, Default)]
pub struct GraphRecorder {
    entries: Vec<GraphEntry>,
}

impl GraphRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Returns every recorded entry, in call order.
    #[must_use]
    pub fn entries(&self) -> &[GraphEntry] { &self.entries }

    /// Returns the entries matching a predicate.
    pub fn matching<'a>(
        &'a self,
        predicate: impl Fn(&GraphEntry) -> bool + 'a,
    ) -> impl Iterator<Item = &'a GraphEntry> {
        self.entries.iter().filter(move |entry| predicate(entry))
    }

    /// Renders all entries as JSON lines.
    ///
    /// The rendering exists for downstream merging; the recorder itself
    /// performs no I/O.
    #[must_use]
    pub fn to_json_lines(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_json().to_string());
            out.push('\n');
        }
        out
    }

    fn push(&mut self, entry: GraphEntry) { self.entries.push(entry); }

    /// Returns true when a range carries anchorable text.
    fn anchorable(range: &Range) -> bool {
        let physical = range.physical();
        physical.is_valid() && !physical.is_empty()
    }
}

const fn record_kind_str(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Struct => "struct",
        RecordKind::Class => "class",
        RecordKind::Union => "union",
    }
}

const fn completeness_str(completeness: Completeness) -> &'static str {
    match completeness {
        Completeness::Definition => "definition",
        Completeness::Complete => "complete",
        Completeness::Incomplete => "incomplete",
    }
}

const fn enum_kind_str(kind: EnumKind) -> &'static str {
    match kind {
        EnumKind::Scoped => "scoped",
        EnumKind::Unscoped => "unscoped",
    }
}

const fn specificity_str(specificity: Specificity) -> &'static str {
    match specificity {
        Specificity::UniquelyCompletes => "uniquely-completes",
        Specificity::Completes => "completes",
    }
}

fn range_json(range: &Range) -> Value {
    fn source_range_json(range: &SourceRange) -> Value {
        json!({ "begin": format!("{:?}", range.begin), "end": format!("{:?}", range.end) })
    }
    match range {
        Range::Physical(physical) => json!({ "physical": source_range_json(physical) }),
        Range::Wraith(physical, context) => json!({
            "physical": source_range_json(physical),
            "context": context.as_str(),
        }),
    }
}

impl GraphEntry {
    /// Renders this entry as one JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::NominalType { id, name } => {
                json!({ "fact": "tnominal", "id": id.as_str(), "name": name })
            }
            Self::TypeAlias { id, name, aliased } => {
                json!({ "fact": "talias", "id": id.as_str(), "name": name, "aliased": aliased.as_str() })
            }
            Self::Tapp { id, tycon, params } => json!({
                "fact": "tapp",
                "id": id.as_str(),
                "tycon": tycon.as_str(),
                "params": params.iter().map(NodeId::as_str).collect::<Vec<_>>(),
            }),
            Self::Record { id, kind, completeness } => json!({
                "fact": "record",
                "id": id.as_str(),
                "kind": record_kind_str(*kind),
                "completeness": completeness_str(*completeness),
            }),
            Self::Function { id, completeness } => json!({
                "fact": "function",
                "id": id.as_str(),
                "completeness": completeness_str(*completeness),
            }),
            Self::Enum { id, completeness, kind } => json!({
                "fact": "enum",
                "id": id.as_str(),
                "completeness": completeness_str(*completeness),
                "kind": enum_kind_str(*kind),
            }),
            Self::Variable { name, id, completeness } => json!({
                "fact": "variable",
                "name": name,
                "id": id.as_str(),
                "completeness": completeness_str(*completeness),
            }),
            Self::IntegerConstant { id, value } => {
                json!({ "fact": "constant", "id": id.as_str(), "value": value.to_string() })
            }
            Self::Abs { id } => json!({ "fact": "abs", "id": id.as_str() }),
            Self::AbsVar { id } => json!({ "fact": "absvar", "id": id.as_str() }),
            Self::Lookup { id, name } => {
                json!({ "fact": "lookup", "id": id.as_str(), "name": name })
            }
            Self::Callable { id } => json!({ "fact": "callable", "id": id.as_str() }),
            Self::Named { node, name } => {
                json!({ "edge": "named", "node": node.as_str(), "name": name })
            }
            Self::TypeEdge { term, ty } => {
                json!({ "edge": "typed", "term": term.as_str(), "type": ty.as_str() })
            }
            Self::SpecEdge { term, ty } => {
                json!({ "edge": "specializes", "term": term.as_str(), "type": ty.as_str() })
            }
            Self::CallableAs { to_call, callable_as } => json!({
                "edge": "callableas",
                "node": to_call.as_str(),
                "callable": callable_as.as_str(),
            }),
            Self::Call { range, caller, callee } => json!({
                "edge": "calls",
                "range": range_json(range),
                "caller": caller.as_str(),
                "callee": callee.as_str(),
            }),
            Self::ChildOf { child, parent } => {
                json!({ "edge": "childof", "child": child.as_str(), "parent": parent.as_str() })
            }
            Self::Param { param_of, ordinal, param } => json!({
                "edge": "param",
                "node": param_of.as_str(),
                "ordinal": ordinal,
                "param": param.as_str(),
            }),
            Self::DefinitionRange { range, node } => json!({
                "anchor": "defines",
                "range": range_json(range),
                "node": node.as_str(),
            }),
            Self::CompletionRange { range, node, specificity } => json!({
                "anchor": "completes",
                "range": range_json(range),
                "node": node.as_str(),
                "specificity": specificity_str(*specificity),
            }),
            Self::DeclUse { range, node } => json!({
                "anchor": "ref",
                "range": range_json(range),
                "node": node.as_str(),
            }),
            Self::TypeSpelling { range, ty } => json!({
                "anchor": "type-spelling",
                "range": range_json(range),
                "type": ty.as_str(),
            }),
        }
    }
}

impl GraphObserver for GraphRecorder {
    fn record_nominal_type_node(&mut self, name: &NameId) -> NodeId {
        let id = self.node_id_for_nominal_type_node(name);
        self.push(GraphEntry::NominalType { id: id.clone(), name: name.to_string() });
        id
    }

    fn record_type_alias_node(&mut self, name: &NameId, aliased: &NodeId) -> NodeId {
        let id = self.node_id_for_type_alias_node(name, aliased);
        self.push(GraphEntry::TypeAlias {
            id: id.clone(),
            name: name.to_string(),
            aliased: aliased.clone(),
        });
        id
    }

    fn record_tapp_node(&mut self, tycon: &NodeId, params: &[NodeId]) -> NodeId {
        let id = self.node_id_for_tapp_node(tycon, params);
        self.push(GraphEntry::Tapp {
            id: id.clone(),
            tycon: tycon.clone(),
            params: params.to_vec(),
        });
        id
    }

    fn record_record_node(&mut self, node: &NodeId, kind: RecordKind, completeness: Completeness) {
        self.push(GraphEntry::Record { id: node.clone(), kind, completeness });
    }

    fn record_function_node(&mut self, node: &NodeId, completeness: Completeness) {
        self.push(GraphEntry::Function { id: node.clone(), completeness });
    }

    fn record_enum_node(&mut self, node: &NodeId, completeness: Completeness, kind: EnumKind) {
        self.push(GraphEntry::Enum { id: node.clone(), completeness, kind });
    }

    fn record_variable_node(&mut self, name: &NameId, node: &NodeId, completeness: Completeness) {
        self.push(GraphEntry::Variable {
            name: name.to_string(),
            id: node.clone(),
            completeness,
        });
    }

    fn record_integer_constant_node(&mut self, node: &NodeId, value: i128) {
        self.push(GraphEntry::IntegerConstant { id: node.clone(), value });
    }

    fn record_abs_node(&mut self, node: &NodeId) {
        self.push(GraphEntry::Abs { id: node.clone() });
    }

    fn record_abs_var_node(&mut self, node: &NodeId) {
        self.push(GraphEntry::AbsVar { id: node.clone() });
    }

    fn record_lookup_node(&mut self, node: &NodeId, name: &str) {
        self.push(GraphEntry::Lookup { id: node.clone(), name: name.to_string() });
    }

    fn record_callable_node(&mut self, node: &NodeId) {
        self.push(GraphEntry::Callable { id: node.clone() });
    }

    fn record_named_edge(&mut self, node: &NodeId, name: &NameId) {
        self.push(GraphEntry::Named { node: node.clone(), name: name.to_string() });
    }

    fn record_type_edge(&mut self, term: &NodeId, ty: &NodeId) {
        self.push(GraphEntry::TypeEdge { term: term.clone(), ty: ty.clone() });
    }

    fn record_spec_edge(&mut self, term: &NodeId, ty: &NodeId) {
        self.push(GraphEntry::SpecEdge { term: term.clone(), ty: ty.clone() });
    }

    fn record_callable_as_edge(&mut self, to_call: &NodeId, callable_as: &NodeId) {
        self.push(GraphEntry::CallableAs {
            to_call: to_call.clone(),
            callable_as: callable_as.clone(),
        });
    }

    fn record_call_edge(&mut self, range: &Range, caller: &NodeId, callee: &NodeId) {
        self.push(GraphEntry::Call {
            range: range.clone(),
            caller: caller.clone(),
            callee: callee.clone(),
        });
    }

    fn record_child_of_edge(&mut self, child: &NodeId, parent: &NodeId) {
        self.push(GraphEntry::ChildOf { child: child.clone(), parent: parent.clone() });
    }

    fn record_param_edge(&mut self, param_of: &NodeId, ordinal: u32, param: &NodeId) {
        self.push(GraphEntry::Param {
            param_of: param_of.clone(),
            ordinal,
            param: param.clone(),
        });
    }

    fn record_definition_range(&mut self, range: &Range, node: &NodeId) {
        if Self::anchorable(range) {
            self.push(GraphEntry::DefinitionRange { range: range.clone(), node: node.clone() });
        }
    }

    fn record_completion_range(&mut self, range: &Range, node: &NodeId, specificity: Specificity) {
        self.push(GraphEntry::CompletionRange {
            range: range.clone(),
            node: node.clone(),
            specificity,
        });
    }

    fn record_decl_use_location(&mut self, range: &Range, node: &NodeId) {
        if Self::anchorable(range) {
            self.push(GraphEntry::DeclUse { range: range.clone(), node: node.clone() });
        }
    }

    fn record_type_spelling_location(&mut self, range: &Range, ty: &NodeId) {
        self.push(GraphEntry::TypeSpelling { range: range.clone(), ty: ty.clone() });
    }
}

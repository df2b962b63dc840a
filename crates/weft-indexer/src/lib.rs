//! Cross-reference graph extraction for C++-like translation units.
//!
//! This crate is the core of the Weft indexer: it consumes a fully-resolved
//! [`weft_ast::ast::Ast`] for one translation unit and emits a
//! language-agnostic cross-reference graph whose nodes denote program
//! entities (types, declarations, templates, callables, names) and whose
//! edges denote relations (definition-of, type-of, child-of, call,
//! specialization, completion, use). Downstream consumers merge
//! per-translation-unit graphs into a project-wide code-search database.
//!
//! ## Architecture
//!
//! - **Observer** ([`observer`], [`recorder`]): the sole output surface;
//!   one implementation persists, one discards
//! - **Identity** ([`ident`]): stable name and node ids, equal across
//!   translation units exactly when the one-definition rule says the
//!   entities are the same
//! - **Parent index** ([`parents`]): declaration → (parent, ordinal)
//! - **Range resolution** ([`ranges`]): meaningful spans for names,
//!   operators, destructors and macro-expansion sites
//! - **Semantic hashing** ([`hash`]): order-independent content hashes
//!   backing cross-translation-unit identity
//! - **Type lowering** ([`lower`]): memoised lowering of type occurrences
//!   into graph type nodes
//! - **Traversal** ([`walk`]): the visitor driving everything, carrying
//!   the range, type and blame context stacks
//!
//! ## Example
//!
//! ```rust,ignore
//! use weft_indexer::recorder::GraphRecorder;
//! use weft_indexer::walk::{IndexOptions, index_translation_unit};
//!
//! // Build an AST with weft_ast::builder::AstBuilder...
//! let mut recorder = GraphRecorder::new();
//! let report = index_translation_unit(&ast, &mut recorder, IndexOptions::new())?;
//! for entry in recorder.entries() {
//!     // merge into the project-wide graph store
//! }
//! ```
//!
//! The core performs no I/O, resolves no macros and re-parses nothing; the
//! AST, its lexer and the source manager are read-only collaborators.

pub mod cancel;
pub mod error;
pub mod hash;
pub mod ident;
pub mod lower;
pub mod observer;
pub mod parents;
pub mod ranges;
pub mod recorder;
pub mod walk;

pub use cancel::CancelToken;
pub use error::IndexError;
pub use lower::{EmitRanges, MaybeFew};
pub use observer::{
    Completeness,
    EnumKind,
    GraphObserver,
    NameEqClass,
    NameId,
    NodeId,
    NullObserver,
    Range,
    RecordKind,
    Specificity,
};
pub use recorder::{GraphEntry, GraphRecorder};
pub use walk::{IndexOptions, IndexReport, Indexer, index_translation_unit};

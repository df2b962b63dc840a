//! Indexing error types.
//!
//! The indexer distinguishes exactly two recoverable conditions: an AST
//! construct the lowering does not handle yet (surfaced only when the
//! ignore-unimplemented policy is switched off) and cooperative
//! cancellation. Malformed ASTs are upstream contract violations and
//! assert instead of returning errors.

use thiserror::Error;

/// Errors that can end an indexing run early.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Lowering reached a construct the indexer does not handle and the
    /// ignore-unimplemented policy is off.
    #[error("unimplemented construct: {construct}")]
    Unimplemented {
        /// Stable name of the unhandled construct.
        construct: &'static str,
    },

    /// The traversal observed a cancellation request.
    #[error("indexing was cancelled")]
    Cancelled,
}

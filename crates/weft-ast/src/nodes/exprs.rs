//! Expression node types.
//!
//! The indexer cares about two expression forms: calls (for the call graph)
//! and declaration references (for use sites). Everything else in a function
//! body is opaque to it, so the AST keeps only these.

use crate::loc::{Loc, SourceRange};
use crate::nodes::{DeclId, ExprId};

/// A call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    /// The declaration being called, when the callee resolved to one.
    pub callee_decl: Option<DeclId>,
    /// The callee expression, when modelled (usually a declaration
    /// reference).
    pub callee: Option<ExprId>,
    /// Argument expressions, in order.
    pub args: Vec<ExprId>,
    /// The location of the closing parenthesis.
    pub rparen_loc: Loc,
}

/// A reference to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclRefExpr {
    /// The referenced declaration.
    pub decl: DeclId,
    /// The location of the referencing token.
    pub loc: Loc,
}

/// The kind of an expression, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// A call expression.
    Call(CallExpr),
    /// A reference to a declaration.
    DeclRef(DeclRefExpr),
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// The kind and payload.
    pub kind: ExprKind,
    /// The source range of the whole expression.
    pub range: SourceRange,
}

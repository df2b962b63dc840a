//! AST node type definitions.
//!
//! Nodes are split by category: declarations, structural types and type
//! spellings, and expressions. All of them are addressed by `u32` id
//! newtypes into the arenas owned by [`crate::ast::Ast`].

mod decls;
mod exprs;
mod types;

use std::fmt;

pub use decls::*;
pub use exprs::*;
pub use types::*;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new id with the given index.
            #[must_use]
            pub const fn new(index: u32) -> Self { Self(index) }

            /// Returns the index of this id.
            #[must_use]
            pub const fn index(&self) -> usize { self.0 as usize }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_id! {
    /// Identifier of a declaration in the AST.
    DeclId
}

arena_id! {
    /// Identifier of a structural (interned) type in the AST.
    TypeId
}

arena_id! {
    /// Identifier of a type spelling occurrence in the AST.
    TypeLocId
}

arena_id! {
    /// Identifier of an expression in the AST.
    ExprId
}

arena_id! {
    /// Identifier of a nested-name-specifier chain in the AST.
    NnsId
}

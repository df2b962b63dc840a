//! Resolved abstract syntax tree consumed by the Weft indexer.
//!
//! This crate models one translation unit of a C++-like language after name
//! resolution and template instantiation: a frozen tree the indexer reads but
//! never mutates. It is the in-workspace realization of the "AST collaborator"
//! the indexer core depends on.
//!
//! ## Architecture
//!
//! All nodes live in arenas owned by a single [`ast::Ast`] value and are
//! addressed by `u32` id newtypes:
//!
//! - declarations ([`nodes::Decl`], addressed by [`nodes::DeclId`])
//! - structural types ([`nodes::Type`], addressed by [`nodes::TypeId`]),
//!   hash-consed by the builder so structurally identical types share an id
//! - type spellings ([`nodes::TypeLoc`], addressed by [`nodes::TypeLocId`]),
//!   one per written occurrence, mirroring the structure of the type they
//!   spell and carrying source ranges
//! - expressions ([`nodes::Expr`]) for the call and reference sites the
//!   indexer turns into graph edges
//! - nested-name-specifier chains for dependent names
//!
//! Source locations ([`loc::Loc`]) distinguish real file positions from
//! positions synthesized by macro expansion; macro locations keep enough of
//! the expansion chain to answer the caller-visible-location and
//! macro-argument queries the indexer's range resolution needs.
//!
//! The [`lexer`] module provides raw (expansion-free) token access over file
//! content, including the identifier table that maps alternate-token
//! spellings such as `compl` back to their canonical kinds.
//!
//! Trees are constructed with [`builder::AstBuilder`] and then frozen with
//! [`builder::AstBuilder::finish`].

pub mod ast;
pub mod builder;
pub mod lexer;
pub mod loc;
pub mod nodes;

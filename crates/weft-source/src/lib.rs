//! Source file handling and position tracking for the Weft indexer.
//!
//! This crate provides the source-level foundation the indexer builds on:
//!
//! - `FileId`: a unique identifier for a source file
//! - `Span`: a byte-offset range within a single file
//! - `Position`: a line/column/offset triple for human-readable output
//! - `SourceFile`: a file's content with efficient position lookup
//! - `SourceManager`: the registry of all files that took part in one
//!   translation unit, including headers reached through inclusion
//!
//! Node identities produced by the indexer embed printable locations of the
//! form `file:<id>@<offset>`; [`types::SourceManager::display_location`] is
//! the single source of truth for that rendering.

pub mod types;

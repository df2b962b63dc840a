//! Type definitions for source code representation.
//!
//! This module defines the core types used for representing source files,
//! byte spans and positions in the Weft indexer. Accurate source tracking is
//! what lets the emitted cross-reference graph anchor nodes to the exact
//! tokens that declared them.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

/// A unique identifier for a source file.
///
/// `FileId` is a newtype wrapper around `usize` that uniquely identifies a
/// source file within a [`SourceManager`]. Ids are assigned by the manager
/// when files are registered; id `0` is reserved for dummy locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(usize);

impl FileId {
    /// Creates a new `FileId` with the given value.
    #[must_use]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the inner value of the `FileId`.
    #[must_use]
    pub const fn value(&self) -> usize { self.0 }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "file:{}", self.0) }
}

/// A byte-offset range within a single source file.
///
/// Spans are half-open (`start..end`). A span with `start == end` is a
/// zero-width point; the indexer emits such spans for entities that were
/// synthesized by macro expansion and have no spellable text of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start offset
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span with the given start and end offsets.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self { Self { start, end } }

    /// Creates a zero-width span at the given offset.
    #[must_use]
    pub const fn point(offset: usize) -> Self { Self { start: offset, end: offset } }

    /// Returns true if this span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.start == self.end }

    /// Merges two spans, creating a new span that covers both.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl Default for Span {
    fn default() -> Self { Self::new(0, 0) }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self { Self { start: range.start, end: range.end } }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self { span.start..span.end }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A position in a source file.
///
/// Positions are 1-indexed for line and column, following common editor
/// conventions. The `offset` is 0-indexed, counting bytes from the start of
/// the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from the start of the file (0-indexed)
    pub offset: usize,
}

impl Position {
    /// Creates a new position with the given line, column, and byte offset.
    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source file registered with a [`SourceManager`].
///
/// Contains the content of the file, its name, and precomputed line start
/// offsets for efficient line/column lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Identifier of the file
    pub id: FileId,
    /// Name of the file (usually a path)
    pub name: String,
    /// Path to the file, if available
    pub path: Option<PathBuf>,
    /// Content of the file
    pub content: String,
    /// Byte offsets of line starts (0-indexed, first entry is always 0)
    pub line_starts: Vec<usize>,
}

impl SourceFile {
    /// Creates a new source file with the given id, name, and content.
    #[must_use]
    pub fn new(id: FileId, name: String, content: String) -> Self {
        let line_starts = Self::compute_line_starts(&content);
        Self { id, name, path: None, content, line_starts }
    }

    /// Creates a new source file with the given id, name, path, and content.
    #[must_use]
    pub fn with_path(id: FileId, name: String, path: PathBuf, content: String) -> Self {
        let line_starts = Self::compute_line_starts(&content);
        Self { id, name, path: Some(path), content, line_starts }
    }

    /// Computes the byte offsets of all line starts in the content.
    fn compute_line_starts(content: &str) -> Vec<usize> {
        let mut line_starts = vec![0]; // First line always starts at byte 0

        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        line_starts
    }

    /// Returns the byte at the given offset, or `None` past the end.
    ///
    /// The range resolver uses this to step over whitespace between raw
    /// tokens without materializing substrings.
    #[must_use]
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.content.as_bytes().get(offset).copied()
    }

    /// Converts a byte offset to a [`Position`].
    ///
    /// Uses binary search on the `line_starts` array to efficiently find the
    /// line number.
    ///
    /// ## Panics
    ///
    /// Panics if the byte offset is greater than the length of the file's
    /// content.
    #[must_use]
    pub fn position_from_offset(&self, byte_offset: usize) -> Position {
        assert!(
            byte_offset <= self.content.len(),
            "byte offset {} out of range for file with length {}",
            byte_offset,
            self.content.len()
        );

        match self.line_starts.binary_search(&byte_offset) {
            // Exact match means it's at the start of a line
            Ok(line) => Position::new(line + 1, 1, byte_offset),

            // No exact match, i is the insertion point (so we're on line i-1)
            Err(line) => {
                let line = line - 1;
                let line_start_offset = self.line_starts[line];
                let column = byte_offset - line_start_offset + 1;

                Position::new(line + 1, column, byte_offset)
            }
        }
    }

    /// Returns the text at the given span.
    ///
    /// ## Panics
    ///
    /// Panics if the span's range is invalid for this file.
    #[must_use]
    pub fn text_at_span(&self, span: Span) -> &str { &self.content[span.start..span.end] }
}

/// A manager for source files.
///
/// The `SourceManager` keeps track of every file that took part in one
/// translation unit and assigns unique [`FileId`]s to them. The indexer
/// treats it as a shared read-only collaborator: it answers which file a
/// location lives in, hands out character data for whitespace skipping, and
/// renders the printable locations embedded in node identities.
#[derive(Debug, Default, Clone)]
pub struct SourceManager {
    /// Map from `FileId` to `SourceFile`
    files: FxHashMap<FileId, SourceFile>,
    /// Next available file id
    next_id: usize,
}

impl SourceManager {
    /// Creates a new empty `SourceManager`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: FxHashMap::default(),
            next_id: 1, // Start from 1, reserve 0 for dummy locations
        }
    }

    /// Adds a new source file and returns its `FileId`.
    pub fn add_file(&mut self, name: String, content: String) -> FileId {
        let id = FileId::new(self.next_id);
        self.next_id += 1;

        let file = SourceFile::new(id, name, content);
        drop(self.files.insert(id, file));

        id
    }

    /// Adds a new source file with a path and returns its `FileId`.
    pub fn add_file_with_path(&mut self, name: String, path: PathBuf, content: String) -> FileId {
        let id = FileId::new(self.next_id);
        self.next_id += 1;

        let file = SourceFile::with_path(id, name, path, content);
        drop(self.files.insert(id, file));

        id
    }

    /// Returns the source file with the given id, if it exists.
    #[must_use]
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> { self.files.get(&id) }

    /// Returns the byte at the given offset in the given file.
    #[must_use]
    pub fn byte_at(&self, file_id: FileId, offset: usize) -> Option<u8> {
        self.get_file(file_id).and_then(|file| file.byte_at(offset))
    }

    /// Returns the position corresponding to the given byte offset.
    #[must_use]
    pub fn position_from_offset(&self, file_id: FileId, byte_offset: usize) -> Option<Position> {
        self.get_file(file_id).map(|file| file.position_from_offset(byte_offset))
    }

    /// Returns the text at the given span for the given file.
    #[must_use]
    pub fn text_at_span(&self, file_id: FileId, span: Span) -> Option<&str> {
        self.get_file(file_id).map(|file| file.text_at_span(span))
    }

    /// Renders the printable form of a file location.
    ///
    /// This is the `file:<id>@<offset>` rendering embedded in node-identity
    /// signatures; it must stay stable across runs over the same input set.
    #[must_use]
    pub fn display_location(&self, file_id: FileId, offset: usize) -> String {
        format!("{file_id}@{offset}")
    }
}

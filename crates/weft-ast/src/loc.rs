//! Source locations, including macro-expansion locations.
//!
//! A [`Loc`] is either invalid, a real position in a source file, or a
//! position produced by macro expansion. Macro locations are records in the
//! owning [`crate::ast::Ast`]; each keeps its caller-visible file position,
//! its immediate macro caller, and whether the expansion came from a macro
//! argument. That is exactly the information the indexer's range resolution
//! needs to decide whether a name inside an expansion can be anchored to
//! source text.

use std::fmt;

use weft_source::types::FileId;

/// A position in an actual source file: file id plus byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileLoc {
    /// The file containing the position.
    pub file: FileId,
    /// Byte offset from the start of the file.
    pub offset: usize,
}

impl FileLoc {
    /// Creates a new file location.
    #[must_use]
    pub const fn new(file: FileId, offset: usize) -> Self { Self { file, offset } }

    /// Returns this location advanced by `delta` bytes.
    #[must_use]
    pub const fn with_offset(self, delta: usize) -> Self {
        Self { file: self.file, offset: self.offset + delta }
    }
}

impl fmt::Display for FileLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.file, self.offset)
    }
}

/// Identifier of a macro-expansion record in the owning AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacroId(u32);

impl MacroId {
    /// Creates a new `MacroId` with the given index.
    #[must_use]
    pub const fn new(index: u32) -> Self { Self(index) }

    /// Returns the index of this id.
    #[must_use]
    pub const fn index(&self) -> usize { self.0 as usize }
}

/// A record describing one macro-expansion location.
///
/// The chain of `caller` links ends at a file location: following it answers
/// "where in the source did this expansion ultimately come from".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroLoc {
    /// The caller-visible location in the file where the expansion happened.
    pub expansion: FileLoc,
    /// The location of the immediate macro caller.
    pub caller: Loc,
    /// Whether this location was produced by expanding a macro argument.
    pub from_macro_arg: bool,
}

/// A source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loc {
    /// Not a location at all. Entities synthesized by the compiler carry
    /// invalid locations.
    Invalid,
    /// A position in an actual source file.
    File(FileLoc),
    /// A position produced by macro expansion.
    Macro(MacroId),
}

impl Loc {
    /// Creates a file location.
    #[must_use]
    pub const fn file(file: FileId, offset: usize) -> Self { Self::File(FileLoc::new(file, offset)) }

    /// Returns true unless this is [`Loc::Invalid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool { !matches!(self, Self::Invalid) }

    /// Returns true if this is a real file position.
    #[must_use]
    pub const fn is_file(&self) -> bool { matches!(self, Self::File(_)) }

    /// Returns true if this position was produced by macro expansion.
    #[must_use]
    pub const fn is_macro(&self) -> bool { matches!(self, Self::Macro(_)) }

    /// Returns the file location if this is one.
    #[must_use]
    pub const fn as_file(&self) -> Option<FileLoc> {
        match self {
            Self::File(fl) => Some(*fl),
            Self::Invalid | Self::Macro(_) => None,
        }
    }
}

/// A source range: a pair of locations.
///
/// Ranges are half-open over byte offsets when both endpoints are file
/// locations in the same file. A range whose `begin` is invalid is an
/// invalid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    /// Start of the range.
    pub begin: Loc,
    /// End of the range (exclusive).
    pub end: Loc,
}

impl SourceRange {
    /// Creates a new range from two locations.
    #[must_use]
    pub const fn new(begin: Loc, end: Loc) -> Self { Self { begin, end } }

    /// Creates an invalid range.
    #[must_use]
    pub const fn invalid() -> Self { Self { begin: Loc::Invalid, end: Loc::Invalid } }

    /// Creates a zero-width range at the given location.
    #[must_use]
    pub const fn point(loc: Loc) -> Self { Self { begin: loc, end: loc } }

    /// Creates a range between two byte offsets of one file.
    #[must_use]
    pub const fn in_file(file: FileId, start: usize, end: usize) -> Self {
        Self { begin: Loc::file(file, start), end: Loc::file(file, end) }
    }

    /// Returns true if the start of the range is a valid location.
    #[must_use]
    pub const fn is_valid(&self) -> bool { self.begin.is_valid() }

    /// Returns true if this range covers no bytes.
    ///
    /// Ranges with non-file endpoints never cover bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match (self.begin.as_file(), self.end.as_file()) {
            (Some(b), Some(e)) => b == e,
            _ => true,
        }
    }
}

impl Default for SourceRange {
    fn default() -> Self { Self::invalid() }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.begin, self.end) {
            (Loc::File(b), Loc::File(e)) => write!(f, "{b}-{}", e.offset),
            _ => write!(f, "<unanchored>"),
        }
    }
}

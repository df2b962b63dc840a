//! Range resolution: from raw locations to meaningful source spans.
//!
//! A declaration's location points at one token, but the span a reader
//! would select is often wider: `operator[]` spans three tokens, `~A`
//! spans two, and a name inside a macro expansion may have no selectable
//! span at all. The resolver computes those spans with raw lexing only, so
//! macro expansion never changes what gets anchored.

use weft_ast::ast::Ast;
use weft_ast::lexer::TokenKind;
use weft_ast::loc::{FileLoc, Loc, SourceRange};
use weft_ast::nodes::{DeclId, DeclName};

/// Resolves source spans for names, operators, destructors and macro
/// expansion sites.
#[derive(Debug, Clone, Copy)]
pub struct RangeResolver<'ast> {
    ast: &'ast Ast,
}

impl<'ast> RangeResolver<'ast> {
    /// Creates a resolver over one AST.
    #[must_use]
    pub const fn new(ast: &'ast Ast) -> Self { Self { ast } }

    /// Advances a location past whitespace characters.
    ///
    /// Raw lexing fails when given a location between tokens, so callers
    /// skip whitespace first.
    #[must_use]
    pub fn skip_whitespace(&self, mut loc: FileLoc) -> FileLoc {
        while let Some(byte) = self.ast.source_manager().byte_at(loc.file, loc.offset) {
            if !byte.is_ascii_whitespace() {
                break;
            }
            loc = loc.with_offset(1);
        }
        loc
    }

    /// Returns the span of the single token starting at `start`.
    #[must_use]
    pub fn range_for_single_token(&self, start: FileLoc) -> SourceRange {
        match self.ast.end_of_token(Loc::File(start)) {
            end @ Loc::File(_) => SourceRange::new(Loc::File(start), end),
            _ => SourceRange::point(Loc::File(start)),
        }
    }

    /// Consumes one token of the expected kind, answering the location
    /// just past it.
    ///
    /// Lexing is raw, so alternate-token spellings such as `compl` are
    /// mapped back to their canonical kinds through the identifier table
    /// before comparison.
    #[must_use]
    pub fn consume_token(&self, start: FileLoc, expected: TokenKind) -> Option<FileLoc> {
        let token = self.ast.raw_token_at(start)?;
        let actual = self.ast.canonical_token_kind(start, &token);
        (actual == expected).then(|| FileLoc::new(start.file, token.span.end))
    }

    /// Extends an `operator` keyword range through the operator's symbol.
    ///
    /// There are two kinds of operators. For a conversion operator (or an
    /// identifier-like operator such as `operator new`) the returned range
    /// stays on the keyword: the type-visiting code adds links from the
    /// type itself. For a symbolic operator the range is extended through
    /// the symbol, including the matching `)` or `]` of `operator()` and
    /// `operator[]` when present.
    #[must_use]
    pub fn range_for_operator_name(&self, operator_token_range: SourceRange) -> SourceRange {
        let Some(end) = operator_token_range.end.as_file() else {
            return operator_token_range;
        };
        let pos = self.skip_whitespace(end);
        let Some(token2) = self.ast.raw_token_at(pos) else {
            return operator_token_range;
        };
        let token2_end = FileLoc::new(pos.file, token2.span.end);
        let Some(spelling) = self.ast.token_spelling(pos, &token2) else {
            return operator_token_range;
        };
        if spelling == "::"
            || spelling.bytes().next().is_some_and(weft_ast::lexer::is_identifier_body)
        {
            // The token after `operator` is an identifier, keyword, or the
            // scope resolution operator: presumably a conversion operator,
            // so the keyword range is all we link from here.
            return operator_token_range;
        }
        if token2.kind == TokenKind::LParen || token2.kind == TokenKind::LSquare {
            let pos3 = self.skip_whitespace(token2_end);
            let Some(token3) = self.ast.raw_token_at(pos3) else {
                log::warn!("failed to lex a token after operator {spelling}");
                return operator_token_range;
            };
            if token3.kind == TokenKind::RParen || token3.kind == TokenKind::RSquare {
                let end = FileLoc::new(pos3.file, token3.span.end);
                return SourceRange::new(operator_token_range.begin, Loc::File(end));
            }
            return operator_token_range;
        }
        SourceRange::new(operator_token_range.begin, Loc::File(token2_end))
    }

    /// Returns the span of the name of a declaration.
    ///
    /// For a destructor spelled `~T` (or `compl T`), the span covers both
    /// tokens when the second token matches the declaration's class name.
    #[must_use]
    pub fn range_for_name_of_declaration(&self, decl: DeclId) -> SourceRange {
        let decl_node = self.ast.decl(decl);
        let start = decl_node.loc;
        if !start.is_valid() {
            return SourceRange::invalid();
        }
        if let (Some(start_fl), DeclName::Destructor(_)) = (start.as_file(), &decl_node.name)
            && let Some(after_tilde) = self.consume_token(start_fl, TokenKind::Tilde)
            && let Some(second) = self.ast.raw_token_at(after_tilde)
            && second.kind == TokenKind::RawIdentifier
            && let Some(spelling) = self.ast.token_spelling(after_tilde, &second)
            && format!("~{spelling}") == decl_node.name.as_string()
        {
            let end = FileLoc::new(start_fl.file, second.span.end);
            return SourceRange::new(start, Loc::File(end));
        }
        self.range_for_entity_at(start)
    }

    /// Returns the span of the entity whose name starts at `start`.
    ///
    /// File locations span the token there (widened for `operator` names).
    /// Macro locations collapse to the caller-visible file position: a
    /// top-level macro argument that is not itself a macro keeps its token
    /// span; anything else becomes a zero-width point, for which no source
    /// link will be created.
    #[must_use]
    pub fn range_for_entity_at(&self, start: Loc) -> SourceRange {
        match start {
            Loc::Invalid => SourceRange::invalid(),
            Loc::File(fl) => {
                let token_range = self.range_for_single_token(fl);
                let is_operator = self
                    .ast
                    .raw_token_at(fl)
                    .and_then(|token| self.ast.token_spelling(fl, &token))
                    .is_some_and(|spelling| spelling == "operator");
                if is_operator {
                    self.range_for_operator_name(token_range)
                } else {
                    token_range
                }
            }
            Loc::Macro(_) => {
                let Some(file_loc) = self.ast.file_loc(start) else {
                    return SourceRange::invalid();
                };
                if self.ast.is_top_level_non_macro_macro_arg(start) {
                    self.range_for_single_token(file_loc)
                } else {
                    SourceRange::point(Loc::File(file_loc))
                }
            }
        }
    }
}

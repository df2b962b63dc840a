//! The parent index: declaration → (parent, child ordinal).
//!
//! Identity construction walks from a declaration up to the translation
//! unit; the AST stores children, so the map inverts that in one pre-order
//! pass. The map is vector-valued because a tree produced by a front end
//! that traverses templates through their instantiations may register a
//! node under more than one parent; identity walks always take the first
//! entry, which keeps repeated traversals deterministic within one
//! compilation.

use rustc_hash::FxHashMap;
use weft_ast::ast::Ast;
use weft_ast::nodes::DeclId;

/// One parent of a declaration, with the declaration's ordinal among the
/// parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedParent {
    /// The parent declaration.
    pub parent: DeclId,
    /// The child's ordinal in the parent, assigned in traversal order.
    pub index: u32,
}

/// Map from each declaration to its parents.
#[derive(Debug, Default)]
pub struct ParentMap {
    parents: FxHashMap<DeclId, Vec<IndexedParent>>,
}

impl ParentMap {
    /// Builds the map with one pre-order walk from the translation-unit
    /// root.
    #[must_use]
    pub fn build(ast: &Ast) -> Self {
        let mut parents: FxHashMap<DeclId, Vec<IndexedParent>> = FxHashMap::default();
        let mut stack = vec![ast.root()];
        while let Some(decl) = stack.pop() {
            for (index, child) in ast.decl_children(decl).into_iter().enumerate() {
                let entry = IndexedParent {
                    parent: decl,
                    index: u32::try_from(index).unwrap_or(u32::MAX),
                };
                parents.entry(child).or_default().push(entry);
                stack.push(child);
            }
        }
        Self { parents }
    }

    /// Returns the parents of a declaration; empty for the root and for
    /// declarations no parent lists.
    #[must_use]
    pub fn parents(&self, decl: DeclId) -> &[IndexedParent] {
        self.parents.get(&decl).map_or(&[], Vec::as_slice)
    }

    /// Returns the first recorded parent, by convention the one identity
    /// walks follow.
    #[must_use]
    pub fn first_parent(&self, decl: DeclId) -> Option<IndexedParent> {
        self.parents(decl).first().copied()
    }
}

#[cfg(test)]
mod tests {
    use weft_ast::builder::AstBuilder;
    use weft_ast::loc::Loc;
    use weft_ast::nodes::{DeclKind, DeclName, NamespaceDecl, Qualifiers, QualType, VarDecl};

    use super::ParentMap;

    #[test]
    fn ordinals_follow_child_order() {
        let mut builder = AstBuilder::new();
        let int_ty = builder.builtin_type("int");
        let var = |builder: &mut AstBuilder, name: &str| {
            builder.decl(
                DeclName::Ident(name.to_string()),
                Loc::Invalid,
                DeclKind::Var(VarDecl {
                    ty: QualType::new(int_ty, Qualifiers::empty()),
                    type_loc: None,
                    parameter: false,
                    is_definition: true,
                }),
            )
        };
        let a = var(&mut builder, "a");
        let b = var(&mut builder, "b");
        builder.add_top_level(a);
        builder.add_top_level(b);
        let ast = builder.finish();

        let map = ParentMap::build(&ast);
        let a_parent = map.first_parent(a).expect("a has a parent");
        let b_parent = map.first_parent(b).expect("b has a parent");

        assert_eq!(a_parent.parent, ast.root());
        assert_eq!(a_parent.index, 0);
        assert_eq!(b_parent.index, 1);
    }

    #[test]
    fn nested_declarations_chain_to_the_root() {
        let mut builder = AstBuilder::new();
        let int_ty = builder.builtin_type("int");
        let inner = builder.decl(
            DeclName::Ident("x".to_string()),
            Loc::Invalid,
            DeclKind::Var(VarDecl {
                ty: QualType::new(int_ty, Qualifiers::empty()),
                type_loc: None,
                parameter: false,
                is_definition: true,
            }),
        );
        let ns = builder.decl(
            DeclName::Ident("n".to_string()),
            Loc::Invalid,
            DeclKind::Namespace(NamespaceDecl { decls: vec![inner] }),
        );
        builder.add_top_level(ns);
        let ast = builder.finish();

        let map = ParentMap::build(&ast);
        assert_eq!(map.first_parent(inner).map(|p| p.parent), Some(ns));
        assert_eq!(map.first_parent(ns).map(|p| p.parent), Some(ast.root()));
        assert!(map.parents(ast.root()).is_empty(), "the root has no parents");
    }
}

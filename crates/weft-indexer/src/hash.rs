//! Semantic content hashes.
//!
//! These hashes unify entities across translation units: two definitions of
//! one record in different translation units hash equally, so their node
//! ids collide exactly as the one-definition rule says they should. They
//! are content hashes for id disambiguation, nothing security-grade.
//!
//! Record and enum hashes are XOR folds over member-name hashes. XOR is
//! deliberate: member order in the AST is not part of the identity of a
//! record's member set, and a commutative fold makes permutations collide
//! correctly. Any replacement must preserve commutativity.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use weft_ast::nodes::{DeclId, DeclKind, QualType, TemplateArg};

use crate::observer::GraphObserver;
use crate::walk::Indexer;

/// 64 characters that can appear in identifiers (plus `$`).
const SAFE_ENCODING_ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyz0123456789_$ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Hashes a string deterministically.
///
/// `FxHasher` is stable across runs and platforms, which the determinism
/// of node ids depends on.
#[must_use]
pub fn string_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Renders a hash into the identifier-safe alphabet, without padding.
///
/// Zero renders as the empty string.
#[must_use]
pub fn hash_to_string(hash: u64) -> String {
    if hash == 0 {
        return String::new();
    }
    let mut remaining = hash;
    let mut digits = Vec::new();
    while remaining != 0 {
        digits.push(SAFE_ENCODING_ALPHABET[(remaining & 0x3f) as usize]);
        remaining >>= 6;
    }
    digits.reverse();
    digits.iter().map(|&byte| char::from(byte)).collect()
}

impl<O: GraphObserver> Indexer<'_, '_, O> {
    /// Hashes a type by its canonical spelling.
    pub(crate) fn semantic_hash_qual_type(&self, ty: QualType) -> u64 {
        string_hash(&self.ast.type_spelling(ty))
    }

    /// Hashes an enum definition: an XOR fold over its enumerator names.
    pub(crate) fn semantic_hash_enum(&self, decl: DeclId) -> u64 {
        let DeclKind::Enum(enum_decl) = &self.ast.decl(decl).kind else { return 0 };
        let mut hash = 0u64;
        for &enumerator in &enum_decl.enumerators {
            if let Some(name) = self.ast.decl(enumerator).name.identifier() {
                hash ^= string_hash(name);
            }
        }
        hash
    }

    /// Hashes a record definition: an XOR fold over its named members,
    /// folded with the describing template's hash and, for
    /// specializations, the specialized type's hash.
    pub(crate) fn semantic_hash_record(&mut self, decl: DeclId) -> u64 {
        let ast = self.ast;
        let DeclKind::Record(record) = &ast.decl(decl).kind else { return 0 };
        let mut hash = 0u64;
        for &member in &record.members {
            if let Some(name) = ast.decl(member).name.identifier() {
                hash ^= string_hash(name);
            }
        }
        if let Some(template) = record.described_template {
            hash ^= self.semantic_hash_template_decl(template);
        }
        if record.specialization.is_some()
            && let Some(tag) = ast.tag_type(decl)
        {
            hash ^= self.semantic_hash_qual_type(tag);
        }
        hash
    }

    /// Hashes a template declaration through its node id.
    pub(crate) fn semantic_hash_template_decl(&mut self, decl: DeclId) -> u64 {
        string_hash(self.build_node_id_for_decl(decl).as_str())
    }

    /// Hashes one template argument.
    ///
    /// ## Panics
    ///
    /// Hashing has no error channel, so with `ignore_unimplemented` off an
    /// argument kind that cannot be hashed is fatal.
    pub(crate) fn semantic_hash_template_arg(&mut self, arg: &TemplateArg) -> u64 {
        match arg {
            // Arbitrary constant for the hash of a null argument.
            TemplateArg::Null => 0x1010_1010_0101_0101,
            TemplateArg::Type(ty) => self.semantic_hash_qual_type(*ty),
            other => {
                assert!(
                    self.options.ignore_unimplemented,
                    "no semantic hash for {}",
                    other.kind_name()
                );
                self.count_unimplemented(other.kind_name());
                0
            }
        }
    }

    /// Hashes a template argument list: an XOR fold over the arguments.
    pub(crate) fn semantic_hash_template_args(&mut self, args: &[TemplateArg]) -> u64 {
        let mut hash = 0u64;
        for arg in args {
            hash ^= self.semantic_hash_template_arg(arg);
        }
        hash
    }
}

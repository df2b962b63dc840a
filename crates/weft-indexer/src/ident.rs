//! Identity construction: lookup names and node ids.
//!
//! A [`NameId`] is the abstract lookup name of a declaration: the path of
//! name tokens from the translation-unit root down to it, plus a name
//! equivalence class. A [`NodeId`] starts from the printable name and adds
//! the disambiguators that keep distinct declarations apart while letting
//! the one-definition rule unify identical definitions across translation
//! units: template barriers, implicit-instantiation parents, template
//! argument hashes, body hashes, and finally a source location.

use weft_ast::nodes::{DeclId, DeclKind, DeclName, FunctionTemplateInfo, RecordKeyword};

use crate::hash::hash_to_string;
use crate::observer::{GraphObserver, NameEqClass, NameId, NodeId};
use crate::walk::Indexer;

impl<O: GraphObserver> Indexer<'_, '_, O> {
    /// Returns the name equivalence class for a declaration.
    ///
    /// Equivalence classes see through templates: the class of a class
    /// template is the class of its templated record.
    pub(crate) fn name_eq_class_for_decl(&self, decl: DeclId) -> NameEqClass {
        match &self.ast.decl(decl).kind {
            DeclKind::Record(record) => match record.keyword {
                RecordKeyword::Struct | RecordKeyword::Class => NameEqClass::Class,
                RecordKeyword::Union => NameEqClass::Union,
            },
            DeclKind::ClassTemplate(template) => self.name_eq_class_for_decl(template.templated),
            _ => NameEqClass::None,
        }
    }

    /// Builds the abstract lookup name for a declaration.
    ///
    /// Path tokens, chosen per ancestor: the identifier when there is one;
    /// `@` for anonymous namespaces (collapsing them into one namespace is
    /// not strictly what the standard says, but it is what lookup wants);
    /// an `OO#` sentinel for overloaded operators; the child ordinal in
    /// the parent otherwise. Class templates are skipped on the way so a
    /// templated record is named `C`, not `C:C`.
    pub fn build_name_id_for_decl(&mut self, decl: DeclId) -> NameId {
        let ast = self.ast;
        let eq_class = self.name_eq_class_for_decl(decl);
        let mut tokens: Vec<String> = Vec::new();
        let mut current = decl;
        loop {
            if matches!(ast.decl(current).kind, DeclKind::TranslationUnit(_)) {
                break;
            }
            let Some(parent) = self.parent_map().first_parent(current) else {
                // Don't lose implicit declarations that still carry names.
                if ast.decl(current).implicit
                    && let Some(name) = ast.decl(current).name.identifier()
                {
                    tokens.push(name.to_string());
                }
                break;
            };
            // We would rather name `template <...> class C` as C, not C:C,
            // while still naming the template itself when asked directly.
            if !tokens.is_empty() && matches!(ast.decl(current).kind, DeclKind::ClassTemplate(_)) {
                current = parent.parent;
                continue;
            }
            let token = match &ast.decl(current).name {
                DeclName::Ident(name) if !name.is_empty() => name.clone(),
                DeclName::Operator(op) => format!("OO#{}", op.sentinel()),
                _ if matches!(ast.decl(current).kind, DeclKind::Namespace(_)) => "@".to_string(),
                _ => parent.index.to_string(),
            };
            tokens.push(token);
            current = parent.parent;
        }
        tokens.reverse();
        NameId::new(tokens.join(":"), eq_class)
    }

    /// Builds the graph identity for a declaration.
    ///
    /// Stability contract: the id depends only on the declaration's path
    /// from the root, the template-argument hashes of enclosing implicit
    /// instantiations, the body or definition marker where applicable, and
    /// the source location. Unrelated code elsewhere in the translation
    /// unit does not change it.
    pub fn build_node_id_for_decl(&mut self, decl: DeclId) -> NodeId {
        let ast = self.ast;
        let mut signature = self.build_name_id_for_decl(decl).to_string();

        // Disambiguate nodes underneath template instances. Once the first
        // enclosing implicit instantiation has been folded in we can stop:
        // its own id already encodes everything above it.
        let mut current = decl;
        loop {
            if matches!(ast.decl(current).kind, DeclKind::TranslationUnit(_)) {
                break;
            }
            let Some(parent) = self.parent_map().first_parent(current) else { break };
            match &ast.decl(current).kind {
                DeclKind::ClassTemplate(_)
                | DeclKind::FunctionTemplate(_)
                | DeclKind::VarTemplate(_)
                | DeclKind::TemplateTemplateParm(_) => {
                    // Keep type abstraction ids apart from the ids of what
                    // they abstract.
                    if current != decl {
                        signature.push('#');
                    }
                }
                DeclKind::Record(record) => {
                    if let Some(spec) = &record.specialization
                        && spec.implicit
                    {
                        if current != decl {
                            let context = self.build_node_id_for_decl(current);
                            signature.push('#');
                            signature.push_str(context.as_str());
                            break;
                        }
                        let hash = self.semantic_hash_template_args(&spec.args);
                        signature.push('#');
                        signature.push_str(&hash_to_string(hash));
                    }
                }
                DeclKind::Function(func) => {
                    if let FunctionTemplateInfo::Specialization(info) = &func.template {
                        if current != decl {
                            let context = self.build_node_id_for_decl(current);
                            signature.push('#');
                            signature.push_str(context.as_str());
                            break;
                        }
                        let hash = self.semantic_hash_template_args(&info.args);
                        signature.push('#');
                        signature.push_str(&hash_to_string(hash));
                    }
                }
                _ => {}
            }
            current = parent.parent;
        }

        // Body hashes unify otherwise unrelated records and enums across
        // translation units, so definitions carry no location suffix.
        match &ast.decl(decl).kind {
            DeclKind::Record(_) if ast.definition_of(decl) == Some(decl) => {
                let hash = self.semantic_hash_record(decl);
                signature.push('#');
                signature.push_str(&hash_to_string(hash));
                return NodeId::new(signature);
            }
            DeclKind::Enum(_) if ast.definition_of(decl) == Some(decl) => {
                let hash = self.semantic_hash_enum(decl);
                signature.push('#');
                signature.push_str(&hash_to_string(hash));
                return NodeId::new(signature);
            }
            DeclKind::Function(func) if func.is_definition => signature.push_str("#D"),
            DeclKind::Var(var) if var.is_definition => signature.push_str("#D"),
            _ => {}
        }

        signature.push('@');
        signature.push_str(&ast.display_location(ast.decl(decl).loc));
        NodeId::new(signature)
    }

    /// Builds a node id variant for declarations that underlie two graph
    /// nodes, such as the body of a templated declaration next to the
    /// abstraction binding its parameters.
    pub fn build_node_id_for_decl_with_index(&mut self, decl: DeclId, index: u32) -> NodeId {
        let base = self.build_node_id_for_decl(decl);
        NodeId::new(format!("{base}.{index}"))
    }

    /// Builds the callable id for a declaration.
    ///
    /// Every declaration of one function shares one callable node no
    /// matter where it appears; the post-processor picks actual targets
    /// with linkage information.
    pub fn build_node_id_for_callable_decl(&mut self, decl: DeclId) -> NodeId {
        let ast = self.ast;
        let name = self.build_name_id_for_decl(decl);
        let mut signature = name.to_string();
        if let DeclKind::Function(func) = &ast.decl(decl).kind {
            let hash = self.semantic_hash_qual_type(func.ty);
            signature.push('#');
            signature.push_str(&hash.to_string());
        }
        signature.push_str("#callable");
        NodeId::new(signature)
    }
}

//! Structural types, type spellings, and template argument nodes.
//!
//! Structural [`Type`]s are interned by the builder: structurally identical
//! types share one [`crate::nodes::TypeId`], which is what the indexer's
//! type-node cache keys on. Each written occurrence of a type is a separate
//! [`TypeLoc`] tree mirroring the type's structure and carrying source
//! ranges; synthesized types have no type-loc at all.

use bitflags::bitflags;

use crate::loc::{Loc, SourceRange};
use crate::nodes::{DeclId, NnsId, TypeId, TypeLocId};

bitflags! {
    /// CVR qualifier bits carried on a type reference.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Qualifiers: u8 {
        /// `const`
        const CONST = 1 << 0;
        /// `restrict`
        const RESTRICT = 1 << 1;
        /// `volatile`
        const VOLATILE = 1 << 2;
    }
}

/// A type reference: a structural type plus local CVR qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualType {
    /// The structural type.
    pub ty: TypeId,
    /// Local qualifier bits.
    pub quals: Qualifiers,
}

impl QualType {
    /// Creates a qualified type reference.
    #[must_use]
    pub const fn new(ty: TypeId, quals: Qualifiers) -> Self { Self { ty, quals } }

    /// Creates an unqualified type reference.
    #[must_use]
    pub const fn unqualified(ty: TypeId) -> Self { Self { ty, quals: Qualifiers::empty() } }

    /// Returns this reference with all local qualifiers dropped.
    #[must_use]
    pub const fn without_quals(self) -> Self { Self { ty: self.ty, quals: Qualifiers::empty() } }
}

/// A template name: what stands before the `<...>` of a specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateName {
    /// A resolved template declaration.
    Template(DeclId),
    /// An overload set of templates.
    Overloaded,
    /// A qualified template name.
    Qualified,
    /// A dependent template name.
    Dependent,
    /// A substituted template template parameter.
    SubstTemplateTemplateParm,
    /// A substituted template template parameter pack.
    SubstTemplateTemplateParmPack,
}

impl TemplateName {
    /// Returns the stable kind name used in unimplemented-construct
    /// reporting.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Template(_) => "TemplateName::Template",
            Self::Overloaded => "TemplateName::Overloaded",
            Self::Qualified => "TemplateName::Qualified",
            Self::Dependent => "TemplateName::Dependent",
            Self::SubstTemplateTemplateParm => "TemplateName::SubstTemplateTemplateParm",
            Self::SubstTemplateTemplateParmPack => "TemplateName::SubstTemplateTemplateParmPack",
        }
    }
}

/// A fully resolved template argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateArg {
    /// An empty argument.
    Null,
    /// A type argument.
    Type(QualType),
    /// A declaration argument.
    Declaration,
    /// A null pointer argument.
    NullPtr,
    /// An integral argument.
    Integral(i128),
    /// A template argument.
    Template(TemplateName),
    /// A template pack expansion.
    TemplateExpansion,
    /// An unevaluated expression argument.
    Expression,
    /// An argument pack.
    Pack,
}

impl TemplateArg {
    /// Returns the stable kind name used in unimplemented-construct
    /// reporting.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "TemplateArgument::Null",
            Self::Type(_) => "TemplateArgument::Type",
            Self::Declaration => "TemplateArgument::Declaration",
            Self::NullPtr => "TemplateArgument::NullPtr",
            Self::Integral(_) => "TemplateArgument::Integral",
            Self::Template(_) => "TemplateArgument::Template",
            Self::TemplateExpansion => "TemplateArgument::TemplateExpansion",
            Self::Expression => "TemplateArgument::Expression",
            Self::Pack => "TemplateArgument::Pack",
        }
    }
}

/// A template argument as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateArgLoc {
    /// A spelled type argument.
    Type(TypeLocId),
    /// A spelled template argument with the template name's location.
    Template(TemplateName, Loc),
    /// Any other argument kind; carries the resolved argument.
    Other(TemplateArg),
}

/// Type kinds the indexer recognizes but does not lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedType {
    /// `_Complex` types.
    Complex,
    /// Block pointers.
    BlockPointer,
    /// Pointers to members.
    MemberPointer,
    /// Arrays without a bound.
    IncompleteArray,
    /// Variable-length arrays.
    VariableArray,
    /// Dependently sized arrays.
    DependentSizedArray,
    /// Vector types.
    Vector,
    /// Extended vector types.
    ExtVector,
    /// `_Atomic` types.
    Atomic,
    /// `typeof(expr)`.
    TypeOfExpr,
    /// `typeof(type)`.
    TypeOf,
    /// `decltype(expr)`.
    Decltype,
    /// `auto` before deduction.
    Auto,
    /// Unexpanded parameter packs.
    PackExpansion,
}

impl UnsupportedType {
    /// Returns the stable kind name used in unimplemented-construct
    /// reporting.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Complex => "Type::Complex",
            Self::BlockPointer => "Type::BlockPointer",
            Self::MemberPointer => "Type::MemberPointer",
            Self::IncompleteArray => "Type::IncompleteArray",
            Self::VariableArray => "Type::VariableArray",
            Self::DependentSizedArray => "Type::DependentSizedArray",
            Self::Vector => "Type::Vector",
            Self::ExtVector => "Type::ExtVector",
            Self::Atomic => "Type::Atomic",
            Self::TypeOfExpr => "Type::TypeOfExpr",
            Self::TypeOf => "Type::TypeOf",
            Self::Decltype => "Type::Decltype",
            Self::Auto => "Type::Auto",
            Self::PackExpansion => "Type::PackExpansion",
        }
    }
}

/// The structure of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A builtin type, by spelling (`int`, `void`, ...).
    Builtin(String),
    /// A pointer type.
    Pointer(QualType),
    /// An lvalue reference type.
    LValueReference(QualType),
    /// An rvalue reference type.
    RValueReference(QualType),
    /// A constant-size array type.
    ConstantArray {
        /// The element type.
        element: QualType,
        /// The array bound.
        size: u64,
    },
    /// A function type with a prototype.
    FunctionProto {
        /// The result type.
        result: QualType,
        /// Parameter types, in order.
        params: Vec<QualType>,
        /// Whether the function is variadic.
        variadic: bool,
    },
    /// A K&R function type without a prototype.
    FunctionNoProto,
    /// A parenthesized type.
    Paren(QualType),
    /// A reference to a typedef or alias declaration.
    Typedef(DeclId),
    /// A reference to a record declaration.
    Record(DeclId),
    /// A reference to an enumeration declaration.
    Enum(DeclId),
    /// An elaborated type (`struct S`, `N::T`); transparent sugar.
    Elaborated(QualType),
    /// A template type parameter.
    TemplateTypeParm {
        /// Nesting depth of the owning parameter list.
        depth: u32,
        /// Index within the owning parameter list.
        index: u32,
        /// The parameter declaration, when the AST kept the link.
        decl: Option<DeclId>,
    },
    /// A template type parameter after substitution; records the spelling
    /// only, never canonical.
    SubstTemplateTypeParm {
        /// The type the parameter was replaced with.
        replacement: QualType,
    },
    /// A template specialization as written (`C<int>` before resolution to
    /// a record).
    TemplateSpecialization {
        /// The named template.
        template: TemplateName,
        /// The arguments, in order.
        args: Vec<TemplateArg>,
    },
    /// The class name injected into its own definition.
    InjectedClassName(DeclId),
    /// A dependent qualified name (`T::U` with dependent `T`).
    DependentName {
        /// The qualifier chain.
        qualifier: NnsId,
        /// The terminal identifier.
        ident: String,
    },
    /// A type kind the indexer does not lower.
    Unsupported(UnsupportedType),
}

/// An interned structural type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// The structure of the type.
    pub kind: TypeKind,
    /// The canonical (fully desugared) type. Self-referential for types
    /// that are already canonical.
    pub canonical: TypeId,
}

/// The structure of one type spelling, mirroring [`TypeKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLocKind {
    /// A builtin type spelling.
    Builtin,
    /// A pointer spelling.
    Pointer {
        /// The pointee spelling.
        pointee: TypeLocId,
        /// The location of the `*`.
        star_loc: Loc,
    },
    /// An lvalue reference spelling.
    LValueReference {
        /// The referent spelling.
        referent: TypeLocId,
        /// The location of the `&`.
        amp_loc: Loc,
    },
    /// An rvalue reference spelling.
    RValueReference {
        /// The referent spelling.
        referent: TypeLocId,
        /// The location of the `&&`.
        amp_loc: Loc,
    },
    /// A constant-size array spelling.
    ConstantArray {
        /// The element spelling.
        element: TypeLocId,
    },
    /// A function prototype spelling.
    FunctionProto {
        /// The result spelling.
        result: TypeLocId,
        /// Parameter spellings, in order.
        params: Vec<TypeLocId>,
    },
    /// A K&R function type spelling.
    FunctionNoProto,
    /// A parenthesized spelling.
    Paren {
        /// The inner spelling.
        inner: TypeLocId,
    },
    /// A typedef reference spelling; leaf.
    Typedef,
    /// A record reference spelling; leaf.
    Record,
    /// An enumeration reference spelling; leaf.
    Enum,
    /// An elaborated spelling.
    Elaborated {
        /// The named inner spelling.
        named: TypeLocId,
    },
    /// A template type parameter spelling; leaf.
    TemplateTypeParm,
    /// A substituted template type parameter spelling; leaf.
    SubstTemplateTypeParm,
    /// A template specialization spelling.
    TemplateSpecialization {
        /// The arguments as written.
        args: Vec<TemplateArgLoc>,
    },
    /// An injected class name spelling; leaf.
    InjectedClassName,
    /// A dependent name spelling.
    DependentName {
        /// The location of the terminal identifier.
        name_loc: Loc,
    },
    /// A spelling of an unsupported type kind.
    Unsupported,
}

/// One written occurrence of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLoc {
    /// The type this occurrence spells.
    pub ty: QualType,
    /// The source range of the whole spelling; invalid for synthesized
    /// occurrences.
    pub range: SourceRange,
    /// The structure of the spelling.
    pub kind: TypeLocKind,
}

/// One segment of a nested-name-specifier chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NnsSegment {
    /// The segment's kind.
    pub kind: NnsSegmentKind,
    /// The location of the segment's own token.
    pub loc: Loc,
}

/// The kind of a nested-name-specifier segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NnsSegmentKind {
    /// A dependent identifier segment.
    Identifier(String),
    /// A type segment.
    TypeSpec(TypeLocId),
    /// A namespace segment.
    Namespace(DeclId),
    /// A namespace-alias segment.
    NamespaceAlias(DeclId),
    /// The global-scope `::` segment.
    Global,
    /// A `template`-qualified type segment.
    TypeSpecWithTemplate(TypeLocId),
}

impl NnsSegmentKind {
    /// Returns the stable kind name used in unimplemented-construct
    /// reporting.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Identifier(_) => "NestedNameSpecifier::Identifier",
            Self::TypeSpec(_) => "NestedNameSpecifier::TypeSpec",
            Self::Namespace(_) => "NestedNameSpecifier::Namespace",
            Self::NamespaceAlias(_) => "NestedNameSpecifier::NamespaceAlias",
            Self::Global => "NestedNameSpecifier::Global",
            Self::TypeSpecWithTemplate(_) => "NestedNameSpecifier::TypeSpecWithTemplate",
        }
    }
}

/// A nested-name-specifier chain with its source extent.
///
/// Segments are stored outermost first: for `A::B::C` the chain for the
/// qualifier `A::B::` holds `A` then `B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedNameLoc {
    /// The chain's segments, outermost first.
    pub segments: Vec<NnsSegment>,
    /// The location where the chain begins.
    pub begin: Loc,
    /// The location where the chain ends.
    pub end: Loc,
}

//! Declaration node types.
//!
//! One [`Decl`] per declaration in the translation unit, including the
//! implicit declarations produced by template instantiation. The kinds cover
//! exactly the surface the indexer consumes: tag types, callables,
//! variables, aliases, templates, and template parameters.

use crate::loc::Loc;
use crate::nodes::{DeclId, ExprId, QualType, TemplateArg, TemplateArgLoc, TypeLocId};

/// An overloaded operator kind.
///
/// The variant names double as the stable sentinels embedded in name paths
/// (`OO#Plus`, `OO#Call`, ...), so they must never be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `operator+`
    Plus,
    /// `operator-`
    Minus,
    /// `operator*`
    Star,
    /// `operator/`
    Slash,
    /// `operator%`
    Percent,
    /// `operator^`
    Caret,
    /// `operator&`
    Amp,
    /// `operator|`
    Pipe,
    /// `operator~`
    Tilde,
    /// `operator!`
    Exclaim,
    /// `operator=`
    Equal,
    /// `operator<`
    Less,
    /// `operator>`
    Greater,
    /// `operator==`
    EqualEqual,
    /// `operator!=`
    ExclaimEqual,
    /// `operator<=`
    LessEqual,
    /// `operator>=`
    GreaterEqual,
    /// `operator&&`
    AmpAmp,
    /// `operator||`
    PipePipe,
    /// `operator<<`
    LessLess,
    /// `operator>>`
    GreaterGreater,
    /// `operator++`
    PlusPlus,
    /// `operator--`
    MinusMinus,
    /// `operator,`
    Comma,
    /// `operator->`
    Arrow,
    /// `operator->*`
    ArrowStar,
    /// `operator()`
    Call,
    /// `operator[]`
    Subscript,
    /// `operator new`
    New,
    /// `operator delete`
    Delete,
    /// `operator new[]`
    ArrayNew,
    /// `operator delete[]`
    ArrayDelete,
}

impl OperatorKind {
    /// Returns the stable sentinel used in name paths.
    #[must_use]
    pub const fn sentinel(&self) -> &'static str {
        match self {
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Star => "Star",
            Self::Slash => "Slash",
            Self::Percent => "Percent",
            Self::Caret => "Caret",
            Self::Amp => "Amp",
            Self::Pipe => "Pipe",
            Self::Tilde => "Tilde",
            Self::Exclaim => "Exclaim",
            Self::Equal => "Equal",
            Self::Less => "Less",
            Self::Greater => "Greater",
            Self::EqualEqual => "EqualEqual",
            Self::ExclaimEqual => "ExclaimEqual",
            Self::LessEqual => "LessEqual",
            Self::GreaterEqual => "GreaterEqual",
            Self::AmpAmp => "AmpAmp",
            Self::PipePipe => "PipePipe",
            Self::LessLess => "LessLess",
            Self::GreaterGreater => "GreaterGreater",
            Self::PlusPlus => "PlusPlus",
            Self::MinusMinus => "MinusMinus",
            Self::Comma => "Comma",
            Self::Arrow => "Arrow",
            Self::ArrowStar => "ArrowStar",
            Self::Call => "Call",
            Self::Subscript => "Subscript",
            Self::New => "New",
            Self::Delete => "Delete",
            Self::ArrayNew => "ArrayNew",
            Self::ArrayDelete => "ArrayDelete",
        }
    }
}

/// The name of a declaration.
///
/// Not every declaration name is an identifier: destructors, conversion
/// functions and overloaded operators carry structured names, and anonymous
/// entities carry none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclName {
    /// An ordinary identifier.
    Ident(String),
    /// No name at all (anonymous namespaces, unnamed records).
    Anonymous,
    /// An overloaded operator.
    Operator(OperatorKind),
    /// A destructor; the payload is the class name (so `~A` carries `A`).
    Destructor(String),
    /// A conversion function (`operator T`).
    Conversion,
}

impl DeclName {
    /// Returns the identifier if this name is an ordinary, non-empty one.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Ident(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Returns the human-readable form of the name.
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            Self::Ident(name) => name.clone(),
            Self::Anonymous => String::new(),
            Self::Operator(op) => format!("operator#{}", op.sentinel()),
            Self::Destructor(class) => format!("~{class}"),
            Self::Conversion => "operator(conversion)".to_string(),
        }
    }
}

/// The class-key a record was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKeyword {
    /// `struct`
    Struct,
    /// `class`
    Class,
    /// `union`
    Union,
}

/// Specialization information attached to a record declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpecialization {
    /// The class template being specialized.
    pub template: DeclId,
    /// The instantiation arguments, fully resolved.
    pub args: Vec<TemplateArg>,
    /// The arguments as written in the source, when the specialization was
    /// spelled out (explicit and partial specializations).
    pub args_as_written: Option<Vec<TemplateArgLoc>>,
    /// Whether this specialization was implicitly instantiated.
    pub implicit: bool,
}

/// How a function declaration relates to templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionTemplateInfo {
    /// Nothing to do with templates.
    Plain,
    /// The pattern of a function template; the payload is the describing
    /// template declaration.
    DescribedTemplate(DeclId),
    /// A member of a class template instantiated for a specialization.
    MemberSpecialization,
    /// A specialization of a function template.
    Specialization(FunctionSpecialization),
    /// A specialization whose template is still dependent.
    DependentSpecialization,
}

/// Specialization information attached to a function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpecialization {
    /// The function template being specialized.
    pub template: DeclId,
    /// The specialization arguments, fully resolved.
    pub args: Vec<TemplateArg>,
    /// The arguments as written in the source, when present.
    pub args_as_written: Option<Vec<TemplateArgLoc>>,
    /// Whether this specialization was implicitly instantiated.
    pub implicit: bool,
    /// The point of instantiation.
    pub point_of_instantiation: Loc,
}

/// A translation-unit root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationUnitDecl {
    /// Top-level declarations in source order.
    pub decls: Vec<DeclId>,
}

/// A namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceDecl {
    /// Declarations inside the namespace, in source order.
    pub decls: Vec<DeclId>,
}

/// A record (struct, class, or union) declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    /// The class-key.
    pub keyword: RecordKeyword,
    /// Member declarations, in source order. Empty for forward declarations.
    pub members: Vec<DeclId>,
    /// The full redeclaration chain, in declaration order, including this
    /// declaration. Empty when this is the only declaration.
    pub redecls: Vec<DeclId>,
    /// Whether this declaration is the definition.
    pub is_definition: bool,
    /// The class template this record is the pattern of, if any.
    pub described_template: Option<DeclId>,
    /// Whether this is the injected class name inside its own definition.
    pub injected_class_name: bool,
    /// Specialization information, when this record specializes a template.
    pub specialization: Option<RecordSpecialization>,
    /// Parameters bound by a partial specialization.
    pub partial_params: Option<Vec<DeclId>>,
}

/// An enumeration declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    /// Whether this is a scoped enumeration (`enum class`).
    pub scoped: bool,
    /// The spelled underlying type, if one was written.
    pub underlying: Option<TypeLocId>,
    /// Enumerator declarations, in source order.
    pub enumerators: Vec<DeclId>,
    /// The full redeclaration chain (see [`RecordDecl::redecls`]).
    pub redecls: Vec<DeclId>,
    /// Whether this declaration is the definition.
    pub is_definition: bool,
}

/// An enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumConstantDecl {
    /// The enumerator's value.
    pub value: i128,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Parameter declarations, in order.
    pub params: Vec<DeclId>,
    /// Declarations local to the body.
    pub locals: Vec<DeclId>,
    /// Body expressions, present only on definitions.
    pub body: Vec<ExprId>,
    /// The function's type.
    pub ty: QualType,
    /// The spelled function type, when written in source.
    pub type_loc: Option<TypeLocId>,
    /// The record this function is a member of, if it is a method. This is
    /// the semantic parent: out-of-line definitions still point at their
    /// class.
    pub member_of: Option<DeclId>,
    /// The full redeclaration chain (see [`RecordDecl::redecls`]).
    pub redecls: Vec<DeclId>,
    /// Whether this declaration is the definition.
    pub is_definition: bool,
    /// How this function relates to templates.
    pub template: FunctionTemplateInfo,
}

/// A non-static data member of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    /// The member's type.
    pub ty: QualType,
    /// The spelled type, when written in source.
    pub type_loc: Option<TypeLocId>,
}

/// A variable declaration, including parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarDecl {
    /// The variable's type.
    pub ty: QualType,
    /// The spelled type, when written in source.
    pub type_loc: Option<TypeLocId>,
    /// Whether this is a function parameter.
    pub parameter: bool,
    /// Whether this declaration is a definition. For parameters the builder
    /// sets this from the enclosing function's definition-ness.
    pub is_definition: bool,
}

/// A typedef or alias declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedefDecl {
    /// The spelled aliased type.
    pub underlying: TypeLocId,
    /// Whether this is one of the compiler-provided aliases
    /// (`__builtin_va_list`, `__int128_t`, `__uint128_t`) the indexer skips.
    pub builtin: bool,
}

/// A class, function, or variable template declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDecl {
    /// The template parameter list, in order.
    pub params: Vec<DeclId>,
    /// The templated declaration (the pattern).
    pub templated: DeclId,
    /// Implicit specializations instantiated from this template.
    pub specializations: Vec<DeclId>,
}

/// A template type parameter or non-type template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateParmDecl {
    /// Nesting depth of the owning parameter list, counted from the outside.
    pub depth: u32,
    /// Index within the owning parameter list.
    pub index: u32,
}

/// A template template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTemplateParmDecl {
    /// The parameter's own template parameter list.
    pub params: Vec<DeclId>,
    /// Nesting depth of the owning parameter list.
    pub depth: u32,
    /// Index within the owning parameter list.
    pub index: u32,
}

/// The kind of a declaration, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// The translation-unit root.
    TranslationUnit(TranslationUnitDecl),
    /// A namespace.
    Namespace(NamespaceDecl),
    /// A record (struct, class, or union).
    Record(RecordDecl),
    /// An enumeration.
    Enum(EnumDecl),
    /// An enumerator.
    EnumConstant(EnumConstantDecl),
    /// A function or method.
    Function(FunctionDecl),
    /// A non-static data member.
    Field(FieldDecl),
    /// A variable or parameter.
    Var(VarDecl),
    /// A typedef or alias.
    Typedef(TypedefDecl),
    /// A class template.
    ClassTemplate(TemplateDecl),
    /// A function template.
    FunctionTemplate(TemplateDecl),
    /// A variable template.
    VarTemplate(TemplateDecl),
    /// A template type parameter.
    TemplateTypeParm(TemplateParmDecl),
    /// A non-type template parameter.
    NonTypeTemplateParm(TemplateParmDecl),
    /// A template template parameter.
    TemplateTemplateParm(TemplateTemplateParmDecl),
}

/// A declaration node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    /// The declaration's name.
    pub name: DeclName,
    /// The location of the name token.
    pub loc: Loc,
    /// Whether the declaration was produced by the compiler rather than
    /// written in source.
    pub implicit: bool,
    /// The kind and kind-specific payload.
    pub kind: DeclKind,
}

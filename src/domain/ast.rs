//! Resolved syntax tree input model: the contract between an external
//! parser/binder front end and the graph construction engine.
//!
//! The engine never parses source text; it consumes a [`Program`] in which
//! every name, call and type use already carries its resolved binding, or
//! `None` when the front end could not resolve it (never an error here).
//! The whole tree is serializable so a front end can hand programs over as
//! JSON (see `adapters::source`).

use serde::{Deserialize, Serialize};

/// Source span of a statement or comment: byte offset and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub length: u32,
}

/// Resolved reference to a type. Out-of-program types have no declaration
/// handle; they are identified by name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeBinding {
    /// Simple name, possibly still carrying generic arguments (`List<T>`).
    pub name: String,
    /// Qualified name; empty for anonymous types.
    #[serde(default)]
    pub qualified_name: String,
    /// Declaration handle when the type is declared in the analyzed program.
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub type_arguments: Vec<TypeBinding>,
    #[serde(default)]
    pub array_dimensions: u32,
    #[serde(default)]
    pub is_type_variable: bool,
    #[serde(default)]
    pub is_wildcard: bool,
    /// Bound of a wildcard type, when one exists.
    #[serde(default)]
    pub wildcard_bound: Option<Box<TypeBinding>>,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Superclass of an anonymous type; resolution falls back to it.
    #[serde(default)]
    pub superclass: Option<Box<TypeBinding>>,
    #[serde(default)]
    pub interfaces: Vec<TypeBinding>,
}

impl TypeBinding {
    /// A plain named type binding with no handle (out-of-program).
    pub fn named(name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            handle: None,
            type_arguments: Vec::new(),
            array_dimensions: 0,
            is_type_variable: false,
            is_wildcard: false,
            wildcard_bound: None,
            is_anonymous: false,
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    /// A type declared in the analyzed program, identified by its handle.
    pub fn declared(
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            handle: Some(handle.into()),
            ..Self::named(name, qualified_name)
        }
    }
}

/// Resolved reference to a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodBinding {
    /// Declaration handle; absent when the declaring element is unknown.
    #[serde(default)]
    pub handle: Option<String>,
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    pub declaring: TypeBinding,
    pub return_type: TypeBinding,
    #[serde(default)]
    pub is_constructor: bool,
}

/// Resolved reference to a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldBinding {
    #[serde(default)]
    pub handle: Option<String>,
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    /// Declaring type; absent for implicit or synthetic variables.
    #[serde(default)]
    pub declaring: Option<TypeBinding>,
    pub field_type: TypeBinding,
}

/// Resolved local variable, parameter or exception variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub handle: String,
    pub name: String,
    /// Declared type signature; array dimensions are read off this.
    pub type_signature: String,
    #[serde(default)]
    pub var_type: Option<TypeBinding>,
}

/// Infix operators. Only the short-circuit boolean pair is significant for
/// complexity counting; the rest are carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfixOp {
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    Equals,
    NotEquals,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShiftSigned,
    RightShiftUnsigned,
    ConditionalAnd,
    ConditionalOr,
}

impl InfixOp {
    pub fn is_short_circuit(self) -> bool {
        matches!(self, InfixOp::ConditionalAnd | InfixOp::ConditionalOr)
    }
}

/// Expression tree. A closed set of kinds; anything the front end cannot
/// classify arrives as `Other` and contributes neither dependencies nor
/// complexity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Assignment {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Cast {
        target: Option<TypeBinding>,
        inner: Box<Expr>,
    },
    Instantiation {
        instantiated: Option<TypeBinding>,
        constructor: Option<MethodBinding>,
        args: Vec<Expr>,
        /// Outer-instance receiver of a qualified instantiation.
        receiver: Option<Box<Expr>>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    FieldAccess {
        /// Resolved type of the whole access (the field's declared type).
        resolved_type: Option<TypeBinding>,
        field: Option<FieldBinding>,
        receiver: Option<Box<Expr>>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
        /// Further operands of a flattened chain (`a && b && c` has one).
        #[serde(default)]
        extended: Vec<Expr>,
    },
    InstanceOf {
        operand: Box<Expr>,
        target: Option<TypeBinding>,
    },
    Call {
        method: Option<MethodBinding>,
        args: Vec<Expr>,
        receiver: Option<Box<Expr>>,
    },
    Parenthesized(Box<Expr>),
    Postfix {
        operand: Box<Expr>,
    },
    /// Simple or qualified name, with the resolved type of the named entity.
    Name {
        resolved_type: Option<TypeBinding>,
    },
    TypeLiteral {
        target: Option<TypeBinding>,
    },
    Literal,
    Other,
}

/// One `name = initializer` fragment of a variable declaration statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarFragment {
    /// Resolved variable; a fragment without one violates the input contract.
    #[serde(default)]
    pub variable: Option<VariableBinding>,
    #[serde(default)]
    pub initializer: Option<Expr>,
}

/// Catch clause of a try statement. Not a statement itself, but carries the
/// same span/naming conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchClause {
    pub span: Span,
    #[serde(default)]
    pub exception: Option<VariableBinding>,
    pub body: Box<Statement>,
}

/// Statement kinds. The engine creates one store object per statement node,
/// named `<kind><n>` off a live instance counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    Assert {
        condition: Expr,
    },
    Block {
        statements: Vec<Statement>,
    },
    Break {
        #[serde(default)]
        label: Option<String>,
    },
    Continue {
        #[serde(default)]
        label: Option<String>,
    },
    ConstructorInvocation {
        constructor: Option<MethodBinding>,
        args: Vec<Expr>,
        #[serde(default)]
        type_args: Vec<TypeBinding>,
    },
    SuperConstructorInvocation {
        #[serde(default)]
        receiver: Option<Expr>,
        constructor: Option<MethodBinding>,
        args: Vec<Expr>,
        #[serde(default)]
        type_args: Vec<TypeBinding>,
    },
    Do {
        /// The loop condition is carried but deliberately not analyzed; see
        /// the statement builder.
        condition: Expr,
        body: Box<Statement>,
    },
    EnhancedFor {
        #[serde(default)]
        parameter: Option<VariableBinding>,
        iterable: Expr,
        body: Box<Statement>,
    },
    ExpressionStmt {
        expr: Expr,
    },
    For {
        #[serde(default)]
        initializers: Vec<Expr>,
        #[serde(default)]
        condition: Option<Expr>,
        #[serde(default)]
        updaters: Vec<Expr>,
        body: Box<Statement>,
    },
    If {
        condition: Expr,
        then_branch: Box<Statement>,
        #[serde(default)]
        else_branch: Option<Box<Statement>>,
    },
    Labeled {
        label: String,
        body: Box<Statement>,
    },
    Return {
        #[serde(default)]
        expr: Option<Expr>,
    },
    Switch {
        selector: Expr,
        statements: Vec<Statement>,
    },
    SwitchCase {
        #[serde(default)]
        expr: Option<Expr>,
        #[serde(default)]
        is_default: bool,
    },
    Synchronized {
        monitor: Expr,
        body: Box<Statement>,
    },
    Throw {
        expr: Expr,
    },
    Try {
        body: Box<Statement>,
        #[serde(default)]
        catch_clauses: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Box<Statement>>,
    },
    /// Local or anonymous type declared in statement position; the type
    /// itself is discovered through occurrence probing during the
    /// declaration pass.
    TypeDeclaration {
        #[serde(default)]
        type_handle: Option<String>,
    },
    VariableDeclaration {
        fragments: Vec<VarFragment>,
        /// Declared (base) type of the whole statement.
        #[serde(default)]
        declared_type: Option<TypeBinding>,
    },
    While {
        condition: Expr,
        body: Box<Statement>,
    },
    Empty,
    Other,
}

/// A statement node: span plus kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub span: Span,
    pub kind: Stmt,
}

impl Statement {
    pub fn new(span: Span, kind: Stmt) -> Self {
        Self { span, kind }
    }

    /// Store class name for this statement kind; also the stem of the
    /// per-kind sequential object name.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            Stmt::Assert { .. } => "AssertStatement",
            Stmt::Block { .. } => "Block",
            Stmt::Break { .. } => "BreakStatement",
            Stmt::Continue { .. } => "ContinueStatement",
            Stmt::ConstructorInvocation { .. } => "ConstructorInvocation",
            Stmt::SuperConstructorInvocation { .. } => "SuperConstructorInvocation",
            Stmt::Do { .. } => "DoStatement",
            Stmt::EnhancedFor { .. } => "EnhancedForStatement",
            Stmt::ExpressionStmt { .. } => "ExpressionStatement",
            Stmt::For { .. } => "ForStatement",
            Stmt::If { .. } => "IfStatement",
            Stmt::Labeled { .. } => "LabeledStatement",
            Stmt::Return { .. } => "ReturnStatement",
            Stmt::Switch { .. } => "SwitchStatement",
            Stmt::SwitchCase { .. } => "SwitchCase",
            Stmt::Synchronized { .. } => "SynchronizedStatement",
            Stmt::Throw { .. } => "ThrowStatement",
            Stmt::Try { .. } => "TryStatement",
            Stmt::TypeDeclaration { .. } => "TypeDeclarationStatement",
            Stmt::VariableDeclaration { .. } => "VariableDeclarationStatement",
            Stmt::While { .. } => "WhileStatement",
            Stmt::Empty | Stmt::Other => "EmptyStatement",
        }
    }
}

/// Visibility of a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VisibilityKind {
    Public,
    Protected,
    Private,
    #[default]
    Default,
}

impl VisibilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityKind::Public => "Public",
            VisibilityKind::Protected => "Protected",
            VisibilityKind::Private => "Private",
            VisibilityKind::Default => "Default",
        }
    }
}

/// Modifier flags of a declared member. Which flags are meaningful depends on
/// the declaration kind; irrelevant ones stay false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Modifiers {
    pub is_final: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_synthetic: bool,
    pub is_deprecated: bool,
    pub is_synchronized: bool,
    pub is_native: bool,
    pub is_bridge: bool,
    pub has_varargs: bool,
    pub is_volatile: bool,
    pub is_transient: bool,
    pub is_strictfp: bool,
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TypeDeclKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeDeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeDeclKind::Class => "ClassType",
            TypeDeclKind::Interface => "InterfaceType",
            TypeDeclKind::Enum => "EnumType",
            TypeDeclKind::Annotation => "AnnotationType",
        }
    }
}

/// An annotation applied to a declaration or package, with its member values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    pub handle: String,
    /// Annotation type name as written (simple or qualified).
    pub name: String,
    #[serde(default)]
    pub values: Vec<AnnotationValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationValuePair {
    pub member_name: String,
    pub value: String,
}

/// Generic type parameter of a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameterDecl {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub bound_signatures: Vec<String>,
}

/// Comment kinds; comments are leaf records attached to their translation
/// unit, independent of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    Line,
    Block,
    Doc,
}

impl CommentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentKind::Line => "Line",
            CommentKind::Block => "Block",
            CommentKind::Doc => "Doc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub span: Span,
}

/// Field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    pub type_signature: String,
    #[serde(default)]
    pub visibility: VisibilityKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub anonymous_types: Vec<TypeDecl>,
}

/// Method parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub handle: String,
    pub name: String,
    pub type_signature: String,
}

/// Method or constructor declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub visibility: VisibilityKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    pub return_type_signature: String,
    #[serde(default)]
    pub exception_signatures: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub body: Option<Statement>,
    #[serde(default)]
    pub anonymous_types: Vec<TypeDecl>,
}

/// Instance or static initializer block of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializerDecl {
    /// 1-based occurrence index within the declaring type.
    pub occurrence: u32,
    pub handle: String,
    #[serde(default)]
    pub name: String,
    pub start_position: u32,
    pub body: Statement,
}

/// Type declaration, including members, nested named types, and anonymous
/// types discovered through occurrence probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub handle: String,
    /// Simple name; empty for anonymous types.
    #[serde(default)]
    pub name: String,
    /// Fully qualified name, nesting separated with `$`.
    pub qualified_name: String,
    /// Fully qualified name, nesting separated with `.`.
    #[serde(default)]
    pub dotted_name: String,
    /// Qualified name including generic parameters (`com.x.Box<T>`).
    #[serde(default)]
    pub parameterized_name: String,
    #[serde(default)]
    pub kind: TypeDeclKind,
    #[serde(default)]
    pub visibility: VisibilityKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDecl>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub superclass_signature: Option<String>,
    #[serde(default)]
    pub interface_signatures: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub initializers: Vec<InitializerDecl>,
    /// Named member types, in source order.
    #[serde(default)]
    pub member_types: Vec<TypeDecl>,
    #[serde(default)]
    pub anonymous_types: Vec<TypeDecl>,
}

/// Occurrence probing over anonymous types nested under a member. Occurrence
/// numbering is dense and 1-based; the first absent index ends the probe.
pub trait HasAnonymousTypes {
    fn anonymous_type(&self, occurrence: usize) -> Option<&TypeDecl>;
}

impl HasAnonymousTypes for TypeDecl {
    fn anonymous_type(&self, occurrence: usize) -> Option<&TypeDecl> {
        occurrence.checked_sub(1).and_then(|i| self.anonymous_types.get(i))
    }
}

impl HasAnonymousTypes for FieldDecl {
    fn anonymous_type(&self, occurrence: usize) -> Option<&TypeDecl> {
        occurrence.checked_sub(1).and_then(|i| self.anonymous_types.get(i))
    }
}

impl HasAnonymousTypes for MethodDecl {
    fn anonymous_type(&self, occurrence: usize) -> Option<&TypeDecl> {
        occurrence.checked_sub(1).and_then(|i| self.anonymous_types.get(i))
    }
}

/// One translation unit (source file) of the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub handle: String,
    pub name: String,
    /// Annotations on the unit's package declaration.
    #[serde(default)]
    pub package_annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Kind of source root the front end walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SourceRootKind {
    #[default]
    Folder,
    Archive,
}

impl SourceRootKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceRootKind::Folder => "Folder",
            SourceRootKind::Archive => "Archive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub units: Vec<TranslationUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRoot {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub kind: SourceRootKind,
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// A whole analyzed program, as assembled by the external project walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub source_roots: Vec<SourceRoot>,
}

impl Program {
    /// All translation units, in walk order.
    pub fn translation_units(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.source_roots
            .iter()
            .flat_map(|r| r.packages.iter())
            .flat_map(|p| p.units.iter())
    }
}

//! Go syntax tree.
//!
//! Covers the declaration level completely (package clause, imports, type
//! and function declarations) and a statement/expression subset large
//! enough to check generated method bodies. `const` declarations are kept
//! for array lengths; `var` declarations are recorded only by span.

use crate::Span;

/// An identifier with its location.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// One parsed source file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct File {
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl File {
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Type(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }

    /// Each `const` declaration's specs, one slice per declaration.
    pub fn const_groups(&self) -> impl Iterator<Item = &[ConstSpec]> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Const(specs) => Some(specs.as_slice()),
            _ => None,
        })
    }
}

/// How an import binds its package name in the importing file.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ImportName {
    /// `import "p"`: bound to the imported package's declared name.
    Default,
    /// `import q "p"`
    Alias(String),
    /// `import . "p"`
    Dot,
    /// `import _ "p"`
    Blank,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImportSpec {
    pub name: ImportName,
    /// Unquoted import path.
    pub path: String,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decl {
    Type(TypeSpec),
    Func(FuncDecl),
    /// `const X = 1` or a parenthesized group.
    Const(Vec<ConstSpec>),
    /// A `var` declaration; contents are not modelled.
    Var(Span),
}

/// One line of a `const` declaration.
///
/// `values` is empty when the line repeats the previous line's
/// expressions, as in `iota` enumerations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    /// Position within the declaration, the value of `iota`.
    pub iota: u32,
}

/// `type Name[P any] T` or `type Name = T`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub alias: bool,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeParam {
    pub name: Ident,
    pub constraint: TypeExpr,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Receiver>,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub sig: Signature,
    /// `None` for bodyless declarations and when bodies were skipped.
    pub body: Option<Block>,
    pub span: Span,
}

/// Method receiver: `(o *List[T])`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Receiver {
    pub name: Option<Ident>,
    pub base: Ident,
    pub pointer: bool,
    /// Receiver type parameter names, e.g. `T` in `List[T]`.
    pub type_params: Vec<Ident>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// Last parameter is `...T`.
    pub variadic: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A type as written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeExpr {
    /// `T`, `pkg.T`, `T[int]`.
    Name {
        package: Option<Ident>,
        name: Ident,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[N]T` or `[...]T`.
    Array {
        len: ArrayLen,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(Signature),
    Struct(Vec<FieldDecl>),
    Interface(Vec<InterfaceElem>),
    /// Constraint union `~int | string`.
    Union(Vec<UnionTerm>),
}

/// Length of an array type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArrayLen {
    /// `None` for `[...]`, which only composite literals may use.
    pub expr: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDecl {
    /// `None` for an embedded field.
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    /// Raw tag literal including its quotes.
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InterfaceElem {
    Method { name: Ident, sig: Signature },
    Embed(TypeExpr),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnionTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stmt {
    /// `var x T = e`
    Var {
        names: Vec<Ident>,
        ty: Option<TypeExpr>,
        values: Vec<Expr>,
    },
    /// `a, b := x, y`
    Define { lhs: Vec<Expr>, rhs: Vec<Expr> },
    /// `a = b`, `a += b`
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    IncDec { target: Expr, inc: bool },
    Expr(Expr),
    Send { chan: Expr, value: Expr },
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    /// Infinite, condition-only or three-clause `for`.
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    /// `for k, v := range x`
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
        body: Block,
    },
    Block(Block),
    Return(Vec<Expr>),
    Break,
    Continue,
    Empty,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AssignOp {
    Assign,
    /// `op=` with the binary operator spelled as in source.
    Compound(&'static str),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Ident(Ident),
    /// Number, string or rune literal text.
    Lit(String),
    Selector {
        base: Box<Expr>,
        field: Ident,
    },
    Index {
        base: Box<Expr>,
        indices: Vec<Expr>,
    },
    SliceExpr {
        base: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
    },
    Unary {
        op: &'static str,
        operand: Box<Expr>,
    },
    Binary {
        op: &'static str,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Paren(Box<Expr>),
    TypeAssert {
        base: Box<Expr>,
        /// `None` for `.(type)`.
        ty: Option<TypeExpr>,
    },
    /// A type literal in operand position, e.g. `[]T` in `make([]T, n)`.
    Type(TypeExpr),
    Composite {
        ty: Option<Box<Expr>>,
        elems: Vec<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncLit {
        sig: Signature,
        body: Block,
    },
}

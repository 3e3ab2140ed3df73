//! Type representation stored in the pool.
//!
//! `TypeData` children are `Idx` handles, never boxed types, so interning
//! makes structural identity an index comparison.

use crate::{BasicKind, Idx, NamedId, PkgId};
use godeep_ir::ast::ChanDir;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeData {
    Basic(BasicKind),
    /// A declared named type; see [`NamedType`].
    Named(NamedId),
    /// A generic named type applied to type arguments, `List[int]`.
    Instance { base: NamedId, args: Box<[Idx]> },
    /// A type parameter in scope of a generic declaration.
    TypeParam(String),
    Pointer(Idx),
    Slice(Idx),
    /// `[len]elem`, with the length evaluated.
    Array { len: u64, elem: Idx },
    Map { key: Idx, value: Idx },
    Chan { dir: ChanDir, elem: Idx },
    /// A struct literal type; `package` is where it was written, which
    /// decides visibility of its unexported fields.
    Struct { package: PkgId, fields: Box<[Field]> },
    Func(Signature),
    Interface(Box<[InterfaceElem]>),
    /// A constraint union `~int | string`.
    Union(Box<[UnionTerm]>),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Idx,
    pub embedded: bool,
    /// Raw tag literal including its quotes.
    pub tag: Option<String>,
}

impl Field {
    /// Go exports identifiers starting with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// Whether a Go identifier is exported.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// A function signature. Parameter names do not take part in identity.
///
/// For variadic signatures the last parameter is stored as its slice type.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Signature {
    pub params: Box<[Idx]>,
    pub results: Box<[Idx]>,
    pub variadic: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum InterfaceElem {
    Method { name: String, sig: Signature },
    Embed(Idx),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct UnionTerm {
    pub tilde: bool,
    pub ty: Idx,
}

/// A method declared on a named type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Method {
    pub name: String,
    pub pointer_receiver: bool,
    /// Type parameter names as the receiver spells them: `T` in
    /// `func (l List[T]) ...`. Empty for non-generic types.
    pub receiver_params: Vec<String>,
    pub sig: Signature,
}

/// A named type declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamedType {
    pub name: String,
    pub package: PkgId,
    pub type_params: Vec<String>,
    /// Declared right-hand side. `None` until resolved, and forever for
    /// types of packages whose source is not available.
    pub rhs: Option<Idx>,
    pub methods: Vec<Method>,
}

impl NamedType {
    pub fn new(name: impl Into<String>, package: PkgId) -> Self {
        NamedType {
            name: name.into(),
            package,
            type_params: Vec::new(),
            rhs: None,
            methods: Vec::new(),
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

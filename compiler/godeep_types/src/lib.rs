//! Go type model and package loader.
//!
//! [`load_program`] reads the package in a directory and everything it
//! imports: from the same module, `vendor/`, `replace` targets, the module
//! cache and the standard library. Imports it cannot read are recorded as
//! opaque packages. The result is a [`Program`]: a package graph over one
//! interned type [`Pool`].
//!
//! # Type identity
//!
//! Types are [`Idx`] handles. Structural types are hash-consed, named
//! declarations are unique, so identical types compare equal by index.

mod build_constraint;
mod context;
mod data;
mod error;
mod idx;
mod loader;
mod pool;
mod program;
mod source_tree;

pub use build_constraint::Platform;
pub use context::BuildContext;
pub use data::{
    is_exported, Field, InterfaceElem, Method, NamedType, Signature, TypeData, UnionTerm,
};
pub use error::LoadError;
pub use idx::{BasicKind, Idx, NamedId, PkgId};
pub use loader::{
    guess_package_name, load_program, Loader, Module, ReplaceTarget, Replacement, Requirement,
};
pub use pool::Pool;
pub use program::{Package, Program};
pub use source_tree::{FsTree, MemoryTree, SourceTree};

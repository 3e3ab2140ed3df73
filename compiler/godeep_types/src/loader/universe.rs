//! The universe block: predeclared type names.

use crate::{BasicKind, Idx, InterfaceElem, NamedType, Package, PkgId, Pool, Signature, TypeData};

pub(super) fn universe(pool: &mut Pool) -> Package {
    let mut pkg = Package::new("", "");
    for kind in BasicKind::ALL {
        pkg.scope.insert(kind.name().to_owned(), Idx::basic(kind));
    }

    let error_iface = pool.intern(TypeData::Interface(Box::new([InterfaceElem::Method {
        name: "Error".to_owned(),
        sig: Signature {
            results: Box::new([Idx::basic(BasicKind::String)]),
            ..Signature::default()
        },
    }])));
    let mut error = NamedType::new("error", PkgId::UNIVERSE);
    error.rhs = Some(error_iface);
    pkg.scope.insert("error".to_owned(), pool.declare_named(error));

    let empty = pool.intern(TypeData::Interface(Box::new([])));
    pkg.scope.insert("any".to_owned(), empty);
    let mut comparable = NamedType::new("comparable", PkgId::UNIVERSE);
    comparable.rhs = Some(empty);
    pkg.scope.insert("comparable".to_owned(), pool.declare_named(comparable));

    pkg
}

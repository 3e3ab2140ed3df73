//! Resolving a requested type name in the target package.

use godeep_types::{Idx, Program, TypeData};

use crate::GenError;

/// The named type `name` declared in the target package.
///
/// Aliases are followed and at most one pointer is stripped, so
/// `type P = *T` locates `T`.
pub fn locate(program: &Program, name: &str) -> Result<Idx, GenError> {
    let target = program.target();
    let pool = program.pool();
    let not_found = || GenError::TypeNotFound {
        name: name.to_owned(),
        package: program.package(target).name.clone(),
    };

    let found = program.lookup(target, name).ok_or_else(not_found)?;
    let ty = match pool.get(found) {
        TypeData::Pointer(elem) => *elem,
        _ => found,
    };
    let TypeData::Named(id) = pool.get(ty) else {
        return Err(not_found());
    };
    if pool.named(*id).package != target {
        return Err(not_found());
    }
    let kind = match pool.underlying(ty).map(|under| pool.get(under)) {
        Some(TypeData::Pointer(_)) => "a pointer",
        Some(TypeData::Interface(_) | TypeData::Union(_)) => "an interface",
        _ => {
            tracing::debug!(name, "located type");
            return Ok(ty);
        }
    };
    Err(GenError::InvalidReceiver {
        name: name.to_owned(),
        kind,
    })
}

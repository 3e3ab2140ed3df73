//! Detection of an existing `DeepCopy` to call instead of inlining.

use godeep_types::{Idx, Method, NamedId, Pool, TypeData};

/// Whether a `DeepCopy` method takes and returns the value or a pointer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Shape {
    #[default]
    Value,
    Pointer,
}

impl Shape {
    pub fn from_pointer(pointer: bool) -> Self {
        if pointer {
            Shape::Pointer
        } else {
            Shape::Value
        }
    }

    #[inline]
    pub fn is_pointer(self) -> bool {
        self == Shape::Pointer
    }

    /// `*` for the pointer shape.
    pub fn prefix(self) -> &'static str {
        match self {
            Shape::Value => "",
            Shape::Pointer => "*",
        }
    }
}

/// A usable `DeepCopy` on some type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Capability {
    pub shape: Shape,
}

/// Find the copy capability of `ty`.
///
/// Types being generated in this run (and instances of them) have one in
/// the run's `shape`. Otherwise a declared `DeepCopy()` with one result
/// counts if that result is the type itself or a pointer to it; a
/// same-named method of any other shape is never used.
pub fn capability(pool: &Pool, generating: &[Idx], shape: Shape, ty: Idx) -> Option<Capability> {
    let id = pool.named_id(ty)?;
    if generating.iter().any(|&g| pool.named_id(g) == Some(id)) {
        return Some(Capability { shape });
    }
    let method = pool.methods(ty).iter().find(|m| m.name == "DeepCopy")?;
    let [result] = &*method.sig.results else {
        return None;
    };
    if !method.sig.params.is_empty() {
        return None;
    }
    let (returned, pointer) = match pool.get(*result) {
        TypeData::Pointer(elem) => (*elem, true),
        _ => (*result, false),
    };
    returns_receiver(pool, id, method, returned).then_some(Capability {
        shape: Shape::from_pointer(pointer),
    })
}

fn returns_receiver(pool: &Pool, id: NamedId, method: &Method, returned: Idx) -> bool {
    match pool.get(returned) {
        TypeData::Named(named) => *named == id && method.receiver_params.is_empty(),
        TypeData::Instance { base, args } => {
            *base == id
                && args.len() == method.receiver_params.len()
                && args.iter().zip(&method.receiver_params).all(|(&arg, param)| {
                    matches!(pool.get(arg), TypeData::TypeParam(name) if name == param)
                })
        }
        _ => false,
    }
}

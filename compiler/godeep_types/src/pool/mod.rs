//! The type pool.
//!
//! Structural types are hash-consed into a flat `Vec<TypeData>`; named
//! declarations get a fresh entry each. Basic types are pre-interned at the
//! indices given by [`BasicKind`].

use crate::{BasicKind, Idx, Method, NamedId, NamedType, TypeData};
use rustc_hash::FxHashMap;

/// Upper bound on pool growth while expanding generic instances. Guards
/// against instantiation chains that grow without end, such as
/// `type T[E any] struct{ next *T[[]E] }`.
const MAX_TYPES: usize = 1 << 20;

/// Maximum nesting of instance-of-instance reductions.
const MAX_INSTANCE_DEPTH: u32 = 64;

#[derive(Debug)]
pub struct Pool {
    types: Vec<TypeData>,
    map: FxHashMap<TypeData, Idx>,
    named: Vec<NamedType>,
    /// `Idx` of `TypeData::Named(id)`, indexed by `NamedId`.
    named_idx: Vec<Idx>,
    /// Underlying types of generic instances, after type argument
    /// substitution.
    instance_underlying: FxHashMap<Idx, Idx>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool with the basic types pre-interned.
    pub fn new() -> Self {
        let mut pool = Pool {
            types: Vec::with_capacity(256),
            map: FxHashMap::default(),
            named: Vec::new(),
            named_idx: Vec::new(),
            instance_underlying: FxHashMap::default(),
        };
        for kind in BasicKind::ALL {
            pool.intern(TypeData::Basic(kind));
        }
        pool
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Intern `data`, returning the existing index for identical types.
    pub fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.map.get(&data) {
            return idx;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "pool growth is capped far below u32::MAX"
        )]
        let idx = Idx::from_raw(self.types.len() as u32);
        self.types.push(data.clone());
        self.map.insert(data, idx);
        idx
    }

    #[inline]
    pub fn get(&self, idx: Idx) -> &TypeData {
        &self.types[idx.index()]
    }

    /// Allocate a new named type. Never deduplicated.
    pub fn declare_named(&mut self, named: NamedType) -> Idx {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "named type count is bounded by pool size"
        )]
        let id = NamedId(self.named.len() as u32);
        self.named.push(named);
        let idx = self.intern(TypeData::Named(id));
        self.named_idx.push(idx);
        idx
    }

    #[inline]
    pub fn named(&self, id: NamedId) -> &NamedType {
        &self.named[id.index()]
    }

    #[inline]
    pub(crate) fn named_mut(&mut self, id: NamedId) -> &mut NamedType {
        &mut self.named[id.index()]
    }

    /// The type handle of a named declaration.
    #[inline]
    pub fn named_type(&self, id: NamedId) -> Idx {
        self.named_idx[id.index()]
    }

    /// The declaration behind a named type or a generic instance of one.
    pub fn named_id(&self, idx: Idx) -> Option<NamedId> {
        match self.get(idx) {
            TypeData::Named(id) | TypeData::Instance { base: id, .. } => Some(*id),
            _ => None,
        }
    }

    /// The underlying type: named types are followed to their structural
    /// definition, instances to their substituted one. `None` when the
    /// definition is not known.
    pub fn underlying(&self, idx: Idx) -> Option<Idx> {
        let mut current = idx;
        for _ in 0..=self.named.len() {
            match self.get(current) {
                TypeData::Named(id) => current = self.named(*id).rhs?,
                TypeData::Instance { .. } => return self.instance_underlying.get(&current).copied(),
                _ => return Some(current),
            }
        }
        None
    }

    /// Methods declared on a named type, or on the base of an instance.
    pub fn methods(&self, idx: Idx) -> &[Method] {
        match self.named_id(idx) {
            Some(id) => &self.named(id).methods,
            None => &[],
        }
    }

    /// Replace type parameters named in `params` by the matching `args`.
    pub(crate) fn substitute(&mut self, idx: Idx, params: &[String], args: &[Idx]) -> Idx {
        let data = match self.get(idx).clone() {
            TypeData::TypeParam(name) => {
                return params
                    .iter()
                    .position(|p| *p == name)
                    .and_then(|i| args.get(i).copied())
                    .unwrap_or(idx);
            }
            TypeData::Basic(_) | TypeData::Named(_) => return idx,
            TypeData::Instance { base, args: inner } => TypeData::Instance {
                base,
                args: inner
                    .iter()
                    .map(|&a| self.substitute(a, params, args))
                    .collect(),
            },
            TypeData::Pointer(elem) => TypeData::Pointer(self.substitute(elem, params, args)),
            TypeData::Slice(elem) => TypeData::Slice(self.substitute(elem, params, args)),
            TypeData::Array { len, elem } => TypeData::Array {
                len,
                elem: self.substitute(elem, params, args),
            },
            TypeData::Map { key, value } => TypeData::Map {
                key: self.substitute(key, params, args),
                value: self.substitute(value, params, args),
            },
            TypeData::Chan { dir, elem } => TypeData::Chan {
                dir,
                elem: self.substitute(elem, params, args),
            },
            TypeData::Struct { package, fields } => TypeData::Struct {
                package,
                fields: fields
                    .iter()
                    .map(|field| crate::Field {
                        ty: self.substitute(field.ty, params, args),
                        ..field.clone()
                    })
                    .collect(),
            },
            TypeData::Func(sig) => TypeData::Func(self.substitute_sig(&sig, params, args)),
            TypeData::Interface(elems) => TypeData::Interface(
                elems
                    .iter()
                    .map(|elem| match elem {
                        crate::InterfaceElem::Method { name, sig } => crate::InterfaceElem::Method {
                            name: name.clone(),
                            sig: self.substitute_sig(sig, params, args),
                        },
                        crate::InterfaceElem::Embed(ty) => {
                            crate::InterfaceElem::Embed(self.substitute(*ty, params, args))
                        }
                    })
                    .collect(),
            ),
            TypeData::Union(terms) => TypeData::Union(
                terms
                    .iter()
                    .map(|term| crate::UnionTerm {
                        tilde: term.tilde,
                        ty: self.substitute(term.ty, params, args),
                    })
                    .collect(),
            ),
        };
        self.intern(data)
    }

    fn substitute_sig(
        &mut self,
        sig: &crate::Signature,
        params: &[String],
        args: &[Idx],
    ) -> crate::Signature {
        crate::Signature {
            params: sig
                .params
                .iter()
                .map(|&p| self.substitute(p, params, args))
                .collect(),
            results: sig
                .results
                .iter()
                .map(|&r| self.substitute(r, params, args))
                .collect(),
            variadic: sig.variadic,
        }
    }

    /// Compute the underlying type of every generic instance, including
    /// instances created by the substitution itself.
    pub(crate) fn resolve_instances(&mut self) {
        let mut i = 0;
        while i < self.types.len() && self.types.len() < MAX_TYPES {
            if matches!(self.types[i], TypeData::Instance { .. }) {
                #[expect(clippy::cast_possible_truncation, reason = "i < MAX_TYPES")]
                let idx = Idx::from_raw(i as u32);
                self.resolve_instance(idx, 0);
            }
            i += 1;
        }
    }

    fn resolve_instance(&mut self, idx: Idx, depth: u32) -> Option<Idx> {
        if let Some(&under) = self.instance_underlying.get(&idx) {
            return Some(under);
        }
        if depth > MAX_INSTANCE_DEPTH {
            return None;
        }
        let TypeData::Instance { base, args } = self.get(idx).clone() else {
            return self.underlying(idx);
        };
        let named = self.named(base);
        let params = named.type_params.clone();
        let rhs = named.rhs?;
        let declared = self.reduce(rhs, depth)?;
        let under = self.substitute(declared, &params, &args);
        self.instance_underlying.insert(idx, under);
        Some(under)
    }

    /// Like [`Pool::underlying`], resolving instances met on the way.
    fn reduce(&mut self, idx: Idx, depth: u32) -> Option<Idx> {
        let mut current = idx;
        for _ in 0..=self.named.len() {
            match self.get(current) {
                TypeData::Named(id) => current = self.named(*id).rhs?,
                TypeData::Instance { .. } => return self.resolve_instance(current, depth + 1),
                _ => return Some(current),
            }
        }
        None
    }
}

//! Name and type expression resolution within one package.

use godeep_ir::ast::{self, ArrayLen, Expr, Ident, ImportName, TypeExpr, TypeSpec};
use godeep_ir::{ensure_sufficient_stack, Span};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{constant, Loader, SourceFile};
use crate::{
    is_exported, Field, Idx, InterfaceElem, LoadError, Method, NamedId, NamedType, PkgId,
    Signature, SourceTree, TypeData, UnionTerm,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum AliasState {
    Pending,
    Resolving,
    Done(Idx),
}

struct AliasSlot<'s> {
    file: usize,
    spec: &'s TypeSpec,
    state: AliasState,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ConstState {
    Pending,
    Evaluating,
    Done(Option<i128>),
}

struct ConstSlot<'s> {
    file: usize,
    /// `None` when the declaration has fewer values than names.
    value: Option<&'s Expr>,
    iota: u32,
    state: ConstState,
}

/// Names visible in one file beyond the package scope.
#[derive(Default)]
struct FileScope {
    imports: FxHashMap<String, PkgId>,
    dots: Vec<PkgId>,
    /// Opaque imports without an alias, bound under a guessed name.
    guessed: Vec<PkgId>,
}

/// Resolution state of the package being loaded.
struct PackageCx<'s> {
    pkg: PkgId,
    path: &'s str,
    files: &'s [SourceFile],
    scopes: Vec<FileScope>,
    aliases: FxHashMap<String, AliasSlot<'s>>,
    consts: FxHashMap<String, ConstSlot<'s>>,
    /// Non-alias declarations: type handle, file index, spec.
    declared: Vec<(Idx, usize, &'s TypeSpec)>,
}

impl PackageCx<'_> {
    #[cold]
    fn error(&self, file: usize, span: Span, message: impl std::fmt::Display) -> LoadError {
        let src = &self.files[file];
        LoadError::failure(
            self.path,
            format!("{}:{}: {message}", src.path.display(), span.line_col(&src.text)),
        )
    }
}

impl<T: SourceTree + ?Sized> Loader<'_, T> {
    pub(super) fn load_package(
        &mut self,
        pkg: PkgId,
        path: &str,
        files: &[SourceFile],
    ) -> Result<(), LoadError> {
        let mut cx = PackageCx {
            pkg,
            path,
            files,
            scopes: Vec::with_capacity(files.len()),
            aliases: FxHashMap::default(),
            consts: FxHashMap::default(),
            declared: Vec::new(),
        };
        self.declare(&mut cx)?;
        self.resolve_imports(&mut cx)?;
        self.eval_consts(&mut cx);
        self.resolve_decls(&mut cx)?;
        self.attach_methods(&mut cx)?;
        self.check_recursive(&cx)
    }

    fn declare(&mut self, cx: &mut PackageCx<'_>) -> Result<(), LoadError> {
        let files = cx.files;
        for (file, src) in files.iter().enumerate() {
            for spec in src.ast.type_specs() {
                let name = &spec.name.name;
                if name == "_" {
                    continue;
                }
                if self.packages[cx.pkg.index()].scope.contains_key(name)
                    || cx.aliases.contains_key(name)
                {
                    return Err(cx.error(file, spec.name.span, format!("{name} redeclared in this block")));
                }
                if spec.alias {
                    if !spec.type_params.is_empty() {
                        return Err(cx.error(
                            file,
                            spec.name.span,
                            format!("generic type alias {name} is not supported"),
                        ));
                    }
                    cx.aliases.insert(
                        name.clone(),
                        AliasSlot {
                            file,
                            spec,
                            state: AliasState::Pending,
                        },
                    );
                    continue;
                }
                let mut named = NamedType::new(name.clone(), cx.pkg);
                named.type_params = type_param_names(&spec.type_params);
                let idx = self.pool.declare_named(named);
                self.packages[cx.pkg.index()].scope.insert(name.clone(), idx);
                cx.declared.push((idx, file, spec));
            }
        }
        for (file, src) in files.iter().enumerate() {
            for group in src.ast.const_groups() {
                let mut values: &[Expr] = &[];
                for spec in group {
                    if !spec.values.is_empty() {
                        values = &spec.values;
                    }
                    for (i, name) in spec.names.iter().enumerate() {
                        if name.name == "_" {
                            continue;
                        }
                        if self.packages[cx.pkg.index()].scope.contains_key(&name.name)
                            || cx.aliases.contains_key(&name.name)
                            || cx.consts.contains_key(&name.name)
                        {
                            return Err(cx.error(
                                file,
                                name.span,
                                format!("{} redeclared in this block", name.name),
                            ));
                        }
                        cx.consts.insert(
                            name.name.clone(),
                            ConstSlot {
                                file,
                                value: values.get(i),
                                iota: spec.iota,
                                state: ConstState::Pending,
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_imports(&mut self, cx: &mut PackageCx<'_>) -> Result<(), LoadError> {
        for src in cx.files {
            let mut scope = FileScope::default();
            for import in &src.ast.imports {
                if import.name == ImportName::Blank {
                    continue;
                }
                let dep = self.import(&import.path)?;
                match &import.name {
                    ImportName::Default => {
                        let package = &self.packages[dep.index()];
                        if package.opaque {
                            scope.guessed.push(dep);
                        }
                        scope.imports.insert(package.name.clone(), dep);
                    }
                    ImportName::Alias(alias) => {
                        scope.imports.insert(alias.clone(), dep);
                    }
                    ImportName::Dot => scope.dots.push(dep),
                    ImportName::Blank => {}
                }
            }
            cx.scopes.push(scope);
        }
        Ok(())
    }

    /// Evaluate every integer constant of the package; constants of other
    /// kinds are skipped.
    fn eval_consts(&mut self, cx: &mut PackageCx<'_>) {
        let mut names: Vec<String> = cx.consts.keys().cloned().collect();
        names.sort_unstable();
        for name in names {
            if let Some(value) = self.const_value(cx, &name) {
                self.packages[cx.pkg.index()].consts.insert(name, value);
            }
        }
    }

    fn const_value(&mut self, cx: &mut PackageCx<'_>, name: &str) -> Option<i128> {
        let slot = cx.consts.get_mut(name)?;
        match slot.state {
            ConstState::Done(value) => return value,
            // A constant defined in terms of itself.
            ConstState::Evaluating => return None,
            ConstState::Pending => slot.state = ConstState::Evaluating,
        }
        let (file, value, iota) = (slot.file, slot.value, slot.iota);
        let value = value.and_then(|expr| self.eval_const(cx, file, Some(iota), expr));
        if let Some(slot) = cx.consts.get_mut(name) {
            slot.state = ConstState::Done(value);
        }
        value
    }

    fn eval_const(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        iota: Option<u32>,
        expr: &Expr,
    ) -> Option<i128> {
        constant::eval(expr, iota, &mut |qualifier, name| match qualifier {
            None if cx.consts.contains_key(name) => self.const_value(cx, name),
            None => cx.scopes[file]
                .dots
                .iter()
                .find_map(|dep| self.packages[dep.index()].consts.get(name).copied()),
            Some(qualifier) => {
                let dep = self.qualifier(cx, file, qualifier)?;
                self.packages[dep.index()].consts.get(name).copied()
            }
        })
    }

    fn array_len(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        len: &ArrayLen,
    ) -> Result<u64, LoadError> {
        let text = len.span.text(&cx.files[file].text).to_owned();
        let Some(expr) = &len.expr else {
            return Err(cx.error(file, len.span, "invalid use of [...] array outside a composite literal"));
        };
        match self.eval_const(cx, file, None, expr) {
            Some(value) => u64::try_from(value)
                .map_err(|_| cx.error(file, len.span, format!("invalid array length {text}"))),
            None => Err(cx.error(
                file,
                len.span,
                format!("array length {text} is not a known integer constant"),
            )),
        }
    }

    fn resolve_decls(&mut self, cx: &mut PackageCx<'_>) -> Result<(), LoadError> {
        let mut aliases: Vec<String> = cx.aliases.keys().cloned().collect();
        aliases.sort_unstable();
        for name in aliases {
            let idx = self.resolve_alias(cx, &name)?;
            self.packages[cx.pkg.index()].scope.insert(name, idx);
        }

        let declared = cx.declared.clone();
        for (idx, file, spec) in declared {
            let params = type_param_names(&spec.type_params);
            let rhs = self.resolve_type(cx, file, &params, &spec.ty)?;
            if let Some(id) = self.pool.named_id(idx) {
                self.pool.named_mut(id).rhs = Some(rhs);
            }
        }
        Ok(())
    }

    fn resolve_alias(&mut self, cx: &mut PackageCx<'_>, name: &str) -> Result<Idx, LoadError> {
        let Some(slot) = cx.aliases.get_mut(name) else {
            return Err(LoadError::failure(cx.path, format!("undefined: {name}")));
        };
        let (file, spec) = (slot.file, slot.spec);
        match slot.state {
            AliasState::Done(idx) => return Ok(idx),
            AliasState::Resolving => {
                return Err(cx.error(file, spec.name.span, format!("invalid recursive type alias {name}")));
            }
            AliasState::Pending => slot.state = AliasState::Resolving,
        }
        let idx = self.resolve_type(cx, file, &[], &spec.ty)?;
        if let Some(slot) = cx.aliases.get_mut(name) {
            slot.state = AliasState::Done(idx);
        }
        Ok(idx)
    }

    fn resolve_type(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        params: &[String],
        expr: &TypeExpr,
    ) -> Result<Idx, LoadError> {
        ensure_sufficient_stack(|| self.resolve_type_inner(cx, file, params, expr))
    }

    fn resolve_type_inner(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        params: &[String],
        expr: &TypeExpr,
    ) -> Result<Idx, LoadError> {
        let data = match expr {
            TypeExpr::Name {
                package,
                name,
                args,
            } => {
                let base = match package {
                    Some(qualifier) => self.lookup_qualified(cx, file, qualifier, name)?,
                    None => self.lookup(cx, file, params, name)?,
                };
                return self.apply_args(cx, file, params, base, name, args);
            }
            TypeExpr::Pointer(elem) => TypeData::Pointer(self.resolve_type(cx, file, params, elem)?),
            TypeExpr::Slice(elem) => TypeData::Slice(self.resolve_type(cx, file, params, elem)?),
            TypeExpr::Array { len, elem } => TypeData::Array {
                len: self.array_len(cx, file, len)?,
                elem: self.resolve_type(cx, file, params, elem)?,
            },
            TypeExpr::Map { key, value } => TypeData::Map {
                key: self.resolve_type(cx, file, params, key)?,
                value: self.resolve_type(cx, file, params, value)?,
            },
            TypeExpr::Chan { dir, elem } => TypeData::Chan {
                dir: *dir,
                elem: self.resolve_type(cx, file, params, elem)?,
            },
            TypeExpr::Func(sig) => TypeData::Func(self.resolve_sig(cx, file, params, sig)?),
            TypeExpr::Struct(decls) => {
                let mut fields = Vec::with_capacity(decls.len());
                for decl in decls {
                    let ty = self.resolve_type(cx, file, params, &decl.ty)?;
                    let (name, embedded) = match &decl.name {
                        Some(name) => (name.name.clone(), false),
                        None => (embedded_name(&decl.ty), true),
                    };
                    fields.push(Field {
                        name,
                        ty,
                        embedded,
                        tag: decl.tag.clone(),
                    });
                }
                TypeData::Struct {
                    package: cx.pkg,
                    fields: fields.into_boxed_slice(),
                }
            }
            TypeExpr::Interface(elems) => {
                let mut out = Vec::with_capacity(elems.len());
                for elem in elems {
                    out.push(match elem {
                        ast::InterfaceElem::Method { name, sig } => InterfaceElem::Method {
                            name: name.name.clone(),
                            sig: self.resolve_sig(cx, file, params, sig)?,
                        },
                        ast::InterfaceElem::Embed(ty) => {
                            InterfaceElem::Embed(self.resolve_type(cx, file, params, ty)?)
                        }
                    });
                }
                TypeData::Interface(out.into_boxed_slice())
            }
            TypeExpr::Union(terms) => {
                let mut out = Vec::with_capacity(terms.len());
                for term in terms {
                    out.push(UnionTerm {
                        tilde: term.tilde,
                        ty: self.resolve_type(cx, file, params, &term.ty)?,
                    });
                }
                TypeData::Union(out.into_boxed_slice())
            }
        };
        Ok(self.pool.intern(data))
    }

    fn resolve_sig(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        params: &[String],
        sig: &ast::Signature,
    ) -> Result<Signature, LoadError> {
        let last = sig.params.len().saturating_sub(1);
        let mut ins = Vec::with_capacity(sig.params.len());
        for (i, param) in sig.params.iter().enumerate() {
            let mut ty = self.resolve_type(cx, file, params, &param.ty)?;
            if sig.variadic && i == last {
                ty = self.pool.intern(TypeData::Slice(ty));
            }
            ins.push(ty);
        }
        let mut outs = Vec::with_capacity(sig.results.len());
        for result in &sig.results {
            outs.push(self.resolve_type(cx, file, params, &result.ty)?);
        }
        Ok(Signature {
            params: ins.into_boxed_slice(),
            results: outs.into_boxed_slice(),
            variadic: sig.variadic,
        })
    }

    /// Apply type arguments written after a type name.
    fn apply_args(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        params: &[String],
        base: Idx,
        name: &Ident,
        args: &[TypeExpr],
    ) -> Result<Idx, LoadError> {
        if args.is_empty() {
            return Ok(base);
        }
        let TypeData::Named(id) = *self.pool.get(base) else {
            return Err(cx.error(file, name.span, format!("{} is not a generic type", name.name)));
        };
        let declared = self.pool.named(id);
        let opaque = self.packages[declared.package.index()].opaque;
        if !opaque && declared.type_params.len() != args.len() {
            let want = declared.type_params.len();
            return Err(cx.error(
                file,
                name.span,
                format!(
                    "wrong number of type arguments for {}: have {}, want {want}",
                    name.name,
                    args.len()
                ),
            ));
        }
        let mut resolved = Vec::with_capacity(args.len());
        for arg in args {
            resolved.push(self.resolve_type(cx, file, params, arg)?);
        }
        Ok(self.pool.intern(TypeData::Instance {
            base: id,
            args: resolved.into_boxed_slice(),
        }))
    }

    /// Unqualified name: type parameter, package scope, dot imports, then
    /// the universe.
    fn lookup(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        params: &[String],
        ident: &Ident,
    ) -> Result<Idx, LoadError> {
        let name = &ident.name;
        if params.contains(name) {
            return Ok(self.pool.intern(TypeData::TypeParam(name.clone())));
        }
        if cx.aliases.contains_key(name) {
            return self.resolve_alias(cx, name);
        }
        if let Some(idx) = self.packages[cx.pkg.index()].lookup(name) {
            return Ok(idx);
        }
        let dots = cx.scopes[file].dots.clone();
        for dep in &dots {
            let package = &self.packages[dep.index()];
            if let Some(idx) = package.lookup(name).filter(|_| !package.opaque) {
                return Ok(idx);
            }
        }
        if let Some(idx) = self.packages[PkgId::UNIVERSE.index()].lookup(name) {
            return Ok(idx);
        }
        if is_exported(name) {
            if let Some(&dep) = dots.iter().find(|dep| self.packages[dep.index()].opaque) {
                return Ok(self.opaque_named(dep, name));
            }
        }
        Err(cx.error(file, ident.span, format!("undefined: {name}")))
    }

    fn lookup_qualified(
        &mut self,
        cx: &mut PackageCx<'_>,
        file: usize,
        qualifier: &Ident,
        name: &Ident,
    ) -> Result<Idx, LoadError> {
        let Some(dep) = self.qualifier(cx, file, &qualifier.name) else {
            return Err(cx.error(file, qualifier.span, format!("undefined: {}", qualifier.name)));
        };
        // cgo names such as `C.int` are lower-case.
        if !is_exported(&name.name) && self.packages[dep.index()].path != "C" {
            return Err(cx.error(
                file,
                name.span,
                format!("name {} not exported by package {}", name.name, qualifier.name),
            ));
        }
        let package = &self.packages[dep.index()];
        if package.opaque {
            return Ok(self.opaque_named(dep, &name.name));
        }
        package.lookup(&name.name).ok_or_else(|| {
            cx.error(file, name.span, format!("undefined: {}.{}", qualifier.name, name.name))
        })
    }

    /// The package a qualifier names in `file`.
    ///
    /// An opaque import's name is only guessed from its path, and the
    /// guess skips a trailing major version: `k8s.io/api/core/v1` is bound
    /// as `core`. A qualifier equal to the last path element of such an
    /// import names it too, and becomes its package name, so generated
    /// imports use the same spelling.
    fn qualifier(&mut self, cx: &mut PackageCx<'_>, file: usize, qualifier: &str) -> Option<PkgId> {
        let scope = &mut cx.scopes[file];
        if let Some(&dep) = scope.imports.get(qualifier) {
            return Some(dep);
        }
        let dep = scope.guessed.iter().copied().find(|dep| {
            self.packages[dep.index()].path.rsplit('/').next() == Some(qualifier)
        })?;
        tracing::debug!(
            path = %self.packages[dep.index()].path,
            name = qualifier,
            "package name taken from use"
        );
        self.packages[dep.index()].name = qualifier.to_owned();
        scope.imports.insert(qualifier.to_owned(), dep);
        Some(dep)
    }

    /// The named type `name` of an opaque package, created on first use.
    fn opaque_named(&mut self, pkg: PkgId, name: &str) -> Idx {
        if let Some(idx) = self.packages[pkg.index()].lookup(name) {
            return idx;
        }
        let idx = self.pool.declare_named(NamedType::new(name, pkg));
        self.packages[pkg.index()].scope.insert(name.to_owned(), idx);
        idx
    }

    fn attach_methods(&mut self, cx: &mut PackageCx<'_>) -> Result<(), LoadError> {
        let files = cx.files;
        for (file, src) in files.iter().enumerate() {
            for func in src.ast.funcs() {
                let Some(recv) = &func.recv else {
                    continue;
                };
                let base = if cx.aliases.contains_key(&recv.base.name) {
                    Some(self.resolve_alias(cx, &recv.base.name)?)
                } else {
                    self.packages[cx.pkg.index()].lookup(&recv.base.name)
                };
                let Some(base) = base else {
                    return Err(cx.error(file, recv.base.span, format!("undefined: {}", recv.base.name)));
                };
                let id = match *self.pool.get(base) {
                    TypeData::Named(id) if self.pool.named(id).package == cx.pkg => id,
                    _ => {
                        return Err(cx.error(
                            file,
                            recv.base.span,
                            format!("cannot define new methods on non-local type {}", recv.base.name),
                        ));
                    }
                };
                let params: Vec<String> = recv.type_params.iter().map(|p| p.name.clone()).collect();
                let sig = self.resolve_sig(cx, file, &params, &func.sig)?;
                self.pool.named_mut(id).methods.push(Method {
                    name: func.name.name.clone(),
                    pointer_receiver: recv.pointer,
                    receiver_params: params,
                    sig,
                });
            }
        }
        Ok(())
    }

    /// A named type may not contain itself by value.
    fn check_recursive(&self, cx: &PackageCx<'_>) -> Result<(), LoadError> {
        for &(idx, file, spec) in &cx.declared {
            let Some(id) = self.pool.named_id(idx) else {
                continue;
            };
            let Some(rhs) = self.pool.named(id).rhs else {
                continue;
            };
            let mut seen = FxHashSet::default();
            if self.contains_by_value(rhs, id, &mut seen) {
                return Err(cx.error(
                    file,
                    spec.name.span,
                    format!("invalid recursive type {}", spec.name.name),
                ));
            }
        }
        Ok(())
    }

    fn contains_by_value(&self, idx: Idx, target: NamedId, seen: &mut FxHashSet<Idx>) -> bool {
        if !seen.insert(idx) {
            return false;
        }
        ensure_sufficient_stack(|| match self.pool.get(idx) {
            TypeData::Named(id) | TypeData::Instance { base: id, .. } => {
                *id == target
                    || self
                        .pool
                        .named(*id)
                        .rhs
                        .is_some_and(|rhs| self.contains_by_value(rhs, target, seen))
            }
            TypeData::Struct { fields, .. } => fields
                .iter()
                .any(|field| self.contains_by_value(field.ty, target, seen)),
            TypeData::Array { elem, .. } => self.contains_by_value(*elem, target, seen),
            _ => false,
        })
    }
}

fn type_param_names(params: &[ast::TypeParam]) -> Vec<String> {
    params.iter().map(|p| p.name.name.clone()).collect()
}

/// Field name of an embedded field: the type name without qualifier.
fn embedded_name(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Pointer(inner) => embedded_name(inner),
        TypeExpr::Name { name, .. } => name.name.clone(),
        _ => String::new(),
    }
}

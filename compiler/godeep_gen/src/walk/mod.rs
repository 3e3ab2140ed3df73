//! The copy walk.
//!
//! A generated method first copies the receiver shallowly into `cp`; the
//! walk then emits assignments only where that shallow copy still shares
//! memory with the original: slices, maps, pointers and channels, at any
//! depth below the receiver. Types with a usable `DeepCopy` are copied by
//! calling it.

use godeep_ir::ensure_sufficient_stack;
use godeep_types::{Field, Idx, PkgId, Program, TypeData};

use crate::buffer::CodeBuffer;
use crate::capability::{capability, Capability, Shape};
use crate::render::render_type;
use crate::{GenError, ImportTable, SkipSet};

/// State shared by all methods of one generated file.
#[derive(Debug, Default)]
pub struct Session {
    imports: ImportTable,
    methods: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    /// Generated method texts in request order.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Generate the `DeepCopy` method of the named type `ty`.
    ///
    /// `generating` is every type requested in this run, so that types
    /// referring to each other call each other's methods.
    pub fn generate_method(
        &mut self,
        program: &Program,
        generating: &[Idx],
        shape: Shape,
        ty: Idx,
        skips: &SkipSet,
    ) -> Result<(), GenError> {
        let pool = program.pool();
        let Some(id) = pool.named_id(ty) else {
            return Err(GenError::TypeNotFound {
                name: render_type(program, &mut self.imports, ty),
                package: program.package(program.target()).name.clone(),
            });
        };
        let named = pool.named(id);
        let receiver = if named.is_generic() {
            format!("{}[{}]", named.name, named.type_params.join(", "))
        } else {
            named.name.clone()
        };
        let ptr = shape.prefix();

        let mut out = CodeBuffer::new();
        out.line(format!("// DeepCopy generates a deep copy of {ptr}{receiver}"));
        out.open(format!(
            "func (o {ptr}{receiver}) DeepCopy() {ptr}{receiver} {{"
        ));
        if shape.is_pointer() {
            out.open("if o == nil {");
            out.line("return nil");
            out.close("}");
        }
        out.line(format!("var cp {receiver} = {ptr}o"));

        // Selectors auto-dereference pointers to structs; other
        // underlying types need an explicit `(*o)`.
        let source = if shape.is_pointer() && !is_struct(program, ty) {
            "(*o)"
        } else {
            "o"
        };
        let mut walker = Walker {
            program,
            generating,
            shape,
            skips,
            imports: &mut self.imports,
            stack: Vec::new(),
            index_depth: 0,
            map_depth: 0,
        };
        walker.walk(&mut out, &Place::root(source), ty, true)?;

        out.line(if shape.is_pointer() {
            "return &cp"
        } else {
            "return cp"
        });
        out.close("}");
        tracing::debug!(ty = %named.name, "generated DeepCopy");
        self.methods.push(out.into_string());
        Ok(())
    }
}

fn is_struct(program: &Program, ty: Idx) -> bool {
    let pool = program.pool();
    matches!(
        pool.underlying(ty).map(|under| pool.get(under)),
        Some(TypeData::Struct { .. })
    )
}

/// Where a value is copied from and to, and its selector path below the
/// receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Place {
    source: String,
    sink: String,
    path: String,
}

impl Place {
    fn root(source: &str) -> Self {
        Place {
            source: source.to_owned(),
            sink: "cp".to_owned(),
            path: String::new(),
        }
    }

    fn field(&self, name: &str) -> Self {
        Place {
            source: format!("{}.{name}", self.source),
            sink: format!("{}.{name}", self.sink),
            path: if self.path.is_empty() {
                name.to_owned()
            } else {
                format!("{}.{name}", self.path)
            },
        }
    }

    /// Element `var` of a slice or array. Selectors always spell the
    /// index `[i]`, whatever the loop variable is called.
    fn element(&self, var: &str) -> Self {
        Place {
            source: format!("{}[{var}]", self.source),
            sink: format!("{}[{var}]", self.sink),
            path: format!("{}[i]", self.path),
        }
    }

    /// The pointee of a pointer to a non-struct type.
    fn deref(&self) -> Self {
        Place {
            source: format!("(*{})", self.source),
            sink: format!("(*{})", self.sink),
            path: self.path.clone(),
        }
    }

    fn entry_path(&self) -> String {
        format!("{}[k]", self.path)
    }
}

/// An identifier derived from a sink expression, for map temporaries:
/// `cp.Lookup[i]` becomes `cp_Lookup_i`.
fn sink_ident(sink: &str) -> String {
    sink.chars()
        .filter_map(|c| match c {
            '.' | '[' => Some('_'),
            ']' | '(' | ')' | '*' | ' ' => None,
            c => Some(c),
        })
        .collect()
}

/// Loop variable for nesting `depth`: `i`, `i1`, `i2`, ...
fn loop_var(base: &str, depth: usize) -> String {
    if depth == 0 {
        base.to_owned()
    } else {
        format!("{base}{depth}")
    }
}

struct Walker<'a> {
    program: &'a Program,
    generating: &'a [Idx],
    shape: Shape,
    skips: &'a SkipSet,
    imports: &'a mut ImportTable,
    /// Named types being expanded, outermost first.
    stack: Vec<Idx>,
    index_depth: usize,
    map_depth: usize,
}

impl Walker<'_> {
    fn render(&mut self, ty: Idx) -> String {
        render_type(self.program, self.imports, ty)
    }

    fn capability(&self, ty: Idx) -> Option<Capability> {
        capability(self.program.pool(), self.generating, self.shape, ty)
    }

    fn walk(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        ty: Idx,
        top: bool,
    ) -> Result<(), GenError> {
        ensure_sufficient_stack(|| self.walk_type(out, place, ty, top))
    }

    fn walk_type(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        ty: Idx,
        top: bool,
    ) -> Result<(), GenError> {
        let program = self.program;
        let pool = program.pool();
        if !top {
            if let Some(cap) = self.capability(ty) {
                tracing::trace!(path = %place.path, "reusing DeepCopy");
                call_deep_copy(out, place, cap.shape, false);
                return Ok(());
            }
        }

        let named = pool.named_id(ty).is_some();
        if named {
            if self.stack.contains(&ty) {
                return Err(GenError::UnsupportedRecursiveType {
                    ty: self.render(ty),
                    path: place.path.clone(),
                });
            }
            self.stack.push(ty);
        }
        let result = match pool.underlying(ty) {
            Some(under) => self.walk_underlying(out, place, under, top),
            None => {
                self.warn_opaque(place, ty);
                Ok(())
            }
        };
        if named {
            self.stack.pop();
        }
        result
    }

    /// A type whose package could not be read keeps whatever the shallow
    /// copy shares.
    fn warn_opaque(&self, place: &Place, ty: Idx) {
        let pool = self.program.pool();
        let Some(id) = pool.named_id(ty) else {
            return;
        };
        let named = pool.named(id);
        let package = &self.program.package(named.package).path;
        if package == "unsafe" {
            return;
        }
        tracing::warn!(
            path = %place.path,
            ty = %format_args!("{package}.{}", named.name),
            "definition not available; copied shallowly"
        );
    }

    fn walk_underlying(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        under: Idx,
        top: bool,
    ) -> Result<(), GenError> {
        let program = self.program;
        match program.pool().get(under) {
            TypeData::Struct { package, fields } => self.walk_struct(out, place, *package, fields),
            TypeData::Slice(elem) => self.walk_slice(out, place, under, *elem),
            TypeData::Array { elem, .. } => self.walk_array(out, place, *elem),
            TypeData::Map { key, value } => self.walk_map(out, place, under, *key, *value),
            TypeData::Pointer(elem) => self.walk_pointer(out, place, *elem, top),
            TypeData::Chan { .. } => {
                let chan = self.render(under);
                out.open(format!("if {} != nil {{", place.source));
                out.line(format!("{} = make({chan}, cap({}))", place.sink, place.source));
                out.close("}");
                Ok(())
            }
            TypeData::Basic(_)
            | TypeData::Named(_)
            | TypeData::Instance { .. }
            | TypeData::TypeParam(_)
            | TypeData::Func(_)
            | TypeData::Interface(_)
            | TypeData::Union(_) => Ok(()),
        }
    }

    fn walk_struct(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        package: PkgId,
        fields: &[Field],
    ) -> Result<(), GenError> {
        let foreign = package != self.program.target();
        for field in fields {
            if field.name == "_" || (foreign && !field.is_exported()) {
                continue;
            }
            let child = place.field(&field.name);
            if self.skips.matches(&child.path) {
                continue;
            }
            self.walk(out, &child, field.ty, false)?;
        }
        Ok(())
    }

    fn walk_slice(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        slice: Idx,
        elem: Idx,
    ) -> Result<(), GenError> {
        let slice_ty = self.render(slice);
        let (source, sink) = (&place.source, &place.sink);
        out.open(format!("if {source} != nil {{"));
        out.line(format!("{sink} = make({slice_ty}, len({source}))"));
        out.line(format!("copy({sink}, {source})"));
        self.walk_elements(out, place, elem)?;
        out.close("}");
        Ok(())
    }

    fn walk_array(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        elem: Idx,
    ) -> Result<(), GenError> {
        self.walk_elements(out, place, elem)
    }

    /// Per-element loop, emitted only when some element needs more than
    /// the copy already made.
    fn walk_elements(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        elem: Idx,
    ) -> Result<(), GenError> {
        let var = loop_var("i", self.index_depth);
        let element = place.element(&var);
        if self.skips.matches(&element.path) {
            return Ok(());
        }
        let mut header = out.child();
        header.open(format!("for {var} := range {} {{", place.source));
        let mut body = header.child();
        self.index_depth += 1;
        let result = self.walk(&mut body, &element, elem, false);
        self.index_depth -= 1;
        result?;
        if !body.is_empty() {
            header.append(body);
            header.close("}");
            out.append(header);
        }
        Ok(())
    }

    fn walk_map(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        map: Idx,
        key: Idx,
        value: Idx,
    ) -> Result<(), GenError> {
        let map_ty = self.render(map);
        let (source, sink) = (&place.source, &place.sink);
        let k = loop_var("k", self.map_depth);
        let v = loop_var("v", self.map_depth);
        out.open(format!("if {source} != nil {{"));
        out.line(format!("{sink} = make({map_ty}, len({source}))"));
        out.open(format!("for {k}, {v} := range {source} {{"));

        let entry_path = place.entry_path();
        let mut key_sink = k.clone();
        let mut value_sink = v.clone();
        if !self.skips.matches(&entry_path) {
            let base = sink_ident(sink);
            self.map_depth += 1;
            let parts = self.copy_entry(out, &base, &entry_path, (&k, key), (&v, value));
            self.map_depth -= 1;
            let (key_tmp, value_tmp) = parts?;
            if let Some(tmp) = key_tmp {
                key_sink = tmp;
            }
            if let Some(tmp) = value_tmp {
                value_sink = tmp;
            }
        }
        out.line(format!("{sink}[{key_sink}] = {value_sink}"));
        out.close("}");
        out.close("}");
        Ok(())
    }

    /// Copy both halves of a map entry; `None` where the iteration
    /// binding can be inserted as is.
    fn copy_entry(
        &mut self,
        out: &mut CodeBuffer,
        base: &str,
        path: &str,
        (k, key): (&str, Idx),
        (v, value): (&str, Idx),
    ) -> Result<(Option<String>, Option<String>), GenError> {
        let key_tmp = self.copy_entry_part(out, k, format!("{base}_k"), path, key)?;
        let value_tmp = self.copy_entry_part(out, v, format!("{base}_v"), path, value)?;
        Ok((key_tmp, value_tmp))
    }

    /// Copy a map key or value into a temporary when it needs more than
    /// the iteration copy. Returns the temporary's name if one was made.
    fn copy_entry_part(
        &mut self,
        out: &mut CodeBuffer,
        binding: &str,
        tmp: String,
        path: &str,
        ty: Idx,
    ) -> Result<Option<String>, GenError> {
        let part = Place {
            source: binding.to_owned(),
            sink: tmp.clone(),
            path: path.to_owned(),
        };
        let mut body = out.child();
        self.walk(&mut body, &part, ty, false)?;
        if body.is_empty() {
            return Ok(None);
        }
        let ty_name = self.render(ty);
        out.line(format!("var {tmp} {ty_name} = {binding}"));
        out.append(body);
        Ok(Some(tmp))
    }

    fn walk_pointer(
        &mut self,
        out: &mut CodeBuffer,
        place: &Place,
        elem: Idx,
        top: bool,
    ) -> Result<(), GenError> {
        out.open(format!("if {} != nil {{", place.source));
        match self.capability(elem).filter(|_| !top) {
            Some(cap) => call_deep_copy(out, place, cap.shape, true),
            None => {
                let elem_ty = self.render(elem);
                out.line(format!("{} = new({elem_ty})", place.sink));
                out.line(format!("*{} = *{}", place.sink, place.source));
                let pointee = if is_struct(self.program, elem) {
                    place.clone()
                } else {
                    place.deref()
                };
                self.walk(out, &pointee, elem, false)?;
            }
        }
        out.close("}");
        Ok(())
    }
}

/// Assign `sink` from `source.DeepCopy()`, adapting between the method's
/// shape and whether the place holds a pointer.
fn call_deep_copy(out: &mut CodeBuffer, place: &Place, method: Shape, pointer_place: bool) {
    let (source, sink) = (&place.source, &place.sink);
    match (pointer_place, method) {
        (false, Shape::Value) | (true, Shape::Pointer) => {
            out.line(format!("{sink} = {source}.DeepCopy()"));
        }
        (true, Shape::Value) => {
            out.open("{");
            out.line(format!("retV := {source}.DeepCopy()"));
            out.line(format!("{sink} = &retV"));
            out.close("}");
        }
        (false, Shape::Pointer) => {
            out.open("{");
            out.line(format!("retV := {source}.DeepCopy()"));
            out.line(format!("{sink} = *retV"));
            out.close("}");
        }
    }
}

#[cfg(test)]
mod tests;

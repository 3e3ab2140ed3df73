//! Go spelling of pool types, as seen from the target package.
//!
//! Names from other packages are qualified with their alias from the
//! [`ImportTable`], which registers the import on first use.

use godeep_ir::ast::ChanDir;
use godeep_types::{InterfaceElem, Idx, PkgId, Program, Signature, TypeData};

use crate::ImportTable;

pub(crate) fn render_type(program: &Program, imports: &mut ImportTable, ty: Idx) -> String {
    let mut out = String::new();
    Renderer { program, imports }.write_type(&mut out, ty);
    out
}

struct Renderer<'a> {
    program: &'a Program,
    imports: &'a mut ImportTable,
}

impl Renderer<'_> {
    fn write_type(&mut self, out: &mut String, ty: Idx) {
        let program = self.program;
        let pool = program.pool();
        match pool.get(ty) {
            TypeData::Basic(kind) => out.push_str(kind.name()),
            TypeData::Named(id) => {
                let named = pool.named(*id);
                self.write_qualifier(out, named.package);
                out.push_str(&named.name);
            }
            TypeData::Instance { base, args } => {
                let named = pool.named(*base);
                self.write_qualifier(out, named.package);
                out.push_str(&named.name);
                out.push('[');
                self.write_list(out, args);
                out.push(']');
            }
            TypeData::TypeParam(name) => out.push_str(name),
            TypeData::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem);
            }
            TypeData::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem);
            }
            TypeData::Array { len, elem } => {
                out.push('[');
                out.push_str(&len.to_string());
                out.push(']');
                self.write_type(out, *elem);
            }
            TypeData::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, *key);
                out.push(']');
                self.write_type(out, *value);
            }
            TypeData::Chan { dir, elem } => {
                let recv_elem = matches!(
                    pool.get(*elem),
                    TypeData::Chan {
                        dir: ChanDir::Recv,
                        ..
                    }
                );
                match dir {
                    ChanDir::Both if recv_elem => {
                        out.push_str("chan (");
                        self.write_type(out, *elem);
                        out.push(')');
                        return;
                    }
                    ChanDir::Both => out.push_str("chan "),
                    ChanDir::Send => out.push_str("chan<- "),
                    ChanDir::Recv => out.push_str("<-chan "),
                }
                self.write_type(out, *elem);
            }
            TypeData::Struct { fields, .. } => {
                if fields.is_empty() {
                    out.push_str("struct{}");
                    return;
                }
                out.push_str("struct{ ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(' ');
                    }
                    self.write_type(out, field.ty);
                    if let Some(tag) = &field.tag {
                        out.push(' ');
                        out.push_str(tag);
                    }
                }
                out.push_str(" }");
            }
            TypeData::Func(sig) => {
                out.push_str("func");
                self.write_signature(out, sig);
            }
            TypeData::Interface(elems) => {
                if elems.is_empty() {
                    out.push_str("interface{}");
                    return;
                }
                out.push_str("interface{ ");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    match elem {
                        InterfaceElem::Method { name, sig } => {
                            out.push_str(name);
                            self.write_signature(out, sig);
                        }
                        InterfaceElem::Embed(ty) => self.write_type(out, *ty),
                    }
                }
                out.push_str(" }");
            }
            TypeData::Union(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    if term.tilde {
                        out.push('~');
                    }
                    self.write_type(out, term.ty);
                }
            }
        }
    }

    fn write_qualifier(&mut self, out: &mut String, package: PkgId) {
        if package == PkgId::UNIVERSE || package == self.program.target() {
            return;
        }
        let program = self.program;
        let package = program.package(package);
        out.push_str(self.imports.alias_for(&package.path, &package.name));
        out.push('.');
    }

    fn write_list(&mut self, out: &mut String, types: &[Idx]) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, *ty);
        }
    }

    /// Parameter and result lists; the variadic parameter is stored as a
    /// slice and printed as `...T`.
    fn write_signature(&mut self, out: &mut String, sig: &Signature) {
        out.push('(');
        for (i, param) in sig.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let variadic_elem = match self.program.pool().get(*param) {
                TypeData::Slice(elem) if sig.variadic && i + 1 == sig.params.len() => Some(*elem),
                _ => None,
            };
            match variadic_elem {
                Some(elem) => {
                    out.push_str("...");
                    self.write_type(out, elem);
                }
                None => self.write_type(out, *param),
            }
        }
        out.push(')');
        match &*sig.results {
            [] => {}
            [single] => {
                out.push(' ');
                self.write_type(out, *single);
            }
            results => {
                out.push_str(" (");
                self.write_list(out, results);
                out.push(')');
            }
        }
    }
}

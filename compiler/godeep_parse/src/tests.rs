#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use super::*;
use godeep_ir::ast::{
    ChanDir, Decl, Expr, FuncDecl, ImportName, InterfaceElem, Stmt, TypeExpr, TypeSpec,
};
use pretty_assertions::assert_eq;

fn signatures(source: &str) -> File {
    parse_source(source, ParseMode::Signatures).expect("source should parse")
}

fn full(source: &str) -> File {
    parse_source(source, ParseMode::Full).expect("source should parse")
}

fn type_spec<'f>(file: &'f File, name: &str) -> &'f TypeSpec {
    file.type_specs()
        .find(|spec| spec.name.name == name)
        .unwrap_or_else(|| panic!("no type {name}"))
}

fn func<'f>(file: &'f File, name: &str) -> &'f FuncDecl {
    file.funcs()
        .find(|f| f.name.name == name)
        .unwrap_or_else(|| panic!("no func {name}"))
}

fn name(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Name { package, name, .. } => match package {
            Some(pkg) => format!("{}.{}", pkg.name, name.name),
            None => name.name.clone(),
        },
        other => panic!("expected a type name, got {other:?}"),
    }
}

/// The literal text of an array type's length.
fn array_len(ty: &TypeExpr) -> &str {
    match ty {
        TypeExpr::Array { len, .. } => match len.expr.as_deref() {
            Some(Expr::Lit(text)) => text,
            Some(Expr::Ident(ident)) => &ident.name,
            other => panic!("unexpected array length {other:?}"),
        },
        other => panic!("expected an array, got {other:?}"),
    }
}

#[test]
fn test_package_and_imports() {
    let file = signatures(
        r#"package shapes

import "fmt"
import (
	str "strings"
	. "math"
	_ "embed"
	"example.com/geo/v2"
)
"#,
    );
    assert_eq!(file.package.name, "shapes");
    let imports: Vec<_> = file
        .imports
        .iter()
        .map(|i| (i.name.clone(), i.path.as_str()))
        .collect();
    assert_eq!(
        imports,
        vec![
            (ImportName::Default, "fmt"),
            (ImportName::Alias("str".into()), "strings"),
            (ImportName::Dot, "math"),
            (ImportName::Blank, "embed"),
            (ImportName::Default, "example.com/geo/v2"),
        ]
    );
}

#[test]
fn test_struct_fields_tags_and_embedding() {
    let file = signatures(
        "package a
type Inner struct {
	sync.Mutex
	*Base
	X, Y int `json:\"x\"`
	items []string
	Lookup map[string]*Inner
	Grid [3][4]float64
}
",
    );
    let TypeExpr::Struct(fields) = &type_spec(&file, "Inner").ty else {
        panic!("expected struct");
    };
    let names: Vec<_> = fields
        .iter()
        .map(|f| f.name.as_ref().map(|n| n.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![None, None, Some("X"), Some("Y"), Some("items"), Some("Lookup"), Some("Grid")]
    );
    assert_eq!(name(&fields[0].ty), "sync.Mutex");
    assert!(matches!(fields[1].ty, TypeExpr::Pointer(_)));
    assert_eq!(fields[2].tag.as_deref(), Some("`json:\"x\"`"));
    assert_eq!(fields[3].tag, fields[2].tag);
    let TypeExpr::Array { elem, .. } = &fields[6].ty else {
        panic!("expected array");
    };
    assert_eq!(array_len(&fields[6].ty), "3");
    assert_eq!(array_len(elem), "4");
}

#[test]
fn test_type_params_versus_array_types() {
    let file = signatures(
        "package a
const N = 4
type Buf [N]byte
type List[T any] struct{ items []T }
type Pair[K comparable, V any] struct{ Key K; Val V }
type Num interface{ ~int | ~float64 }
type Alias = List[int]
",
    );
    let buf = type_spec(&file, "Buf");
    assert!(buf.type_params.is_empty());
    assert_eq!(array_len(&buf.ty), "N");

    let list = type_spec(&file, "List");
    assert_eq!(list.type_params.len(), 1);
    assert_eq!(list.type_params[0].name.name, "T");

    let pair = type_spec(&file, "Pair");
    let params: Vec<_> = pair.type_params.iter().map(|p| p.name.name.as_str()).collect();
    assert_eq!(params, vec!["K", "V"]);

    let TypeExpr::Interface(elems) = &type_spec(&file, "Num").ty else {
        panic!("expected interface");
    };
    assert!(matches!(&elems[0], InterfaceElem::Embed(TypeExpr::Union(terms)) if terms.len() == 2));

    let alias = type_spec(&file, "Alias");
    assert!(alias.alias);
    assert!(matches!(&alias.ty, TypeExpr::Name { args, .. } if args.len() == 1));
    assert!(file.decls.iter().any(|d| matches!(d, Decl::Const(_))));
}

#[test]
fn test_const_groups_track_iota() {
    let file = signatures(
        "package a
const Single = 1 << 3
const (
	A, B = iota, iota * 2
	C, D
	_
	E int = geom.N + 1
)
",
    );
    let groups: Vec<_> = file.const_groups().collect();
    assert_eq!(groups.len(), 2);
    assert!(matches!(&groups[0][0].values[0], Expr::Binary { op: "<<", .. }));

    let group = groups[1];
    let iotas: Vec<_> = group.iter().map(|spec| spec.iota).collect();
    assert_eq!(iotas, vec![0, 1, 2, 3]);
    let names: Vec<_> = group[1].names.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["C", "D"]);
    assert!(group[1].values.is_empty());
    assert_eq!(group[0].values.len(), 2);
    assert_eq!(name(group[3].ty.as_ref().expect("typed const")), "int");
    assert!(matches!(&group[3].values[0], Expr::Binary { op: "+", .. }));
}

#[test]
fn test_array_length_expressions() {
    let file = signatures(
        "package a
type A [geom.N * 2]int
type B [(1 << 2)]*int
var c = [...]int{1, 2}
",
    );
    let TypeExpr::Array { len, .. } = &type_spec(&file, "A").ty else {
        panic!("expected array");
    };
    assert!(matches!(len.expr.as_deref(), Some(Expr::Binary { op: "*", .. })));
    let TypeExpr::Array { len, elem } = &type_spec(&file, "B").ty else {
        panic!("expected array");
    };
    assert!(matches!(len.expr.as_deref(), Some(Expr::Paren(_))));
    assert!(matches!(**elem, TypeExpr::Pointer(_)));
}

#[test]
fn test_grouped_type_decl_and_chan_directions() {
    let file = signatures(
        "package a
type (
	In  <-chan int
	Out chan<- int
	Both chan int
)
",
    );
    let dir = |n: &str| match &type_spec(&file, n).ty {
        TypeExpr::Chan { dir, .. } => *dir,
        other => panic!("expected chan, got {other:?}"),
    };
    assert_eq!(dir("In"), ChanDir::Recv);
    assert_eq!(dir("Out"), ChanDir::Send);
    assert_eq!(dir("Both"), ChanDir::Both);
}

#[test]
fn test_methods_and_receivers() {
    let file = signatures(
        "package a
func (o *Outer) DeepCopy() *Outer { return nil }
func (l List[T]) Len() int { return len(l.items) }
func (Point) String() string { return \"p\" }
func helper(a, b int, rest ...string) (n int, err error) { return 0, nil }
",
    );
    let deep = func(&file, "DeepCopy");
    let recv = deep.recv.as_ref().unwrap();
    assert!(recv.pointer);
    assert_eq!(recv.base.name, "Outer");
    assert_eq!(recv.name.as_ref().unwrap().name, "o");
    assert!(deep.sig.params.is_empty());
    assert_eq!(deep.sig.results.len(), 1);
    assert!(deep.body.is_none());

    let len = func(&file, "Len");
    let recv = len.recv.as_ref().unwrap();
    assert!(!recv.pointer);
    assert_eq!(recv.type_params[0].name, "T");

    let string = func(&file, "String");
    assert!(string.recv.as_ref().unwrap().name.is_none());

    let helper = func(&file, "helper");
    assert!(helper.recv.is_none());
    assert!(helper.sig.variadic);
    let params: Vec<_> = helper
        .sig
        .params
        .iter()
        .map(|p| p.name.as_ref().unwrap().name.as_str())
        .collect();
    assert_eq!(params, vec!["a", "b", "rest"]);
    assert_eq!(name(&helper.sig.params[1].ty), "int");
    assert_eq!(helper.sig.results.len(), 2);
}

#[test]
fn test_parameter_forms() {
    let file = signatures(
        "package a
func f(int, string) {}
func g(buf [4]byte, l List[int]) {}
func h(List[int], map[string]int) {}
",
    );
    let f = func(&file, "f");
    assert!(f.sig.params.iter().all(|p| p.name.is_none()));
    let g = func(&file, "g");
    assert!(matches!(g.sig.params[0].ty, TypeExpr::Array { .. }));
    assert!(matches!(&g.sig.params[1].ty, TypeExpr::Name { args, .. } if args.len() == 1));
    let h = func(&file, "h");
    assert_eq!(h.sig.params.len(), 2);
    assert!(h.sig.params[0].name.is_none());
}

#[test]
fn test_signatures_mode_skips_bodies_and_values() {
    let file = signatures(
        "package a
var (
	x = map[string]int{\"a\": 1}
	y = func() { if true { } }
)
func Run() {
	switch v := x[\"a\"]; v {
	case 1:
		go func() { defer close(nil) }()
	}
	select {}
}
",
    );
    assert_eq!(file.decls.len(), 2);
    assert!(func(&file, "Run").body.is_none());
}

#[test]
fn test_full_mode_parses_generated_body() {
    let file = full(
        "package a

// DeepCopy generates a deep copy of *Outer
func (o *Outer) DeepCopy() *Outer {
	if o == nil {
		return nil
	}
	var cp Outer = *o
	if o.Items != nil {
		cp.Items = make([]Item, len(o.Items))
		copy(cp.Items, o.Items)
		for i := range o.Items {
			{
				retV := o.Items[i].DeepCopy()
				cp.Items[i] = *retV
			}
		}
	}
	if o.Lookup != nil {
		cp.Lookup = make(map[string]*Inner, len(o.Lookup))
		for k, v := range o.Lookup {
			var cp_Lookup_v *Inner = v
			if v != nil {
				cp_Lookup_v = new(Inner)
				*cp_Lookup_v = *v
			}
			cp.Lookup[k] = cp_Lookup_v
		}
	}
	if o.Events != nil {
		cp.Events = make(<-chan struct{ At int }, cap(o.Events))
	}
	return &cp
}
",
    );
    let body = func(&file, "DeepCopy").body.as_ref().unwrap();
    assert_eq!(body.stmts.len(), 6);
    assert!(matches!(body.stmts[1], Stmt::Var { .. }));
    assert!(matches!(&body.stmts[5], Stmt::Return(values) if matches!(values[0], Expr::Unary { op: "&", .. })));
}

#[test]
fn test_full_mode_statements_and_composites() {
    let file = full(
        "package a
func f(xs []int) (total int) {
	for i := 0; i < len(xs); i++ {
		total += xs[i] * 2
	}
	for total > 10 {
		total--
	}
	p := Point{X: 1, Y: 2}
	if q := (Point{}); q.X == 0 {
		_ = []Point{{1, 2}, {X: 3}}
	} else if p.Y != 0 {
		return
	} else {
		_ = xs[1:len(xs):cap(xs)]
	}
	ch := make(chan int, 1)
	ch <- total
	v, ok := interface{}(p).(Point)
	_, _ = v, ok
	fn := func(args ...int) int { return args[0] }
	return fn(xs...)
}
",
    );
    let body = func(&file, "f").body.as_ref().unwrap();
    assert!(matches!(body.stmts[0], Stmt::For { .. }));
    assert!(matches!(&body.stmts[1], Stmt::For { init: None, cond: Some(_), post: None, .. }));
    assert!(matches!(&body.stmts[2], Stmt::Define { rhs, .. } if matches!(rhs[0], Expr::Composite { .. })));
    assert!(matches!(&body.stmts[3], Stmt::If { init: Some(_), els: Some(_), .. }));
    assert!(matches!(body.stmts[5], Stmt::Send { .. }));
}

#[test]
fn test_operator_precedence() {
    let file = full("package a\nfunc f() { _ = a || b && c == d + e * f }\n");
    let body = func(&file, "f").body.as_ref().unwrap();
    let Stmt::Assign { rhs, .. } = &body.stmts[0] else {
        panic!("expected assignment");
    };
    let Expr::Binary { op, rhs, .. } = &rhs[0] else {
        panic!("expected binary");
    };
    assert_eq!(*op, "||");
    assert!(matches!(**rhs, Expr::Binary { op: "&&", .. }));
}

#[test]
fn test_missing_brace_reports_context() {
    let err = parse_source("package a\nfunc f() {\n\tx := 1\n", ParseMode::Full).unwrap_err();
    let SyntaxError::Parse(err) = err else {
        panic!("expected parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::UnclosedBrace);
}

#[test]
fn test_unexpected_token_message() {
    let err = parse_source("package a\ntype T struct { X int", ParseMode::Signatures).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("expected `}`, found end of file"), "{message}");
    assert!(message.ends_with("while parsing a struct type"), "{message}");
}

#[test]
fn test_composite_not_allowed_in_if_header() {
    // `x {` in an if header opens the body, not a literal.
    let file = full("package a\nfunc f(x bool) {\n\tif x {\n\t\treturn\n\t}\n}\n");
    let body = func(&file, "f").body.as_ref().unwrap();
    assert!(matches!(&body.stmts[0], Stmt::If { cond: Expr::Ident(_), .. }));
}

#[test]
fn test_mixed_parameters_rejected() {
    let err = parse_source("package a\nfunc f(a int, string) {}\n", ParseMode::Signatures)
        .unwrap_err();
    assert!(matches!(
        err,
        SyntaxError::Parse(ParseError {
            kind: ParseErrorKind::MixedParameters,
            ..
        })
    ));
}

#[test]
fn test_lex_error_surfaces_as_syntax_error() {
    let err = parse_source("package a\nvar s = \"open\n", ParseMode::Signatures).unwrap_err();
    assert!(matches!(err, SyntaxError::Lex(_)));
}

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use std::path::Path;

use godeep_types::{load_program, MemoryTree, Program};
use pretty_assertions::assert_eq;

use super::*;
use crate::locate;

fn program(source: &str) -> Program {
    let tree = MemoryTree::new()
        .with("/m/go.mod", "module example.com/m\n")
        .with("/m/m.go", source);
    load_program(&tree, Path::new("/m")).unwrap()
}

/// Expected Go text written with four-space indents; converted to tabs.
fn go(text: &str) -> String {
    let mut out = String::new();
    for line in text.strip_prefix('\n').unwrap_or(text).lines() {
        let body = line.trim_start_matches(' ');
        let depth = (line.len() - body.len()) / 4;
        out.push_str(&"\t".repeat(depth));
        out.push_str(body);
        out.push('\n');
    }
    out
}

fn method_with(source: &str, names: &[&str], shape: Shape, skips: &str) -> Result<String, GenError> {
    let program = program(source);
    let generating = names
        .iter()
        .map(|name| locate(&program, name))
        .collect::<Result<Vec<_>, _>>()?;
    let mut session = Session::new();
    session.generate_method(&program, &generating, shape, generating[0], &SkipSet::parse(skips))?;
    Ok(session.methods()[0].clone())
}

fn method(source: &str, name: &str, shape: Shape) -> String {
    method_with(source, &[name], shape, "").unwrap()
}

#[test]
fn test_scalar_struct_is_a_bare_copy() {
    let text = method("package shapes\n\ntype Point struct {\n\tX, Y int\n}\n", "Point", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Point
func (o Point) DeepCopy() Point {
    var cp Point = o
    return cp
}")
    );
}

#[test]
fn test_self_referencing_slice_calls_deep_copy() {
    let text = method("package m\n\ntype Tree struct{ Children []Tree }\n", "Tree", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Tree
func (o Tree) DeepCopy() Tree {
    var cp Tree = o
    if o.Children != nil {
        cp.Children = make([]Tree, len(o.Children))
        copy(cp.Children, o.Children)
        for i := range o.Children {
            cp.Children[i] = o.Children[i].DeepCopy()
        }
    }
    return cp
}")
    );
}

#[test]
fn test_pointer_shape_guards_nil_receiver() {
    let source = "package m\n\ntype A struct{ Next *B }\n\ntype B struct{ Prev *A }\n";
    let text = method_with(source, &["A", "B"], Shape::Pointer, "").unwrap();
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of *A
func (o *A) DeepCopy() *A {
    if o == nil {
        return nil
    }
    var cp A = *o
    if o.Next != nil {
        cp.Next = o.Next.DeepCopy()
    }
    return &cp
}")
    );
}

#[test]
fn test_value_method_in_pointer_run() {
    let source = "package m

type Inner struct{ V []int }

func (i Inner) DeepCopy() Inner { return i }

type Outer struct {
	In  Inner
	Ptr *Inner
}
";
    let text = method_with(source, &["Outer"], Shape::Pointer, "").unwrap();
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of *Outer
func (o *Outer) DeepCopy() *Outer {
    if o == nil {
        return nil
    }
    var cp Outer = *o
    cp.In = o.In.DeepCopy()
    if o.Ptr != nil {
        {
            retV := o.Ptr.DeepCopy()
            cp.Ptr = &retV
        }
    }
    return &cp
}")
    );
}

#[test]
fn test_pointer_method_in_value_context() {
    let source = "package m

type Conf struct{ M map[string]string }

func (c *Conf) DeepCopy() *Conf { return c }

type App struct {
	C Conf
	P *Conf
}
";
    let text = method(source, "App", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of App
func (o App) DeepCopy() App {
    var cp App = o
    {
        retV := o.C.DeepCopy()
        cp.C = *retV
    }
    if o.P != nil {
        cp.P = o.P.DeepCopy()
    }
    return cp
}")
    );
}

#[test]
fn test_differently_shaped_deep_copy_is_not_reused() {
    let source = "package m

type Weird struct{ S []int }

func (w Weird) DeepCopy() int { return 0 }

type Holder struct{ W Weird }
";
    let text = method(source, "Holder", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Holder
func (o Holder) DeepCopy() Holder {
    var cp Holder = o
    if o.W.S != nil {
        cp.W.S = make([]int, len(o.W.S))
        copy(cp.W.S, o.W.S)
    }
    return cp
}")
    );
}

#[test]
fn test_map_entries_use_temporaries_only_when_needed() {
    let source = "package m

type Item struct{ Tags []string }

type Index struct {
	ByName map[string]*Item
	Raw    map[string][]byte
}
";
    let text = method_with(source, &["Index"], Shape::Value, "Raw[k]").unwrap();
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Index
func (o Index) DeepCopy() Index {
    var cp Index = o
    if o.ByName != nil {
        cp.ByName = make(map[string]*Item, len(o.ByName))
        for k, v := range o.ByName {
            var cp_ByName_v *Item = v
            if v != nil {
                cp_ByName_v = new(Item)
                *cp_ByName_v = *v
                if v.Tags != nil {
                    cp_ByName_v.Tags = make([]string, len(v.Tags))
                    copy(cp_ByName_v.Tags, v.Tags)
                }
            }
            cp.ByName[k] = cp_ByName_v
        }
    }
    if o.Raw != nil {
        cp.Raw = make(map[string][]byte, len(o.Raw))
        for k, v := range o.Raw {
            cp.Raw[k] = v
        }
    }
    return cp
}")
    );
}

#[test]
fn test_skipped_paths_stay_shallow() {
    let source = "package m

type Leaf struct{ P *int }

type Doc struct {
	Items []*Leaf
	Meta  *Leaf
}
";
    let program = program(source);
    let doc = locate(&program, "Doc").unwrap();
    let skips = SkipSet::parse("Items[i],Meta,Nope");
    let mut session = Session::new();
    session
        .generate_method(&program, &[doc], Shape::Value, doc, &skips)
        .unwrap();
    assert_eq!(
        session.methods()[0],
        go(r"
// DeepCopy generates a deep copy of Doc
func (o Doc) DeepCopy() Doc {
    var cp Doc = o
    if o.Items != nil {
        cp.Items = make([]*Leaf, len(o.Items))
        copy(cp.Items, o.Items)
    }
    return cp
}")
    );
    assert_eq!(skips.unmatched(), vec!["Nope"]);
}

#[test]
fn test_nested_loops_use_distinct_variables() {
    let text = method("package m\n\ntype Grid struct{ Cells [][]*int }\n", "Grid", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Grid
func (o Grid) DeepCopy() Grid {
    var cp Grid = o
    if o.Cells != nil {
        cp.Cells = make([][]*int, len(o.Cells))
        copy(cp.Cells, o.Cells)
        for i := range o.Cells {
            if o.Cells[i] != nil {
                cp.Cells[i] = make([]*int, len(o.Cells[i]))
                copy(cp.Cells[i], o.Cells[i])
                for i1 := range o.Cells[i] {
                    if o.Cells[i][i1] != nil {
                        cp.Cells[i][i1] = new(int)
                        *cp.Cells[i][i1] = *o.Cells[i][i1]
                    }
                }
            }
        }
    }
    return cp
}")
    );
}

#[test]
fn test_nested_maps_use_distinct_bindings() {
    let text = method(
        "package m\n\ntype Nest struct{ M map[string]map[string]*int }\n",
        "Nest",
        Shape::Value,
    );
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Nest
func (o Nest) DeepCopy() Nest {
    var cp Nest = o
    if o.M != nil {
        cp.M = make(map[string]map[string]*int, len(o.M))
        for k, v := range o.M {
            var cp_M_v map[string]*int = v
            if v != nil {
                cp_M_v = make(map[string]*int, len(v))
                for k1, v1 := range v {
                    var cp_M_v_v *int = v1
                    if v1 != nil {
                        cp_M_v_v = new(int)
                        *cp_M_v_v = *v1
                    }
                    cp_M_v[k1] = cp_M_v_v
                }
            }
            cp.M[k] = cp_M_v
        }
    }
    return cp
}")
    );
}

#[test]
fn test_pointer_shape_on_slice_type_dereferences() {
    let text = method("package m\n\ntype Names []*string\n", "Names", Shape::Pointer);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of *Names
func (o *Names) DeepCopy() *Names {
    if o == nil {
        return nil
    }
    var cp Names = *o
    if (*o) != nil {
        cp = make([]*string, len((*o)))
        copy(cp, (*o))
        for i := range (*o) {
            if (*o)[i] != nil {
                cp[i] = new(string)
                *cp[i] = *(*o)[i]
            }
        }
    }
    return &cp
}")
    );
}

#[test]
fn test_generic_receiver() {
    let source = "package m

type List[T any] struct {
	items []T
	next  *List[T]
}
";
    let text = method(source, "List", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of List[T]
func (o List[T]) DeepCopy() List[T] {
    var cp List[T] = o
    if o.items != nil {
        cp.items = make([]T, len(o.items))
        copy(cp.items, o.items)
    }
    if o.next != nil {
        {
            retV := o.next.DeepCopy()
            cp.next = &retV
        }
    }
    return cp
}")
    );
}

#[test]
fn test_channels_and_arrays() {
    let source = "package m

type Pipes struct {
	In   chan int
	Out  <-chan string
	Buf  [4]*int
	Flat [2]int
}
";
    let text = method(source, "Pipes", Shape::Value);
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Pipes
func (o Pipes) DeepCopy() Pipes {
    var cp Pipes = o
    if o.In != nil {
        cp.In = make(chan int, cap(o.In))
    }
    if o.Out != nil {
        cp.Out = make(<-chan string, cap(o.Out))
    }
    for i := range o.Buf {
        if o.Buf[i] != nil {
            cp.Buf[i] = new(int)
            *cp.Buf[i] = *o.Buf[i]
        }
    }
    return cp
}")
    );
}

#[test]
fn test_embedded_field_path() {
    let source = "package m

type Base struct{ Tags []string }

type Derived struct {
	Base
	N int
}
";
    let text = method_with(source, &["Derived"], Shape::Value, "Base.Tags").unwrap();
    assert_eq!(
        text,
        go(r"
// DeepCopy generates a deep copy of Derived
func (o Derived) DeepCopy() Derived {
    var cp Derived = o
    return cp
}")
    );
    let text = method(source, "Derived", Shape::Value);
    assert!(text.contains("\tif o.Base.Tags != nil {\n"), "{text}");
}

#[test]
fn test_recursive_type_outside_generation_set() {
    let source = "package m

type List struct{ Head *Node }

type Node struct {
	Next *Node
	V    int
}
";
    let err = method_with(source, &["List"], Shape::Value, "").unwrap_err();
    assert_eq!(
        err,
        GenError::UnsupportedRecursiveType {
            ty: "Node".into(),
            path: "Head.Next".into(),
        }
    );

    let text = method_with(source, &["List", "Node"], Shape::Value, "").unwrap();
    assert!(text.contains("\t\tretV := o.Head.DeepCopy()\n"), "{text}");
}

#[test]
fn test_sink_ident() {
    assert_eq!(sink_ident("cp.Lookup"), "cp_Lookup");
    assert_eq!(sink_ident("cp.Items[i].M"), "cp_Items_i_M");
    assert_eq!(sink_ident("(*cp.P)"), "cp_P");
}

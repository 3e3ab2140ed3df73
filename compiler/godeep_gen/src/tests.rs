#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use std::path::Path;

use godeep_types::{load_program, MemoryTree, Program};
use pretty_assertions::assert_eq;

use super::*;

fn load(tree: &MemoryTree, dir: &str) -> Program {
    load_program(tree, Path::new(dir)).unwrap()
}

fn single(source: &str) -> Program {
    let tree = MemoryTree::new()
        .with("/m/go.mod", "module example.com/m\n")
        .with("/m/m.go", source);
    load(&tree, "/m")
}

fn options(invocation: &str) -> GenerateOptions {
    GenerateOptions {
        shape: Shape::Value,
        invocation: invocation.to_owned(),
    }
}

fn requests(names: &[&str]) -> Vec<CopyRequest> {
    names.iter().map(|&name| CopyRequest::new(name)).collect()
}

#[test]
fn test_whole_file_with_colliding_imports() {
    let tree = MemoryTree::new()
        .with("/m/go.mod", "module example.com/m\n")
        .with(
            "/m/m.go",
            "package m

import (
	\"example.com/m/a/model\"
	bmodel \"example.com/m/b/model\"
	\"time\"
)

type Both struct {
	A  []*model.Thing
	B  map[string]*bmodel.Thing
	At []time.Time
}
",
        )
        .with(
            "/m/a/model/thing.go",
            "package model\n\ntype Thing struct {\n\tN      int\n\thidden *int\n}\n",
        )
        .with("/m/b/model/thing.go", "package model\n\ntype Thing struct{ S []string }\n");
    let program = load(&tree, "/m");
    let text = generate(&program, &requests(&["Both"]), &options("godeep -t Both")).unwrap();
    assert_eq!(
        text,
        "// Code generated by godeep -t Both; DO NOT EDIT.

package m

import (
	\"example.com/m/a/model\"
	example_com_m_b_model \"example.com/m/b/model\"
	\"time\"
)

// DeepCopy generates a deep copy of Both
func (o Both) DeepCopy() Both {
	var cp Both = o
	if o.A != nil {
		cp.A = make([]*model.Thing, len(o.A))
		copy(cp.A, o.A)
		for i := range o.A {
			if o.A[i] != nil {
				cp.A[i] = new(model.Thing)
				*cp.A[i] = *o.A[i]
			}
		}
	}
	if o.B != nil {
		cp.B = make(map[string]*example_com_m_b_model.Thing, len(o.B))
		for k, v := range o.B {
			var cp_B_v *example_com_m_b_model.Thing = v
			if v != nil {
				cp_B_v = new(example_com_m_b_model.Thing)
				*cp_B_v = *v
				if v.S != nil {
					cp_B_v.S = make([]string, len(v.S))
					copy(cp_B_v.S, v.S)
				}
			}
			cp.B[k] = cp_B_v
		}
	}
	if o.At != nil {
		cp.At = make([]time.Time, len(o.At))
		copy(cp.At, o.At)
	}
	return cp
}
"
    );
}

#[test]
fn test_methods_follow_request_order() {
    let program = single("package m\n\ntype A struct{ B *B }\n\ntype B struct{ A []A }\n");
    let text = generate(&program, &requests(&["B", "A"]), &options("godeep")).unwrap();
    let b = text.find("func (o B)").unwrap();
    let a = text.find("func (o A)").unwrap();
    assert!(b < a, "{text}");
    assert!(text.contains("\t\t\tretV := o.B.DeepCopy()\n"), "{text}");
    assert!(text.contains("\t\t\tcp.A[i] = o.A[i].DeepCopy()\n"), "{text}");
    assert!(!text.contains("import ("), "{text}");
}

#[test]
fn test_pointer_run_output_parses() {
    let program = single(
        "package m\n\ntype Names []string\n\ntype Set map[string]*Names\n\ntype Ch chan []int\n",
    );
    let options = GenerateOptions {
        shape: Shape::Pointer,
        invocation: "godeep --pointer-receiver".to_owned(),
    };
    let text = generate(&program, &requests(&["Names", "Set", "Ch"]), &options).unwrap();
    assert!(text.contains("func (o *Set) DeepCopy() *Set {\n"), "{text}");
    assert!(
        text.contains(
            "\t\t\tvar cp_v *Names = v\n\t\t\tif v != nil {\n\t\t\t\tcp_v = v.DeepCopy()\n\t\t\t}\n\t\t\tcp[k] = cp_v\n"
        ),
        "{text}"
    );
    assert!(text.contains("\tif (*o) != nil {\n\t\tcp = make(chan []int, cap((*o)))\n"), "{text}");
}

#[test]
fn test_skips_apply_per_request() {
    let program = single(
        "package m\n\ntype A struct{ S []int }\n\ntype B struct{ S []int }\n",
    );
    let requests = vec![
        CopyRequest::new("A").with_skips(SkipSet::parse("S")),
        CopyRequest::new("B"),
    ];
    let text = generate(&program, &requests, &options("godeep")).unwrap();
    assert_eq!(text.matches("make([]int").count(), 1, "{text}");
}

#[test]
fn test_locate_errors() {
    let program = single(
        "package m

import \"time\"

type T struct{}

type P = *T

type Ptr *T

type Iface interface{ M() }

type Stamp = time.Time

type Ints = []int
",
    );
    assert_eq!(locate(&program, "P").unwrap(), locate(&program, "T").unwrap());
    assert_eq!(
        locate(&program, "Missing"),
        Err(GenError::TypeNotFound {
            name: "Missing".into(),
            package: "m".into(),
        })
    );
    assert_eq!(
        locate(&program, "Ptr"),
        Err(GenError::InvalidReceiver {
            name: "Ptr".into(),
            kind: "a pointer",
        })
    );
    assert_eq!(
        locate(&program, "Iface"),
        Err(GenError::InvalidReceiver {
            name: "Iface".into(),
            kind: "an interface",
        })
    );
    for foreign in ["Stamp", "Ints", "int"] {
        assert!(
            matches!(locate(&program, foreign), Err(GenError::TypeNotFound { .. })),
            "{foreign}"
        );
    }
}

#[test]
fn test_unknown_request_fails_before_generating() {
    let program = single("package m\n\ntype T struct{}\n");
    let err = generate(&program, &requests(&["T", "U"]), &options("godeep")).unwrap_err();
    assert_eq!(err.to_string(), "type U not found in package m");
}

#[test]
fn test_recursive_error_message_names_the_way_out() {
    let program = single("package m\n\ntype L struct{ N *N }\n\ntype N struct{ Next *N }\n");
    let err = generate(&program, &requests(&["L"]), &options("godeep")).unwrap_err();
    assert!(err.to_string().starts_with("type N refers back to itself at N.Next;"), "{err}");
    assert!(generate(&program, &requests(&["L", "N"]), &options("godeep")).is_ok());
}

#[test]
fn test_replaced_module_deep_copy_is_called() {
    let tree = MemoryTree::new()
        .with(
            "/w/m/go.mod",
            "module example.com/m\n\nrequire example.com/dep v0.1.0\n\nreplace example.com/dep => ../dep\n",
        )
        .with(
            "/w/m/m.go",
            "package m\n\nimport \"example.com/dep\"\n\ntype A struct {\n\tD dep.Thing\n\tP *dep.Thing\n}\n",
        )
        .with("/w/dep/go.mod", "module example.com/dep\n")
        .with(
            "/w/dep/thing.go",
            "package dep\n\nimport \"maps\"\n\ntype Thing struct{ M map[string]int }\n\n\
             func (t Thing) DeepCopy() Thing {\n\treturn Thing{M: maps.Clone(t.M)}\n}\n",
        );
    let program = load(&tree, "/w/m");
    let text = generate(&program, &requests(&["A"]), &options("godeep -t A")).unwrap();
    assert_eq!(
        text,
        "// Code generated by godeep -t A; DO NOT EDIT.

package m

// DeepCopy generates a deep copy of A
func (o A) DeepCopy() A {
	var cp A = o
	cp.D = o.D.DeepCopy()
	if o.P != nil {
		{
			retV := o.P.DeepCopy()
			cp.P = &retV
		}
	}
	return cp
}
"
    );
}

#[test]
fn test_major_version_import_keeps_its_name() {
    let program = single(
        "package m

import \"k8s.io/api/core/v1\"

type A struct {
	Pods []v1.Pod
}
",
    );
    let text = generate(&program, &requests(&["A"]), &options("godeep -t A")).unwrap();
    assert_eq!(
        text,
        "// Code generated by godeep -t A; DO NOT EDIT.

package m

import (
	\"k8s.io/api/core/v1\"
)

// DeepCopy generates a deep copy of A
func (o A) DeepCopy() A {
	var cp A = o
	if o.Pods != nil {
		cp.Pods = make([]v1.Pod, len(o.Pods))
		copy(cp.Pods, o.Pods)
	}
	return cp
}
"
    );
}

#[test]
fn test_foreign_array_length_is_a_number() {
    let tree = MemoryTree::new()
        .with("/m/go.mod", "module example.com/m\n")
        .with(
            "/m/m.go",
            "package m\n\nimport \"example.com/m/geom\"\n\ntype A struct{ P geom.Poly }\n",
        )
        .with(
            "/m/geom/poly.go",
            "package geom\n\nconst N = 4\n\ntype Poly struct{ Pts [][N]*int }\n",
        );
    let program = load(&tree, "/m");
    let text = generate(&program, &requests(&["A"]), &options("godeep -t A")).unwrap();
    assert_eq!(
        text,
        "// Code generated by godeep -t A; DO NOT EDIT.

package m

// DeepCopy generates a deep copy of A
func (o A) DeepCopy() A {
	var cp A = o
	if o.P.Pts != nil {
		cp.P.Pts = make([][4]*int, len(o.P.Pts))
		copy(cp.P.Pts, o.P.Pts)
		for i := range o.P.Pts {
			for i1 := range o.P.Pts[i] {
				if o.P.Pts[i][i1] != nil {
					cp.P.Pts[i][i1] = new(int)
					*cp.P.Pts[i][i1] = *o.P.Pts[i][i1]
				}
			}
		}
	}
	return cp
}
"
    );
}

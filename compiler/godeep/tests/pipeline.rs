#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use std::fs;
use std::path::Path;

use clap::Parser;
use godeep::{generate_source, invocation, run, Cli, Config, Error, Output};
use godeep_gen::GenError;
use godeep_types::LoadError;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SHAPES: &str = "package shapes

import \"example.com/x/geom\"

type Polygon struct {
	Name   string
	Points []geom.Point
	Holes  []*Polygon
	Labels map[string][]string
}
";

const GEOM: &str = "package geom

type Point struct{ X, Y float64 }

type Path struct{ Points []Point }
";

fn module() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("go.mod"), "module example.com/x\n\ngo 1.21\n").unwrap();
    fs::create_dir_all(dir.path().join("shapes")).unwrap();
    fs::create_dir_all(dir.path().join("geom")).unwrap();
    fs::write(dir.path().join("shapes/polygon.go"), SHAPES).unwrap();
    fs::write(dir.path().join("shapes/polygon_test.go"), "package shapes\n\nbroken(\n").unwrap();
    fs::write(dir.path().join("geom/point.go"), GEOM).unwrap();
    dir
}

fn config(args: &[&str]) -> Config {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    Config::from_cli(cli, invocation(args)).unwrap()
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_generates_module_package() {
    let module = module();
    let dir = path_arg(&module.path().join("shapes"));
    let text = generate_source(&config(&["godeep", "-t", "Polygon", "--skip", "Labels[k]", &dir]))
        .unwrap();
    assert_eq!(
        text,
        format!(
            "// Code generated by godeep -t Polygon --skip Labels[k] {dir}; DO NOT EDIT.

package shapes

import (
	\"example.com/x/geom\"
)

// DeepCopy generates a deep copy of Polygon
func (o Polygon) DeepCopy() Polygon {{
	var cp Polygon = o
	if o.Points != nil {{
		cp.Points = make([]geom.Point, len(o.Points))
		copy(cp.Points, o.Points)
	}}
	if o.Holes != nil {{
		cp.Holes = make([]*Polygon, len(o.Holes))
		copy(cp.Holes, o.Holes)
		for i := range o.Holes {{
			if o.Holes[i] != nil {{
				{{
					retV := o.Holes[i].DeepCopy()
					cp.Holes[i] = &retV
				}}
			}}
		}}
	}}
	if o.Labels != nil {{
		cp.Labels = make(map[string][]string, len(o.Labels))
		for k, v := range o.Labels {{
			cp.Labels[k] = v
		}}
	}}
	return cp
}}
"
        )
    );
}

#[test]
fn test_writes_and_truncates_output_file() {
    let module = module();
    let out = module.path().join("deepcopy_gen.go");
    fs::write(&out, "x".repeat(10_000)).unwrap();
    let dir = path_arg(&module.path().join("geom"));
    let out_arg = path_arg(&out);
    let config = config(&[
        "godeep",
        "--pointer-receiver",
        "-t",
        "Path",
        "-t",
        "Point",
        "-o",
        &out_arg,
        &dir,
    ]);
    assert_eq!(config.output, Output::File(out.clone()));

    run(&config).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("// Code generated by godeep --pointer-receiver"), "{written}");
    assert!(written.contains("func (o *Path) DeepCopy() *Path {\n"), "{written}");
    assert!(written.contains("func (o *Point) DeepCopy() *Point {\n"), "{written}");
    assert!(written.contains("\t\t\t\tcp.Points[i] = *retV\n"), "{written}");
    assert!(!written.contains("xxxx"));
    assert!(!written.contains("import"), "{written}");

    // Once the file is part of the package, regenerating gives the same text.
    fs::write(module.path().join("geom/deepcopy_gen.go"), &written).unwrap();
    let again = generate_source(&config).unwrap();
    assert_eq!(again, written);
}

#[test]
fn test_failed_run_writes_nothing() {
    let module = module();
    let out = module.path().join("out.go");
    let dir = path_arg(&module.path().join("shapes"));
    let out_arg = path_arg(&out);
    let err = run(&config(&["godeep", "-t", "Missing", "-o", &out_arg, &dir])).unwrap_err();
    assert!(
        matches!(
            &err,
            Error::Gen(GenError::TypeNotFound { name, package }) if name == "Missing" && package == "shapes"
        ),
        "{err}"
    );
    assert!(!out.exists());
}

#[test]
fn test_empty_package() {
    let module = module();
    fs::create_dir_all(module.path().join("empty")).unwrap();
    let dir = path_arg(&module.path().join("empty"));
    let err = generate_source(&config(&["godeep", "-t", "T", &dir])).unwrap_err();
    let Error::Load(load) = err else {
        panic!("expected a load error, got {err}");
    };
    assert_eq!(
        load,
        LoadError::EmptyPackageSet {
            path: "example.com/x/empty".into()
        }
    );
}

#[test]
fn test_load_failure_names_the_file() {
    let module = module();
    fs::write(
        module.path().join("geom/bad.go"),
        "package geom\n\ntype Bad struct{ U Unknown }\n",
    )
    .unwrap();
    let dir = path_arg(&module.path().join("shapes"));
    let err = generate_source(&config(&["godeep", "-t", "Polygon", &dir])).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("cannot load package example.com/x/geom: "), "{message}");
    assert!(message.ends_with("bad.go:3:20: undefined: Unknown"), "{message}");
}

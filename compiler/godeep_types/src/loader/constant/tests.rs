#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use godeep_ir::ast::{Decl, Expr};
use godeep_parse::{parse_source, ParseMode};
use pretty_assertions::assert_eq;

use super::eval;

/// Parse `expr` as the value of a constant declaration.
fn expr(text: &str) -> Expr {
    let source = format!("package a\nconst X = {text}\n");
    let file = parse_source(&source, ParseMode::Signatures).unwrap();
    let Some(Decl::Const(specs)) = file.decls.into_iter().next() else {
        panic!("expected a const declaration");
    };
    specs.into_iter().next().unwrap().values.into_iter().next().unwrap()
}

fn value(text: &str) -> Option<i128> {
    eval(&expr(text), Some(3), &mut |pkg, name| match (pkg, name) {
        (None, "N") => Some(4),
        (Some("geom"), "Size") => Some(16),
        _ => None,
    })
}

#[test]
fn test_literals() {
    assert_eq!(value("42"), Some(42));
    assert_eq!(value("1_000"), Some(1000));
    assert_eq!(value("0x1F"), Some(31));
    assert_eq!(value("0b101"), Some(5));
    assert_eq!(value("0o17"), Some(15));
    assert_eq!(value("017"), Some(15));
    assert_eq!(value("0"), Some(0));
    assert_eq!(value("'a'"), Some(97));
    assert_eq!(value("'\\n'"), Some(10));
    assert_eq!(value("'\\x41'"), Some(65));
    assert_eq!(value("1.5"), None);
    assert_eq!(value("\"four\""), None);
}

#[test]
fn test_operators_and_names() {
    assert_eq!(value("N * 2 + 1"), Some(9));
    assert_eq!(value("(N + 1) * 2"), Some(10));
    assert_eq!(value("1 << N"), Some(16));
    assert_eq!(value("geom.Size >> 2"), Some(4));
    assert_eq!(value("geom.Size &^ N"), Some(12));
    assert_eq!(value("-N + 10"), Some(6));
    assert_eq!(value("^0"), Some(-1));
    assert_eq!(value("17 % 5"), Some(2));
    assert_eq!(value("iota * 2"), Some(6));
    assert_eq!(value("int(N) + uint8(1)"), Some(5));
}

#[test]
fn test_non_constants() {
    assert_eq!(value("M"), None);
    assert_eq!(value("other.Size"), None);
    assert_eq!(value("N / 0"), None);
    assert_eq!(value("len(N)"), None);
    assert_eq!(value("unsafe.Sizeof(N)"), None);
    assert_eq!(value("N == 4"), None);
    assert_eq!(value("1 << 200"), None);
}

#[test]
fn test_iota_outside_const_declaration_is_a_name() {
    let mut seen = Vec::new();
    let result = eval(&expr("iota"), None, &mut |_, name| {
        seen.push(name.to_owned());
        None
    });
    assert_eq!(result, None);
    assert_eq!(seen, vec!["iota".to_owned()]);
}

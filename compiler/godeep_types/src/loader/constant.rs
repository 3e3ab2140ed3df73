//! Integer constant evaluation for array lengths.
//!
//! Covers what array lengths are written with in practice: integer and
//! rune literals, named constants, `iota`, the arithmetic, bitwise and
//! shift operators, and conversions such as `int(N)`. Anything else is
//! not a constant here, and neither is an overflowing or dividing-by-zero
//! expression.

use godeep_ir::ast::Expr;
use godeep_ir::ensure_sufficient_stack;

/// Resolves a constant name, unqualified (`None`) or through an import.
pub(super) type Names<'a> = dyn FnMut(Option<&str>, &str) -> Option<i128> + 'a;

/// Value of `expr`; `iota` is `Some` inside a `const` declaration.
pub(super) fn eval(expr: &Expr, iota: Option<u32>, names: &mut Names<'_>) -> Option<i128> {
    ensure_sufficient_stack(|| eval_inner(expr, iota, names))
}

fn eval_inner(expr: &Expr, iota: Option<u32>, names: &mut Names<'_>) -> Option<i128> {
    match expr {
        Expr::Lit(text) => parse_lit(text),
        Expr::Ident(ident) => match (ident.name.as_str(), iota) {
            ("iota", Some(iota)) => Some(i128::from(iota)),
            (name, _) => names(None, name),
        },
        Expr::Selector { base, field } => match &**base {
            Expr::Ident(pkg) => names(Some(&pkg.name), &field.name),
            _ => None,
        },
        Expr::Paren(inner) => eval(inner, iota, names),
        Expr::Unary { op, operand } => fold_unary(op, eval(operand, iota, names)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, iota, names)?;
            let rhs = eval(rhs, iota, names)?;
            fold_binary(op, lhs, rhs)
        }
        Expr::Call {
            func,
            args,
            ellipsis: false,
        } if args.len() == 1 && is_conversion(func) => eval(&args[0], iota, names),
        _ => None,
    }
}

/// `T(x)` keeps the value of `x`. Builtins and `unsafe` calls with one
/// argument compute something else.
fn is_conversion(func: &Expr) -> bool {
    match func {
        Expr::Ident(ident) => !matches!(
            ident.name.as_str(),
            "len" | "cap" | "real" | "imag" | "new" | "make" | "panic" | "print" | "println"
        ),
        Expr::Selector { base, .. } => {
            !matches!(&**base, Expr::Ident(pkg) if pkg.name == "unsafe")
        }
        Expr::Paren(inner) => is_conversion(inner),
        _ => false,
    }
}

fn fold_unary(op: &str, value: i128) -> Option<i128> {
    match op {
        "+" => Some(value),
        "-" => value.checked_neg(),
        // Untyped complement: ^x == -x - 1.
        "^" => Some(!value),
        _ => None,
    }
}

fn fold_binary(op: &str, lhs: i128, rhs: i128) -> Option<i128> {
    match op {
        "+" => lhs.checked_add(rhs),
        "-" => lhs.checked_sub(rhs),
        "*" => lhs.checked_mul(rhs),
        "/" => lhs.checked_div(rhs),
        "%" => lhs.checked_rem(rhs),
        "&" => Some(lhs & rhs),
        "|" => Some(lhs | rhs),
        "^" => Some(lhs ^ rhs),
        "&^" => Some(lhs & !rhs),
        "<<" => {
            let shift = u32::try_from(rhs).ok().filter(|&s| s < 127)?;
            let result = lhs.checked_shl(shift)?;
            (result >> shift == lhs).then_some(result)
        }
        ">>" => {
            let shift = u32::try_from(rhs).ok()?;
            Some(lhs >> shift.min(127))
        }
        _ => None,
    }
}

/// Integer or rune literal; floats, imaginaries and strings are `None`.
fn parse_lit(text: &str) -> Option<i128> {
    if let Some(rune) = text.strip_prefix('\'') {
        return parse_rune(rune.strip_suffix('\'')?);
    }
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else if lower.len() > 1 && lower.starts_with('0') && lower.bytes().all(|b| b.is_ascii_digit()) {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i128::from_str_radix(body, radix).ok()
}

/// The body of a rune literal, between its quotes.
fn parse_rune(body: &str) -> Option<i128> {
    let Some(escape) = body.strip_prefix('\\') else {
        let mut chars = body.chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| i128::from(u32::from(c)));
    };
    let simple = match escape {
        "a" => Some(0x07),
        "b" => Some(0x08),
        "f" => Some(0x0c),
        "n" => Some(0x0a),
        "r" => Some(0x0d),
        "t" => Some(0x09),
        "v" => Some(0x0b),
        "\\" => Some(0x5c),
        "'" => Some(0x27),
        _ => None,
    };
    if simple.is_some() {
        return simple;
    }
    let (radix, digits) = match escape.as_bytes().first()? {
        b'x' | b'u' | b'U' => (16, &escape[1..]),
        b'0'..=b'7' => (8, escape),
        _ => return None,
    };
    i128::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests;

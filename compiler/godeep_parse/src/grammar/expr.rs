//! Expressions, parsed by precedence climbing.

use crate::{ErrorContext, ParseError, Parser};
use godeep_ir::ast::{Expr, TypeExpr};
use godeep_ir::{ensure_sufficient_stack, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.in_context(ErrorContext::Expression, |p| p.parse_binary(1)))
    }

    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.cursor.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let kind = self.cursor.current_kind();
            let prec = kind.binary_precedence();
            if prec == 0 || prec < min_prec {
                break;
            }
            self.cursor.advance();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary {
                op: operator(kind),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Not => "!",
            TokenKind::Caret => "^",
            TokenKind::Star => "*",
            TokenKind::Amp => "&",
            TokenKind::Arrow => "<-",
            _ => return self.parse_primary(),
        };
        self.cursor.advance();
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_operand()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    if self.cursor.eat(TokenKind::LParen) {
                        let ty = if self.cursor.eat(TokenKind::Type) {
                            None
                        } else {
                            Some(self.parse_type()?)
                        };
                        self.expect(TokenKind::RParen, "`)`")?;
                        expr = Expr::TypeAssert {
                            base: Box::new(expr),
                            ty,
                        };
                    } else {
                        let field = self.expect_ident()?;
                        expr = Expr::Selector {
                            base: Box::new(expr),
                            field,
                        };
                    }
                }
                TokenKind::LBracket => expr = self.parse_index_or_slice(expr)?,
                TokenKind::LParen => expr = self.parse_call(expr)?,
                TokenKind::LBrace if self.opens_composite(&expr) => {
                    expr = self.parse_composite(Some(expr))?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Whether `{` after `expr` starts a composite literal.
    ///
    /// Literal types (`[]T{`, `map[K]V{`) always do. A type name does
    /// only outside `if`/`for` headers, where `{` opens the body.
    fn opens_composite(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Type(_) => true,
            Expr::Ident(_) | Expr::Index { .. } => !self.no_composite,
            Expr::Selector { base, .. } => matches!(**base, Expr::Ident(_)) && !self.no_composite,
            _ => false,
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Ident => Ok(Expr::Ident(self.expect_ident()?)),
            TokenKind::Number | TokenKind::String | TokenKind::RawString | TokenKind::Rune => {
                let token = self.cursor.advance();
                Ok(Expr::Lit(self.cursor.text(token.span).to_owned()))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.with_composite(true, Self::parse_expr)?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::Func => {
                self.cursor.advance();
                let sig = self.parse_signature()?;
                if self.cursor.check(TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    Ok(Expr::FuncLit { sig, body })
                } else {
                    Ok(Expr::Type(TypeExpr::Func(sig)))
                }
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => Ok(Expr::Type(self.parse_type()?)),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `x[i]`, `f[A, B]`, `s[lo:hi]`, `s[lo:hi:max]`.
    fn parse_index_or_slice(&mut self, base: Expr) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LBracket, "`[`")?;
        self.with_composite(true, |p| -> Result<_, ParseError> {
            let low = if p.cursor.check(TokenKind::Colon) {
                None
            } else {
                Some(p.parse_expr()?)
            };
            match low {
                Some(first) if !p.cursor.check(TokenKind::Colon) => {
                    let mut indices = vec![first];
                    while p.cursor.eat(TokenKind::Comma) && !p.cursor.check(TokenKind::RBracket) {
                        indices.push(p.parse_expr()?);
                    }
                    p.expect(TokenKind::RBracket, "`]`")?;
                    Ok(Expr::Index {
                        base: Box::new(base),
                        indices,
                    })
                }
                low => {
                    p.expect(TokenKind::Colon, "`:`")?;
                    let high = if matches!(
                        p.cursor.current_kind(),
                        TokenKind::Colon | TokenKind::RBracket
                    ) {
                        None
                    } else {
                        Some(Box::new(p.parse_expr()?))
                    };
                    let max = if p.cursor.eat(TokenKind::Colon) {
                        Some(Box::new(p.parse_expr()?))
                    } else {
                        None
                    };
                    p.expect(TokenKind::RBracket, "`]`")?;
                    Ok(Expr::SliceExpr {
                        base: Box::new(base),
                        low: low.map(Box::new),
                        high,
                        max,
                    })
                }
            }
        })
    }

    fn parse_call(&mut self, func: Expr) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen, "`(`")?;
        self.with_composite(true, |p| -> Result<_, ParseError> {
            let mut args = Vec::new();
            let mut ellipsis = false;
            while !p.cursor.check(TokenKind::RParen) && !p.cursor.is_at_end() {
                args.push(p.parse_expr()?);
                if p.cursor.eat(TokenKind::Ellipsis) {
                    ellipsis = true;
                }
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RParen, "`)`")?;
            Ok(Expr::Call {
                func: Box::new(func),
                args,
                ellipsis,
            })
        })
    }

    /// `T{a, k: v}`; elements may be untyped nested `{...}` literals.
    fn parse_composite(&mut self, ty: Option<Expr>) -> Result<Expr, ParseError> {
        self.in_context(ErrorContext::CompositeLiteral, |p| {
            p.expect(TokenKind::LBrace, "`{`")?;
            p.with_composite(true, |p| -> Result<_, ParseError> {
                let mut elems = Vec::new();
                while !p.cursor.check(TokenKind::RBrace) && !p.cursor.is_at_end() {
                    let elem = p.parse_element()?;
                    if p.cursor.eat(TokenKind::Colon) {
                        let value = p.parse_element()?;
                        elems.push(Expr::KeyValue {
                            key: Box::new(elem),
                            value: Box::new(value),
                        });
                    } else {
                        elems.push(elem);
                    }
                    if !p.cursor.eat(TokenKind::Comma) {
                        break;
                    }
                }
                p.expect(TokenKind::RBrace, "`}`")?;
                Ok(Expr::Composite {
                    ty: ty.map(Box::new),
                    elems,
                })
            })
        })
    }

    fn parse_element(&mut self) -> Result<Expr, ParseError> {
        if self.cursor.check(TokenKind::LBrace) {
            self.parse_composite(None)
        } else {
            self.parse_expr()
        }
    }
}

/// Source spelling of a binary operator token.
fn operator(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::OrOr => "||",
        TokenKind::AndAnd => "&&",
        TokenKind::EqEq => "==",
        TokenKind::NotEq => "!=",
        TokenKind::Lt => "<",
        TokenKind::LtEq => "<=",
        TokenKind::Gt => ">",
        TokenKind::GtEq => ">=",
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Pipe => "|",
        TokenKind::Caret => "^",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::Shl => "<<",
        TokenKind::Shr => ">>",
        TokenKind::Amp => "&",
        TokenKind::AndNot => "&^",
        _ => "?",
    }
}

//! Blocks and statements.

use crate::{ErrorContext, ParseError, ParseErrorKind, Parser};
use godeep_ir::ast::{AssignOp, Block, Expr, Stmt};
use godeep_ir::{ensure_sufficient_stack, TokenKind};

/// A parsed `for` header, before the body.
enum ForHeader {
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
}

impl Parser<'_> {
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.in_context(ErrorContext::Block, |p| {
            let open = p.expect(TokenKind::LBrace, "`{`")?.span;
            p.with_composite(true, |p| -> Result<_, ParseError> {
                let mut stmts = Vec::new();
                while !p.cursor.check(TokenKind::RBrace) {
                    if p.cursor.is_at_end() {
                        return Err(ParseError::new(ParseErrorKind::UnclosedBrace, open));
                    }
                    stmts.push(p.parse_stmt()?);
                    p.expect_semi()?;
                }
                let close = p.expect(TokenKind::RBrace, "`}`")?.span;
                Ok(Block {
                    stmts,
                    span: open.merge(close),
                })
            })
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| {
            self.in_context(ErrorContext::Statement, |p| match p.cursor.current_kind() {
                TokenKind::Var => p.parse_var_stmt(),
                TokenKind::If => p.parse_if(),
                TokenKind::For => p.parse_for(),
                TokenKind::Return => {
                    p.cursor.advance();
                    let values = if matches!(
                        p.cursor.current_kind(),
                        TokenKind::Semicolon | TokenKind::RBrace
                    ) {
                        Vec::new()
                    } else {
                        p.parse_expr_list()?
                    };
                    Ok(Stmt::Return(values))
                }
                TokenKind::Break => {
                    p.cursor.advance();
                    Ok(Stmt::Break)
                }
                TokenKind::Continue => {
                    p.cursor.advance();
                    Ok(Stmt::Continue)
                }
                TokenKind::LBrace => Ok(Stmt::Block(p.parse_block()?)),
                TokenKind::Semicolon => Ok(Stmt::Empty),
                _ => p.parse_simple_stmt(),
            })
        })
    }

    /// `var a, b T = x, y`
    fn parse_var_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Var, "`var`")?;
        let mut names = vec![self.expect_ident()?];
        while self.cursor.eat(TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = if self.cursor.check(TokenKind::Assign) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.cursor.eat(TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stmt::Var { names, ty, values })
    }

    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let lhs = self.parse_expr_list()?;
        self.finish_simple_stmt(lhs)
    }

    /// Complete a simple statement whose left-hand side is parsed.
    fn finish_simple_stmt(&mut self, lhs: Vec<Expr>) -> Result<Stmt, ParseError> {
        let kind = self.cursor.current_kind();
        if kind == TokenKind::Define {
            self.cursor.advance();
            let rhs = self.parse_expr_list()?;
            return Ok(Stmt::Define { lhs, rhs });
        }
        if kind.is_assign_op() {
            self.cursor.advance();
            let rhs = self.parse_expr_list()?;
            return Ok(Stmt::Assign {
                lhs,
                op: assign_op(kind),
                rhs,
            });
        }
        let Ok([target]) = <[Expr; 1]>::try_from(lhs) else {
            return Err(self.unexpected("`:=` or `=`"));
        };
        match kind {
            TokenKind::Inc | TokenKind::Dec => {
                self.cursor.advance();
                Ok(Stmt::IncDec {
                    target,
                    inc: kind == TokenKind::Inc,
                })
            }
            TokenKind::Arrow => {
                self.cursor.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::Send {
                    chan: target,
                    value,
                })
            }
            _ => Ok(Stmt::Expr(target)),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::If, "`if`")?;
        let (init, cond) = self.with_composite(false, |p| -> Result<_, ParseError> {
            let first = p.parse_simple_stmt()?;
            if p.cursor.eat(TokenKind::Semicolon) {
                let cond = p.parse_expr()?;
                return Ok((Some(Box::new(first)), cond));
            }
            match first {
                Stmt::Expr(cond) => Ok((None, cond)),
                _ => Err(p.unexpected("`;`")),
            }
        })?;
        let then = self.parse_block()?;
        let els = if self.cursor.eat(TokenKind::Else) {
            match self.cursor.current_kind() {
                TokenKind::If => Some(Box::new(self.parse_if()?)),
                TokenKind::LBrace => Some(Box::new(Stmt::Block(self.parse_block()?))),
                _ => return Err(self.unexpected("`if` or `{`")),
            }
        } else {
            None
        };
        Ok(Stmt::If {
            init,
            cond,
            then,
            els,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::For, "`for`")?;
        let header = if self.cursor.check(TokenKind::LBrace) {
            ForHeader::Loop {
                init: None,
                cond: None,
                post: None,
            }
        } else {
            self.with_composite(false, Self::parse_for_header)?
        };
        let body = self.parse_block()?;
        Ok(match header {
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => Stmt::Range {
                key,
                value,
                define,
                expr,
                body,
            },
            ForHeader::Loop { init, cond, post } => Stmt::For {
                init,
                cond,
                post,
                body,
            },
        })
    }

    fn parse_for_header(&mut self) -> Result<ForHeader, ParseError> {
        if self.cursor.eat(TokenKind::Range) {
            return Ok(ForHeader::Range {
                key: None,
                value: None,
                define: false,
                expr: self.parse_expr()?,
            });
        }

        let init = if self.cursor.check(TokenKind::Semicolon) {
            None
        } else {
            let lhs = self.parse_expr_list()?;
            let kind = self.cursor.current_kind();
            if matches!(kind, TokenKind::Define | TokenKind::Assign)
                && self.cursor.peek_kind(1) == TokenKind::Range
            {
                self.cursor.advance();
                self.cursor.advance();
                let mut vars = lhs.into_iter();
                let key = vars.next();
                let value = vars.next();
                if vars.next().is_some() {
                    return Err(self.unexpected("at most two iteration variables"));
                }
                return Ok(ForHeader::Range {
                    key,
                    value,
                    define: kind == TokenKind::Define,
                    expr: self.parse_expr()?,
                });
            }
            Some(self.finish_simple_stmt(lhs)?)
        };

        if !self.cursor.eat(TokenKind::Semicolon) {
            return match init {
                Some(Stmt::Expr(cond)) => Ok(ForHeader::Loop {
                    init: None,
                    cond: Some(cond),
                    post: None,
                }),
                _ => Err(self.unexpected("`{`")),
            };
        }
        let cond = if self.cursor.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "`;`")?;
        let post = if self.cursor.check(TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt()?))
        };
        Ok(ForHeader::Loop {
            init: init.map(Box::new),
            cond,
            post,
        })
    }
}

fn assign_op(kind: TokenKind) -> AssignOp {
    match kind {
        TokenKind::PlusAssign => AssignOp::Compound("+"),
        TokenKind::MinusAssign => AssignOp::Compound("-"),
        TokenKind::StarAssign => AssignOp::Compound("*"),
        TokenKind::SlashAssign => AssignOp::Compound("/"),
        TokenKind::PercentAssign => AssignOp::Compound("%"),
        TokenKind::AmpAssign => AssignOp::Compound("&"),
        TokenKind::PipeAssign => AssignOp::Compound("|"),
        TokenKind::CaretAssign => AssignOp::Compound("^"),
        TokenKind::ShlAssign => AssignOp::Compound("<<"),
        TokenKind::ShrAssign => AssignOp::Compound(">>"),
        TokenKind::AndNotAssign => AssignOp::Compound("&^"),
        _ => AssignOp::Assign,
    }
}

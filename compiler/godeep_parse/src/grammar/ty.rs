//! Type expressions, signatures and type parameter lists.

use crate::{ErrorContext, ParseError, ParseErrorKind, Parser};
use godeep_ir::ast::{
    ArrayLen, ChanDir, FieldDecl, Ident, InterfaceElem, Param, Signature, TypeExpr, TypeParam, UnionTerm,
};
use godeep_ir::{ensure_sufficient_stack, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        ensure_sufficient_stack(|| self.in_context(ErrorContext::TypeExpr, Self::parse_type_inner))
    }

    fn parse_type_inner(&mut self) -> Result<TypeExpr, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Ident => self.parse_type_name(),
            TokenKind::Star => {
                self.cursor.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                if self.cursor.eat(TokenKind::RBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = self.parse_array_len()?;
                let elem = Box::new(self.parse_type()?);
                Ok(TypeExpr::Array { len, elem })
            }
            TokenKind::Map => {
                self.cursor.advance();
                self.expect(TokenKind::LBracket, "`[`")?;
                let key = Box::new(self.parse_type()?);
                self.expect(TokenKind::RBracket, "`]`")?;
                let value = Box::new(self.parse_type()?);
                Ok(TypeExpr::Map { key, value })
            }
            TokenKind::Chan => {
                self.cursor.advance();
                let dir = if self.cursor.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let elem = Box::new(self.parse_type()?);
                Ok(TypeExpr::Chan { dir, elem })
            }
            TokenKind::Arrow => {
                self.cursor.advance();
                self.expect(TokenKind::Chan, "`chan`")?;
                let elem = Box::new(self.parse_type()?);
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem,
                })
            }
            TokenKind::Func => {
                self.cursor.advance();
                Ok(TypeExpr::Func(self.parse_signature()?))
            }
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// `T`, `pkg.T`, `T[A, B]`.
    fn parse_type_name(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.expect_ident()?;
        let (package, name) = if self.cursor.eat(TokenKind::Dot) {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };
        let args = if self.cursor.check(TokenKind::LBracket)
            && self.cursor.peek_kind(1) != TokenKind::RBracket
        {
            self.parse_type_args()?
        } else {
            Vec::new()
        };
        Ok(TypeExpr::Name {
            package,
            name,
            args,
        })
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        self.expect(TokenKind::LBracket, "`[`")?;
        let mut args = Vec::new();
        while !self.cursor.check(TokenKind::RBracket) {
            args.push(self.parse_type()?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "`]`")?;
        Ok(args)
    }

    /// Array length expression, kept as source text.
    /// The length of `[N]T` after its opening bracket, through `]`.
    fn parse_array_len(&mut self) -> Result<ArrayLen, ParseError> {
        let start = self.cursor.current_span();
        let expr = if self.cursor.eat(TokenKind::Ellipsis) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let span = start.merge(self.cursor.previous_span());
        self.expect(TokenKind::RBracket, "`]`")?;
        Ok(ArrayLen { expr, span })
    }

    fn parse_struct_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.in_context(ErrorContext::StructType, |p| {
            p.expect(TokenKind::Struct, "`struct`")?;
            p.expect(TokenKind::LBrace, "`{`")?;
            let mut fields = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) && !p.cursor.is_at_end() {
                p.parse_field_decl(&mut fields)?;
                p.expect_semi()?;
            }
            p.expect(TokenKind::RBrace, "`}`")?;
            Ok(TypeExpr::Struct(fields))
        })
    }

    fn parse_field_decl(&mut self, fields: &mut Vec<FieldDecl>) -> Result<(), ParseError> {
        let embedded = match self.cursor.current_kind() {
            TokenKind::Star => true,
            TokenKind::Ident => match self.cursor.peek_kind(1) {
                TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Dot => true,
                TokenKind::LBracket => self.is_embedded_generic(),
                _ => false,
            },
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        if embedded {
            let ty = if self.cursor.eat(TokenKind::Star) {
                TypeExpr::Pointer(Box::new(self.parse_type_name()?))
            } else {
                self.parse_type_name()?
            };
            let tag = self.parse_tag();
            fields.push(FieldDecl {
                name: None,
                ty,
                tag,
            });
            return Ok(());
        }

        let mut names = vec![self.expect_ident()?];
        while self.cursor.eat(TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = self.parse_type()?;
        let tag = self.parse_tag();
        fields.extend(names.into_iter().map(|name| FieldDecl {
            name: Some(name),
            ty: ty.clone(),
            tag: tag.clone(),
        }));
        Ok(())
    }

    /// At `Name [`: true when the bracket group closes a line, as in an
    /// embedded `List[T]`, rather than starting a field's array type.
    fn is_embedded_generic(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 1;
        loop {
            match self.cursor.peek_kind(n) {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::Semicolon | TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
        matches!(
            self.cursor.peek_kind(n + 1),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::String | TokenKind::RawString
        )
    }

    fn parse_tag(&mut self) -> Option<String> {
        match self.cursor.current_kind() {
            TokenKind::String | TokenKind::RawString => {
                let token = self.cursor.advance();
                Some(self.cursor.text(token.span).to_owned())
            }
            _ => None,
        }
    }

    fn parse_interface_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.in_context(ErrorContext::InterfaceType, |p| {
            p.expect(TokenKind::Interface, "`interface`")?;
            p.expect(TokenKind::LBrace, "`{`")?;
            let mut elems = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) && !p.cursor.is_at_end() {
                if p.cursor.check(TokenKind::Ident) && p.cursor.peek_kind(1) == TokenKind::LParen {
                    let name = p.expect_ident()?;
                    let sig = p.parse_signature()?;
                    elems.push(InterfaceElem::Method { name, sig });
                } else {
                    elems.push(InterfaceElem::Embed(p.parse_constraint()?));
                }
                p.expect_semi()?;
            }
            p.expect(TokenKind::RBrace, "`}`")?;
            Ok(TypeExpr::Interface(elems))
        })
    }

    /// A type or a union of `~T | U` terms.
    fn parse_constraint(&mut self) -> Result<TypeExpr, ParseError> {
        let mut terms = vec![self.parse_union_term()?];
        while self.cursor.eat(TokenKind::Pipe) {
            terms.push(self.parse_union_term()?);
        }
        if terms.len() == 1 && !terms[0].tilde {
            if let Some(term) = terms.pop() {
                return Ok(term.ty);
            }
        }
        Ok(TypeExpr::Union(terms))
    }

    fn parse_union_term(&mut self) -> Result<UnionTerm, ParseError> {
        let tilde = self.cursor.eat(TokenKind::Tilde);
        let ty = self.parse_type()?;
        Ok(UnionTerm { tilde, ty })
    }

    /// At `Name [`: whether the bracket opens a type parameter list rather
    /// than an array length (`type A[T any] ...` vs `type A [N]int`).
    pub(crate) fn starts_type_params(&self) -> bool {
        self.cursor.check(TokenKind::LBracket)
            && self.cursor.peek_kind(1) == TokenKind::Ident
            && matches!(
                self.cursor.peek_kind(2),
                TokenKind::Ident
                    | TokenKind::Comma
                    | TokenKind::Tilde
                    | TokenKind::LBracket
                    | TokenKind::LParen
                    | TokenKind::Interface
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Func
                    | TokenKind::Struct
            )
    }

    pub(crate) fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        self.in_context(ErrorContext::TypeParams, |p| {
            p.expect(TokenKind::LBracket, "`[`")?;
            let mut params = Vec::new();
            while !p.cursor.check(TokenKind::RBracket) {
                let mut names = vec![p.expect_ident()?];
                while p.cursor.eat(TokenKind::Comma) {
                    names.push(p.expect_ident()?);
                }
                let constraint = p.parse_constraint()?;
                params.extend(names.into_iter().map(|name| TypeParam {
                    name,
                    constraint: constraint.clone(),
                }));
                if !p.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RBracket, "`]`")?;
            Ok(params)
        })
    }

    pub(crate) fn parse_signature(&mut self) -> Result<Signature, ParseError> {
        self.in_context(ErrorContext::Signature, |p| {
            let (params, variadic) = p.parse_params()?;
            let results = if p.cursor.check(TokenKind::LParen) {
                p.parse_params()?.0
            } else if p.starts_type() {
                vec![Param {
                    name: None,
                    ty: p.parse_type()?,
                }]
            } else {
                Vec::new()
            };
            Ok(Signature {
                params,
                results,
                variadic,
            })
        })
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.cursor.current_kind(),
            TokenKind::Ident
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Interface
        )
    }

    /// A parenthesized parameter or result list.
    ///
    /// Entries are either all unnamed types or all named; in the named form
    /// consecutive bare names share the next type (`a, b int`).
    fn parse_params(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut entries: Vec<(Option<Ident>, TypeExpr)> = Vec::new();
        let mut variadic = false;
        while !self.cursor.check(TokenKind::RParen) && !self.cursor.is_at_end() {
            if variadic {
                return Err(self.unexpected("`)`"));
            }
            entries.push(self.parse_param_entry(&mut variadic)?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RParen, "`)`")?.span;

        if entries.iter().all(|(name, _)| name.is_none()) {
            let params = entries
                .into_iter()
                .map(|(_, ty)| Param { name: None, ty })
                .collect();
            return Ok((params, variadic));
        }

        let mut params = Vec::new();
        let mut pending = Vec::new();
        for (name, ty) in entries {
            match (name, ty) {
                (Some(name), ty) => {
                    params.extend(pending.drain(..).map(|pending| Param {
                        name: Some(pending),
                        ty: ty.clone(),
                    }));
                    params.push(Param {
                        name: Some(name),
                        ty,
                    });
                }
                (
                    None,
                    TypeExpr::Name {
                        package: None,
                        name,
                        args,
                    },
                ) if args.is_empty() => pending.push(name),
                (None, _) => {
                    return Err(ParseError::new(ParseErrorKind::MixedParameters, close));
                }
            }
        }
        if !pending.is_empty() {
            return Err(ParseError::new(ParseErrorKind::MixedParameters, close));
        }
        Ok((params, variadic))
    }

    /// One list entry: `T`, `...T`, `name T` or `name ...T`.
    fn parse_param_entry(
        &mut self,
        variadic: &mut bool,
    ) -> Result<(Option<Ident>, TypeExpr), ParseError> {
        if self.cursor.eat(TokenKind::Ellipsis) {
            *variadic = true;
            return Ok((None, self.parse_type()?));
        }

        // `a [N]T` and `List[T]` both start `Ident [`; try the named form
        // first and fall back to a generic type name.
        if self.cursor.check(TokenKind::Ident) && self.cursor.peek_kind(1) == TokenKind::LBracket {
            let checkpoint = self.cursor.position();
            let name = self.expect_ident()?;
            if let Ok(ty) = self.parse_type() {
                if matches!(
                    self.cursor.current_kind(),
                    TokenKind::Comma | TokenKind::RParen
                ) {
                    return Ok((Some(name), ty));
                }
            }
            self.cursor.set_position(checkpoint);
        }

        let ty = self.parse_type()?;
        if matches!(
            self.cursor.current_kind(),
            TokenKind::Comma | TokenKind::RParen
        ) {
            return Ok((None, ty));
        }
        let TypeExpr::Name {
            package: None,
            name,
            args,
        } = ty
        else {
            return Err(self.unexpected("`,` or `)`"));
        };
        if !args.is_empty() {
            return Err(self.unexpected("`,` or `)`"));
        }
        if self.cursor.eat(TokenKind::Ellipsis) {
            *variadic = true;
        }
        Ok((Some(name), self.parse_type()?))
    }
}

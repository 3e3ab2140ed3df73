//! Grammar productions, split by syntactic category.
//!
//! This file holds the file-level productions: package clause, imports,
//! and top-level declarations.

mod expr;
mod stmt;
mod ty;

use crate::{ErrorContext, ParseError, ParseErrorKind, ParseMode, Parser};
use godeep_ir::ast::{
    ConstSpec, Decl, File, FuncDecl, ImportName, ImportSpec, Receiver, TypeSpec,
};
use godeep_ir::{Span, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_file(&mut self) -> Result<File, ParseError> {
        let package = self.in_context(ErrorContext::PackageClause, |p| {
            p.expect(TokenKind::Package, "`package`")?;
            let name = p.expect_ident()?;
            p.expect_semi()?;
            Ok(name)
        })?;

        let mut imports = Vec::new();
        while self.cursor.check(TokenKind::Import) {
            self.in_context(ErrorContext::ImportDecl, |p| p.parse_import_decl(&mut imports))?;
        }

        let mut decls = Vec::new();
        while !self.cursor.is_at_end() {
            match self.cursor.current_kind() {
                TokenKind::Type => {
                    self.in_context(ErrorContext::TypeDecl, |p| p.parse_type_decl(&mut decls))?;
                }
                TokenKind::Func => {
                    let func = self.in_context(ErrorContext::FuncDecl, Self::parse_func_decl)?;
                    decls.push(Decl::Func(func));
                }
                TokenKind::Const => {
                    let specs = self.in_context(ErrorContext::ConstDecl, Self::parse_const_decl)?;
                    decls.push(Decl::Const(specs));
                }
                TokenKind::Var => {
                    let span = self.in_context(ErrorContext::VarDecl, Self::skip_var_decl)?;
                    decls.push(Decl::Var(span));
                }
                _ => return Err(self.unexpected("declaration")),
            }
            self.expect_semi()?;
        }

        Ok(File {
            package,
            imports,
            decls,
        })
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
        self.expect(TokenKind::Import, "`import`")?;
        if self.cursor.eat(TokenKind::LParen) {
            while !self.cursor.check(TokenKind::RParen) && !self.cursor.is_at_end() {
                imports.push(self.parse_import_spec()?);
                self.expect_semi()?;
            }
            self.expect(TokenKind::RParen, "`)`")?;
        } else {
            imports.push(self.parse_import_spec()?);
        }
        self.expect_semi()
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, ParseError> {
        let start = self.cursor.current_span();
        let name = match self.cursor.current_kind() {
            TokenKind::Dot => {
                self.cursor.advance();
                ImportName::Dot
            }
            TokenKind::Ident => {
                let ident = self.expect_ident()?;
                if ident.name == "_" {
                    ImportName::Blank
                } else {
                    ImportName::Alias(ident.name)
                }
            }
            _ => ImportName::Default,
        };
        let path = self.parse_string_lit("import path")?;
        Ok(ImportSpec {
            name,
            path,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// A string literal with its quotes removed.
    fn parse_string_lit(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::String | TokenKind::RawString => {
                let token = self.cursor.advance();
                let text = self.cursor.text(token.span);
                Ok(text[1..text.len() - 1].to_owned())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_type_decl(&mut self, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        self.expect(TokenKind::Type, "`type`")?;
        if self.cursor.eat(TokenKind::LParen) {
            while !self.cursor.check(TokenKind::RParen) && !self.cursor.is_at_end() {
                decls.push(Decl::Type(self.parse_type_spec()?));
                self.expect_semi()?;
            }
            self.expect(TokenKind::RParen, "`)`")?;
        } else {
            decls.push(Decl::Type(self.parse_type_spec()?));
        }
        Ok(())
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let name = self.expect_ident()?;
        let type_params = if self.starts_type_params() {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let alias = self.cursor.eat(TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let start = self.expect(TokenKind::Func, "`func`")?.span;
        let recv = if self.cursor.check(TokenKind::LParen) {
            Some(self.in_context(ErrorContext::Receiver, Self::parse_receiver)?)
        } else {
            None
        };
        let name = self.expect_ident()?;
        let type_params = if self.cursor.check(TokenKind::LBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let sig = self.parse_signature()?;
        let body = if self.cursor.check(TokenKind::LBrace) {
            match self.mode {
                ParseMode::Signatures => {
                    self.skip_braced()?;
                    None
                }
                ParseMode::Full => Some(self.parse_block()?),
            }
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            type_params,
            sig,
            body,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `(o *T)`, `(T)`, `(l List[E])`.
    fn parse_receiver(&mut self) -> Result<Receiver, ParseError> {
        self.expect(TokenKind::LParen, "`(`")?;
        let name = if self.cursor.check(TokenKind::Ident)
            && matches!(self.cursor.peek_kind(1), TokenKind::Ident | TokenKind::Star)
        {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let pointer = self.cursor.eat(TokenKind::Star);
        let base = self.expect_ident()?;
        let mut type_params = Vec::new();
        if self.cursor.eat(TokenKind::LBracket) {
            while !self.cursor.check(TokenKind::RBracket) {
                type_params.push(self.expect_ident()?);
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBracket, "`]`")?;
        }
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(Receiver {
            name,
            base,
            pointer,
            type_params,
        })
    }

    /// Skip a `{ ... }` group by brace matching.
    fn skip_braced(&mut self) -> Result<(), ParseError> {
        let open = self.expect(TokenKind::LBrace, "`{`")?.span;
        let mut depth = 1usize;
        while depth > 0 {
            match self.cursor.advance().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => return Err(ParseError::new(ParseErrorKind::UnclosedBrace, open)),
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_const_decl(&mut self) -> Result<Vec<ConstSpec>, ParseError> {
        self.expect(TokenKind::Const, "`const`")?;
        if !self.cursor.eat(TokenKind::LParen) {
            return Ok(vec![self.parse_const_spec(0)?]);
        }
        let mut specs = Vec::new();
        let mut iota = 0;
        while !self.cursor.check(TokenKind::RParen) && !self.cursor.is_at_end() {
            specs.push(self.parse_const_spec(iota)?);
            iota += 1;
            self.expect_semi()?;
        }
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(specs)
    }

    /// `A, B T = x, y`; type and values are both optional inside a group.
    fn parse_const_spec(&mut self, iota: u32) -> Result<ConstSpec, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.cursor.eat(TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = match self.cursor.current_kind() {
            TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen => None,
            _ => Some(self.parse_type()?),
        };
        let values = if self.cursor.eat(TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(ConstSpec {
            names,
            ty,
            values,
            iota,
        })
    }

    /// Skip a `var` declaration up to its terminating semicolon.
    fn skip_var_decl(&mut self) -> Result<Span, ParseError> {
        let start = self.cursor.advance().span;
        let mut depth = 0usize;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => depth -= 1,
                TokenKind::Eof => return Err(self.unexpected("`;` or newline")),
                _ => {}
            }
            self.cursor.advance();
        }
        Ok(start.merge(self.cursor.previous_span()))
    }
}

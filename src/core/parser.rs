//! Lanefile parser
//!
//! Recursive descent over the token stream from [`super::lexer`]. Failures
//! are reported as [`SyntaxError`] with the line, column and source line of
//! the offending token, relative to the start of the script text.

use std::rc::Rc;

use super::ast::{
    Arg, Block, DeclName, Expr, ExprKind, HookDecl, HookKind, ImportDecl, Item, LaneDecl,
    PlatformDecl, Program, Stmt, StmtKind,
};
use super::lexer::{LexError, Lexer, Token, TokenKind};
use super::script::Script;
use super::value::Value;
use crate::error::SyntaxError;

/// Parse a script into a [`Program`].
///
/// Quote repair runs first; it preserves line structure so positions still
/// refer to the raw source.
pub fn parse(script: &Script) -> Result<Program, SyntaxError> {
    let repaired = script.repaired_source();
    let tokens = Lexer::new(&repaired)
        .tokenize()
        .map_err(|e| lex_error(script, &e))?;

    let mut parser = Parser {
        tokens,
        pos: 0,
        origin: Rc::from(script.origin_label()),
        script,
    };
    parser.program()
}

fn lex_error(script: &Script, e: &LexError) -> SyntaxError {
    SyntaxError {
        origin: script.origin_label(),
        line: e.line,
        column: e.column,
        message: e.message.clone(),
        source_line: script.line(e.line).unwrap_or_default().to_string(),
    }
}

struct Parser<'s> {
    tokens: Vec<Token>,
    pos: usize,
    origin: Rc<str>,
    script: &'s Script,
}

type ParseResult<T> = Result<T, SyntaxError>;

impl Parser<'_> {
    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        // tokenize() always ends with Eof, so the last token is a safe fallback
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_second_kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn skip_newlines(&mut self) {
        while self.at(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            origin: self.origin.to_string(),
            line: token.line,
            column: token.column,
            message: message.into(),
            source_line: self.script.line(token.line).unwrap_or_default().to_string(),
        }
    }

    fn unexpected(&self, expecting: &str) -> SyntaxError {
        let token = self.peek();
        self.error_at(token, format!("unexpected {}, expecting {expecting}", token.kind))
    }

    fn expect(&mut self, kind: &TokenKind, expecting: &str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expecting))
        }
    }

    /// A statement or declaration must be followed by a line break, or by
    /// the `}` closing the surrounding block.
    fn expect_terminator(&mut self) -> ParseResult<()> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof | TokenKind::RBrace => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn program(&mut self) -> ParseResult<Program> {
        let items = self.items(false)?;
        if !self.at(&TokenKind::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(Program { items })
    }

    /// Items up to end of input, or up to (not including) the closing `}`
    /// when `in_block` is set.
    fn items(&mut self, in_block: bool) -> ParseResult<Vec<Item>> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::Eof if in_block => return Err(self.unexpected("'}'")),
                TokenKind::Eof => break,
                TokenKind::RBrace if in_block => break,
                _ => {}
            }
            items.push(self.item()?);
            self.expect_terminator()?;
        }
        Ok(items)
    }

    fn item(&mut self) -> ParseResult<Item> {
        let TokenKind::Ident(word) = self.peek_kind().clone() else {
            return Ok(Item::Statement(self.statement()?));
        };

        // `error = ...` and friends are plain assignments
        if self.peek_second_kind() == &TokenKind::Assign {
            return Ok(Item::Statement(self.statement()?));
        }

        match word.as_str() {
            "lane" => self.lane_decl().map(Item::Lane),
            "platform" => self.platform_decl().map(Item::Platform),
            "import" => self.import_decl().map(Item::Import),
            keyword => match HookKind::from_keyword(keyword) {
                Some(kind) => self.hook_decl(kind).map(Item::Hook),
                None => Ok(Item::Statement(self.statement()?)),
            },
        }
    }

    fn decl_name(&mut self, what: &str) -> ParseResult<DeclName> {
        let parenthesized = self.at(&TokenKind::LParen);
        if parenthesized {
            self.advance();
        }

        let name = match self.peek_kind().clone() {
            TokenKind::Symbol(s) => DeclName::Symbol(s),
            TokenKind::Str(s) => DeclName::Str(s),
            TokenKind::Ident(s) => DeclName::Ident(s),
            _ => return Err(self.unexpected(&format!("{what} name"))),
        };
        self.advance();

        if parenthesized {
            self.expect(&TokenKind::RParen, "')'")?;
        }
        Ok(name)
    }

    fn lane_decl(&mut self) -> ParseResult<LaneDecl> {
        let keyword = self.advance();
        let name = self.decl_name("lane")?;
        let block = if self.at(&TokenKind::LBrace) {
            Some(Rc::new(self.block()?))
        } else {
            None
        };
        Ok(LaneDecl {
            name,
            block,
            line: keyword.line,
        })
    }

    fn platform_decl(&mut self) -> ParseResult<PlatformDecl> {
        let keyword = self.advance();
        let name = self.decl_name("platform")?;
        self.expect(&TokenKind::LBrace, "'{'")?;
        let items = self.items(true)?;
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(PlatformDecl {
            name,
            items,
            line: keyword.line,
        })
    }

    fn hook_decl(&mut self, kind: HookKind) -> ParseResult<HookDecl> {
        let keyword = self.advance();
        if !self.at(&TokenKind::LBrace) {
            return Err(self.unexpected("'{'"));
        }
        let block = Rc::new(self.block()?);
        Ok(HookDecl {
            kind,
            block,
            line: keyword.line,
        })
    }

    fn import_decl(&mut self) -> ParseResult<ImportDecl> {
        let keyword = self.advance();
        let parenthesized = self.at(&TokenKind::LParen);
        if parenthesized {
            self.advance();
        }
        let TokenKind::Str(path) = self.peek_kind().clone() else {
            return Err(self.unexpected("string path"));
        };
        self.advance();
        if parenthesized {
            self.expect(&TokenKind::RParen, "')'")?;
        }
        Ok(ImportDecl {
            path,
            line: keyword.line,
        })
    }

    fn block(&mut self) -> ParseResult<Block> {
        let open = self.expect(&TokenKind::LBrace, "'{'")?;
        self.skip_newlines();

        let mut params = Vec::new();
        if self.at(&TokenKind::Pipe) {
            self.advance();
            loop {
                let TokenKind::Ident(name) = self.peek_kind().clone() else {
                    return Err(self.unexpected("block parameter name"));
                };
                self.advance();
                params.push(name);
                if self.at(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(&TokenKind::Pipe, "'|'")?;
        }

        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(self.unexpected("'}'")),
                _ => {}
            }
            stmts.push(self.statement()?);
            self.expect_terminator()?;
        }

        Ok(Block {
            params,
            stmts,
            origin: Rc::clone(&self.origin),
            line: open.line,
        })
    }

    // ------------------------------------------------------------------
    // Statements and expressions
    // ------------------------------------------------------------------

    fn statement(&mut self) -> ParseResult<Stmt> {
        let line = self.peek().line;
        if let TokenKind::Ident(name) = self.peek_kind().clone() {
            if self.peek_second_kind() == &TokenKind::Assign {
                self.advance();
                self.advance();
                self.skip_newlines();
                let value = self.command_or_expr()?;
                return Ok(Stmt {
                    kind: StmtKind::Assign { name, value },
                    line,
                });
            }
        }
        let expr = self.command_or_expr()?;
        Ok(Stmt {
            kind: StmtKind::Expr(expr),
            line,
        })
    }

    /// `name arg, key: value` without parentheses, or a plain expression
    fn command_or_expr(&mut self) -> ParseResult<Expr> {
        if let TokenKind::Ident(name) = self.peek_kind().clone() {
            if starts_command_argument(self.peek_second_kind()) {
                let line = self.advance().line;
                let args = self.arguments()?;
                return Ok(Expr {
                    kind: ExprKind::Call { name, args },
                    line,
                });
            }
        }
        self.expr()
    }

    fn arguments(&mut self) -> ParseResult<Vec<Arg>> {
        let mut args = vec![self.argument()?];
        while self.at(&TokenKind::Comma) {
            self.advance();
            self.skip_newlines();
            args.push(self.argument()?);
        }
        Ok(args)
    }

    fn argument(&mut self) -> ParseResult<Arg> {
        if let TokenKind::Label(key) = self.peek_kind().clone() {
            self.advance();
            self.skip_newlines();
            return Ok(Arg::Named(key, self.expr()?));
        }
        Ok(Arg::Positional(self.expr()?))
    }

    fn expr(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.postfix()?;
        while self.at(&TokenKind::Plus) {
            self.advance();
            self.skip_newlines();
            let rhs = self.postfix()?;
            let line = lhs.line;
            lhs = Expr {
                kind: ExprKind::Add {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                line,
            };
        }
        Ok(lhs)
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut target = self.primary()?;
        while self.at(&TokenKind::LBracket) {
            self.advance();
            self.skip_newlines();
            let index = self.expr()?;
            self.skip_newlines();
            self.expect(&TokenKind::RBracket, "']'")?;
            let line = target.line;
            target = Expr {
                kind: ExprKind::Index {
                    target: Box::new(target),
                    index: Box::new(index),
                },
                line,
            };
        }
        Ok(target)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let literal = |value| Expr {
            kind: ExprKind::Literal(value),
            line: token.line,
        };

        let expr = match token.kind.clone() {
            TokenKind::Str(s) => literal(Value::Str(s)),
            TokenKind::Symbol(s) => literal(Value::Symbol(s)),
            TokenKind::Int(n) => literal(Value::Int(n)),
            TokenKind::True => literal(Value::Bool(true)),
            TokenKind::False => literal(Value::Bool(false)),
            TokenKind::Nil => literal(Value::Nil),
            TokenKind::LBracket => return self.array_literal(),
            TokenKind::LBrace => return self.map_literal(),
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.expr()?;
                self.skip_newlines();
                self.expect(&TokenKind::RParen, "')'")?;
                return Ok(inner);
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.at(&TokenKind::LParen) {
                    self.advance();
                    self.skip_newlines();
                    let args = if self.at(&TokenKind::RParen) {
                        Vec::new()
                    } else {
                        self.arguments()?
                    };
                    self.skip_newlines();
                    self.expect(&TokenKind::RParen, "')'")?;
                    return Ok(Expr {
                        kind: ExprKind::Call { name, args },
                        line: token.line,
                    });
                }
                return Ok(Expr {
                    kind: ExprKind::Ident(name),
                    line: token.line,
                });
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn array_literal(&mut self) -> ParseResult<Expr> {
        let open = self.advance();
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(&TokenKind::RBracket) {
                self.advance();
                break;
            }
            if !starts_expression(self.peek_kind()) {
                return Err(self.unexpected("']'"));
            }
            items.push(self.expr()?);
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("']'")),
            }
        }
        Ok(Expr {
            kind: ExprKind::Array(items),
            line: open.line,
        })
    }

    fn map_literal(&mut self) -> ParseResult<Expr> {
        let open = self.advance();
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            let key = match self.peek_kind().clone() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Label(key) => key,
                _ => return Err(self.unexpected("label or '}'")),
            };
            self.advance();
            self.skip_newlines();
            entries.push((key, self.expr()?));
            self.skip_newlines();
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("'}'")),
            }
        }
        Ok(Expr {
            kind: ExprKind::Map(entries),
            line: open.line,
        })
    }
}

fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Symbol(_)
            | TokenKind::Str(_)
            | TokenKind::Int(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::LParen
    )
}

/// Tokens that, directly after an identifier, begin a parenthesis-free
/// argument list
fn starts_command_argument(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Label(_)
            | TokenKind::Symbol(_)
            | TokenKind::Str(_)
            | TokenKind::Int(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil
            | TokenKind::LBrace
    )
}

//! # Parser Module
//!
//! Recursive descent parser with Pratt-style precedence climbing for
//! expressions. Consumes a flat token stream from the lexer and produces
//! the program AST consumed by code generation.
//!
//! ## Key Features
//! - Pratt parser for correct operator precedence with minimal code.
//! - Enforces the fixed program shape: top-level bindings, then exactly
//!   one entry function `logic(txn, gtxn, args)`.
//! - Panic-mode recovery at statement boundaries: the parser reports
//!   every syntax error it can find in one run, and only hands out an
//!   AST when that list is empty.

use crate::ast::*;
use crate::error::{ErrorKind, SigilError, SigilResult};
use crate::token::{Token, TokenKind};

// -----------------------------------------------------------------------------
// PRECEDENCE LEVELS
// -----------------------------------------------------------------------------

/// Operator precedence levels, ordered from lowest to highest.
/// Used by the Pratt parser to determine binding strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Precedence {
    None = 0,
    Or = 1,         // ||
    And = 2,        // &&
    BitOr = 3,      // |
    BitXor = 4,     // ^
    BitAnd = 5,     // &
    Equality = 6,   // == !=
    Comparison = 7, // < > <= >=
    Term = 8,       // + -
    Factor = 9,     // * / %
    Unary = 10,     // ! ~
}

// -----------------------------------------------------------------------------
// PARSER STATE
// -----------------------------------------------------------------------------

/// The Sigil parser. Turns tokens into a [`Program`].
pub struct Parser {
    /// Token stream produced by the lexer.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    current: usize,
    /// Every syntax error recorded so far.
    errors: Vec<SigilError>,
}

impl Parser {
    /// Creates a new parser for the given token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the entire token stream into a program.
    ///
    /// # Errors
    /// Returns every syntax error discovered. An AST is only produced
    /// when the error list is empty, so downstream code generation
    /// never sees a tree it cannot trust.
    pub fn parse(mut self) -> Result<Program, Vec<SigilError>> {
        let mut globals = Vec::new();
        let mut entry: Option<FunctionDecl> = None;

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Let | TokenKind::Const => {
                    let after_entry = entry.is_some();
                    match self.declaration() {
                        Ok(stmt) => {
                            if after_entry {
                                self.errors.push(SigilError::parser(
                                    "top-level declarations must precede the entry function",
                                    stmt.span(),
                                ));
                            }
                            globals.push(stmt);
                        }
                        Err(e) => {
                            self.errors.push(e);
                            self.synchronize();
                        }
                    }
                }
                TokenKind::Function => match self.function_declaration() {
                    Ok(decl) => {
                        if entry.is_some() {
                            self.errors.push(SigilError::parser(
                                "multiple function declarations are not supported",
                                decl.span,
                            ));
                        } else {
                            entry = Some(decl);
                        }
                    }
                    Err(e) => {
                        self.errors.push(e);
                        self.synchronize();
                    }
                },
                _ => {
                    let token = self.peek().clone();
                    self.errors.push(SigilError::parser(
                        format!("unexpected token: {:?}", token.kind),
                        token.span,
                    ));
                    self.synchronize();
                }
            }
        }

        let Some(entry) = entry else {
            self.errors.push(SigilError::no_span(
                ErrorKind::Parser,
                "missing entry function 'logic'",
            ));
            return Err(self.errors);
        };

        if self.errors.is_empty() {
            Ok(Program { globals, entry })
        } else {
            Err(self.errors)
        }
    }

    // -------------------------------------------------------------------------
    // DECLARATION PARSING
    // -------------------------------------------------------------------------

    /// Parses `let name = expr;` or `const name = expr;`.
    ///
    /// Declarations without an initializer are not part of the
    /// language; a missing `=` is a syntax error.
    fn declaration(&mut self) -> SigilResult<Stmt> {
        let keyword = self.advance(); // consume 'let' or 'const'
        let span = keyword.span;
        let is_const = keyword.kind == TokenKind::Const;

        let name = self.expect_ident("expected variable name")?;
        self.expect_kind(
            &TokenKind::Eq,
            "expected '=' after variable name (declarations require an initializer)",
        )?;
        let value = self.expression()?;
        self.expect_semicolon()?;

        if is_const {
            Ok(Stmt::Const { name, value, span })
        } else {
            Ok(Stmt::Let { name, value, span })
        }
    }

    /// Parses `function logic(txn, gtxn, args) { body }`.
    fn function_declaration(&mut self) -> SigilResult<FunctionDecl> {
        let span = self.advance().span; // consume 'function'
        let name = self.expect_ident("expected function name")?;
        let params = self.parse_param_list()?;

        if name != "logic" {
            self.errors.push(SigilError::parser(
                format!("entry function must be named 'logic', found '{}'", name),
                span,
            ));
        }
        if params.len() != 3 {
            self.errors.push(SigilError::parser(
                format!(
                    "entry function takes exactly 3 parameters, found {}",
                    params.len()
                ),
                span,
            ));
        }

        let body = self.parse_block_body()?;
        Ok(FunctionDecl {
            name,
            params,
            body,
            span,
        })
    }

    // -------------------------------------------------------------------------
    // STATEMENT PARSING
    // -------------------------------------------------------------------------

    /// Parses a single statement inside the entry function body.
    fn statement(&mut self) -> SigilResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Let | TokenKind::Const => self.declaration(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Error => self.error_statement(),
            TokenKind::Ident(_) => self.assignment(),
            TokenKind::Function => {
                let token = self.peek().clone();
                Err(SigilError::parser(
                    "nested function declarations are not supported",
                    token.span,
                ))
            }
            TokenKind::LBrace => {
                let token = self.peek().clone();
                Err(SigilError::parser(
                    "nested blocks are not supported",
                    token.span,
                ))
            }
            _ => {
                let token = self.peek().clone();
                Err(SigilError::parser(
                    format!("unexpected token: {:?}", token.kind),
                    token.span,
                ))
            }
        }
    }

    /// Parses `return expr;`. A bare `return;` has no meaning for an
    /// approval program, which must leave its verdict on the stack.
    fn return_statement(&mut self) -> SigilResult<Stmt> {
        let span = self.advance().span; // consume 'return'
        if self.check_kind(&TokenKind::Semicolon) {
            return Err(SigilError::parser("expected expression after 'return'", span));
        }
        let value = self.expression()?;
        self.expect_semicolon()?;
        Ok(Stmt::Return { value, span })
    }

    /// Parses the abort statement `error;`.
    fn error_statement(&mut self) -> SigilResult<Stmt> {
        let span = self.advance().span; // consume 'error'
        self.expect_semicolon()?;
        Ok(Stmt::Error { span })
    }

    /// Parses `name = expr;`.
    fn assignment(&mut self) -> SigilResult<Stmt> {
        let token = self.advance();
        let span = token.span;
        let name = match token.kind {
            TokenKind::Ident(name) => name,
            _ => unreachable!("assignment starts with an identifier"),
        };
        self.expect_kind(&TokenKind::Eq, "expected '=' after assignment target")?;
        let value = self.expression()?;
        self.expect_semicolon()?;
        Ok(Stmt::Assign { name, value, span })
    }

    // -------------------------------------------------------------------------
    // EXPRESSION PARSING — Pratt / Precedence Climbing
    // -------------------------------------------------------------------------

    /// Parses an expression at the lowest precedence.
    fn expression(&mut self) -> SigilResult<Expr> {
        self.parse_precedence(Precedence::Or)
    }

    /// Core Pratt parser: parses expressions with the given minimum
    /// precedence. All binary operators are left-associative.
    fn parse_precedence(&mut self, min_prec: Precedence) -> SigilResult<Expr> {
        let mut left = self.parse_prefix()?;

        loop {
            if self.is_at_end() {
                break;
            }

            let prec = self.get_infix_precedence();
            if prec < min_prec {
                break;
            }

            left = self.parse_infix(left, prec)?;
        }

        Ok(left)
    }

    /// Parses a prefix expression (unary operators, literals, grouping,
    /// identifiers).
    fn parse_prefix(&mut self) -> SigilResult<Expr> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_precedence(Precedence::Unary)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    span: token.span,
                })
            }
            TokenKind::Tilde => {
                self.advance();
                let operand = self.parse_precedence(Precedence::Unary)?;
                Ok(Expr::Unary {
                    op: UnaryOp::BitNot,
                    operand: Box::new(operand),
                    span: token.span,
                })
            }

            TokenKind::Int(_) => {
                let t = self.advance();
                if let TokenKind::Int(value) = t.kind {
                    Ok(Expr::Int {
                        value,
                        span: t.span,
                    })
                } else {
                    unreachable!()
                }
            }
            TokenKind::Bytes(_) => {
                let t = self.advance();
                if let TokenKind::Bytes(value) = t.kind {
                    Ok(Expr::Bytes {
                        value,
                        span: t.span,
                    })
                } else {
                    unreachable!()
                }
            }

            TokenKind::Ident(_) => {
                let t = self.advance();
                if let TokenKind::Ident(name) = t.kind {
                    Ok(Expr::Ident { name, span: t.span })
                } else {
                    unreachable!()
                }
            }

            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect_kind(&TokenKind::RParen, "expected ')'")?;
                Ok(expr)
            }

            _ => Err(SigilError::parser(
                format!("unexpected token: {:?}", token.kind),
                token.span,
            )),
        }
    }

    /// Parses an infix (binary) expression.
    fn parse_infix(&mut self, left: Expr, prec: Precedence) -> SigilResult<Expr> {
        let token = self.advance();
        let op = token_to_binop(&token.kind);

        let next_prec = Precedence::from_u8(prec as u8 + 1);
        let right = self.parse_precedence(next_prec)?;

        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span: token.span,
        })
    }

    /// Returns the precedence of the current token as an infix operator.
    fn get_infix_precedence(&self) -> Precedence {
        match self.peek_kind() {
            TokenKind::PipePipe => Precedence::Or,
            TokenKind::AmpAmp => Precedence::And,
            TokenKind::Pipe => Precedence::BitOr,
            TokenKind::Caret => Precedence::BitXor,
            TokenKind::Amp => Precedence::BitAnd,
            TokenKind::EqEq | TokenKind::BangEq => Precedence::Equality,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Precedence::Comparison
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
            _ => Precedence::None,
        }
    }

    // -------------------------------------------------------------------------
    // COMPOUND CONSTRUCTS
    // -------------------------------------------------------------------------

    /// Parses a parameter list: `(param1, param2, ...)`.
    fn parse_param_list(&mut self) -> SigilResult<Vec<String>> {
        self.expect_kind(&TokenKind::LParen, "expected '(' for parameter list")?;
        let mut params = Vec::new();

        if !self.check_kind(&TokenKind::RParen) {
            params.push(self.expect_ident("expected parameter name")?);
            while self.match_kind(&TokenKind::Comma) {
                params.push(self.expect_ident("expected parameter name")?);
            }
        }

        self.expect_kind(&TokenKind::RParen, "expected ')' after parameters")?;
        Ok(params)
    }

    /// Parses the body of the entry function: `{ stmts... }`, recovering
    /// at statement boundaries so one bad statement does not hide the
    /// rest.
    fn parse_block_body(&mut self) -> SigilResult<Vec<Stmt>> {
        self.expect_kind(&TokenKind::LBrace, "expected '{'")?;
        let mut stmts = Vec::new();
        while !self.check_kind(&TokenKind::RBrace) && !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        self.expect_kind(&TokenKind::RBrace, "expected '}'")?;
        Ok(stmts)
    }

    // -------------------------------------------------------------------------
    // ERROR RECOVERY
    // -------------------------------------------------------------------------

    /// Skips tokens until a likely statement boundary: just past a
    /// semicolon, or just before a token that can start a statement.
    /// Always consumes at least one token so recovery makes progress.
    fn synchronize(&mut self) {
        if !self.is_at_end() {
            self.advance();
        }
        while !self.is_at_end() {
            if self.previous_is_semicolon() {
                return;
            }
            match self.peek_kind() {
                TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Error
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn previous_is_semicolon(&self) -> bool {
        self.current > 0 && self.tokens[self.current - 1].kind == TokenKind::Semicolon
    }

    // -------------------------------------------------------------------------
    // TOKEN HELPERS
    // -------------------------------------------------------------------------

    /// Returns a reference to the current token without consuming it.
    #[inline]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the kind of the current token.
    #[inline]
    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.current].kind
    }

    /// Consumes and returns the current token.
    #[inline]
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Returns `true` if the current token is `Eof`.
    #[inline]
    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.current].kind, TokenKind::Eof)
    }

    /// Returns `true` if the current token matches the given kind.
    fn check_kind(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    /// Consumes the current token if it matches `kind`, returning `true`.
    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match `kind`, returning an error otherwise.
    fn expect_kind(&mut self, kind: &TokenKind, msg: &str) -> SigilResult<Token> {
        if self.check_kind(kind) {
            Ok(self.advance())
        } else {
            Err(SigilError::parser(msg, self.peek().span))
        }
    }

    /// Expects an identifier token and returns the name string.
    fn expect_ident(&mut self, msg: &str) -> SigilResult<String> {
        let token = self.peek().clone();
        if let TokenKind::Ident(_) = &token.kind {
            let t = self.advance();
            if let TokenKind::Ident(name) = t.kind {
                Ok(name)
            } else {
                unreachable!()
            }
        } else {
            Err(SigilError::parser(msg, token.span))
        }
    }

    /// Expects a semicolon token.
    fn expect_semicolon(&mut self) -> SigilResult<Token> {
        self.expect_kind(&TokenKind::Semicolon, "expected ';'")
    }
}

// -----------------------------------------------------------------------------
// OPERATOR CONVERSION HELPER
// -----------------------------------------------------------------------------

/// Converts a binary operator token kind to its AST `BinOp`.
fn token_to_binop(kind: &TokenKind) -> BinOp {
    match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::BangEq => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::AmpAmp => BinOp::And,
        TokenKind::PipePipe => BinOp::Or,
        TokenKind::Amp => BinOp::BitAnd,
        TokenKind::Pipe => BinOp::BitOr,
        TokenKind::Caret => BinOp::BitXor,
        _ => unreachable!("not a binary operator: {:?}", kind),
    }
}

// -----------------------------------------------------------------------------
// PRECEDENCE HELPER
// -----------------------------------------------------------------------------

impl Precedence {
    /// Converts a `u8` to a `Precedence`, clamping to `Unary` if out of
    /// range.
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Precedence::None,
            1 => Precedence::Or,
            2 => Precedence::And,
            3 => Precedence::BitOr,
            4 => Precedence::BitXor,
            5 => Precedence::BitAnd,
            6 => Precedence::Equality,
            7 => Precedence::Comparison,
            8 => Precedence::Term,
            9 => Precedence::Factor,
            _ => Precedence::Unary,
        }
    }
}

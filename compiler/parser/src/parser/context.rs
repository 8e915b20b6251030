//! Token cursor with explicit save/rewind, used for the two speculative
//! disambiguations in §4.2 (spec.md §9: "implement with a saved token index
//! and explicit rewind; no need for a fully general backtracking framework").

use std::fmt::Display;

use coffee_ast::token::{Token, TokenKind};
use coffee_errors::{ParseError, Result, Span};

pub struct ParserContext {
    tokens: Vec<Token>,
    pos: usize,
}

/// A saved cursor position, rewindable with [`ParserContext::rewind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark(usize);

impl ParserContext {
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(!tokens.is_empty(), "tokenizer always emits a trailing Eof");
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub fn token(&self) -> &TokenKind {
        &self.current().kind
    }

    pub fn span(&self) -> Span {
        let t = self.current();
        Span::new(t.line, t.column)
    }

    pub fn has_next(&self) -> bool {
        !matches!(self.token(), TokenKind::Eof)
    }

    /// Advances the cursor by one token. A no-op at `Eof`.
    pub fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn rewind(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        self.token() == kind
    }

    /// Looks `dist` tokens ahead of the current one without consuming.
    /// `dist == 0` is the current token.
    pub fn look_ahead(&self, dist: usize) -> &TokenKind {
        match self.tokens.get(self.pos + dist) {
            Some(t) => &t.kind,
            None => &self.tokens[self.tokens.len() - 1].kind,
        }
    }

    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn eat_any(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|k| self.check(k)) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn unexpected<T>(&self, expected: impl Display) -> Result<T> {
        Err(ParseError::Unexpected { span: self.span(), expected: expected.to_string(), found: self.token().to_string() }.into())
    }

    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span> {
        let span = self.span();
        if self.eat(kind) {
            Ok(span)
        } else {
            self.unexpected(kind)
        }
    }

    /// Eats the next token if it's an identifier, returning its name.
    pub fn eat_identifier(&mut self) -> Option<String> {
        if let TokenKind::Ident(name) = self.token() {
            let name = name.clone();
            self.bump();
            Some(name)
        } else {
            None
        }
    }

    pub fn expect_identifier(&mut self) -> Result<String> {
        self.eat_identifier().ok_or_else(|| ParseError::ExpectedIdentifier(self.span()).into())
    }

    /// Parses a `sep`-separated, `open`/`close`-delimited list using `inner`.
    /// No trailing separator is accepted (the source grammar has none).
    pub fn parse_list<T>(&mut self, open: &TokenKind, close: &TokenKind, sep: &TokenKind, mut inner: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect(open)?;
        let mut items = Vec::new();
        if !self.check(close) {
            loop {
                items.push(inner(self)?);
                if !self.eat(sep) {
                    break;
                }
            }
        }
        self.expect(close)?;
        Ok(items)
    }
}

//! Char-by-char scanner (spec.md §4.1). Maintains a (line, column) cursor
//! advanced per character; newlines reset column to 1 and increment line.

use std::iter::Peekable;
use std::str::Chars;

use coffee_ast::token::{Token, TokenKind};
use coffee_errors::{LexError, Result, Span};

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable(), line: 1, column: 1 }
    }

    /// Scans the entire input into a token stream terminated by `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let span = self.pos();
            match self.bump() {
                None => {
                    tokens.push(Token::new(TokenKind::Eof, span.line, span.column));
                    return Ok(tokens);
                }
                Some(c) => {
                    let kind = self.scan_from(c, span)?;
                    tokens.push(Token::new(kind, span.line, span.column));
                }
            }
        }
    }

    fn pos(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_if(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and both comment forms (spec.md §4.1).
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let span = self.pos();
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => continue,
                            None => return Err(LexError::UnterminatedBlockComment(span).into()),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_from(&mut self, c: char, start: Span) -> Result<TokenKind> {
        match c {
            '0'..='9' => Ok(self.scan_number(c)),
            '"' => self.scan_string(start),
            '\'' => self.scan_char(start),
            c if c.is_alphabetic() || c == '_' => Ok(self.scan_identifier(c)),
            '+' => Ok(if self.eat_if('+') {
                TokenKind::PlusPlus
            } else if self.eat_if('=') {
                TokenKind::PlusEq
            } else {
                TokenKind::Plus
            }),
            '-' => Ok(if self.eat_if('-') {
                TokenKind::MinusMinus
            } else if self.eat_if('=') {
                TokenKind::MinusEq
            } else {
                TokenKind::Minus
            }),
            '*' => Ok(TokenKind::Star),
            '/' => Ok(TokenKind::Slash),
            '%' => Ok(TokenKind::Percent),
            '=' => Ok(if self.eat_if('=') { TokenKind::EqEq } else { TokenKind::Assign }),
            '!' => Ok(if self.eat_if('=') { TokenKind::NotEq } else { TokenKind::Not }),
            '<' => Ok(if self.eat_if('=') { TokenKind::LtEq } else { TokenKind::Lt }),
            '>' => Ok(if self.eat_if('=') { TokenKind::GtEq } else { TokenKind::Gt }),
            '&' if self.eat_if('&') => Ok(TokenKind::AndAnd),
            '|' if self.eat_if('|') => Ok(TokenKind::OrOr),
            '?' => Ok(TokenKind::Question),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            '[' => Ok(TokenKind::LBracket),
            ']' => Ok(TokenKind::RBracket),
            ';' => Ok(TokenKind::Semicolon),
            ',' => Ok(TokenKind::Comma),
            '.' => Ok(TokenKind::Dot),
            ':' => Ok(TokenKind::Colon),
            other => Err(LexError::UnexpectedCharacter(start, other).into()),
        }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        // A `.` is the decimal point only if followed by a digit (spec.md
        // §4.1), so `3.field` never gets mis-scanned as `3.` + `field`.
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(), Some('f' | 'F' | 'd' | 'D')) {
            is_float = true;
            self.bump();
        }
        if is_float {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::Int(text.parse().unwrap_or(0))
        }
    }

    fn scan_escape(&mut self) -> Option<char> {
        match self.bump()? {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            other => Some(other),
        }
    }

    fn scan_string(&mut self, start: Span) -> Result<TokenKind> {
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::Str(s)),
                Some('\\') => match self.scan_escape() {
                    Some(c) => s.push(c),
                    None => return Err(LexError::UnterminatedString(start).into()),
                },
                Some(c) => s.push(c),
                None => return Err(LexError::UnterminatedString(start).into()),
            }
        }
    }

    fn scan_char(&mut self, start: Span) -> Result<TokenKind> {
        let c = match self.bump() {
            Some('\\') => self.scan_escape().ok_or(LexError::UnterminatedChar(start))?,
            Some(c) => c,
            None => return Err(LexError::UnterminatedChar(start).into()),
        };
        if self.bump() != Some('\'') {
            return Err(LexError::UnterminatedChar(start).into());
        }
        Ok(TokenKind::Char(c))
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::keyword(&name).unwrap_or(TokenKind::Ident(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_operators_preferring_longest_match() {
        assert_eq!(
            kinds("++ -- == != <= >= && || += -="),
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_numbers() {
        assert_eq!(kinds("42 3.14 5f 2d"), vec![
            TokenKind::Int(42),
            TokenKind::Float(3.14),
            TokenKind::Float(5.0),
            TokenKind::Float(2.0),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn dot_after_int_is_not_always_decimal() {
        // `3.field` is not valid syntax for this language's grammar, but the
        // lexer must not greedily consume `.` unless a digit follows.
        assert_eq!(kinds("3.x"), vec![TokenKind::Int(3), TokenKind::Dot, TokenKind::Ident("x".into()), TokenKind::Eof]);
    }

    #[test]
    fn scans_string_escapes() {
        assert_eq!(kinds(r#""a\nb\"c""#), vec![TokenKind::Str("a\nb\"c".into()), TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(kinds("class public x"), vec![TokenKind::Class, TokenKind::Public, TokenKind::Ident("x".into()), TokenKind::Eof]);
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = Lexer::new("a\nb").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 1));
    }

    #[test]
    fn unterminated_string_fails() {
        assert!(Lexer::new("\"abc").tokenize().is_err());
    }

    #[test]
    fn skips_comments() {
        assert_eq!(kinds("1 // line\n/* block */ 2"), vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]);
    }
}

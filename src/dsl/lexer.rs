//! Lexer (tokenizer) for model-definition documents.
//!
//! Besides plain tokens, the lexer offers the statement-level reads the parser
//! needs: single punctuation checks, array bounds, `dt(...)` arguments and raw
//! equation text up to the statement terminator.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{ModelError, Result};

/// Statement terminator.
pub const STATEMENT_END: char = ';';
/// Comment start; comments run to end of line.
pub const COMMENT: char = '#';

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Token {
    /// Whether this is the punctuation character `ch`.
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.len() == ch.len_utf8() && self.text.starts_with(ch)
    }
}

/// Token types in the model language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A name or keyword
    Identifier,
    /// Structural punctuation: `; , { } [ ] ( ) = : #` and other symbols
    Punctuation,
    /// Operators that only make sense inside equations: `+ - * / ^ < > ! & | ? % .`
    EquationPunctuation,
    /// An unsigned integer literal
    Integer,
    /// A floating point literal
    Float,
    /// End of input
    Eof,
}

/// Half-open index range `[lower, upper)` of an array declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub lower: i64,
    pub upper: i64,
}

impl IndexRange {
    /// Create a range; callers guarantee `lower < upper`.
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// Number of elements in the range.
    pub fn len(&self) -> usize {
        (self.upper - self.lower).max(0) as usize
    }

    /// Whether the range holds no index.
    pub fn is_empty(&self) -> bool {
        self.upper <= self.lower
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.lower..self.upper
    }
}

/// A name with an optional subscript range, as in `dt(x)` or `dt(x[0:3])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptedName {
    pub name: String,
    /// `None` for a scalar
    pub range: Option<IndexRange>,
}

/// Outcome of reading a parenthesized function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgument {
    /// `( name )` or `( name[bounds] )`
    Name(SubscriptedName),
    /// Anything else; carries the offending text
    Malformed(String),
}

/// Name of an expanded array element: `base_index`.
pub fn element_name(base: &str, index: i64) -> String {
    format!("{}_{}", base, index)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_equation_punct(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | '*' | '/' | '^' | '<' | '>' | '!' | '&' | '|' | '?' | '%' | '.'
    )
}

/// Lexer for tokenizing model-definition input.
pub struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Current line (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the next token. Only whitespace is skipped; `#` comes back as
    /// punctuation so the caller decides when to [`skip_comment`](Self::skip_comment).
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    line: self.line,
                    column: self.column,
                });
            }
        };

        let line = self.line;
        let column = self.column;

        let (kind, text) = if is_ident_start(ch) {
            (TokenKind::Identifier, self.read_identifier())
        } else if ch.is_ascii_digit() || (ch == '.' && self.second_char().is_some_and(|c| c.is_ascii_digit())) {
            self.read_number()
        } else if is_equation_punct(ch) {
            self.advance();
            (TokenKind::EquationPunctuation, ch.to_string())
        } else {
            // Anything else, including non-ASCII, is left for the caller to report
            self.advance();
            (TokenKind::Punctuation, ch.to_string())
        };

        Ok(Token {
            kind,
            text,
            line,
            column,
        })
    }

    /// Next significant character, skipping whitespace and comments, without
    /// consuming it. Returns `None` unless it is punctuation.
    pub fn peek_punct(&mut self) -> Option<char> {
        self.skip_trivia();
        self.peek_char()
            .filter(|ch| !is_ident_char(*ch) && !ch.is_whitespace())
    }

    /// Consume the next significant character if it is `expected`.
    pub fn eat_punct(&mut self, expected: char) -> bool {
        if self.peek_punct() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Read array bounds after an opening `[`, through the closing `]`.
    ///
    /// `lb:ub` is the half-open range `[lb, ub)`; a single index `n` is `[n, n+1)`.
    pub fn read_array_bounds(&mut self) -> Result<IndexRange> {
        let lower = self.read_bound()?;
        let upper = if self.eat_punct(':') {
            self.read_bound()?
        } else {
            lower
                .checked_add(1)
                .ok_or_else(|| ModelError::bad_bounds(self.line, format!("index {} is out of range", lower)))?
        };

        if !self.eat_punct(']') {
            return Err(ModelError::expected("]", self.line));
        }
        if upper <= lower {
            return Err(ModelError::bad_bounds(
                self.line,
                format!("upper bound {} must exceed lower bound {}", upper, lower),
            ));
        }

        Ok(IndexRange::new(lower, upper))
    }

    /// Read a single parenthesized argument that must be a (possibly
    /// subscripted) name.
    pub fn read_function_arg(&mut self) -> Result<CallArgument> {
        if !self.eat_punct('(') {
            return Ok(CallArgument::Malformed(self.describe_next()));
        }

        self.skip_trivia();
        if !self.peek_char().is_some_and(is_ident_start) {
            return Ok(CallArgument::Malformed(self.describe_next()));
        }
        let name = self.read_identifier();

        let range = if self.eat_punct('[') {
            Some(self.read_array_bounds()?)
        } else {
            None
        };

        if !self.eat_punct(')') {
            return Ok(CallArgument::Malformed(name));
        }

        Ok(CallArgument::Name(SubscriptedName { name, range }))
    }

    /// Read raw statement text up to, not including, the terminator.
    ///
    /// Comments are dropped and whitespace runs collapse to a single space.
    pub fn read_statement_text(&mut self) -> String {
        let mut text = String::new();
        let mut pending_space = false;

        while let Some(ch) = self.peek_char() {
            match ch {
                STATEMENT_END => break,
                COMMENT => {
                    self.skip_comment();
                    pending_space = true;
                    continue;
                }
                _ if ch.is_whitespace() => {
                    self.advance();
                    pending_space = true;
                    continue;
                }
                _ => {}
            }

            if pending_space && !text.is_empty() {
                text.push(' ');
            }
            pending_space = false;
            text.push(ch);
            self.advance();
        }

        text
    }

    /// Read a parenthesized body verbatim, after the opening `(` was consumed,
    /// through the matching `)`. The result excludes the closing parenthesis
    /// and is trimmed; comment characters and line breaks are kept.
    pub fn read_parenthesized(&mut self, open_line: usize, open_column: usize) -> Result<String> {
        let mut text = String::new();
        let mut depth = 1usize;

        while let Some(ch) = self.advance() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text.trim().to_string());
                    }
                }
                _ => {}
            }
            text.push(ch);
        }

        Err(ModelError::lexer(
            open_line,
            open_column,
            "unbalanced '(': no matching ')' before end of input",
        ))
    }

    /// Line and column of the next character.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Discard everything through the next statement terminator.
    pub fn eat_statement(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == COMMENT {
                self.skip_comment();
                continue;
            }
            self.advance();
            if ch == STATEMENT_END {
                break;
            }
        }
    }

    /// Skip the rest of the current line.
    pub fn skip_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn second_char(&self) -> Option<char> {
        self.chars.clone().nth(1).map(|(_, ch)| ch)
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek_char() == Some(COMMENT) {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    fn describe_next(&mut self) -> String {
        match self.peek_char() {
            Some(ch) => ch.to_string(),
            None => "end of input".to_string(),
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek_char() {
            if is_ident_char(ch) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> (TokenKind, String) {
        let mut text = String::new();
        let mut kind = TokenKind::Integer;

        // Integer part
        self.read_digits(&mut text);

        // Decimal part
        if self.peek_char() == Some('.') {
            kind = TokenKind::Float;
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent part, only when digits follow
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mut ahead = self.chars.clone();
            ahead.next();
            let exponent_follows = match ahead.next().map(|(_, c)| c) {
                Some('+' | '-') => ahead.next().is_some_and(|(_, c)| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                kind = TokenKind::Float;
                if let Some(e) = self.advance() {
                    text.push(e);
                }
                if let Some(sign @ ('+' | '-')) = self.peek_char() {
                    text.push(sign);
                    self.advance();
                }
                self.read_digits(&mut text);
            }
        }

        (kind, text)
    }

    fn read_bound(&mut self) -> Result<i64> {
        self.skip_trivia();
        let mut digits = String::new();
        self.read_digits(&mut digits);
        if digits.is_empty() {
            let found = self.describe_next();
            return Err(ModelError::bad_bounds(
                self.line,
                format!("expected an integer bound, found '{}'", found),
            ));
        }
        digits.parse::<i64>().map_err(|e| {
            ModelError::bad_bounds(self.line, format!("bound '{}' is out of range: {}", digits, e))
        })
    }
}

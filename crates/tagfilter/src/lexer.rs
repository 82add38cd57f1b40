//! Lexer (tokenizer) for tag filter expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use serde_json::Number;

use crate::ast::Operator;
use crate::error::{FilterError, FilterResult};

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: FilterToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a tag filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterToken {
    // ==================== Literals ====================
    /// A bare word that is not a keyword, e.g. `call.http.status`.
    Identifier(String),

    /// A quoted string with escapes resolved.
    String(String),

    /// An integer or floating point literal.
    Number(Number),

    /// `TRUE` or `FALSE` in any case.
    Boolean(bool),

    // ==================== Keywords ====================
    /// A comparison or unary operator name in any case.
    Operator(Operator),

    /// The `AND` keyword.
    And,

    /// The `OR` keyword.
    Or,

    // ==================== Punctuation ====================
    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    /// Tag key separator `:`.
    Colon,

    /// Origin separator `@`.
    At,
}

impl FilterToken {
    /// Returns true for tokens that can follow a comparison operator.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            FilterToken::String(_) | FilterToken::Number(_) | FilterToken::Boolean(_)
        )
    }

    /// Renders the token the way it would appear in a filter string.
    pub fn describe(&self) -> String {
        match self {
            FilterToken::Identifier(name) => format!("'{name}'"),
            FilterToken::String(value) => format!("string '{value}'"),
            FilterToken::Number(value) => format!("number {value}"),
            FilterToken::Boolean(value) => format!("boolean {value}"),
            FilterToken::Operator(op) => op.as_str().to_string(),
            FilterToken::And => "AND".to_string(),
            FilterToken::Or => "OR".to_string(),
            FilterToken::OpenParen => "'('".to_string(),
            FilterToken::CloseParen => "')'".to_string(),
            FilterToken::Colon => "':'".to_string(),
            FilterToken::At => "'@'".to_string(),
        }
    }
}

/// Lexer for tokenizing tag filter expressions.
///
/// Tokenizing stops at the first character that cannot be read; there is no
/// error recovery.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Consumes the next character.
    fn next_char(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    /// Byte offset of the next unread character.
    fn current_position(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.input.len(), |&(position, _)| position)
    }

    /// Consumes the next character if it satisfies `pred`.
    fn next_if(&mut self, pred: impl FnOnce(char) -> bool) -> Option<char> {
        self.chars.next_if(|&(_, c)| pred(c)).map(|(_, c)| c)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.next_if(char::is_whitespace).is_some() {}
    }

    /// Reads a word: a letter or `_`, followed by letters, digits and `_ . - /`.
    fn read_word(&mut self, start: usize) -> &'a str {
        while self.next_if(is_word_char).is_some() {}
        &self.input[start..self.current_position()]
    }

    /// Reads a quoted string. The opening quote has not been consumed yet.
    fn read_quoted_string(&mut self, quote_char: char, start: usize) -> FilterResult<String> {
        self.next_char();

        let mut result = String::new();
        loop {
            match self.next_char() {
                Some(c) if c == quote_char => return Ok(result),
                Some('\\') => match self.next_char() {
                    Some(escaped) => result.push(escaped),
                    None => break,
                },
                Some(c) => result.push(c),
                None => break,
            }
        }
        Err(FilterError::UnterminatedString { position: start })
    }

    /// Reads a number: `-? digits (. digits)? ([eE] [+-]? digits)?`.
    fn read_number(&mut self, start: usize) -> FilterResult<Number> {
        self.next_if(|c| c == '-');
        while self.next_if(|c| c.is_ascii_digit()).is_some() {}

        let mut is_float = false;
        if self.next_if(|c| c == '.').is_some() {
            is_float = true;
            while self.next_if(|c| c.is_ascii_digit()).is_some() {}
        }
        if self.next_if(|c| c == 'e' || c == 'E').is_some() {
            is_float = true;
            self.next_if(|c| c == '+' || c == '-');
            while self.next_if(|c| c.is_ascii_digit()).is_some() {}
        }
        // A number glued to a word, e.g. `12abc`, is not a number.
        while self.next_if(is_word_char).is_some() {
            is_float = true;
        }

        let literal = &self.input[start..self.current_position()];
        let invalid = || FilterError::InvalidNumber {
            literal: literal.to_string(),
            position: start,
        };

        if !is_float {
            if let Ok(value) = literal.parse::<i64>() {
                return Ok(Number::from(value));
            }
            if let Ok(value) = literal.parse::<u64>() {
                return Ok(Number::from(value));
            }
        }
        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(invalid)
    }

    /// Returns the next token with its position, or `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> FilterResult<Option<PositionedToken>> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let position = self.current_position();

        let token = match c {
            '(' | ')' | ':' | '@' => {
                self.next_char();
                match c {
                    '(' => FilterToken::OpenParen,
                    ')' => FilterToken::CloseParen,
                    ':' => FilterToken::Colon,
                    _ => FilterToken::At,
                }
            }
            '\'' | '"' => FilterToken::String(self.read_quoted_string(c, position)?),
            '-' if self.input[position + 1..].starts_with(|n: char| n.is_ascii_digit()) => {
                FilterToken::Number(self.read_number(position)?)
            }
            _ if c.is_ascii_digit() => FilterToken::Number(self.read_number(position)?),
            _ if c.is_alphabetic() || c == '_' => keyword_or_identifier(self.read_word(position)),
            _ => {
                return Err(FilterError::UnexpectedCharacter {
                    character: c,
                    position,
                })
            }
        };

        Ok(Some(PositionedToken { token, position }))
    }

    /// Collects all tokens, failing on the first lexical error.
    pub fn tokenize(mut self) -> FilterResult<Vec<PositionedToken>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')
}

fn keyword_or_identifier(word: &str) -> FilterToken {
    if word.eq_ignore_ascii_case("and") {
        FilterToken::And
    } else if word.eq_ignore_ascii_case("or") {
        FilterToken::Or
    } else if word.eq_ignore_ascii_case("true") {
        FilterToken::Boolean(true)
    } else if word.eq_ignore_ascii_case("false") {
        FilterToken::Boolean(false)
    } else if let Some(op) = Operator::from_name(word) {
        FilterToken::Operator(op)
    } else {
        FilterToken::Identifier(word.to_string())
    }
}

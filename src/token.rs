use log::trace;
use std::fmt;

use crate::config::NumBase;

/// Token classes produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    /// Prefix, infix or postfix operator
    Operator,
    FunctionName,
    BracketOpen,
    BracketClose,
    /// A single character that starts neither a number nor a known name
    Invalid,
}

/// A piece of the expression text. `position` is the character offset of
/// the first character of the token in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: &str, position: usize) -> Self {
        Token {
            kind,
            value: value.to_owned(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}('{}')@{}", self.kind, self.value, self.position)
    }
}

/// A name the tokenizer recognizes and the kind of token it becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub name: String,
    pub kind: TokenKind,
}

impl Word {
    pub fn new(name: &str, kind: TokenKind) -> Self {
        Word {
            name: name.to_owned(),
            kind,
        }
    }
}

fn same_char(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Lazy tokenizer over one expression.
///
/// At every position the longest known name wins (the first one added on a
/// tie), then a digit run of the current base, and anything else becomes a
/// one-character `Invalid` token. Digit runs stop where a known name starts,
/// so `10cos` is a number followed by a function even in hexadecimal where
/// `c` is a digit.
#[derive(Debug, Clone)]
pub struct Tokens {
    chars: Vec<char>,
    pos: usize,
    words: Vec<Word>,
    base: NumBase,
    decimal_point: char,
}

impl Tokens {
    pub fn new(expression: &str, words: Vec<Word>, base: NumBase, decimal_point: char) -> Self {
        Tokens {
            chars: expression.chars().collect(),
            pos: 0,
            words,
            base,
            decimal_point,
        }
    }

    // the longest name starting at `pos`
    fn match_word(&self, pos: usize) -> Option<(usize, TokenKind)> {
        let rest = &self.chars[pos..];
        let mut best: Option<(usize, TokenKind)> = None;
        for w in self.words.iter() {
            let len = w.name.chars().count();
            if len == 0 || len > rest.len() {
                continue;
            }
            if !w.name.chars().zip(rest.iter()).all(|(a, b)| same_char(a, *b)) {
                continue;
            }
            match best {
                Some((best_len, _)) if best_len >= len => {}
                _ => best = Some((len, w.kind)),
            }
        }
        best
    }

    fn digits_from(&self, mut pos: usize) -> usize {
        while pos < self.chars.len() && self.base.is_digit(self.chars[pos]) && self.match_word(pos).is_none() {
            pos += 1;
        }
        pos
    }

    // end of the number literal starting at `pos`, if there is one
    fn match_number(&self, pos: usize) -> Option<usize> {
        let mut end = self.digits_from(pos);
        let mut digits = end - pos;
        if end < self.chars.len() && self.chars[end] == self.decimal_point && self.match_word(end).is_none() {
            let frac_end = self.digits_from(end + 1);
            digits += frac_end - end - 1;
            if digits > 0 {
                end = frac_end;
            }
        }
        if digits == 0 {
            None
        } else {
            Some(end)
        }
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) -> Token {
        let value: String = self.chars[start..end].iter().collect();
        self.pos = end;
        let token = Token::new(kind, &value, start);
        trace!("token {}", token);
        token
    }
}

impl Iterator for Tokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            return None;
        }

        let start = self.pos;
        if let Some((len, kind)) = self.match_word(start) {
            return Some(self.emit(kind, start, start + len));
        }
        if let Some(end) = self.match_number(start) {
            return Some(self.emit(TokenKind::Number, start, end));
        }
        Some(self.emit(TokenKind::Invalid, start, start + 1))
    }
}

/// Splits `expression` into tokens, recognizing `words` and number literals
/// of `base`
pub fn tokenize(expression: &str, words: Vec<Word>, base: NumBase, decimal_point: char) -> Tokens {
    Tokens::new(expression, words, base, decimal_point)
}
